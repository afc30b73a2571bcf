use crate::bag::{Bag, BagItem};
use crate::budget::{self, Budget};
use crate::constants::{
    BUDGET_THRESHOLD, CONCEPT_BELIEFS_MAX, CONCEPT_GOALS_MAX, CONCEPT_QUESTIONS_MAX,
    REVISION_MAX_OCCURRENCE_DISTANCE, TASK_LINK_BAG_SIZE, TASK_LINK_FORGET_CYCLES,
    TERM_LINK_BAG_SIZE, TERM_LINK_FORGET_CYCLES,
};
use crate::link::{TaskLink, TermLink};
use crate::sentence::{solution_quality, Sentence};
use crate::stamp::{self, IntervalMark};
use crate::task::Task;
use crate::term::Term;
use crate::truth;

/// Per-term memory item: beliefs, questions, goals, and the link
/// sub-bags feeding the inference cycle.
///
/// Concepts are created on first reference and never destroyed during a
/// run; forgetting lowers their priority, not their existence.
pub struct Concept {
    pub term: Term,
    pub budget: Budget,
    pub beliefs: Vec<Task>,
    pub questions: Vec<Task>,
    pub goals: Vec<Task>,
    pub task_links: Bag<TaskLink>,
    pub term_links: Bag<TermLink>,
    key: String,
}

impl Concept {
    pub fn new(term: Term, budget: Budget) -> Concept {
        let key = term.name().to_string();
        Concept {
            term,
            budget,
            beliefs: Vec::new(),
            questions: Vec::new(),
            goals: Vec::new(),
            task_links: Bag::new(TASK_LINK_BAG_SIZE, TASK_LINK_FORGET_CYCLES),
            term_links: Bag::new(TERM_LINK_BAG_SIZE, TERM_LINK_FORGET_CYCLES),
            key,
        }
    }

    pub fn name(&self) -> &str {
        &self.key
    }

    /// Index of the belief best matching a task, by confidence.
    pub fn select_candidate(&self, task: &Task) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, belief) in self.beliefs.iter().enumerate() {
            let q = solution_quality(&task.sentence, &belief.sentence, true);
            if best.is_none_or(|(_, bq)| q > bq) {
                best = Some((i, q));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Digest a judgment task into the belief table.
    ///
    /// Duplicate evidence is dropped. A matching revisable belief is
    /// merged by revision, the revised judgment joining the table beside
    /// its parents. The incoming task itself is remembered when its
    /// budget clears the threshold.
    pub fn process_judgment(&mut self, task: &mut Task, now: i64) {
        if let Some(idx) = self.select_candidate(task) {
            let candidate = &self.beliefs[idx];

            if candidate
                .sentence
                .stamp
                .equals(&task.sentence.stamp, false, true, true)
            {
                return;
            }

            if revision_applicable(&task.sentence, &candidate.sentence) {
                let candidate = self.beliefs[idx].clone();
                let revised = local_revision(task, &candidate, now);

                let new_truth = task.sentence.truth.as_ref().expect("judgment has truth");
                task.achievement = Some(match &candidate.sentence.truth {
                    Some(old) => (new_truth.expectation() - old.expectation()).abs(),
                    None => new_truth.expectation(),
                });

                if revised.budget.summary() > BUDGET_THRESHOLD {
                    self.add_belief(revised);
                }
            }
        }

        if task.budget.summary() > BUDGET_THRESHOLD {
            self.add_belief(task.clone());
        }
    }

    /// Append a belief, evicting the lowest-quality one at capacity.
    pub fn add_belief(&mut self, task: Task) {
        if self.beliefs.len() >= CONCEPT_BELIEFS_MAX {
            let worst = self
                .beliefs
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    a.budget
                        .quality()
                        .partial_cmp(&b.budget.quality())
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(i, _)| i);
            if let Some(i) = worst {
                self.beliefs.remove(i);
            }
        }
        self.beliefs.push(task);
    }

    /// Append a question, FIFO-shifting at capacity.
    pub fn add_question(&mut self, task: Task) {
        if self.questions.len() >= CONCEPT_QUESTIONS_MAX {
            self.questions.remove(0);
        }
        self.questions.push(task);
    }

    /// Append a goal, FIFO-shifting at capacity.
    pub fn add_goal(&mut self, task: Task) {
        if self.goals.len() >= CONCEPT_GOALS_MAX {
            self.goals.remove(0);
        }
        self.goals.push(task);
    }

    pub fn insert_task_link(&mut self, link: TaskLink) -> Option<TaskLink> {
        self.task_links.put_in(link)
    }

    pub fn insert_term_link(&mut self, link: TermLink) -> Option<TermLink> {
        self.term_links.put_in(link)
    }
}

impl BagItem for Concept {
    fn key(&self) -> &str {
        &self.key
    }
    fn budget(&self) -> &Budget {
        &self.budget
    }
    fn budget_mut(&mut self) -> &mut Budget {
        &mut self.budget
    }
}

/// Whether two judgments may be merged by revision: occurrence times
/// compatible, the sentence form revisable, temporal orders agreeing
/// (or unspecified), and evidence disjoint.
fn revision_applicable(incoming: &Sentence, candidate: &Sentence) -> bool {
    let s1 = &incoming.stamp;
    let s2 = &candidate.stamp;
    let occurrence_compatible = match (s1.is_eternal(), s2.is_eternal()) {
        (true, true) => true,
        (false, false) => {
            (s1.occurrence_time - s2.occurrence_time).abs() <= REVISION_MAX_OCCURRENCE_DISTANCE
        }
        _ => false,
    };
    if !occurrence_compatible || !incoming.is_revisable() {
        return false;
    }

    let order1 = incoming.term.copula().and_then(|c| c.temporal_order());
    let order2 = candidate.term.copula().and_then(|c| c.temporal_order());
    let order_compatible = match (order1, order2) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    };

    order_compatible && !s1.overlaps(s2)
}

/// Merge a task with a matching belief into a revised judgment task.
fn local_revision(task: &mut Task, belief: &Task, now: i64) -> Task {
    let t_task = task.sentence.truth.expect("judgment has truth");
    let t_belief = belief.sentence.truth.expect("belief has truth");
    let t_derived = truth::revision(&t_task, &t_belief);

    let derived_budget = budget::revise(
        &mut task.budget,
        &t_task,
        Some(&t_belief),
        &t_derived,
        None,
        None,
    );

    let mark = interval_mark_for(&task.sentence.term);
    let derived_stamp = stamp::revision(
        &task.sentence.stamp,
        &belief.sentence.stamp,
        now,
        mark,
        false,
        0,
    );

    Task::derived(
        Sentence::judgment(task.sentence.term.clone(), t_derived, derived_stamp),
        derived_budget,
    )
}

fn interval_mark_for(term: &Term) -> Option<IntervalMark> {
    if let Some(copula) = term.copula() {
        return IntervalMark::from_symbol(copula.symbol());
    }
    if let Some(connector) = term.connector() {
        return IntervalMark::from_symbol(connector.symbol());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentence::Punctuation;
    use crate::stamp::{Stamp, Tense};
    use crate::term::Copula;
    use crate::truth::Truth;

    fn inheritance(s: &str, p: &str) -> Term {
        Term::statement(Term::atom(s), Copula::Inheritance, Term::atom(p))
    }

    fn judgment_task(term: Term, f: f64, c: f64, serial: u64) -> Task {
        let truth = Truth::new(f, c);
        let stamp = Stamp::input(0, Tense::Eternal, 1, serial);
        Task::input(
            Sentence::judgment(term, truth, stamp),
            Budget::new(0.8, 0.5, 0.7),
        )
    }

    fn make_concept(term: Term) -> Concept {
        Concept::new(term, Budget::new(0.8, 0.5, 0.5))
    }

    #[test]
    fn test_name_is_term_name() {
        let c = make_concept(inheritance("bird", "fly"));
        assert_eq!(c.name(), "<bird --> fly>");
        assert_eq!(c.name(), c.term.name());
    }

    #[test]
    fn test_first_judgment_becomes_belief() {
        let term = inheritance("bird", "fly");
        let mut c = make_concept(term.clone());
        let mut task = judgment_task(term, 0.9, 0.9, 1);
        c.process_judgment(&mut task, 0);
        assert_eq!(c.beliefs.len(), 1);
        let belief = &c.beliefs[0].sentence;
        assert!(belief.truth.is_some());
    }

    #[test]
    fn test_duplicate_evidence_dropped() {
        let term = inheritance("bird", "fly");
        let mut c = make_concept(term.clone());
        let mut t1 = judgment_task(term.clone(), 0.9, 0.9, 1);
        c.process_judgment(&mut t1, 0);
        // Same serial: same evidence base, same occurrence time
        let mut t2 = judgment_task(term, 0.9, 0.9, 1);
        c.process_judgment(&mut t2, 1);
        assert_eq!(c.beliefs.len(), 1, "duplicate evidence must not grow beliefs");
    }

    #[test]
    fn test_revision_produces_combined_belief() {
        let term = inheritance("bird", "fly");
        let mut c = make_concept(term.clone());
        let mut t1 = judgment_task(term.clone(), 0.9, 0.9, 1);
        c.process_judgment(&mut t1, 0);
        let mut t2 = judgment_task(term, 0.8, 0.8, 2);
        c.process_judgment(&mut t2, 1);

        // Parents plus the revised judgment
        assert_eq!(c.beliefs.len(), 3);
        let revised = c
            .beliefs
            .iter()
            .filter_map(|b| b.sentence.truth.as_ref())
            .max_by(|a, b| a.confidence().partial_cmp(&b.confidence()).unwrap())
            .expect("beliefs carry truth");
        assert!((revised.frequency() - 0.87).abs() < 0.01, "f = {}", revised.frequency());
        assert!((revised.confidence() - 13.0 / 14.0).abs() < 0.001, "c = {}", revised.confidence());
        assert!(t2.achievement.is_some());
    }

    #[test]
    fn test_overlapping_evidence_blocks_revision() {
        let term = inheritance("bird", "fly");
        let mut c = make_concept(term.clone());
        let mut t1 = judgment_task(term.clone(), 0.9, 0.9, 1);
        c.process_judgment(&mut t1, 0);
        // Same serial but different occurrence handling: craft overlap with
        // distinct occurrence times so the duplicate check passes
        let truth = Truth::new(0.5, 0.5);
        let mut stamp = Stamp::input(3, Tense::Present, 1, 1);
        stamp.evidence = t1.sentence.stamp.evidence.clone();
        let mut t2 = Task::input(
            Sentence::judgment(term, truth, stamp),
            Budget::new(0.8, 0.5, 0.7),
        );
        c.process_judgment(&mut t2, 3);
        // No revision: just the two parent beliefs
        assert_eq!(c.beliefs.len(), 2);
        assert!(t2.achievement.is_none());
    }

    #[test]
    fn test_belief_capacity_evicts_lowest_quality() {
        let term = inheritance("bird", "fly");
        let mut c = make_concept(term.clone());
        for i in 0..CONCEPT_BELIEFS_MAX {
            let mut task = judgment_task(term.clone(), 0.9, 0.9, i as u64 + 10);
            task.budget = Budget::new(0.5, 0.5, 0.2 + (i as f64) * 0.01);
            c.add_belief(task);
        }
        let mut rich = judgment_task(term, 0.9, 0.9, 999);
        rich.budget = Budget::new(0.5, 0.5, 0.9);
        c.add_belief(rich);
        assert_eq!(c.beliefs.len(), CONCEPT_BELIEFS_MAX);
        let min_quality = c
            .beliefs
            .iter()
            .map(|b| b.budget.quality())
            .fold(f64::INFINITY, f64::min);
        assert!(min_quality > 0.2, "lowest-quality belief should be gone");
    }

    #[test]
    fn test_question_capacity_fifo() {
        let mut c = make_concept(inheritance("bird", "fly"));
        for i in 0..(CONCEPT_QUESTIONS_MAX + 2) {
            let term = inheritance(&format!("t{i}"), "fly");
            let stamp = Stamp::input(0, Tense::Eternal, 1, i as u64);
            let task = Task::input(Sentence::question(term, stamp), Budget::new(0.9, 0.9, 1.0));
            c.add_question(task);
        }
        assert_eq!(c.questions.len(), CONCEPT_QUESTIONS_MAX);
        assert_eq!(c.questions[0].sentence.term.name(), "<t2 --> fly>");
    }

    #[test]
    fn test_select_candidate_prefers_confidence() {
        let term = inheritance("bird", "fly");
        let mut c = make_concept(term.clone());
        c.add_belief(judgment_task(term.clone(), 0.9, 0.3, 1));
        c.add_belief(judgment_task(term.clone(), 0.9, 0.8, 2));
        c.add_belief(judgment_task(term.clone(), 0.9, 0.5, 3));
        let probe = judgment_task(term, 0.5, 0.5, 4);
        let idx = c.select_candidate(&probe).expect("beliefs present");
        assert_eq!(idx, 1);
    }

    #[test]
    fn test_low_budget_judgment_not_remembered() {
        let term = inheritance("bird", "fly");
        let mut c = make_concept(term.clone());
        let mut task = judgment_task(term, 0.9, 0.9, 1);
        task.budget = Budget::new(0.001, 0.001, 0.001);
        c.process_judgment(&mut task, 0);
        assert!(c.beliefs.is_empty());
    }

    #[test]
    fn test_every_belief_is_judgment_with_truth_and_stamp() {
        let term = inheritance("bird", "fly");
        let mut c = make_concept(term.clone());
        let mut t1 = judgment_task(term.clone(), 0.9, 0.9, 1);
        c.process_judgment(&mut t1, 0);
        let mut t2 = judgment_task(term, 0.8, 0.8, 2);
        c.process_judgment(&mut t2, 1);
        for belief in &c.beliefs {
            assert_eq!(belief.sentence.punctuation, Punctuation::Judgment);
            assert!(belief.sentence.truth.is_some());
            assert!(!belief.sentence.stamp.evidence.is_empty());
        }
    }
}
