use std::collections::HashMap;

use serde::Serialize;

use crate::bag::{Bag, BagItem};
use crate::budget::Budget;
use crate::concept::Concept;
use crate::constants::{
    CONCEPT_BAG_SIZE, CONCEPT_FORGET_CYCLES, TASK_BAG_SIZE, TASK_FORGET_CYCLES,
    TASK_LINK_FORGET_CYCLES, TERM_LINK_FORGET_CYCLES,
};
use crate::link::{classify, TaskLink, TermLink};
use crate::sentence::{solution_quality, Sentence};
use crate::short_float::prob_or;
use crate::task::{Task, TaskType};
use crate::term::{unify_vars, Term, VarKind};
use crate::truth::truth_to_quality;

/// What an input produced: synchronous answers plus whatever the global
/// task bag displaced.
#[derive(Debug, Default)]
pub struct InputOutcome {
    pub answers: Vec<Sentence>,
    pub overflow: Option<Task>,
}

/// Snapshot row for bag inspection.
#[derive(Clone, Debug, Serialize)]
pub struct BagEntry {
    pub key: String,
    pub priority: f64,
    pub durability: f64,
    pub quality: f64,
}

/// Snapshot row for concept inspection.
#[derive(Clone, Debug, Serialize)]
pub struct ConceptSummary {
    pub name: String,
    pub priority: f64,
    pub quality: f64,
    pub beliefs: usize,
    pub questions: usize,
    pub goals: usize,
    pub task_links: usize,
    pub term_links: usize,
}

/// The concept store and its satellite bags.
///
/// Owns every concept exclusively; tasks referenced by task links live in
/// an id-keyed arena so links never hold pointers. The working-concept
/// pointer names whichever concept the last input or cycle touched.
pub struct Memory {
    concepts: Bag<Concept>,
    pub task_links: Bag<TaskLink>,
    pub term_links: Bag<TermLink>,
    pub global_tasks: Bag<Task>,
    pub novel_tasks: Bag<Task>,
    tasks: HashMap<u64, Task>,
    next_task_id: u64,
    current_concept: Option<String>,
}

impl Memory {
    pub fn new() -> Memory {
        Memory {
            concepts: Bag::new(CONCEPT_BAG_SIZE, CONCEPT_FORGET_CYCLES),
            task_links: Bag::new(CONCEPT_BAG_SIZE, TASK_LINK_FORGET_CYCLES),
            term_links: Bag::new(CONCEPT_BAG_SIZE, TERM_LINK_FORGET_CYCLES),
            global_tasks: Bag::new(TASK_BAG_SIZE, TASK_FORGET_CYCLES),
            novel_tasks: Bag::new(TASK_BAG_SIZE, TASK_FORGET_CYCLES),
            tasks: HashMap::new(),
            next_task_id: 0,
            current_concept: None,
        }
    }

    pub fn concept_count(&self) -> usize {
        self.concepts.size()
    }

    /// Inspect a concept by name without touching its priority.
    pub fn concept(&self, name: &str) -> Option<&Concept> {
        self.concepts.peek(name)
    }

    /// Task arena lookup for link targets.
    pub fn task(&self, id: u64) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn current_concept(&self) -> Option<&str> {
        self.current_concept.as_deref()
    }

    /// Take one concept out for a working cycle.
    pub fn take_out_concept(&mut self) -> Option<Concept> {
        let concept = self.concepts.take_out()?;
        self.current_concept = Some(concept.name().to_string());
        Some(concept)
    }

    /// Return a cycled concept, decaying it.
    pub fn put_back_concept(&mut self, concept: Concept) -> Option<Concept> {
        self.concepts.put_back(concept)
    }

    /// Route one task into memory: conceptualize, digest by punctuation,
    /// then fan out task links and term links across the term tree.
    pub fn input(&mut self, mut task: Task, now: i64) -> InputOutcome {
        let mut outcome = InputOutcome::default();

        let term = task.sentence.term.clone();
        let concept_budget = conceptualization_budget(&task, &term);
        let mut concept = self.pick_or_generate_concept(&term, &concept_budget);

        if task.sentence.is_judgment() {
            concept.process_judgment(&mut task, now);
        } else if task.sentence.is_question() {
            if term.contains_variable(VarKind::Query) {
                outcome.answers = self.process_wh_question(&mut task, &mut concept);
            } else if let Some(answer) = process_yes_no_question(&mut task, &mut concept) {
                outcome.answers.push(answer);
            }
        } else if task.sentence.is_goal() {
            concept.add_goal(task.clone());
        }

        let task_id = self.next_task_id;
        self.next_task_id += 1;
        self.tasks.insert(task_id, task.clone());

        self.create_task_links(task_id, &task, &mut concept);
        self.create_term_links(&task, &mut concept);

        if task.task_type == TaskType::Derived {
            self.novel_tasks.put_in(task.clone());
        }
        outcome.overflow = self.global_tasks.put_in(task);

        self.current_concept = Some(concept.name().to_string());
        self.concepts.put_in(concept);

        outcome
    }

    /// Fetch a concept for mutation, activating it on re-entry, or
    /// create it fresh. The caller owns the concept until it is put back.
    fn pick_or_generate_concept(&mut self, term: &Term, budget: &Budget) -> Concept {
        match self.concepts.pick_out(term.name()) {
            Some(mut concept) => {
                let b = &mut concept.budget;
                b.priority.set(prob_or(b.priority(), budget.priority()));
                b.durability.set(prob_or(b.durability(), budget.durability()));
                b.quality = b.quality.max(budget.quality);
                concept
            }
            None => Concept::new(term.clone(), *budget),
        }
    }

    /// Run a closure against the concept for `term`, routing to the
    /// held-out main concept when the names collide.
    fn with_concept<F>(&mut self, term: &Term, budget: &Budget, main: &mut Concept, f: F)
    where
        F: FnOnce(&mut Concept),
    {
        if term.name() == main.name() {
            f(main);
            return;
        }
        let mut concept = self.pick_or_generate_concept(term, budget);
        f(&mut concept);
        self.concepts.put_in(concept);
    }

    /// Give every distinct subterm's concept a task link to this task.
    fn create_task_links(&mut self, task_id: u64, task: &Task, main: &mut Concept) {
        let target = &task.sentence.term;
        let subterm_terms: Vec<Term> = target.subterms().into_iter().cloned().collect();

        for subterm in subterm_terms {
            let (link_type, indices) = classify(&subterm, target, true);
            let link = TaskLink::new(
                task_id,
                &task.sentence.key(),
                target.name(),
                task.budget,
                link_type,
                indices,
            );
            self.task_links.put_in(link.clone());

            let budget = conceptualization_budget(task, &subterm);
            self.with_concept(&subterm, &budget, main, |concept| {
                concept.insert_task_link(link);
            });
        }
    }

    /// Wire bidirectional term links between every ancestor–descendant
    /// pair in the task's term tree.
    fn create_term_links(&mut self, task: &Task, main: &mut Concept) {
        let subterms: Vec<Term> = task.sentence.term.subterms().into_iter().cloned().collect();

        for ancestor in &subterms {
            for descendant in &subterms {
                if ancestor.name() == descendant.name() || !ancestor.contains(descendant) {
                    continue;
                }

                let (down_type, down_indices) = classify(ancestor, descendant, false);
                let down = TermLink::new(descendant.name(), task.budget, down_type, down_indices);
                self.term_links.put_in(down.clone());

                let (up_type, up_indices) = classify(descendant, ancestor, false);
                let up = TermLink::new(ancestor.name(), task.budget, up_type, up_indices);
                self.term_links.put_in(up.clone());

                let anc_budget = conceptualization_budget(task, ancestor);
                self.with_concept(ancestor, &anc_budget, main, |concept| {
                    concept.insert_term_link(down);
                });

                let desc_budget = conceptualization_budget(task, descendant);
                self.with_concept(descendant, &desc_budget, main, |concept| {
                    concept.insert_term_link(up);
                });
            }
        }
    }

    /// Answer a question containing query variables by unifying it
    /// against the terms of concepts reachable through the task links of
    /// its ground subterms.
    fn process_wh_question(&mut self, query: &mut Task, main: &mut Concept) -> Vec<Sentence> {
        let mut answers = Vec::new();

        let ground_subterms: Vec<Term> = query
            .sentence
            .term
            .subterms()
            .into_iter()
            .filter(|s| !s.contains_variable(VarKind::Query))
            .cloned()
            .collect();

        let mut candidate_names: Vec<String> = Vec::new();
        for subterm in &ground_subterms {
            let Some(concept) = self.concepts.peek(subterm.name()) else {
                continue;
            };
            for link in concept.task_links.iter() {
                if !candidate_names.iter().any(|n| n == &link.task_term_name) {
                    candidate_names.push(link.task_term_name.clone());
                }
            }
        }

        for name in candidate_names {
            if name == main.name() {
                continue;
            }
            let Some(mut candidate) = self.concepts.pick_out(&name) else {
                continue;
            };

            let mut subst = HashMap::new();
            if unify_vars(VarKind::Query, &query.sentence.term, &candidate.term, &mut subst)
                && !subst.is_empty()
            {
                for belief in candidate.beliefs.iter_mut() {
                    if let Some(answer) = try_solution(query, belief) {
                        answers.push(answer);
                    }
                }
            }

            self.concepts.put_in(candidate);
        }

        answers
    }

    pub fn concept_bag_snapshot(&self) -> Vec<ConceptSummary> {
        self.concepts
            .iter()
            .map(|c| ConceptSummary {
                name: c.name().to_string(),
                priority: c.budget.priority(),
                quality: c.budget.quality(),
                beliefs: c.beliefs.len(),
                questions: c.questions.len(),
                goals: c.goals.len(),
                task_links: c.task_links.size(),
                term_links: c.term_links.size(),
            })
            .collect()
    }

    pub fn global_task_bag_snapshot(&self) -> Vec<BagEntry> {
        bag_entries(&self.global_tasks)
    }

    pub fn novel_task_bag_snapshot(&self) -> Vec<BagEntry> {
        bag_entries(&self.novel_tasks)
    }

    pub fn task_link_bag_snapshot(&self) -> Vec<BagEntry> {
        bag_entries(&self.task_links)
    }

    pub fn term_link_bag_snapshot(&self) -> Vec<BagEntry> {
        bag_entries(&self.term_links)
    }
}

fn bag_entries<T: BagItem>(bag: &Bag<T>) -> Vec<BagEntry> {
    bag.iter()
        .map(|item| BagEntry {
            key: item.key().to_string(),
            priority: item.budget().priority(),
            durability: item.budget().durability(),
            quality: item.budget().quality(),
        })
        .collect()
}

impl Default for Memory {
    fn default() -> Self {
        Memory::new()
    }
}

/// Budget under which a task conceptualizes a term: the task's drive,
/// the term's simplicity as quality.
fn conceptualization_budget(task: &Task, term: &Term) -> Budget {
    Budget::new(
        task.budget.priority(),
        task.budget.durability(),
        term.simplicity(),
    )
}

/// Answer a yes/no question from the concept's own belief table.
fn process_yes_no_question(query: &mut Task, concept: &mut Concept) -> Option<Sentence> {
    let candidate = concept.select_candidate(query);
    let answer = candidate.and_then(|idx| try_solution(query, &mut concept.beliefs[idx]));
    concept.add_question(query.clone());
    answer
}

/// Offer a belief as a solution to a query.
///
/// The first solution always lands. A later one must strictly beat the
/// current best; when it does, the belief is rewarded and the query's
/// priority is damped so answered questions stop hogging attention.
fn try_solution(query: &mut Task, belief: &mut Task) -> Option<Sentence> {
    let solution = belief.sentence.clone();

    let Some(best) = &query.best_solution else {
        query.best_solution = Some(solution.clone());
        return Some(solution);
    };

    let old_quality = solution_quality(&query.sentence, best, false);
    let new_quality = solution_quality(&query.sentence, &solution, false);
    if new_quality <= old_quality {
        return None;
    }

    query.best_solution = Some(solution.clone());

    belief
        .budget
        .priority
        .set(prob_or(query.budget.priority(), new_quality));
    belief.budget.durability = query.budget.durability;
    if let Some(truth) = &solution.truth {
        belief.budget.quality.set(truth_to_quality(truth));
    }

    let damped = query.budget.priority().min(1.0 - new_quality);
    query.budget.priority.set(damped);

    Some(solution)
}
