use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::bag::BagItem;
use crate::budget::Budget;
use crate::constants::TERM_LINK_RECORD_LENGTH;
use crate::term::Term;

/// Structural relationship between a link's source concept and its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkType {
    SelfLink,
    Component,
    Compound,
    ComponentStatement,
    CompoundStatement,
    ComponentCondition,
    CompoundCondition,
    Transform,
}

impl LinkType {
    fn tag(self) -> &'static str {
        match self {
            LinkType::SelfLink => "S",
            LinkType::Component => "c",
            LinkType::Compound => "C",
            LinkType::ComponentStatement => "cs",
            LinkType::CompoundStatement => "CS",
            LinkType::ComponentCondition => "cc",
            LinkType::CompoundCondition => "CC",
            LinkType::Transform => "T",
        }
    }
}

/// Classify the link from `source` to `target` and return the descent
/// index path when the source occurs inside the target.
///
/// Task links enable TRANSFORM typing (a descent through a product or
/// image inside a statement); term links do not.
pub fn classify(source: &Term, target: &Term, enable_transform: bool) -> (LinkType, Vec<usize>) {
    let mut chain: Vec<&Term> = Vec::new();
    let mut path: Vec<usize> = Vec::new();

    if find_descent(target, source, &mut chain, &mut path) {
        if source == target {
            return (LinkType::SelfLink, path);
        }
        if target.is_statement() {
            let parent = chain.len().checked_sub(2).and_then(|i| chain.get(i));
            let grandparent = chain.len().checked_sub(3).and_then(|i| chain.get(i));
            if chain.len() >= 3
                && enable_transform
                && grandparent.is_some_and(|g| g.is_statement())
                && parent.is_some_and(|p| {
                    p.connector().is_some_and(|c| c.is_product_or_image())
                })
            {
                return (LinkType::Transform, path);
            }
            let copula = target.copula().expect("statement has a copula");
            if copula.is_higher_order() {
                let at_top = target.subject() == Some(source) || target.predicate() == Some(source);
                if at_top {
                    return (LinkType::ComponentCondition, path);
                }
                return (LinkType::ComponentStatement, path);
            }
            return (LinkType::ComponentStatement, path);
        }
        return (LinkType::Compound, path);
    }

    // Source does not occur inside the target.
    if source.is_statement() {
        let copula = source.copula().expect("statement has a copula");
        if copula.is_higher_order() {
            if source == target {
                return (LinkType::CompoundStatement, Vec::new());
            }
            return (LinkType::CompoundCondition, Vec::new());
        }
        return (LinkType::ComponentStatement, Vec::new());
    }
    (LinkType::Compound, Vec::new())
}

/// Depth-first search for `source` inside `target`, filling the visited
/// term chain (root..source) and the component index path.
fn find_descent<'a>(
    target: &'a Term,
    source: &Term,
    chain: &mut Vec<&'a Term>,
    path: &mut Vec<usize>,
) -> bool {
    chain.push(target);
    if target == source {
        return true;
    }
    for i in 0..target.component_count() {
        let child = target.component_at(i).expect("index within component count");
        path.push(i);
        if find_descent(child, source, chain, path) {
            return true;
        }
        path.pop();
    }
    chain.pop();
    false
}

fn link_key(link_type: LinkType, indices: &[usize], target: &str) -> String {
    let idx: Vec<String> = indices.iter().map(|i| i.to_string()).collect();
    format!("{}{}:{}", link_type.tag(), idx.join("."), target)
}

/// Edge from a concept to a task, with a recency record gating which
/// term links it may be paired with.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskLink {
    pub task_id: u64,
    pub task_key: String,
    pub task_term_name: String,
    pub budget: Budget,
    pub link_type: LinkType,
    pub indices: Vec<usize>,
    records: VecDeque<(String, i64)>,
    key: String,
}

impl TaskLink {
    pub fn new(
        task_id: u64,
        task_key: &str,
        task_term_name: &str,
        budget: Budget,
        link_type: LinkType,
        indices: Vec<usize>,
    ) -> TaskLink {
        let key = link_key(link_type, &indices, task_key);
        TaskLink {
            task_id,
            task_key: task_key.to_string(),
            task_term_name: task_term_name.to_string(),
            budget,
            link_type,
            indices,
            records: VecDeque::new(),
            key,
        }
    }

    /// Whether pairing with this term link is worth doing now.
    ///
    /// Not novel when the term link leads back to the task's own term, or
    /// when the pair was already considered within the record window.
    /// A novel pairing is recorded at the current time; the record is
    /// FIFO-bounded.
    pub fn is_novel(&mut self, term_link: &TermLink, now: i64) -> bool {
        if term_link.target == self.task_term_name {
            return false;
        }

        if let Some(entry) = self.records.iter_mut().find(|(k, _)| *k == term_link.key) {
            if now < entry.1 + TERM_LINK_RECORD_LENGTH as i64 {
                return false;
            }
            entry.1 = now;
            return true;
        }

        if self.records.len() >= TERM_LINK_RECORD_LENGTH {
            self.records.pop_front();
        }
        self.records.push_back((term_link.key.clone(), now));
        true
    }
}

impl BagItem for TaskLink {
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

/// Edge from a concept to another concept, by name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TermLink {
    pub target: String,
    pub budget: Budget,
    pub link_type: LinkType,
    pub indices: Vec<usize>,
    key: String,
}

impl TermLink {
    pub fn new(target: &str, budget: Budget, link_type: LinkType, indices: Vec<usize>) -> TermLink {
        let key = link_key(link_type, &indices, target);
        TermLink {
            target: target.to_string(),
            budget,
            link_type,
            indices,
            key,
        }
    }
}

impl BagItem for TermLink {
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
