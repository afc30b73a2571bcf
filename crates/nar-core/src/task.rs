use serde::{Deserialize, Serialize};

use crate::bag::BagItem;
use crate::budget::Budget;
use crate::sentence::Sentence;

/// Where a task came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskType {
    Input,
    Derived,
}

/// A sentence under a budget: the unit of work flowing through memory.
///
/// Questions accumulate a best solution as answers are found; revised
/// judgments record how far the revision moved expectation (achievement).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub sentence: Sentence,
    pub budget: Budget,
    pub task_type: TaskType,
    pub best_solution: Option<Sentence>,
    pub achievement: Option<f64>,
    key: String,
}

impl Task {
    pub fn new(sentence: Sentence, budget: Budget, task_type: TaskType) -> Task {
        let key = sentence.key();
        Task {
            sentence,
            budget,
            task_type,
            best_solution: None,
            achievement: None,
            key,
        }
    }

    pub fn input(sentence: Sentence, budget: Budget) -> Task {
        Task::new(sentence, budget, TaskType::Input)
    }

    pub fn derived(sentence: Sentence, budget: Budget) -> Task {
        Task::new(sentence, budget, TaskType::Derived)
    }

    pub fn is_input(&self) -> bool {
        self.task_type == TaskType::Input
    }
}

impl BagItem for Task {
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
