use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::clock::Clock;
use crate::engine::{DerivationEngine, Explanation};
use crate::error::Result;
use crate::memory::{BagEntry, ConceptSummary, Memory};
use crate::parser::parse_task;
use crate::rules::RuleTable;
use crate::sentence::Sentence;
use crate::task::{Task, TaskType};

/// What one host input produced.
#[derive(Debug, Default)]
pub struct InputReport {
    /// The parsed task, when the input was a sentence.
    pub task: Option<Task>,
    /// Whatever the global task bag displaced.
    pub overflow: Option<Task>,
    /// Answers found synchronously.
    pub answers: Vec<Sentence>,
    /// Working cycles run, when the input was a cycle count.
    pub cycles: u64,
}

/// What one working cycle produced.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Concept selected this cycle, if any.
    pub concept: Option<String>,
    /// Explanations for conclusions the rule engine admitted.
    pub derivations: Vec<Explanation>,
    /// Answers produced while re-injecting derived tasks.
    pub answers: Vec<Sentence>,
}

/// The control loop: owns memory, the rule engine, the clock, and the
/// randomness source feeding stamp nar-ids.
///
/// Single-threaded by design; every entry point runs to completion and
/// advances the logical clock by exactly one tick (plus one per derived
/// task re-injected during a cycle).
pub struct Reasoner {
    pub memory: Memory,
    pub engine: DerivationEngine,
    clock: Clock,
    rng: SmallRng,
}

impl Reasoner {
    pub fn new() -> Reasoner {
        Reasoner::with_rng(SmallRng::from_os_rng())
    }

    /// Deterministic reasoner for tests.
    pub fn seeded(seed: u64) -> Reasoner {
        Reasoner::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Reasoner {
        Reasoner {
            memory: Memory::new(),
            engine: DerivationEngine::new(),
            clock: Clock::new(),
            rng,
        }
    }

    /// Load a rule-table block into the derivation engine.
    pub fn load_rules(&mut self, table: &RuleTable, path: &str) -> Result<usize> {
        self.engine.load_block(table, path)
    }

    /// Load the built-in `immediate` and `nal1` blocks.
    pub fn load_default_rules(&mut self) -> Result<usize> {
        let table = RuleTable::default_table();
        let immediate = self.load_rules(&table, "rules.immediate")?;
        let nal1 = self.load_rules(&table, "rules.nal1")?;
        Ok(immediate + nal1)
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Host entry point. A purely numeric input runs that many working
    /// cycles; anything else parses as one Narsese task and routes
    /// through memory. Parse failures are returned as errors and leave
    /// memory untouched.
    pub fn input_narsese(&mut self, text: &str) -> Result<InputReport> {
        let trimmed = text.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            let count: u64 = trimmed
                .parse()
                .map_err(|_| crate::error::NarError::Parse(format!("bad cycle count: {trimmed}")))?;
            for _ in 0..count {
                self.cycle();
            }
            return Ok(InputReport {
                cycles: count,
                ..InputReport::default()
            });
        }

        let nar_id: i64 = self.rng.random();
        let serial = self.clock.next_serial();
        let task = parse_task(trimmed, self.clock.now(), nar_id, serial)?;

        let outcome = self.memory.input(task.clone(), self.clock.now());
        self.clock.tick();

        Ok(InputReport {
            task: Some(task),
            overflow: outcome.overflow,
            answers: outcome.answers,
            cycles: 0,
        })
    }

    /// One working cycle: pull a concept, pull one of its task links,
    /// assert the linked task's term as a fact, run a derivation pass,
    /// and re-inject each conclusion as a task carrying the parent's
    /// punctuation.
    pub fn cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        let Some(mut concept) = self.memory.take_out_concept() else {
            self.clock.tick();
            return report;
        };
        report.concept = Some(concept.name().to_string());

        let Some(link) = concept.task_links.take_out() else {
            self.memory.put_back_concept(concept);
            self.clock.tick();
            return report;
        };
        concept.task_links.put_back(link.clone());

        let punctuation = self
            .memory
            .task(link.task_id)
            .map(|task| task.sentence.punctuation.symbol())
            .unwrap_or('.');
        self.engine.assert_fact(&link.task_term_name);
        report.derivations = self.engine.derive_once();

        // The concept returns to the bag before re-injection so that a
        // derivation touching the same term finds it there.
        self.memory.put_back_concept(concept);

        for explanation in &report.derivations {
            let text = format!("{}{}", explanation.conclusion, punctuation);
            let nar_id: i64 = self.rng.random();
            let serial = self.clock.next_serial();
            let Ok(mut task) = parse_task(&text, self.clock.now(), nar_id, serial) else {
                continue;
            };
            task.task_type = TaskType::Derived;
            let outcome = self.memory.input(task, self.clock.now());
            report.answers.extend(outcome.answers);
            self.clock.tick();
        }

        self.clock.tick();
        report
    }

    /// Inspect a concept by name.
    pub fn concept_at(&self, name: &str) -> Option<&crate::concept::Concept> {
        self.memory.concept(name)
    }

    pub fn concept_bag_snapshot(&self) -> Vec<ConceptSummary> {
        self.memory.concept_bag_snapshot()
    }

    pub fn global_task_bag_snapshot(&self) -> Vec<BagEntry> {
        self.memory.global_task_bag_snapshot()
    }

    pub fn novel_task_bag_snapshot(&self) -> Vec<BagEntry> {
        self.memory.novel_task_bag_snapshot()
    }

    pub fn task_link_bag_snapshot(&self) -> Vec<BagEntry> {
        self.memory.task_link_bag_snapshot()
    }

    pub fn term_link_bag_snapshot(&self) -> Vec<BagEntry> {
        self.memory.term_link_bag_snapshot()
    }
}

impl Default for Reasoner {
    fn default() -> Self {
        Reasoner::new()
    }
}
