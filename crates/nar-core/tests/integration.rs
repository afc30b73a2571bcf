//! Integration tests exercising the full reasoning pipeline:
//! Narsese in → concept memory → derivation → answers out.

use nar_core::{
    prob_or, solution_quality, Budget, DerivationEngine, Reasoner, RuleTable, ShortFloat, Truth,
    VarKind,
};

/// Test 1: a judgment followed by the same yes/no question returns the
/// belief as the answer, truth intact.
#[test]
fn question_answered_from_stored_belief() {
    let mut nar = Reasoner::seeded(42);
    nar.input_narsese("<bird --> fly>. %0.9;0.9%").unwrap();
    let report = nar.input_narsese("<bird --> fly>?").unwrap();

    assert_eq!(report.answers.len(), 1);
    let answer = &report.answers[0];
    assert_eq!(answer.term.name(), "<bird --> fly>");
    let truth = answer.truth.as_ref().expect("answers carry truth");
    assert!((truth.frequency() - 0.9).abs() < 0.001, "f = {}", truth.frequency());
    assert!((truth.confidence() - 0.9).abs() < 0.001, "c = {}", truth.confidence());
}

/// Test 2: two judgments on the same statement with distinct evidence
/// revise into a stronger belief with the predicted truth.
#[test]
fn distinct_evidence_revises_belief() {
    let mut nar = Reasoner::seeded(42);
    nar.input_narsese("<bird --> fly>. %0.9;0.9%").unwrap();
    nar.input_narsese("<bird --> fly>. %0.8;0.8%").unwrap();

    let concept = nar.concept_at("<bird --> fly>").expect("concept exists");
    let revised = concept
        .beliefs
        .iter()
        .filter_map(|b| b.sentence.truth.as_ref())
        .max_by(|a, b| a.confidence().partial_cmp(&b.confidence()).unwrap())
        .expect("concept holds beliefs");

    // Weight addition at k=1: w = 9 + 4 → f ≈ 0.87, c = 13/14
    assert!((revised.frequency() - 0.87).abs() < 0.01, "f = {}", revised.frequency());
    assert!((revised.confidence() - 13.0 / 14.0).abs() < 0.001, "c = {}", revised.confidence());
}

/// Test 3: a Wh-question binds its query variable against a remembered
/// belief and stores a best solution on the query.
#[test]
fn wh_question_binds_variable() {
    let mut nar = Reasoner::seeded(42);
    nar.input_narsese("<bird --> fly>.").unwrap();
    let report = nar.input_narsese("<bird --> ?x>?").unwrap();

    assert_eq!(report.answers.len(), 1);
    assert_eq!(report.answers[0].term.name(), "<bird --> fly>");
}

/// Test 4: cycles over empty memory with no rules loaded derive nothing
/// and leave the fact set empty.
#[test]
fn empty_run_derives_nothing() {
    let mut nar = Reasoner::seeded(42);
    let report = nar.input_narsese("2").unwrap();
    assert_eq!(report.cycles, 2);
    assert!(nar.engine.facts().is_empty());
    assert_eq!(nar.memory.concept_count(), 0);
}

/// Test 5: with the immediate and nal1 blocks loaded, deduction chains
/// while the reflexive guard holds.
#[test]
fn deduction_fires_and_reflexive_guard_holds() {
    let table = RuleTable::default_table();
    let mut engine = DerivationEngine::new();
    engine.load_block(&table, "rules.immediate").unwrap();
    engine.load_block(&table, "rules.nal1").unwrap();

    engine.assert_fact("<bird --> fly>");
    engine.assert_fact("<fly --> animal>");
    engine.derive_once();

    assert!(engine.contains_fact("<bird --> animal>"), "deduction must fire");
    assert!(!engine.contains_fact("<bird --> bird>"), "reflexive guard must hold");

    // The guard keeps holding across further passes
    engine.derive_once();
    engine.derive_once();
    assert!(engine.facts().iter().all(|f| {
        !(f.starts_with("<bird --> bird>") || f.starts_with("<fly --> fly>"))
    }));
}

/// Test 6: an out-of-range ShortFloat is a range error, not a clamp.
#[test]
fn short_float_range_error() {
    assert!(ShortFloat::new(1.5).is_err());
    // A budget built from in-range parts is untouched by the failure
    let budget = Budget::new(0.8, 0.5, 0.3);
    assert!(ShortFloat::new(-0.2).is_err());
    assert!((budget.priority() - 0.8).abs() < 1e-9);
}

/// Quantified invariant: concept names always match their term names.
#[test]
fn concept_names_match_terms() {
    let mut nar = Reasoner::seeded(7);
    nar.load_default_rules().unwrap();
    nar.input_narsese("<bird --> fly>.").unwrap();
    nar.input_narsese("<fly --> animal>.").unwrap();
    nar.input_narsese("(--, <fish --> fly>).").unwrap();
    nar.input_narsese("10").unwrap();

    for summary in nar.concept_bag_snapshot() {
        let concept = nar.concept_at(&summary.name).expect("snapshot names resolve");
        assert_eq!(concept.name(), concept.term.name());
        for belief in &concept.beliefs {
            assert!(belief.sentence.truth.is_some(), "beliefs carry truth");
            assert!(
                !belief.sentence.stamp.evidence.is_empty(),
                "beliefs carry evidence"
            );
        }
    }
}

/// Quantified invariant: probabilistic OR is commutative and monotone.
#[test]
fn prob_or_properties() {
    for a in [0.0, 0.1, 0.5, 0.9, 1.0] {
        for b in [0.0, 0.3, 0.7, 1.0] {
            assert!((prob_or(a, b) - prob_or(b, a)).abs() < 1e-12);
            assert!(prob_or(a, b) >= a.max(b) - 1e-12);
        }
    }
}

/// Long-run smoke: many inputs and cycles never panic, and answers keep
/// flowing while the attention bags stay bounded.
#[test]
fn sustained_run_stays_bounded() {
    let mut nar = Reasoner::seeded(1234);
    nar.load_default_rules().unwrap();

    let animals = ["robin", "sparrow", "eagle", "hawk", "crow"];
    for (i, name) in animals.iter().enumerate() {
        nar.input_narsese(&format!("<{name} --> bird>. %0.9;0.{}%", 5 + i))
            .unwrap();
        nar.input_narsese("<bird --> fly>. %0.9;0.9%").unwrap();
        nar.input_narsese("3").unwrap();
    }

    let report = nar.input_narsese("<robin --> bird>?").unwrap();
    assert!(!report.answers.is_empty(), "seeded belief should answer");

    for summary in nar.concept_bag_snapshot() {
        assert!(summary.task_links <= 100);
        assert!(summary.term_links <= 100);
        assert!(summary.beliefs <= 28);
        assert!(summary.questions <= 5);
    }
}

/// Solution quality ranks a confident simple answer above a hedged one.
#[test]
fn solution_quality_ordering() {
    use nar_core::{Sentence, Stamp, Tense, Term};

    let term = Term::statement(
        Term::atom("bird"),
        nar_core::Copula::Inheritance,
        Term::atom("fly"),
    );
    let stamp = Stamp::input(0, Tense::Eternal, 1, 1);
    let question = Sentence::question(term.clone(), stamp.clone());

    let strong = Sentence::judgment(term.clone(), Truth::new(0.9, 0.9), stamp.clone());
    let weak = Sentence::judgment(term, Truth::new(0.9, 0.2), stamp);

    assert!(
        solution_quality(&question, &strong, false) > solution_quality(&question, &weak, false)
    );
}

/// A query-variable answer never counts for a mismatched punctuation.
#[test]
fn solution_quality_rejects_query_variable_mismatch() {
    use nar_core::{Sentence, Stamp, Tense, Term};

    let open_term = Term::statement(
        Term::atom("bird"),
        nar_core::Copula::Inheritance,
        Term::variable(VarKind::Query, "x"),
    );
    let stamp = Stamp::input(0, Tense::Eternal, 1, 1);
    let question = Sentence::question(open_term.clone(), stamp.clone());
    let pseudo_judgment = Sentence {
        term: open_term,
        punctuation: nar_core::Punctuation::Judgment,
        truth: Some(Truth::new(0.9, 0.9)),
        stamp,
    };
    assert_eq!(solution_quality(&question, &pseudo_judgment, false), 0.0);
}
