use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Variable kinds, by surface prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarKind {
    /// `$x`, universally scoped across a statement.
    Independent,
    /// `#x`, existentially scoped.
    Dependent,
    /// `?x`, a hole to be filled by question answering.
    Query,
}

impl VarKind {
    pub fn prefix(self) -> char {
        match self {
            VarKind::Independent => '$',
            VarKind::Dependent => '#',
            VarKind::Query => '?',
        }
    }

    pub fn from_prefix(c: char) -> Option<VarKind> {
        match c {
            '$' => Some(VarKind::Independent),
            '#' => Some(VarKind::Dependent),
            '?' => Some(VarKind::Query),
            _ => None,
        }
    }
}

/// Compound-term connectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Connector {
    Conjunction,
    Disjunction,
    Product,
    ParallelEvents,
    SequentialEvents,
    IntensionalIntersection,
    ExtensionalIntersection,
    ExtensionalDifference,
    IntensionalDifference,
    ExtensionalImage,
    IntensionalImage,
    ExtensionalSet,
    IntensionalSet,
    Negation,
}

/// How many components a connector admits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Single,
    Double,
    Multiple,
}

impl Connector {
    pub fn symbol(self) -> &'static str {
        match self {
            Connector::Conjunction => "&&",
            Connector::Disjunction => "||",
            Connector::Product => "*",
            Connector::ParallelEvents => "&|",
            Connector::SequentialEvents => "&/",
            Connector::IntensionalIntersection => "|",
            Connector::ExtensionalIntersection => "&",
            Connector::ExtensionalDifference => "-",
            Connector::IntensionalDifference => "~",
            Connector::ExtensionalImage => "/",
            Connector::IntensionalImage => "\\",
            Connector::ExtensionalSet => "{}",
            Connector::IntensionalSet => "[]",
            Connector::Negation => "--",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Connector> {
        Some(match s {
            "&&" => Connector::Conjunction,
            "||" => Connector::Disjunction,
            "*" => Connector::Product,
            "&|" => Connector::ParallelEvents,
            "&/" => Connector::SequentialEvents,
            "|" => Connector::IntensionalIntersection,
            "&" => Connector::ExtensionalIntersection,
            "-" => Connector::ExtensionalDifference,
            "~" => Connector::IntensionalDifference,
            "/" => Connector::ExtensionalImage,
            "\\" => Connector::IntensionalImage,
            "{}" => Connector::ExtensionalSet,
            "[]" => Connector::IntensionalSet,
            "--" => Connector::Negation,
            _ => return None,
        })
    }

    pub fn arity(self) -> Arity {
        match self {
            Connector::Negation => Arity::Single,
            Connector::ExtensionalDifference | Connector::IntensionalDifference => Arity::Double,
            _ => Arity::Multiple,
        }
    }

    pub fn is_commutative(self) -> bool {
        matches!(
            self,
            Connector::Conjunction
                | Connector::Disjunction
                | Connector::ParallelEvents
                | Connector::IntensionalIntersection
                | Connector::ExtensionalIntersection
                | Connector::ExtensionalSet
                | Connector::IntensionalSet
        )
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, Connector::ParallelEvents | Connector::SequentialEvents)
    }

    /// Product and image connectors participate in TRANSFORM link typing.
    pub fn is_product_or_image(self) -> bool {
        matches!(
            self,
            Connector::Product | Connector::ExtensionalImage | Connector::IntensionalImage
        )
    }
}

/// Statement copulas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Copula {
    Inheritance,
    Similarity,
    Instance,
    Property,
    InstanceProperty,
    Implication,
    Equivalence,
    PredictiveImplication,
    ConcurrentImplication,
    RetrospectiveImplication,
    PredictiveEquivalence,
    ConcurrentEquivalence,
}

/// Temporal direction carried by a temporal copula.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemporalOrder {
    Forward,
    Backward,
    Concurrent,
}

impl Copula {
    pub fn symbol(self) -> &'static str {
        match self {
            Copula::Inheritance => "-->",
            Copula::Similarity => "<->",
            Copula::Instance => "{--",
            Copula::Property => "--]",
            Copula::InstanceProperty => "{-]",
            Copula::Implication => "==>",
            Copula::Equivalence => "<=>",
            Copula::PredictiveImplication => "=/>",
            Copula::ConcurrentImplication => "=|>",
            Copula::RetrospectiveImplication => "=\\>",
            Copula::PredictiveEquivalence => "</>",
            Copula::ConcurrentEquivalence => "<|>",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Copula> {
        Some(match s {
            "-->" => Copula::Inheritance,
            "<->" => Copula::Similarity,
            "{--" => Copula::Instance,
            "--]" => Copula::Property,
            "{-]" => Copula::InstanceProperty,
            "==>" => Copula::Implication,
            "<=>" => Copula::Equivalence,
            "=/>" => Copula::PredictiveImplication,
            "=|>" => Copula::ConcurrentImplication,
            "=\\>" => Copula::RetrospectiveImplication,
            "</>" => Copula::PredictiveEquivalence,
            "<|>" => Copula::ConcurrentEquivalence,
            _ => return None,
        })
    }

    /// Implication/equivalence families (temporal included) are higher-order;
    /// inheritance/similarity families are first-order.
    pub fn is_higher_order(self) -> bool {
        matches!(
            self,
            Copula::Implication
                | Copula::Equivalence
                | Copula::PredictiveImplication
                | Copula::ConcurrentImplication
                | Copula::RetrospectiveImplication
                | Copula::PredictiveEquivalence
                | Copula::ConcurrentEquivalence
        )
    }

    pub fn is_symmetric(self) -> bool {
        matches!(
            self,
            Copula::Similarity
                | Copula::Equivalence
                | Copula::PredictiveEquivalence
                | Copula::ConcurrentEquivalence
        )
    }

    /// None for atemporal copulas, which counts as "unspecified" when
    /// revision checks temporal compatibility.
    pub fn temporal_order(self) -> Option<TemporalOrder> {
        match self {
            Copula::PredictiveImplication | Copula::PredictiveEquivalence => {
                Some(TemporalOrder::Forward)
            }
            Copula::RetrospectiveImplication => Some(TemporalOrder::Backward),
            Copula::ConcurrentImplication | Copula::ConcurrentEquivalence => {
                Some(TemporalOrder::Concurrent)
            }
            _ => None,
        }
    }
}

/// Term variants.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TermKind {
    Atom {
        var: Option<VarKind>,
    },
    Compound {
        connector: Connector,
        components: Vec<Term>,
    },
    Statement {
        copula: Copula,
        subject: Box<Term>,
        predicate: Box<Term>,
    },
}

/// A term: atom, compound, or statement.
///
/// Terms are value-typed: equality and hashing go through the canonical
/// name. The identity token exists only to tell whether two references
/// are the same object, it never participates in equality.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Term {
    kind: TermKind,
    name: String,
    complexity: u32,
    has_ivar: bool,
    has_dvar: bool,
    has_qvar: bool,
    identity: Uuid,
}

impl Term {
    pub fn atom(name: &str) -> Term {
        Term {
            kind: TermKind::Atom { var: None },
            name: name.to_string(),
            complexity: 1,
            has_ivar: false,
            has_dvar: false,
            has_qvar: false,
            identity: Uuid::new_v4(),
        }
    }

    pub fn variable(kind: VarKind, name: &str) -> Term {
        Term {
            kind: TermKind::Atom { var: Some(kind) },
            name: format!("{}{}", kind.prefix(), name),
            complexity: 1,
            has_ivar: kind == VarKind::Independent,
            has_dvar: kind == VarKind::Dependent,
            has_qvar: kind == VarKind::Query,
            identity: Uuid::new_v4(),
        }
    }

    pub fn compound(connector: Connector, components: Vec<Term>) -> Term {
        let name = match connector {
            Connector::ExtensionalSet => format!("{{{}}}", join_names(&components)),
            Connector::IntensionalSet => format!("[{}]", join_names(&components)),
            _ => format!("({}, {})", connector.symbol(), join_names(&components)),
        };
        let complexity = 1 + components.iter().map(|c| c.complexity).sum::<u32>();
        let has_ivar = components.iter().any(|c| c.has_ivar);
        let has_dvar = components.iter().any(|c| c.has_dvar);
        let has_qvar = components.iter().any(|c| c.has_qvar);
        Term {
            kind: TermKind::Compound { connector, components },
            name,
            complexity,
            has_ivar,
            has_dvar,
            has_qvar,
            identity: Uuid::new_v4(),
        }
    }

    pub fn negation(inner: Term) -> Term {
        Term::compound(Connector::Negation, vec![inner])
    }

    pub fn statement(subject: Term, copula: Copula, predicate: Term) -> Term {
        let name = format!("<{} {} {}>", subject.name, copula.symbol(), predicate.name);
        let complexity = 1 + subject.complexity + predicate.complexity;
        let has_ivar = subject.has_ivar || predicate.has_ivar;
        let has_dvar = subject.has_dvar || predicate.has_dvar;
        let has_qvar = subject.has_qvar || predicate.has_qvar;
        Term {
            kind: TermKind::Statement {
                copula,
                subject: Box::new(subject),
                predicate: Box::new(predicate),
            },
            name,
            complexity,
            has_ivar,
            has_dvar,
            has_qvar,
            identity: Uuid::new_v4(),
        }
    }

    pub fn kind(&self) -> &TermKind {
        &self.kind
    }

    /// Canonical printable form; the sole identity for equality.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn complexity(&self) -> u32 {
        self.complexity
    }

    /// 1 / complexity, used as conceptualization quality.
    pub fn simplicity(&self) -> f64 {
        1.0 / f64::from(self.complexity)
    }

    pub fn is_atom(&self) -> bool {
        matches!(self.kind, TermKind::Atom { .. })
    }

    pub fn is_compound(&self) -> bool {
        matches!(self.kind, TermKind::Compound { .. })
    }

    pub fn is_statement(&self) -> bool {
        matches!(self.kind, TermKind::Statement { .. })
    }

    pub fn as_variable(&self) -> Option<VarKind> {
        match self.kind {
            TermKind::Atom { var } => var,
            _ => None,
        }
    }

    pub fn copula(&self) -> Option<Copula> {
        match self.kind {
            TermKind::Statement { copula, .. } => Some(copula),
            _ => None,
        }
    }

    pub fn subject(&self) -> Option<&Term> {
        match &self.kind {
            TermKind::Statement { subject, .. } => Some(subject),
            _ => None,
        }
    }

    pub fn predicate(&self) -> Option<&Term> {
        match &self.kind {
            TermKind::Statement { predicate, .. } => Some(predicate),
            _ => None,
        }
    }

    pub fn connector(&self) -> Option<Connector> {
        match self.kind {
            TermKind::Compound { connector, .. } => Some(connector),
            _ => None,
        }
    }

    /// Compound components, in order. Empty for atoms and statements
    /// (statements go through component_at: 0 = subject, 1 = predicate).
    pub fn components(&self) -> &[Term] {
        match &self.kind {
            TermKind::Compound { components, .. } => components,
            _ => &[],
        }
    }

    /// Child at a positional index (statements: 0 = subject, 1 = predicate).
    pub fn component_at(&self, index: usize) -> Option<&Term> {
        match &self.kind {
            TermKind::Atom { .. } => None,
            TermKind::Compound { components, .. } => components.get(index),
            TermKind::Statement { subject, predicate, .. } => match index {
                0 => Some(subject),
                1 => Some(predicate),
                _ => None,
            },
        }
    }

    pub fn component_count(&self) -> usize {
        match &self.kind {
            TermKind::Atom { .. } => 0,
            TermKind::Compound { components, .. } => components.len(),
            TermKind::Statement { .. } => 2,
        }
    }

    pub fn contains_variable(&self, kind: VarKind) -> bool {
        match kind {
            VarKind::Independent => self.has_ivar,
            VarKind::Dependent => self.has_dvar,
            VarKind::Query => self.has_qvar,
        }
    }

    pub fn has_any_variable(&self) -> bool {
        self.has_ivar || self.has_dvar || self.has_qvar
    }

    /// Whether two references point at the same object (not value equality).
    pub fn same_object(&self, other: &Term) -> bool {
        self.identity == other.identity
    }

    /// All distinct subterms, self included, outermost first.
    pub fn subterms(&self) -> Vec<&Term> {
        let mut seen: Vec<&Term> = Vec::new();
        self.collect_subterms(&mut seen);
        seen
    }

    fn collect_subterms<'a>(&'a self, seen: &mut Vec<&'a Term>) {
        if seen.iter().any(|t| t.name == self.name) {
            return;
        }
        seen.push(self);
        for i in 0..self.component_count() {
            if let Some(child) = self.component_at(i) {
                child.collect_subterms(seen);
            }
        }
    }

    /// Whether `other` occurs anywhere inside this term (strictly or as self).
    pub fn contains(&self, other: &Term) -> bool {
        if self.name == other.name {
            return true;
        }
        (0..self.component_count())
            .filter_map(|i| self.component_at(i))
            .any(|c| c.contains(other))
    }
}

fn join_names(components: &[Term]) -> String {
    components
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Term {}

impl std::hash::Hash for Term {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Unify `general` (which may contain variables of `kind`) against
/// `specific`, extending `subst`. Bindings are chased transitively;
/// a variable already bound must dereference to a term equal to the
/// new target.
pub fn unify_vars(
    kind: VarKind,
    general: &Term,
    specific: &Term,
    subst: &mut HashMap<String, Term>,
) -> bool {
    if general.as_variable() == Some(kind) {
        let var_name = general.name().to_string();
        if let Some(bound) = deref(&var_name, subst) {
            return bound == *specific;
        }
        subst.insert(var_name, specific.clone());
        return true;
    }

    match (&general.kind, &specific.kind) {
        (TermKind::Atom { .. }, TermKind::Atom { .. }) => general.name == specific.name,
        (
            TermKind::Compound { connector: c1, components: k1 },
            TermKind::Compound { connector: c2, components: k2 },
        ) => {
            c1 == c2
                && k1.len() == k2.len()
                && k1
                    .iter()
                    .zip(k2.iter())
                    .all(|(a, b)| unify_vars(kind, a, b, subst))
        }
        (
            TermKind::Statement { copula: p1, subject: s1, predicate: o1 },
            TermKind::Statement { copula: p2, subject: s2, predicate: o2 },
        ) => {
            p1 == p2
                && unify_vars(kind, s1, s2, subst)
                && unify_vars(kind, o1, o2, subst)
        }
        _ => false,
    }
}

fn deref(var_name: &str, subst: &HashMap<String, Term>) -> Option<Term> {
    let mut current = subst.get(var_name)?;
    let mut hops = 0;
    while let Some(next) = subst.get(current.name()) {
        current = next;
        hops += 1;
        if hops > subst.len() {
            break;
        }
    }
    Some(current.clone())
}

/// Rebuild a term with variables of `kind` replaced by their bindings.
pub fn apply_substitution(term: &Term, kind: VarKind, subst: &HashMap<String, Term>) -> Term {
    if term.as_variable() == Some(kind) {
        if let Some(bound) = deref(term.name(), subst) {
            return bound;
        }
        return term.clone();
    }
    match &term.kind {
        TermKind::Atom { .. } => term.clone(),
        TermKind::Compound { connector, components } => Term::compound(
            *connector,
            components
                .iter()
                .map(|c| apply_substitution(c, kind, subst))
                .collect(),
        ),
        TermKind::Statement { copula, subject, predicate } => Term::statement(
            apply_substitution(subject, kind, subst),
            *copula,
            apply_substitution(predicate, kind, subst),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inheritance(s: &str, p: &str) -> Term {
        Term::statement(Term::atom(s), Copula::Inheritance, Term::atom(p))
    }

    #[test]
    fn test_atom_name_and_complexity() {
        let t = Term::atom("bird");
        assert_eq!(t.name(), "bird");
        assert_eq!(t.complexity(), 1);
    }

    #[test]
    fn test_statement_canonical_name() {
        let t = inheritance("bird", "fly");
        assert_eq!(t.name(), "<bird --> fly>");
        assert_eq!(t.complexity(), 3);
    }

    #[test]
    fn test_negation_canonical_name() {
        let t = Term::negation(inheritance("bird", "fly"));
        assert_eq!(t.name(), "(--, <bird --> fly>)");
        assert_eq!(t.complexity(), 4);
    }

    #[test]
    fn test_variable_prefixes() {
        assert_eq!(Term::variable(VarKind::Independent, "x").name(), "$x");
        assert_eq!(Term::variable(VarKind::Dependent, "x").name(), "#x");
        assert_eq!(Term::variable(VarKind::Query, "x").name(), "?x");
    }

    #[test]
    fn test_variable_flags_propagate() {
        let t = Term::statement(
            Term::atom("bird"),
            Copula::Inheritance,
            Term::variable(VarKind::Query, "x"),
        );
        assert!(t.contains_variable(VarKind::Query));
        assert!(!t.contains_variable(VarKind::Dependent));
    }

    #[test]
    fn test_equality_by_name_not_identity() {
        let a = inheritance("bird", "fly");
        let b = inheritance("bird", "fly");
        assert_eq!(a, b);
        assert!(!a.same_object(&b));
        assert!(a.same_object(&a));
    }

    #[test]
    fn test_subterms_distinct() {
        // <bird --> bird> has subterms: itself and bird (once)
        let t = inheritance("bird", "bird");
        let subs = t.subterms();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].name(), "<bird --> bird>");
        assert_eq!(subs[1].name(), "bird");
    }

    #[test]
    fn test_subterms_nested() {
        let inner = inheritance("a", "b");
        let t = Term::statement(inner, Copula::Implication, Term::atom("c"));
        let names: Vec<&str> = t.subterms().iter().map(|s| s.name()).collect();
        assert!(names.contains(&"<a --> b>"));
        assert!(names.contains(&"a"));
        assert!(names.contains(&"b"));
        assert!(names.contains(&"c"));
    }

    #[test]
    fn test_contains() {
        let t = inheritance("bird", "fly");
        assert!(t.contains(&Term::atom("bird")));
        assert!(!t.contains(&Term::atom("fish")));
        assert!(t.contains(&t.clone()));
    }

    #[test]
    fn test_copula_classification() {
        assert!(Copula::Implication.is_higher_order());
        assert!(Copula::PredictiveImplication.is_higher_order());
        assert!(!Copula::Inheritance.is_higher_order());
        assert!(Copula::Similarity.is_symmetric());
        assert_eq!(
            Copula::PredictiveImplication.temporal_order(),
            Some(TemporalOrder::Forward)
        );
        assert_eq!(Copula::Inheritance.temporal_order(), None);
    }

    #[test]
    fn test_connector_metadata() {
        assert_eq!(Connector::Negation.arity(), Arity::Single);
        assert_eq!(Connector::ExtensionalDifference.arity(), Arity::Double);
        assert!(Connector::Conjunction.is_commutative());
        assert!(!Connector::Product.is_commutative());
        assert!(Connector::SequentialEvents.is_temporal());
        assert!(Connector::ExtensionalImage.is_product_or_image());
    }

    #[test]
    fn test_unify_query_variable() {
        let query = Term::statement(
            Term::atom("bird"),
            Copula::Inheritance,
            Term::variable(VarKind::Query, "x"),
        );
        let fact = inheritance("bird", "fly");
        let mut subst = HashMap::new();
        assert!(unify_vars(VarKind::Query, &query, &fact, &mut subst));
        assert_eq!(subst.get("?x").unwrap().name(), "fly");
    }

    #[test]
    fn test_unify_mismatch() {
        let query = Term::statement(
            Term::atom("fish"),
            Copula::Inheritance,
            Term::variable(VarKind::Query, "x"),
        );
        let fact = inheritance("bird", "fly");
        let mut subst = HashMap::new();
        assert!(!unify_vars(VarKind::Query, &query, &fact, &mut subst));
    }

    #[test]
    fn test_unify_repeated_variable_consistent() {
        // <?x --> ?x> unifies with <bird --> bird> but not <bird --> fly>
        let query = Term::statement(
            Term::variable(VarKind::Query, "x"),
            Copula::Inheritance,
            Term::variable(VarKind::Query, "x"),
        );
        let mut subst = HashMap::new();
        assert!(unify_vars(
            VarKind::Query,
            &query,
            &inheritance("bird", "bird"),
            &mut subst
        ));
        let mut subst2 = HashMap::new();
        assert!(!unify_vars(
            VarKind::Query,
            &query,
            &inheritance("bird", "fly"),
            &mut subst2
        ));
    }

    #[test]
    fn test_apply_substitution() {
        let query = Term::statement(
            Term::atom("bird"),
            Copula::Inheritance,
            Term::variable(VarKind::Query, "x"),
        );
        let fact = inheritance("bird", "fly");
        let mut subst = HashMap::new();
        assert!(unify_vars(VarKind::Query, &query, &fact, &mut subst));
        let grounded = apply_substitution(&query, VarKind::Query, &subst);
        assert_eq!(grounded, fact);
    }

    #[test]
    fn test_serde_roundtrip() {
        let t = Term::statement(
            Term::negation(inheritance("a", "b")),
            Copula::Implication,
            Term::variable(VarKind::Query, "x"),
        );
        let json = serde_json::to_string(&t).unwrap();
        let back: Term = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
        assert_eq!(t.complexity(), back.complexity());
        assert!(back.contains_variable(VarKind::Query));
    }

    #[test]
    fn test_set_names() {
        let ext = Term::compound(
            Connector::ExtensionalSet,
            vec![Term::atom("a"), Term::atom("b")],
        );
        assert_eq!(ext.name(), "{a, b}");
        let int = Term::compound(Connector::IntensionalSet, vec![Term::atom("a")]);
        assert_eq!(int.name(), "[a]");
    }
}
