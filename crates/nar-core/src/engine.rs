use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{NarError, Result};
use crate::rules::RuleTable;
use crate::term::Copula;

/// Identifiers with an uppercase first letter after an optional `?`/`$`
/// prefix are variables of the rule language.
static VAR_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[?$]?[A-Z][A-Za-z0-9_]*$").unwrap());

/// Terms of the rule language: atoms, variables, statements, negation.
#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
    Atom(String),
    Var(String),
    Statement {
        copula: Copula,
        subject: Box<Pattern>,
        predicate: Box<Pattern>,
    },
    Negation(Box<Pattern>),
}

impl Pattern {
    pub fn canonical(&self) -> String {
        match self {
            Pattern::Atom(name) | Pattern::Var(name) => name.clone(),
            Pattern::Statement { copula, subject, predicate } => format!(
                "<{} {} {}>",
                subject.canonical(),
                copula.symbol(),
                predicate.canonical()
            ),
            Pattern::Negation(inner) => format!("(--, {})", inner.canonical()),
        }
    }

    fn is_negation(&self) -> bool {
        matches!(self, Pattern::Negation(_))
    }

    /// Deepest run of nested negations anywhere in the term.
    fn negation_depth(&self) -> usize {
        match self {
            Pattern::Atom(_) | Pattern::Var(_) => 0,
            Pattern::Negation(inner) => 1 + inner.negation_depth(),
            Pattern::Statement { subject, predicate, .. } => {
                subject.negation_depth().max(predicate.negation_depth())
            }
        }
    }

    /// Reflexive inheritance (`<X --> X>`) is never a useful conclusion.
    fn is_reflexive_inheritance(&self) -> bool {
        match self {
            Pattern::Statement { copula: Copula::Inheritance, subject, predicate } => {
                subject.canonical() == predicate.canonical()
            }
            _ => false,
        }
    }
}

/// A loaded derivation rule.
#[derive(Clone, Debug)]
pub struct Rule {
    pub name: String,
    pub inverse: bool,
    pub premises: Vec<Pattern>,
    pub conclusion: Pattern,
}

impl Rule {
    /// Name as reported in explanations; primed for inverse variants.
    pub fn display_name(&self) -> String {
        if self.inverse {
            format!("{}'", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Why a conclusion was added to the fact set.
#[derive(Clone, Debug)]
pub struct Explanation {
    pub conclusion: String,
    pub rule: String,
    pub premises: Vec<String>,
    pub bindings: HashMap<String, String>,
}

type Subst = HashMap<String, Pattern>;

/// Syntactic unification with occurs-check; bindings chase transitively.
fn unify(a: &Pattern, b: &Pattern, subst: &mut Subst) -> bool {
    match (a, b) {
        (Pattern::Var(name), other) | (other, Pattern::Var(name)) => {
            bind(name, other, subst)
        }
        (Pattern::Atom(x), Pattern::Atom(y)) => x == y,
        (
            Pattern::Statement { copula: c1, subject: s1, predicate: p1 },
            Pattern::Statement { copula: c2, subject: s2, predicate: p2 },
        ) => c1 == c2 && unify(s1, s2, subst) && unify(p1, p2, subst),
        (Pattern::Negation(x), Pattern::Negation(y)) => unify(x, y, subst),
        _ => false,
    }
}

fn bind(name: &str, target: &Pattern, subst: &mut Subst) -> bool {
    if let Pattern::Var(other) = target {
        if other == name {
            return true;
        }
    }
    if let Some(bound) = subst.get(name).cloned() {
        return unify(&bound, target, subst);
    }
    let resolved = resolve(target, subst);
    if occurs(name, &resolved) {
        return false;
    }
    subst.insert(name.to_string(), resolved);
    true
}

fn occurs(name: &str, term: &Pattern) -> bool {
    match term {
        Pattern::Var(v) => v == name,
        Pattern::Atom(_) => false,
        Pattern::Negation(inner) => occurs(name, inner),
        Pattern::Statement { subject, predicate, .. } => {
            occurs(name, subject) || occurs(name, predicate)
        }
    }
}

/// Apply a substitution throughout a pattern; unbound variables stay.
fn resolve(term: &Pattern, subst: &Subst) -> Pattern {
    match term {
        Pattern::Var(name) => match subst.get(name) {
            Some(bound) => resolve(bound, subst),
            None => term.clone(),
        },
        Pattern::Atom(_) => term.clone(),
        Pattern::Negation(inner) => Pattern::Negation(Box::new(resolve(inner, subst))),
        Pattern::Statement { copula, subject, predicate } => Pattern::Statement {
            copula: *copula,
            subject: Box::new(resolve(subject, subst)),
            predicate: Box::new(resolve(predicate, subst)),
        },
    }
}

/// Parse a rule-language term.
pub fn parse_pattern(text: &str) -> Result<Pattern> {
    let chars: Vec<char> = text.chars().collect();
    let mut pos = 0;
    let pattern = parse_at(&chars, &mut pos)?;
    skip_ws(&chars, &mut pos);
    if pos != chars.len() {
        return Err(NarError::RuleTable(format!("trailing input in pattern: {text}")));
    }
    Ok(pattern)
}

fn skip_ws(chars: &[char], pos: &mut usize) {
    while chars.get(*pos).is_some_and(|c| c.is_whitespace()) {
        *pos += 1;
    }
}

fn parse_at(chars: &[char], pos: &mut usize) -> Result<Pattern> {
    skip_ws(chars, pos);
    match chars.get(*pos) {
        Some('<') => {
            *pos += 1;
            let subject = parse_at(chars, pos)?;
            skip_ws(chars, pos);
            let copula = parse_copula(chars, pos)?;
            let predicate = parse_at(chars, pos)?;
            skip_ws(chars, pos);
            if chars.get(*pos) != Some(&'>') {
                return Err(NarError::RuleTable("unterminated statement pattern".to_string()));
            }
            *pos += 1;
            Ok(Pattern::Statement {
                copula,
                subject: Box::new(subject),
                predicate: Box::new(predicate),
            })
        }
        Some('(') => {
            *pos += 1;
            skip_ws(chars, pos);
            if chars.get(*pos) != Some(&'-') || chars.get(*pos + 1) != Some(&'-') {
                return Err(NarError::RuleTable(
                    "only negation compounds appear in rules".to_string(),
                ));
            }
            *pos += 2;
            skip_ws(chars, pos);
            if chars.get(*pos) != Some(&',') {
                return Err(NarError::RuleTable("expected ',' in negation".to_string()));
            }
            *pos += 1;
            let inner = parse_at(chars, pos)?;
            skip_ws(chars, pos);
            if chars.get(*pos) != Some(&')') {
                return Err(NarError::RuleTable("unterminated negation".to_string()));
            }
            *pos += 1;
            Ok(Pattern::Negation(Box::new(inner)))
        }
        Some(_) => {
            let start = *pos;
            while chars
                .get(*pos)
                .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '?' | '$'))
            {
                *pos += 1;
            }
            if *pos == start {
                return Err(NarError::RuleTable(format!(
                    "unexpected character '{}' in pattern",
                    chars[*pos]
                )));
            }
            let token: String = chars[start..*pos].iter().collect();
            if VAR_TOKEN.is_match(&token) {
                Ok(Pattern::Var(token))
            } else {
                Ok(Pattern::Atom(token))
            }
        }
        None => Err(NarError::RuleTable("empty pattern".to_string())),
    }
}

fn parse_copula(chars: &[char], pos: &mut usize) -> Result<Copula> {
    const SYMBOLS: [&str; 12] = [
        "-->", "<->", "{--", "--]", "{-]", "==>", "<=>", "=/>", "=|>", "=\\>", "</>", "<|>",
    ];
    for symbol in SYMBOLS {
        let len = symbol.chars().count();
        let slice: String = chars[*pos..].iter().take(len).collect();
        if slice == symbol {
            *pos += len;
            return Ok(Copula::from_symbol(symbol).expect("listed symbols are copulas"));
        }
    }
    Err(NarError::RuleTable("expected a copula in pattern".to_string()))
}

/// Parse one rule line: `{P1. P2} |- C .name[']` or `P |- C .name[']`.
pub fn parse_rule(line: &str) -> Result<Rule> {
    let Some((left, right)) = line.split_once("|-") else {
        return Err(NarError::RuleTable(format!("missing |- in rule: {line}")));
    };

    let left = left.trim();
    let premises = if let Some(group) = left.strip_prefix('{') {
        let Some(group) = group.strip_suffix('}') else {
            return Err(NarError::RuleTable(format!("unterminated premise group: {line}")));
        };
        let parts = split_premises(group);
        if parts.len() != 2 {
            return Err(NarError::RuleTable(format!(
                "premise group must hold two patterns: {line}"
            )));
        }
        vec![parse_pattern(&parts[0])?, parse_pattern(&parts[1])?]
    } else {
        vec![parse_pattern(left)?]
    };

    let right = right.trim();
    let Some(dot) = right.rfind(" .") else {
        return Err(NarError::RuleTable(format!("missing rule name: {line}")));
    };
    let conclusion = parse_pattern(right[..dot].trim())?;
    let mut name = right[dot + 2..].trim().to_string();
    if name.is_empty() {
        return Err(NarError::RuleTable(format!("empty rule name: {line}")));
    }
    let inverse = name.ends_with('\'');
    if inverse {
        name.pop();
    }

    Ok(Rule {
        name,
        inverse,
        premises,
        conclusion,
    })
}

/// Split a premise group on top-level dots.
fn split_premises(group: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for c in group.chars() {
        match c {
            '<' | '(' => depth += 1,
            '>' | ')' => depth -= 1,
            '.' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

/// Forward derivation over a string-keyed fact set.
///
/// Facts are canonical term forms. One derivation call snapshots the
/// facts, fires every loaded rule over them (each at most once per
/// premise combination), guard-filters the conclusions, and only then
/// admits the survivors as new facts.
pub struct DerivationEngine {
    rules: Vec<Rule>,
    facts: Vec<String>,
    fact_set: HashSet<String>,
}

impl DerivationEngine {
    pub fn new() -> DerivationEngine {
        DerivationEngine {
            rules: Vec::new(),
            facts: Vec::new(),
            fact_set: HashSet::new(),
        }
    }

    /// Load one block of a rule table. Atomic: a malformed line loads
    /// nothing from the block.
    pub fn load_block(&mut self, table: &RuleTable, path: &str) -> Result<usize> {
        let Some(lines) = table.block(path) else {
            return Err(NarError::RuleTable(format!("no such block: {path}")));
        };
        let parsed: Result<Vec<Rule>> = lines.iter().map(|l| parse_rule(l)).collect();
        let parsed = parsed?;
        let count = parsed.len();
        self.rules.extend(parsed);
        Ok(count)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Add a fact by canonical name. Returns false when already present.
    pub fn assert_fact(&mut self, canonical: &str) -> bool {
        if self.fact_set.contains(canonical) {
            return false;
        }
        self.fact_set.insert(canonical.to_string());
        self.facts.push(canonical.to_string());
        true
    }

    pub fn contains_fact(&self, canonical: &str) -> bool {
        self.fact_set.contains(canonical)
    }

    pub fn facts(&self) -> &[String] {
        &self.facts
    }

    /// One derivation pass over the current facts. Derived conclusions
    /// do not feed back within the same call.
    pub fn derive_once(&mut self) -> Vec<Explanation> {
        let snapshot: Vec<(String, Pattern)> = self
            .facts
            .iter()
            .filter_map(|f| parse_pattern(f).ok().map(|p| (f.clone(), p)))
            .collect();

        let mut fired: HashSet<String> = HashSet::new();
        let mut explanations: Vec<Explanation> = Vec::new();
        let mut admitted: HashSet<String> = HashSet::new();

        for rule in &self.rules {
            match rule.premises.len() {
                1 => {
                    for (fact_name, fact) in &snapshot {
                        if rule.name == "negative" && fact.is_negation() {
                            continue;
                        }
                        let mut subst = Subst::new();
                        if !unify(&rule.premises[0], fact, &mut subst) {
                            continue;
                        }
                        Self::fire(
                            rule,
                            &[fact_name.clone()],
                            &subst,
                            &mut fired,
                            &self.fact_set,
                            &mut admitted,
                            &mut explanations,
                        );
                    }
                }
                2 => {
                    for (i, (name_a, fact_a)) in snapshot.iter().enumerate() {
                        for (j, (name_b, fact_b)) in snapshot.iter().enumerate() {
                            if i == j {
                                continue;
                            }
                            let mut subst = Subst::new();
                            if !unify(&rule.premises[0], fact_a, &mut subst)
                                || !unify(&rule.premises[1], fact_b, &mut subst)
                            {
                                continue;
                            }
                            Self::fire(
                                rule,
                                &[name_a.clone(), name_b.clone()],
                                &subst,
                                &mut fired,
                                &self.fact_set,
                                &mut admitted,
                                &mut explanations,
                            );
                        }
                    }
                }
                _ => {}
            }
        }

        for explanation in &explanations {
            self.fact_set.insert(explanation.conclusion.clone());
            self.facts.push(explanation.conclusion.clone());
        }
        explanations
    }

    #[allow(clippy::too_many_arguments)]
    fn fire(
        rule: &Rule,
        premises: &[String],
        subst: &Subst,
        fired: &mut HashSet<String>,
        existing: &HashSet<String>,
        admitted: &mut HashSet<String>,
        explanations: &mut Vec<Explanation>,
    ) {
        // One firing per rule and unordered premise combination.
        let mut sorted = premises.to_vec();
        sorted.sort();
        let signature = format!("{}|{}", rule.display_name(), sorted.join(";"));
        if !fired.insert(signature) {
            return;
        }

        let conclusion = resolve(&rule.conclusion, subst);
        if conclusion.is_reflexive_inheritance() {
            return;
        }
        if conclusion.negation_depth() > 1 {
            return;
        }

        let canonical = conclusion.canonical();
        if existing.contains(&canonical) || !admitted.insert(canonical.clone()) {
            return;
        }

        let bindings = subst
            .iter()
            .map(|(k, v)| (k.clone(), v.canonical()))
            .collect();
        explanations.push(Explanation {
            conclusion: canonical,
            rule: rule.display_name(),
            premises: premises.to_vec(),
            bindings,
        });
    }
}

impl Default for DerivationEngine {
    fn default() -> Self {
        DerivationEngine::new()
    }
}
