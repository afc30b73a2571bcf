use crate::budget::Budget;
use crate::constants::{
    DEFAULT_GOAL_DURABILITY, DEFAULT_GOAL_PRIORITY, DEFAULT_JUDGMENT_CONFIDENCE,
    DEFAULT_JUDGMENT_DURABILITY, DEFAULT_JUDGMENT_FREQUENCY, DEFAULT_JUDGMENT_PRIORITY,
    DEFAULT_K, DEFAULT_QUESTION_DURABILITY, DEFAULT_QUESTION_PRIORITY,
};
use crate::error::{NarError, Result};
use crate::sentence::{Punctuation, Sentence};
use crate::stamp::{Stamp, Tense};
use crate::task::Task;
use crate::term::{Connector, Copula, Term, VarKind};
use crate::truth::{truth_to_quality, Truth};

/// Parse one Narsese input line into a Task.
///
/// Surface form: `[$p;d;q$] <term copula term> punctuation [tense] [truth]`.
/// Whitespace-insensitive. Missing budget and truth fields fall back to
/// the punctuation's defaults. Pure except for the stamp fields threaded
/// in by the caller (clock time, nar-id, input serial).
pub fn parse_task(text: &str, now: i64, nar_id: i64, serial: u64) -> Result<Task> {
    if text.trim().is_empty() {
        return Err(NarError::EmptyInput);
    }

    let mut cursor = Cursor::new(text);
    cursor.skip_ws();

    let explicit_budget = if cursor.peek() == Some('$') {
        Some(cursor.parse_budget_values()?)
    } else {
        None
    };

    cursor.skip_ws();
    let term = cursor.parse_term()?;

    cursor.skip_ws();
    let punctuation = cursor
        .bump()
        .and_then(Punctuation::from_symbol)
        .ok_or_else(|| NarError::Parse("expected punctuation (. ? !)".to_string()))?;

    cursor.skip_ws();
    let tense = cursor.parse_tense()?;

    cursor.skip_ws();
    let explicit_truth = if cursor.peek() == Some('%') {
        Some(cursor.parse_truth_values()?)
    } else {
        None
    };

    cursor.skip_ws();
    if let Some(c) = cursor.peek() {
        return Err(NarError::Parse(format!("unexpected trailing input at '{c}'")));
    }

    let stamp = Stamp::input(now, tense, nar_id, serial);

    let truth = match punctuation {
        Punctuation::Question => None,
        Punctuation::Judgment | Punctuation::Goal => {
            let (f, c, k) = explicit_truth.unwrap_or((
                DEFAULT_JUDGMENT_FREQUENCY,
                DEFAULT_JUDGMENT_CONFIDENCE,
                DEFAULT_K,
            ));
            Some(Truth::with_horizon(f, c, k))
        }
    };

    let (default_priority, default_durability) = match punctuation {
        Punctuation::Judgment => (DEFAULT_JUDGMENT_PRIORITY, DEFAULT_JUDGMENT_DURABILITY),
        Punctuation::Question => (DEFAULT_QUESTION_PRIORITY, DEFAULT_QUESTION_DURABILITY),
        Punctuation::Goal => (DEFAULT_GOAL_PRIORITY, DEFAULT_GOAL_DURABILITY),
    };
    let default_quality = match &truth {
        Some(t) => truth_to_quality(t),
        None => 1.0,
    };
    let (priority, durability, quality) = match explicit_budget {
        Some((p, d, q)) => (
            p.unwrap_or(default_priority),
            d.unwrap_or(default_durability),
            q.unwrap_or(default_quality),
        ),
        None => (default_priority, default_durability, default_quality),
    };
    let budget = Budget::new(priority, durability, quality);

    let sentence = Sentence {
        term,
        punctuation,
        truth,
        stamp,
    };
    Ok(Task::input(sentence, budget))
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(text: &str) -> Cursor {
        Cursor {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            other => Err(NarError::Parse(format!(
                "expected '{expected}', found {:?}",
                other.map(String::from).unwrap_or_else(|| "end of input".to_string())
            ))),
        }
    }

    fn try_symbol(&mut self, symbol: &str) -> bool {
        let len = symbol.chars().count();
        let slice: String = self.chars[self.pos..].iter().take(len).collect();
        if slice == symbol {
            self.pos += len;
            true
        } else {
            false
        }
    }

    /// `$p[;d[;q]]$`, each field optional past the first.
    fn parse_budget_values(&mut self) -> Result<(Option<f64>, Option<f64>, Option<f64>)> {
        self.expect('$')?;
        let mut values = Vec::new();
        loop {
            self.skip_ws();
            values.push(self.parse_number()?);
            self.skip_ws();
            match self.bump() {
                Some(';') => continue,
                Some('$') => break,
                _ => return Err(NarError::Parse("unterminated budget".to_string())),
            }
        }
        if values.len() > 3 {
            return Err(NarError::Parse("budget has at most three fields".to_string()));
        }
        let mut it = values.into_iter();
        Ok((it.next(), it.next(), it.next()))
    }

    /// `%f[;c[;k]]%`.
    fn parse_truth_values(&mut self) -> Result<(f64, f64, u32)> {
        self.expect('%')?;
        let mut values = Vec::new();
        loop {
            self.skip_ws();
            values.push(self.parse_number()?);
            self.skip_ws();
            match self.bump() {
                Some(';') => continue,
                Some('%') => break,
                _ => return Err(NarError::Parse("unterminated truth".to_string())),
            }
        }
        if values.len() > 3 {
            return Err(NarError::Parse("truth has at most three fields".to_string()));
        }
        let f = values[0];
        let c = values.get(1).copied().unwrap_or(DEFAULT_JUDGMENT_CONFIDENCE);
        let k = values.get(2).map(|v| v.max(1.0) as u32).unwrap_or(DEFAULT_K);
        Ok((f, c, k))
    }

    fn parse_tense(&mut self) -> Result<Tense> {
        if self.try_symbol(":/:") {
            return Ok(Tense::Future);
        }
        if self.try_symbol(":|:") {
            return Ok(Tense::Present);
        }
        if self.try_symbol(":\\:") {
            return Ok(Tense::Past);
        }
        if self.try_symbol(":-:") {
            return Ok(Tense::Eternal);
        }
        if self.peek() == Some(':') {
            return Err(NarError::Parse("malformed tense marker".to_string()));
        }
        Ok(Tense::None)
    }

    fn parse_number(&mut self) -> Result<f64> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.' || c == '-')
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map_err(|_| NarError::Parse(format!("invalid number '{text}'")))
    }

    fn parse_term(&mut self) -> Result<Term> {
        self.skip_ws();
        match self.peek() {
            Some('<') => self.parse_statement('<', '>'),
            Some('(') => self.parse_parenthesized(),
            Some('{') => self.parse_set(Connector::ExtensionalSet, '{', '}'),
            Some('[') => self.parse_set(Connector::IntensionalSet, '[', ']'),
            Some(c) if VarKind::from_prefix(c).is_some() => self.parse_variable(),
            Some(c) if is_atom_start(c) => Ok(self.parse_atom()),
            other => Err(NarError::Parse(format!("expected a term, found {other:?}"))),
        }
    }

    fn parse_statement(&mut self, open: char, close: char) -> Result<Term> {
        self.expect(open)?;
        let subject = self.parse_term()?;
        self.skip_ws();
        let copula = self.parse_copula()?;
        let predicate = self.parse_term()?;
        self.skip_ws();
        self.expect(close)?;
        Ok(Term::statement(subject, copula, predicate))
    }

    /// `(` opens either a compound `(connector, ...)` or a statement
    /// `(term copula term)`; a connector followed by a comma decides.
    fn parse_parenthesized(&mut self) -> Result<Term> {
        let checkpoint = self.pos;
        self.expect('(')?;
        self.skip_ws();

        // Longest connector symbols first so `--` is not read as `-`.
        const CONNECTORS: [&str; 12] = [
            "&&", "||", "&/", "&|", "--", "*", "|", "&", "-", "~", "/", "\\",
        ];
        for symbol in CONNECTORS {
            let before = self.pos;
            if self.try_symbol(symbol) {
                self.skip_ws();
                if self.peek() == Some(',') {
                    let connector =
                        Connector::from_symbol(symbol).expect("listed symbols are connectors");
                    return self.parse_compound_tail(connector);
                }
                self.pos = before;
            }
        }

        self.pos = checkpoint;
        self.parse_statement('(', ')')
    }

    fn parse_compound_tail(&mut self, connector: Connector) -> Result<Term> {
        let mut components = Vec::new();
        while self.peek() == Some(',') {
            self.pos += 1;
            components.push(self.parse_term()?);
            self.skip_ws();
        }
        self.expect(')')?;
        if components.is_empty() {
            return Err(NarError::Parse("empty compound".to_string()));
        }
        Ok(Term::compound(connector, components))
    }

    fn parse_set(&mut self, connector: Connector, open: char, close: char) -> Result<Term> {
        self.expect(open)?;
        let mut components = vec![self.parse_term()?];
        self.skip_ws();
        while self.peek() == Some(',') {
            self.pos += 1;
            components.push(self.parse_term()?);
            self.skip_ws();
        }
        self.expect(close)?;
        Ok(Term::compound(connector, components))
    }

    fn parse_copula(&mut self) -> Result<Copula> {
        const COPULAS: [&str; 12] = [
            "-->", "<->", "{--", "--]", "{-]", "==>", "<=>", "=/>", "=|>", "=\\>", "</>", "<|>",
        ];
        for symbol in COPULAS {
            if self.try_symbol(symbol) {
                return Ok(Copula::from_symbol(symbol).expect("listed symbols are copulas"));
            }
        }
        Err(NarError::Parse("expected a copula".to_string()))
    }

    fn parse_variable(&mut self) -> Result<Term> {
        let prefix = self.bump().expect("caller saw a variable prefix");
        let kind = VarKind::from_prefix(prefix).expect("caller checked the prefix");
        let name = self.parse_word();
        if name.is_empty() {
            return Err(NarError::Parse(format!("'{prefix}' without a variable name")));
        }
        Ok(Term::variable(kind, &name))
    }

    fn parse_atom(&mut self) -> Term {
        Term::atom(&self.parse_word())
    }

    fn parse_word(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_atom_char) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }
}

fn is_atom_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_atom_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
