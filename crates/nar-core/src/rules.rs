use std::collections::HashMap;

use crate::error::{NarError, Result};

/// The default rule table shipped with the crate: `immediate` and `nal1`
/// blocks.
pub const DEFAULT_RULES: &str = include_str!("../rules/default.rules");

/// A text resource holding rule blocks addressable by dotted path keys
/// (`rules.nal1` → block `nal1` of the table named `rules`).
///
/// Parsing here only splits blocks and strips comments; rule syntax is
/// validated when a block is loaded into the engine, atomically per
/// block.
pub struct RuleTable {
    name: String,
    blocks: HashMap<String, Vec<String>>,
    order: Vec<String>,
}

impl RuleTable {
    pub fn parse(name: &str, source: &str) -> Result<RuleTable> {
        let mut blocks: HashMap<String, Vec<String>> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        let mut current: Option<String> = None;

        for line in source.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('\'') {
                continue;
            }
            if let Some(header) = line.strip_prefix('[') {
                let Some(block_name) = header.strip_suffix(']') else {
                    return Err(NarError::RuleTable(format!("unterminated header: {line}")));
                };
                let block_name = block_name.trim().to_string();
                if block_name.is_empty() {
                    return Err(NarError::RuleTable("empty block name".to_string()));
                }
                if !blocks.contains_key(&block_name) {
                    order.push(block_name.clone());
                }
                blocks.entry(block_name.clone()).or_default();
                current = Some(block_name);
                continue;
            }
            match &current {
                Some(block) => blocks
                    .get_mut(block)
                    .expect("current block exists")
                    .push(line.to_string()),
                None => {
                    return Err(NarError::RuleTable(format!(
                        "rule line before any [block] header: {line}"
                    )))
                }
            }
        }

        Ok(RuleTable {
            name: name.to_string(),
            blocks,
            order,
        })
    }

    /// The built-in table, addressed as `rules.<block>`.
    pub fn default_table() -> RuleTable {
        RuleTable::parse("rules", DEFAULT_RULES).expect("embedded rule table is well-formed")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw rule lines of a block. Accepts `table.block` or bare `block`.
    pub fn block(&self, path: &str) -> Option<&[String]> {
        let key = path
            .strip_prefix(&format!("{}.", self.name))
            .unwrap_or(path);
        self.blocks.get(key).map(Vec::as_slice)
    }

    pub fn block_names(&self) -> &[String] {
        &self.order
    }
}
