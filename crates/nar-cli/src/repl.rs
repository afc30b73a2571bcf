//! Interactive console: one Narsese input per line, answers and
//! derivations printed as they happen.
//!
//! A purely numeric line runs that many working cycles. `:stats` prints
//! memory totals, `:concepts` the top of the concept bag, `:facts` the
//! rule engine's fact set, `:quit` exits. Everything else goes through
//! the reasoner's Narsese channel.

use std::io::{BufRead, Write};

use anyhow::Result;
use nar_core::Reasoner;

pub fn run(nar: &mut Reasoner, input: impl BufRead, mut output: impl Write) -> Result<()> {
    writeln!(output, "nar console - one Narsese input per line, :quit to exit")?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        match line {
            ":quit" | ":q" => break,
            ":stats" => {
                writeln!(
                    output,
                    "concepts: {}, clock: {}",
                    nar.memory.concept_count(),
                    nar.now()
                )?;
                continue;
            }
            ":concepts" => {
                for summary in nar.concept_bag_snapshot().iter().take(20) {
                    writeln!(
                        output,
                        "{:.2} {} ({} beliefs, {} questions)",
                        summary.priority, summary.name, summary.beliefs, summary.questions
                    )?;
                }
                continue;
            }
            ":facts" => {
                for fact in nar.engine.facts() {
                    writeln!(output, "{fact}")?;
                }
                continue;
            }
            _ => {}
        }

        // Numeric lines cycle with visible derivations
        if line.chars().all(|c| c.is_ascii_digit()) {
            let count: u64 = match line.parse() {
                Ok(n) => n,
                Err(_) => {
                    writeln!(output, "error: bad cycle count '{line}'")?;
                    continue;
                }
            };
            for _ in 0..count {
                let report = nar.cycle();
                for explanation in &report.derivations {
                    writeln!(
                        output,
                        "derived: {} ({})",
                        explanation.conclusion, explanation.rule
                    )?;
                }
                for answer in &report.answers {
                    writeln!(output, "Answer: {answer}")?;
                }
            }
            continue;
        }

        match nar.input_narsese(line) {
            Ok(report) => {
                if let Some(task) = &report.task {
                    tracing::debug!("accepted task {}", task.sentence);
                }
                if let Some(overflow) = &report.overflow {
                    tracing::debug!("task bag overflow: {}", overflow.sentence);
                }
                for answer in &report.answers {
                    writeln!(output, "Answer: {answer}")?;
                }
            }
            Err(e) => {
                tracing::warn!("parse failure: {e}");
                writeln!(output, "error: {e}")?;
            }
        }
    }

    Ok(())
}
