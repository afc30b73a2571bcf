mod repl;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nar_core::{Reasoner, RuleTable};

#[derive(Parser)]
#[command(name = "nar", about = "Non-axiomatic reasoner console and batch runner")]
struct Cli {
    /// Rule table file (defaults to the built-in immediate + nal1 table)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Seed the stamp RNG for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive Narsese console
    Repl,

    /// Feed Narsese files line by line, then run extra cycles
    Run {
        /// File path(s) holding one Narsese input per line
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Working cycles to run after the files are consumed
        #[arg(long, default_value_t = 0)]
        cycles: u64,

        /// Print the concept bag as JSON when done
        #[arg(long)]
        snapshot: bool,
    },

    /// Print the rule blocks the reasoner would load
    Rules,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// Rule table resolution order: --rules flag, NAR_RULES env var, built-in.
fn load_rule_table(flag: Option<&Path>) -> Result<RuleTable> {
    let env_path = std::env::var("NAR_RULES").ok().map(PathBuf::from);
    let path = flag.map(Path::to_path_buf).or(env_path);

    match path {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read rule table {}", path.display()))?;
            RuleTable::parse("rules", &text)
                .map_err(|e| anyhow::anyhow!("{e}"))
                .with_context(|| format!("failed to parse rule table {}", path.display()))
        }
        None => Ok(RuleTable::default_table()),
    }
}

fn build_reasoner(cli: &Cli) -> Result<Reasoner> {
    let mut nar = match cli.seed {
        Some(seed) => Reasoner::seeded(seed),
        None => Reasoner::new(),
    };

    let table = load_rule_table(cli.rules.as_deref())?;
    let mut loaded = 0usize;
    for block in table.block_names().to_vec() {
        let path = format!("{}.{}", table.name(), block);
        loaded += nar
            .load_rules(&table, &path)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("failed to load block {path}"))?;
    }
    tracing::debug!("loaded {loaded} rules");
    Ok(nar)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Repl => cmd_repl(&cli),
        Commands::Run { files, cycles, snapshot } => cmd_run(&cli, files, *cycles, *snapshot),
        Commands::Rules => cmd_rules(&cli),
    }
}

fn cmd_repl(cli: &Cli) -> Result<()> {
    let mut nar = build_reasoner(cli)?;
    repl::run(&mut nar, std::io::stdin().lock(), std::io::stdout().lock())
}

fn cmd_run(cli: &Cli, files: &[PathBuf], cycles: u64, snapshot: bool) -> Result<()> {
    let mut nar = build_reasoner(cli)?;

    for path in files {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut inputs = 0usize;
        let mut answers = 0usize;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            match nar.input_narsese(line) {
                Ok(report) => {
                    inputs += 1;
                    for answer in &report.answers {
                        answers += 1;
                        println!("Answer: {answer}");
                    }
                }
                Err(e) => {
                    tracing::warn!("{}: skipped '{line}': {e}", path.display());
                }
            }
        }
        println!(
            "processed {} -> {} inputs, {} answers",
            path.display(),
            inputs,
            answers
        );
    }

    let mut derived = 0usize;
    for _ in 0..cycles {
        let report = nar.cycle();
        derived += report.derivations.len();
        for answer in &report.answers {
            println!("Answer: {answer}");
        }
    }
    if cycles > 0 {
        println!("ran {cycles} cycles, {derived} derivations");
    }

    if snapshot {
        let json = serde_json::to_string_pretty(&nar.concept_bag_snapshot())
            .context("failed to serialize snapshot")?;
        println!("{json}");
    }

    println!(
        "concepts: {}, clock: {}",
        nar.memory.concept_count(),
        nar.now()
    );
    Ok(())
}

fn cmd_rules(cli: &Cli) -> Result<()> {
    let table = load_rule_table(cli.rules.as_deref())?;
    for block in table.block_names() {
        let lines = table.block(block).expect("listed blocks exist");
        println!("[{block}] ({} rules)", lines.len());
        for line in lines {
            println!("  {line}");
        }
    }
    Ok(())
}
