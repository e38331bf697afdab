use std::io::Read;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use prompt_refinery::{Intent, Mode, OptimizationResult, OptimizerConfig, Phase, TransformationEngine};

#[derive(Parser)]
#[command(
    name = "prompt-refinery",
    about = "Classify, rewrite and score prompts",
    version
)]
struct Cli {
    /// File paths to optimize (reads stdin if none provided)
    files: Vec<PathBuf>,

    /// Processing depth: fast, deep, prd or conversational
    #[arg(short, long, default_value = "fast")]
    mode: Mode,

    /// Workflow phase: validation, clarification, drafting or output
    #[arg(short, long)]
    phase: Option<Phase>,

    /// Skip classification and treat every input as this intent
    #[arg(short, long)]
    intent: Option<Intent>,

    /// JSON file with pattern overrides
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn run(engine: &TransformationEngine, cli: &Cli, text: &str) -> OptimizationResult {
    match cli.intent {
        Some(intent) => engine.optimize_as(text, intent, cli.mode, cli.phase, None),
        None => engine.optimize(text, cli.mode, cli.phase, None),
    }
}

fn report(result: &OptimizationResult) {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing result: {e}");
            process::exit(1);
        }
    }
    eprintln!("{}", TransformationEngine::recommendation_message(result));
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut catalog = prompt_refinery::builtin_catalog();
    if let Some(path) = &cli.config {
        match OptimizerConfig::load(path) {
            Ok(config) => catalog.apply_config(&config.patterns),
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }
    let engine = TransformationEngine::new(catalog);

    if cli.files.is_empty() {
        let mut input = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut input) {
            eprintln!("Error reading stdin: {e}");
            process::exit(1);
        }
        report(&run(&engine, &cli, &input));
    } else {
        for path in &cli.files {
            let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading {}: {e}", path.display());
                process::exit(1);
            });
            report(&run(&engine, &cli, &text));
        }
    }
}
