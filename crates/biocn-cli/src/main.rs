//! bioCN — highlights grammatical roles or key phrases in XHTML books.

use std::path::{Path, PathBuf};

use anyhow::Context;
use biocn_core::BiocnConfig;
use biocn_oracle::{create_oracle, FixtureOracle, LinguisticOracle, SentenceAnalysis};
use biocn_runtime::Pipeline;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod args;

use args::AnnotateArgs;

fn print_help() {
    println!("bioCN — grammatical role and keyword highlighting for XHTML books");
    println!();
    println!("Usage: biocn <command> [args]");
    println!();
    println!("Commands:");
    println!("  annotate <input> <output>  Annotate a chapter file or a directory of chapters");
    println!("      --config FILE          JSON config (default: biocn.json if present)");
    println!("      --mode svo|keywords    Analysis mode");
    println!("      --method NAME          Keyword ranking method (frequency, tfidf, textrank)");
    println!("      --top-k N              Keywords kept per paragraph");
    println!("      --inline-css           Inline styles instead of a stylesheet");
    println!("      --fixture FILE         Replay parses from a JSON fixture instead of HanLP");
    println!("      --report               Print a JSON run report to stdout");
    println!("  extract <fixture.json>     Print role triples for every fixture sentence");
    println!("  help                       Show this help message");
    println!();
    println!("Environment: BIOCN_HANLP_URL, BIOCN_HANLP_AUTH, RUST_LOG");
}

fn run_annotate(raw: &[String]) -> anyhow::Result<()> {
    let args = AnnotateArgs::parse(raw)?;
    if !args.input.exists() {
        anyhow::bail!("Input not found: {}", args.input.display());
    }

    let config_path = args.config.clone().unwrap_or_else(|| PathBuf::from("biocn.json"));
    let mut config = BiocnConfig::load(Some(&config_path))
        .with_context(|| format!("loading config {}", config_path.display()))?;
    args.apply(&mut config);

    // Reject bad modes before the oracle (possibly remote) is set up.
    config.analyzer_kind()?;
    let oracle = create_oracle(&config.oracle)?;
    let pipeline = Pipeline::new(&config, oracle.as_ref())?;

    let report = pipeline
        .process_path(&args.input, &args.output)
        .with_context(|| format!("annotating {}", args.input.display()))?;

    info!(
        "Annotated {} document(s) into {}",
        report.documents,
        args.output.display()
    );
    if args.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn run_extract(fixture: &Path) -> anyhow::Result<()> {
    let oracle = FixtureOracle::from_path(fixture)
        .with_context(|| format!("reading fixture {}", fixture.display()))?;
    let sentences: Vec<String> = oracle.sentences().into_iter().map(String::from).collect();
    let analyses: Vec<SentenceAnalysis> = oracle.analyze(&sentences)?;
    let roles = biocn_extract::extract_sentences(&sentences, &analyses);
    info!("{} of {} sentences yielded triples", roles.len(), sentences.len());
    println!("{}", serde_json::to_string_pretty(&roles)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // stdout is reserved for reports.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("annotate") => run_annotate(&args[2..]),
        Some("extract") => {
            let Some(fixture) = args.get(2) else {
                eprintln!("Usage: biocn extract <fixture.json>");
                std::process::exit(1);
            };
            run_extract(Path::new(fixture))
        }
        Some("help") | Some("--help") | Some("-h") | None => {
            print_help();
            Ok(())
        }
        Some(other) => {
            eprintln!("Unknown command: {}. Use 'biocn help' for usage.", other);
            std::process::exit(1);
        }
    }
}
