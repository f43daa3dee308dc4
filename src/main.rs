//! Interactive command-line driver for the symptom triage pipeline.
//!
//! Loads a labeled CSV corpus, embeds it through the provider, trains the
//! classifier, then reads symptom lines from stdin and prints banded
//! diagnoses. All pipeline logic lives in the library.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use dxassist::config::{CONFIG_FILE_NAME, ProviderConfig};
use dxassist::dataset::export::write_history_csv;
use dxassist::dataset::loader::load_csv;
use dxassist::logging;
use dxassist::ml::logreg::TrainOptions;
use dxassist::provider::{ChatClient, EmbeddingClient};
use dxassist::session::{Session, embed_dataset};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

struct CliOptions {
    data: PathBuf,
    config: Option<PathBuf>,
    test_fraction: f32,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut data = None;
    let mut config = None;
    let mut test_fraction = 0.2f32;
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--data" => {
                data = Some(PathBuf::from(
                    iter.next().ok_or("--data requires a path")?,
                ));
            }
            "--config" => {
                config = Some(PathBuf::from(
                    iter.next().ok_or("--config requires a path")?,
                ));
            }
            "--test-fraction" => {
                let value = iter.next().ok_or("--test-fraction requires a value")?;
                test_fraction = value
                    .parse()
                    .map_err(|_| format!("Invalid test fraction: {value}"))?;
            }
            other => {
                return Err(format!(
                    "Unknown argument {other}\nUsage: dxassist --data <csv> [--config <toml>] [--test-fraction <f>]"
                ));
            }
        }
    }
    let data = data.ok_or("Missing required --data <csv>")?;
    Ok(CliOptions {
        data,
        config,
        test_fraction,
    })
}

fn run() -> Result<(), String> {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    let options = parse_args(std::env::args().skip(1).collect())?;
    let config_path = options.config.clone().or_else(|| {
        let default = PathBuf::from(CONFIG_FILE_NAME);
        default.exists().then_some(default)
    });
    let config = ProviderConfig::load(config_path.as_deref()).map_err(|err| err.to_string())?;

    let mut dataset = load_csv(&options.data).map_err(|err| err.to_string())?;
    tracing::info!(records = dataset.len(), "dataset loaded");

    let embeddings = EmbeddingClient::new(config.clone());
    let chat = ChatClient::new(config.clone());

    embed_dataset(&embeddings, &mut dataset, config.chunk_size).map_err(|err| err.to_string())?;

    let mut session = Session::new();
    let train_options = TrainOptions {
        test_fraction: options.test_fraction,
        ..TrainOptions::default()
    };
    let report = session
        .train(&dataset, &train_options)
        .map_err(|err| err.to_string())?;
    println!("Model accuracy: {:.2}", report.accuracy);
    println!("Precision: {:.2}", report.precision);

    repl(&mut session, &embeddings, &chat)
}

fn repl(
    session: &mut Session,
    embeddings: &EmbeddingClient,
    chat: &ChatClient,
) -> Result<(), String> {
    println!("Enter symptoms to diagnose. Commands: :history, :summary, :export <path>, :clear, :quit");
    let stdin = std::io::stdin();
    loop {
        print!("symptoms> ");
        std::io::stdout().flush().map_err(|err| err.to_string())?;
        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|err| err.to_string())?;
        if read == 0 {
            break;
        }
        let line = line.trim();
        match line {
            "" => {}
            ":quit" | ":q" => break,
            ":history" => print_history(session),
            ":summary" => print_summary(session),
            ":clear" => {
                session.history.clear();
                println!("History cleared.");
            }
            _ => {
                if let Some(path) = line.strip_prefix(":export ") {
                    export_history(session, path.trim());
                } else {
                    diagnose_line(session, embeddings, chat, line);
                }
            }
        }
    }
    Ok(())
}

fn diagnose_line(session: &mut Session, embeddings: &EmbeddingClient, chat: &ChatClient, text: &str) {
    match session.diagnose(embeddings, text) {
        Ok(diagnosis) => {
            println!(
                "Diagnosis: {} (confidence {:.2}, tier {})",
                diagnosis.condition,
                diagnosis.confidence,
                diagnosis.tier.as_str()
            );
            match chat.describe_condition(&diagnosis.condition) {
                Ok(description) => println!("{description}"),
                Err(err) => tracing::warn!("Description unavailable: {err}"),
            }
        }
        Err(err) => eprintln!("Diagnosis failed: {err}"),
    }
}

fn print_history(session: &Session) {
    if session.history.is_empty() {
        println!("No history yet.");
        return;
    }
    for entry in session.history.entries() {
        println!(
            "[{}] {} -> {} ({:.2})",
            entry.timestamp_display(),
            entry.input_text,
            entry.prediction,
            entry.confidence
        );
    }
}

fn print_summary(session: &Session) {
    let summary = session.history.summarize(&session.thresholds);
    if summary.is_empty() {
        println!("No history yet.");
        return;
    }
    for (condition, breakdown) in &summary {
        println!(
            "{condition}: green {:.2}% amber {:.2}% red {:.2}%",
            breakdown.green_pct, breakdown.amber_pct, breakdown.red_pct
        );
    }
}

fn export_history(session: &Session, path: &str) {
    let file = match std::fs::File::create(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Export failed: {err}");
            return;
        }
    };
    match write_history_csv(session.history.entries(), file) {
        Ok(()) => println!("History written to {path}"),
        Err(err) => eprintln!("Export failed: {err}"),
    }
}
