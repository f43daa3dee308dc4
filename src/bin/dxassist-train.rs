//! Developer utility to embed a CSV corpus, train the diagnosis classifier,
//! and print a training report.

use std::path::PathBuf;

use dxassist::config::{CONFIG_FILE_NAME, ProviderConfig};
use dxassist::dataset::export::write_processed_csv;
use dxassist::dataset::loader::load_csv;
use dxassist::logging;
use dxassist::ml::logreg::TrainOptions;
use dxassist::provider::EmbeddingClient;
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
    export: Option<PathBuf>,
    train: TrainOptions,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut data = None;
    let mut config = None;
    let mut export = None;
    let mut train = TrainOptions::default();
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
            "--export" => {
                export = Some(PathBuf::from(
                    iter.next().ok_or("--export requires a path")?,
                ));
            }
            "--test-fraction" => {
                train.test_fraction = parse_value(iter.next(), "--test-fraction")?;
            }
            "--seed" => {
                train.seed = parse_value(iter.next(), "--seed")?;
            }
            "--max-iterations" => {
                train.max_iterations = parse_value(iter.next(), "--max-iterations")?;
            }
            other => {
                return Err(format!(
                    "Unknown argument {other}\nUsage: dxassist-train --data <csv> [--config <toml>] \
                     [--export <csv>] [--test-fraction <f>] [--seed <n>] [--max-iterations <n>]"
                ));
            }
        }
    }
    let data = data.ok_or("Missing required --data <csv>")?;
    Ok(CliOptions {
        data,
        config,
        export,
        train,
    })
}

fn parse_value<T: std::str::FromStr>(value: Option<String>, flag: &str) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("{flag} requires a value"))?;
    value
        .parse()
        .map_err(|_| format!("Invalid value for {flag}: {value}"))
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
    let embeddings = EmbeddingClient::new(config.clone());
    embed_dataset(&embeddings, &mut dataset, config.chunk_size).map_err(|err| err.to_string())?;

    let mut session = Session::new();
    let report = session
        .train(&dataset, &options.train)
        .map(|report| report.clone())
        .map_err(|err| err.to_string())?;

    println!("Accuracy:    {:.4}", report.accuracy);
    println!("Precision:   {:.4}", report.precision);
    println!("Converged:   {}", report.converged);
    println!("Iterations:  {}", report.iterations);
    println!("Train/test:  {}/{}", report.train_size, report.test_size);

    if let Some(path) = options.export {
        let trained = session
            .trained()
            .ok_or("Training succeeded but no model is available")?;
        let file = std::fs::File::create(&path).map_err(|err| err.to_string())?;
        write_processed_csv(&dataset, trained.codec(), file).map_err(|err| err.to_string())?;
        println!("Processed dataset written to {}", path.display());
    }
    Ok(())
}
