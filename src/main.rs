// Text front-end: classify one image and print what the upload form shows.
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use scenery::{Config, Pipeline, open_image, render_report};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "scenery", about = "Classify a scene photo with four classical models")]
struct Cli {
    /// JPEG or PNG image to classify
    image: PathBuf,

    /// TOML config file (defaults to ./scenery.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the model artifacts, overrides the config
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(dir) = cli.model_dir {
        config.bank.model_dir = dir;
    }

    let pipeline = Pipeline::from_config(&config);
    if let Err(e) = pipeline.bank() {
        eprintln!("{}", e.user_message());
        return ExitCode::FAILURE;
    }

    let image = match open_image(&cli.image) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("{}", scenery::ClassifyError::from(e).user_message());
            return ExitCode::FAILURE;
        }
    };
    println!(
        "Image uploaded: {} ({}x{})",
        cli.image.display(),
        image.width(),
        image.height()
    );

    match pipeline.classify_image(&image) {
        Ok(result) => {
            print!("{}", render_report(&result));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
