// src/bin/movie_chat.rs
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::Parser;
use movie_rag::{ChatEngine, MovieRagConfig};

#[derive(Parser, Debug)]
#[command(name = "movie-chat", version, about = "Ask a question about the movie database")]
struct Args {
    /// JSON config file; defaults are used when omitted
    #[arg(long, env = "MOVIE_AGENT_CONFIG")]
    config: Option<PathBuf>,

    /// Answer from templates only, without calling the text generator
    #[arg(long)]
    no_generate: bool,

    /// Print the health report instead of answering a question
    #[arg(long)]
    health: bool,

    /// The question, e.g. "Top 5 highest rated horror movies"
    question: Vec<String>,
}

fn load_config(args: &Args) -> Result<MovieRagConfig> {
    let mut config = match &args.config {
        Some(path) => MovieRagConfig::from_file(path).map_err(|e| anyhow!(e))?,
        None => MovieRagConfig::default(),
    };
    config.apply_env_overrides().map_err(|e| anyhow!(e))?;
    if args.no_generate {
        config.generator.enabled = false;
    }
    Ok(config)
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    init_tracing(&config.log_level);

    let engine = ChatEngine::from_config(config)?;

    if args.health {
        let report = engine.health().await;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let question = args.question.join(" ");
    if question.trim().is_empty() {
        return Err(anyhow!("no question given"));
    }

    let envelope = engine.handle(&question).await?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
