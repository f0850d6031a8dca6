// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use prospectus_summarize::{
    AppState, Config, ProgressTracker, ProspectusPipeline, server,
    utils::logging::{format_error, format_heading, format_info, format_success, init_logger},
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "prospectus_summarize")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Finds, summarizes and answers questions about drug package inserts", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP JSON service
    Serve {
        /// Address to bind, overriding server.bind
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Locate and summarize the package insert of a drug
    Summarize {
        drug: String,
    },

    /// Summarize a drug, then answer a question from its full insert text
    Ask {
        drug: String,

        question: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger(cli.color, cli.verbose);

    info!("Prospectus summarization service");

    let config = if cli.config.exists() {
        info!("Loading configuration from: {}", cli.config.display());
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using defaults and environment",
            cli.config.display()
        );
        Config::load(None).context("Failed to load configuration")?
    };

    match cli.command {
        Commands::Serve { bind } => {
            cmd_serve(&config, bind).await?;
        }
        Commands::Summarize { drug } => {
            cmd_summarize(&config, &drug, cli.color).await?;
        }
        Commands::Ask { drug, question } => {
            cmd_ask(&config, &drug, &question, cli.color).await?;
        }
    }

    Ok(())
}

async fn cmd_serve(config: &Config, bind: Option<String>) -> Result<()> {
    let addr = bind.unwrap_or_else(|| config.server.bind.clone());

    let pipeline = ProspectusPipeline::from_config(config).context("Failed to build pipeline")?;
    let state = AppState::new(pipeline, config.server.fallback_on_llm_error);

    if config.server.fallback_on_llm_error {
        info!("Inference failures will be answered with fallback text");
    }

    server::serve(state, &addr)
        .await
        .with_context(|| format!("HTTP server on {} failed", addr))?;

    Ok(())
}

async fn cmd_summarize(config: &Config, drug: &str, colored: bool) -> Result<()> {
    let pipeline = ProspectusPipeline::from_config(config).context("Failed to build pipeline")?;
    let progress = ProgressTracker::new(colored);

    let result = pipeline.summarize_drug(drug, &progress).await;
    progress.finish();

    match result {
        Ok(outcome) => {
            println!("\n{}", format_heading(&format!("{} prospektüs özeti", drug)));
            println!("{}", format_info(&format!("Kaynak: {}", outcome.document.source_url)));
            println!(
                "{}",
                format_info(&format!(
                    "Metin uzunluğu: {}, özet uzunluğu: {}",
                    outcome.summary.source_text_length, outcome.summary.summary_length
                ))
            );
            println!("\n{}\n", outcome.summary.text);
            println!("{}", format_success("Özet hazır"));
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", format_error(&e.to_string()));
            Err(e).context(format!("Summary for '{}' failed", drug))
        }
    }
}

async fn cmd_ask(config: &Config, drug: &str, question: &str, colored: bool) -> Result<()> {
    let pipeline = ProspectusPipeline::from_config(config).context("Failed to build pipeline")?;

    let progress = ProgressTracker::new(colored);
    let outcome = pipeline.summarize_drug(drug, &progress).await;
    progress.finish();
    let outcome = outcome.with_context(|| format!("Summary for '{}' failed", drug))?;

    let progress = ProgressTracker::new(colored);
    let answer = pipeline
        .answer_question(question, &outcome.summary.text, Some(drug), &progress)
        .await;
    progress.finish();
    let answer = answer.context("Question answering failed")?;

    println!("\n{}", format_heading(question));
    println!("{}\n", answer.text);
    println!(
        "{}",
        format_info(&format!(
            "Kullanılan metin uzunluğu: {}",
            answer.grounding_text_length
        ))
    );

    Ok(())
}
