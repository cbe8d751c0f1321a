use std::env;

use urpaq_core::config::Config;
use urpaq_server::{logging, verbose_flag, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    logging::init(verbose_flag(&args));

    let question = args.iter().filter(|a| !a.starts_with('-')).cloned().collect::<Vec<_>>().join(" ");
    if question.trim().is_empty() {
        eprintln!("Usage: urpaq-ask [--verbose] \"<question>\"");
        std::process::exit(1);
    }

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let settings = config.settings()?;
    let state = AppState::from_settings(&settings).await?;

    if state.retrieval.count().await? == 0 {
        eprintln!("⚠️  The index is empty. Run urpaq-indexer first.");
    }

    let response = state.ai.ask(&question).await;
    println!("❓ {}\n", question);
    println!("{}\n", response.answer);
    println!("📚 Sources ({}):\n{}", response.source_count(), response.sources_summary());
    if !response.is_valid {
        println!("\n⚠️  Validation: {}", response.validation_issue);
    }
    Ok(())
}
