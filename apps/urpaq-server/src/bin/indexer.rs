use std::env;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use urpaq_core::config::Config;
use urpaq_rag::ingest::{DataInitializer, ObjectLoader};
use urpaq_server::{logging, verbose_flag, AppState};

fn usage() -> ! {
    eprintln!("Usage: urpaq-indexer [--with-s3] [--verbose] [TXT_DIR]");
    std::process::exit(1)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    logging::init(verbose_flag(&args));

    let mut with_s3 = false;
    let mut txt_dir = None;
    for arg in &args {
        match arg.as_str() {
            "--with-s3" => with_s3 = true,
            "--verbose" | "-v" => {}
            "--help" | "-h" => usage(),
            other if !other.starts_with('-') => txt_dir = Some(other.to_string()),
            other => {
                eprintln!("Unknown flag: {}", other);
                usage()
            }
        }
    }

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let mut settings = config.settings()?;
    settings.ingest.skip_seed = false;
    if let Some(dir) = txt_dir {
        settings.ingest.txt_dir = dir;
    }

    println!("Digital Urpaq Indexer\n=====================");
    println!("Index directory: {}", settings.index.path().map_or("<memory>".to_string(), |p| p.display().to_string()));
    let state = AppState::from_settings(&settings).await?;

    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message("Indexing PDF, seed and text documents...");
    let count = DataInitializer::new(state.retrieval.clone(), settings.ingest.clone()).run().await?;
    spinner.finish_with_message(format!("📊 {} entries in the index", count));

    if with_s3 {
        if !settings.s3.is_configured() {
            eprintln!("--with-s3 needs s3.bucket to be configured");
            std::process::exit(1);
        }
        let loader = ObjectLoader::new(state.objects.clone(), state.retrieval.clone(), settings.ingest.use_chunking);
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {wide_msg}")?.progress_chars("=> "),
        );
        let stored = loader
            .load_all_with(|done, total, key| {
                bar.set_length(total as u64);
                bar.set_position(done as u64);
                bar.set_message(key.to_string());
            })
            .await?;
        bar.finish_with_message(format!("📦 {} objects stored", stored));
    }

    println!("\n✅ Indexing completed successfully!");
    println!("📊 Total entries: {}", state.retrieval.count().await?);
    println!("\n💡 To ask a question, use: cargo run --bin urpaq-ask '<question>'");
    Ok(())
}
