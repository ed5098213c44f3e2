use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use meeting_notes::{
    create_router, AppState, Config, NotePipeline, NoteWriter, OllamaClient, SummaryGenerator,
    Vault, WhisperClient,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "meeting-notes", about = "Meeting recorder with AI notes")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/meeting-notes")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Vault: {}", cfg.vault.path);
    info!("Ollama: {} (model {})", cfg.ollama.host, cfg.ollama.model);

    let transcriber = Arc::new(WhisperClient::new(cfg.transcription.clone()));
    let summarizer = Arc::new(SummaryGenerator::new(
        OllamaClient::new(cfg.ollama.host.clone()),
        cfg.ollama.model.clone(),
    ));
    let writer = NoteWriter::new(Vault::new(&cfg.vault.path), cfg.vault.notes_folder.clone());

    let pipeline = Arc::new(NotePipeline::new(
        cfg.transcription.clone(),
        transcriber,
        summarizer,
        writer,
    ));

    let state = AppState::new(pipeline);
    let router = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(listener, router).await?;

    Ok(())
}
