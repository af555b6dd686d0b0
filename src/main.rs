//! Application entry point: Banking AI services.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] (`.env`, settings file, environment); exit on any
//!    missing upstream setting.
//! 3. Build the shared chat model, prompt builder and lazy Whisper engine.
//! 4. Bind the complaint and call-analysis listeners.
//! 5. Serve both until Ctrl-C.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use banking_ai::{
    analysis::{CallAnalyzer, ComplaintAnalyzer},
    config::AppConfig,
    extract::{Extractor, LopdfExtractor, ScratchDir},
    llm::{ApiChatModel, ChatModel, PromptBuilder},
    server::{call_router, complaint_router},
    stt::{FileTranscriber, LazyWhisperEngine, TranscribeParams},
};
use tokio::net::TcpListener;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Banking AI starting up");

    let config = AppConfig::load().context("failed to load configuration")?;

    // ── Upstream model ───────────────────────────────────────────────────
    let llm: Arc<dyn ChatModel> = Arc::new(ApiChatModel::from_config(&config.llm));
    let prompts = PromptBuilder::from_config(&config.llm);
    log::info!(
        "LLM: model={} base_url={}",
        config.llm.model,
        config.llm.base_url
    );

    // ── STT ──────────────────────────────────────────────────────────────
    let stt_model_path = config.stt.model_path.clone();
    if !stt_model_path.exists() {
        log::warn!(
            "Whisper model not found at {}; audio uploads will fail until it is installed",
            stt_model_path.display()
        );
    }
    let engine = LazyWhisperEngine::new(stt_model_path, TranscribeParams::from_config(&config.stt));
    let transcriber = Arc::new(FileTranscriber::new(Arc::new(engine)));

    // ── Analyzers ────────────────────────────────────────────────────────
    let extractor = Extractor::new(
        transcriber,
        Arc::new(LopdfExtractor),
        ScratchDir::new(&config.server.upload_dir),
    );
    let complaint = Arc::new(ComplaintAnalyzer::new(llm.clone(), prompts.clone()));
    let call = Arc::new(CallAnalyzer::new(llm, prompts, extractor));

    // ── Serve ────────────────────────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Failed to listen for Ctrl-C: {e}");
            return;
        }
        log::info!("Shutdown requested");
        let _ = shutdown_tx.send(true);
    });

    tokio::try_join!(
        serve(
            "complaint",
            config.server.complaint_addr,
            complaint_router(complaint),
            shutdown_rx.clone(),
        ),
        serve(
            "call analysis",
            config.server.call_addr,
            call_router(call, config.server.max_upload_bytes),
            shutdown_rx,
        ),
    )?;

    log::info!("Banking AI stopped");
    Ok(())
}

async fn serve(
    name: &'static str,
    addr: SocketAddr,
    router: Router,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {name} service to {addr}"))?;
    log::info!("{name} service listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            // A dropped sender means Ctrl-C handling is unavailable; keep serving.
            if shutdown.wait_for(|stop| *stop).await.is_err() {
                std::future::pending::<()>().await;
            }
        })
        .await
        .with_context(|| format!("{name} service failed"))
}
