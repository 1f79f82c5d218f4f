use anyhow::Result;
use clap::Parser;
use search_core::{corpus, log_duration, SearchIndex};
use server::{build_app, ServerConfig};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Documents to load at startup (.json, .jsonl or a directory)
    #[arg(long)]
    input: Option<String>,
    /// Space-separated stop words
    #[arg(long, default_value = "")]
    stop_words: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let mut index = SearchIndex::with_stop_words_text(&args.stop_words)?;
    if let Some(input) = &args.input {
        log_duration!("load corpus");
        corpus::index_all(&mut index, &corpus::load(input)?)?;
    }
    tracing::info!(num_docs = index.document_count(), "index ready");
    let app = build_app(index, ServerConfig::from_env());

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
