use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gncql_web::{AppState, Config, router};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (default: config.toml in the working directory)
    #[arg(short, long, env = "GNCQL_CONF")]
    config: Option<PathBuf>,

    /// GnuCash book to serve, overriding the configuration
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Host to listen on, overriding the configuration
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on, overriding the configuration
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gncql_web=info,gncql_loader=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(file) = args.file {
        config.gnucash.file = Some(file);
    }
    if let Some(host) = args.host {
        config.listen.host = host;
    }
    if let Some(port) = args.port {
        config.listen.port = port;
    }

    let Some(path) = config.gnucash.file.clone() else {
        bail!("no GnuCash file configured: set [gnucash] file or pass --file");
    };

    let database = tokio::task::spawn_blocking(move || gncql_loader::load_file(&path))
        .await
        .context("loader task failed")?
        .context("failed to load GnuCash book")?;

    let app = router(Arc::new(AppState::new(database)));

    let addr = config.listen.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to listen on {addr}"))?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
