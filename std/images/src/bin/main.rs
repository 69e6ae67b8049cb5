//! Binary entry point for the wmcp-images MCP server.

use anyhow::Context;
use clap::Parser;
use rmcp::ServiceExt;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wmcp_images::{
    ImageServer, ToolProfile,
    dirs::{DirectoryList, DirectorySource, describe, parse_roots},
};

/// Walrus MCP Image Server: returns images from local directories as viewable content.
#[derive(Parser)]
#[command(name = "wmcp-images", version, about)]
struct Cli {
    /// Single media directory to serve. The server refuses to start if it is
    /// missing.
    #[arg(long, env = "VAULT_MEDIA_PATH", conflicts_with = "roots")]
    media_dir: Option<PathBuf>,

    /// Image directories, searched in order. Each value may be a path, a
    /// comma-separated list, or a JSON array of paths. Without this flag the
    /// client's roots are used.
    #[arg(long, num_args = 1.., value_name = "DIRS")]
    roots: Vec<String>,

    /// Tools to expose.
    #[arg(long, value_enum, default_value_t = ToolProfile::Full)]
    tools: ToolProfile,
}

impl Cli {
    fn source(&self) -> DirectorySource {
        if let Some(dir) = &self.media_dir {
            return DirectorySource::Fixed(dir.clone());
        }
        let dirs = parse_roots(&self.roots);
        if dirs.is_empty() {
            DirectorySource::ClientRoots
        } else {
            DirectorySource::Flag(dirs)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let source = cli.source();
    let dirs = DirectoryList::from_source(source).context("invalid image directory configuration")?;

    let configured = dirs.snapshot().await;
    if dirs.follows_roots() {
        tracing::info!("no directories given, waiting for client roots");
    } else {
        tracing::info!(
            "configured directories ({}):\n{}",
            configured.len(),
            describe(&configured)
        );
    }

    let server = ImageServer::new(dirs, cli.tools);
    let transport = rmcp::transport::stdio();
    server
        .serve(transport)
        .await
        .context("failed to start server")?
        .waiting()
        .await
        .context("server error")?;
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
