mod render;
mod repl;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use imagecap_engine::traits::Clipboard;
use imagecap_engine::view::CaptionView;
use imagecap_platform::clipboard::SystemClipboard;
use imagecap_platform::picker::read_file_input;
use imagecap_platform::preview::TempFilePreviews;
use imagecap_platform::test::StdoutClipboard;
use imagecap_runtime::config_store::ConfigStore;
use imagecap_runtime::defaults::{ENDPOINT_ENV, default_config_path};
use imagecap_runtime::runtime_view::build_view_from_config;

use crate::render::render;

/// Caption images with a remote captioning endpoint.
///
/// With IMAGE, runs one select -> caption cycle and prints the result.
/// Without it, starts an interactive session.
#[derive(Debug, Parser)]
#[command(name = "imagecap", version)]
struct Cli {
    /// Image to caption
    image: Option<PathBuf>,

    /// Config file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the captioning backend, e.g. http://127.0.0.1:8000
    #[arg(long, env = ENDPOINT_ENV)]
    endpoint: Option<String>,

    /// Copy the caption to the clipboard (one-shot mode)
    #[arg(long)]
    copy: bool,

    /// Print the final state as JSON (one-shot mode)
    #[arg(long)]
    json: bool,

    /// Print copied text to stdout instead of using the system clipboard
    #[arg(long)]
    no_system_clipboard: bool,

    /// Save the effective configuration (including --endpoint) and continue
    #[arg(long)]
    write_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let store = ConfigStore::at_path(cli.config.clone().unwrap_or_else(default_config_path));
    let mut cfg = store.load_or_default()?;
    if let Some(endpoint) = cli.endpoint.as_ref().filter(|e| !e.trim().is_empty()) {
        cfg.endpoint.base_url = endpoint.trim().to_string();
    }
    if cli.write_config {
        store.save(&cfg)?;
        eprintln!("wrote {}", store.path().display());
    }

    let clipboard: Arc<dyn Clipboard> = if cli.no_system_clipboard {
        Arc::new(StdoutClipboard)
    } else {
        Arc::new(SystemClipboard)
    };
    let previews = Arc::new(TempFilePreviews::new()?);
    let view = Arc::new(build_view_from_config(cfg, previews, clipboard));

    match cli.image.as_deref() {
        Some(path) => {
            let res = one_shot(&view, path, cli.copy, cli.json).await;
            view.teardown();
            res
        }
        None => repl::run(view).await,
    }
}

async fn one_shot(view: &CaptionView, path: &Path, copy: bool, json: bool) -> anyhow::Result<()> {
    let input = read_file_input(path)?;

    let outcome = async {
        view.select_file(Some(input))?;
        view.generate_caption().await?;
        if copy {
            view.copy_caption().await?;
        }
        Ok::<_, imagecap_core::error::ViewError>(())
    }
    .await;

    let snap = view.snapshot();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&snap).context("encode state JSON")?
        );
    } else {
        print!("{}", render(&snap));
    }

    outcome.with_context(|| format!("captioning {} failed", path.display()))
}
