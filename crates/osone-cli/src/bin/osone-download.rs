use anyhow::Context;
use clap::Parser;
use indicatif::MultiProgress;

use osone_cli::commands::download::{self, DownloadArgs};
use osone_cli::config::load_config;
use osone_cli::{init_tracing, GlobalArgs};
use osone_hub::HubSnapshot;

/// Download Hugging Face models for OS One
#[derive(Debug, Parser)]
#[command(name = "osone-download", version, about, long_about = None, after_help = download::after_help())]
struct Cli {
    #[command(flatten)]
    args: DownloadArgs,

    #[command(flatten)]
    global: GlobalArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.global.log_format);

    let cfg = load_config(cli.global.config.as_ref()).context("Failed to load configuration")?;

    let source = HubSnapshot::new()?.with_progress(MultiProgress::new());
    download::run(&cli.args, &cfg, &source).await?;

    Ok(())
}
