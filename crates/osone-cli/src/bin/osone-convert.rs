use anyhow::Context;
use clap::Parser;

use osone_cli::commands::convert::{self, ConvertArgs};
use osone_cli::config::load_config;
use osone_cli::{init_tracing, GlobalArgs};
use osone_mlx::MlxLmConverter;

/// Convert Hugging Face models to MLX format
#[derive(Debug, Parser)]
#[command(name = "osone-convert", version, about, long_about = None, after_help = convert::AFTER_HELP)]
struct Cli {
    #[command(flatten)]
    args: ConvertArgs,

    #[command(flatten)]
    global: GlobalArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.global.log_format);

    let cfg = load_config(cli.global.config.as_ref()).context("Failed to load configuration")?;

    let converter = MlxLmConverter::new(&cfg.convert.python);
    convert::run(&cli.args, &cfg, &converter)?;

    Ok(())
}
