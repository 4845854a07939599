//! KTX CLI - renders station ridership views to JSON for the chart layer.
//!
//! Settings come from the TOML file named by `KTX_CONFIG` (default
//! `ktx.toml`); log level from `RUST_LOG`.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "ktx-cli",
    version,
    about = "KTX station ridership views",
    long_about = "Loads the configured ridership file, applies the station and date \
                  selection, and writes one JSON view per dashboard section.\n\n\
                  Configuration is read from $KTX_CONFIG (default ktx.toml)."
)]
struct Cli {}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    Cli::parse();

    let config = ktx_cmd::Config::from_env()?;
    log::info!(
        "[KTX] Starting: data {} -> {}",
        config.data_path.display(),
        config.output_dir.display()
    );
    ktx_cmd::run(config)
}
