//! wxd CLI - weather forecasts and interpolated map overlays for registered locations.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "wxd-cli",
    version,
    about = "Weather dashboard toolkit: locations, forecasts and interpolation overlays"
)]
struct Cli {
    #[command(subcommand)]
    command: wxd_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("Starting wxd-cli");
    wxd_cmd::run(cli.command).await
}
