use crate::demo::{run_demo, run_stats, DemoArgs, StatsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use teachteam::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "TeachTeam",
    about = "Search, rank, and summarise tutor applications",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk through search, ranking, and statistics against an in-memory store
    Demo(DemoArgs),
    /// Print selection statistics for an application export as JSON
    Stats(StatsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// CSV export used to seed the in-memory application store
    #[arg(long)]
    pub(crate) seed_csv: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
        Command::Stats(args) => run_stats(args),
    }
}
