use crate::commands::{run_comps, run_underwrite, CompsArgs, UnderwriteArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use offer_estimator::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Quick Offer Estimator",
    about = "Serve quick offer estimates or run the comparable search offline",
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
    /// Run the comparable search and underwriting over a JSON fixture
    Comps(CompsArgs),
    /// Inspect the underwriting calculator
    Underwrite(UnderwriteArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// JSON array of buyer profiles to seed the in-memory buyer list
    #[arg(long)]
    pub(crate) buyers: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Comps(args) => run_comps(args),
        Command::Underwrite(args) => run_underwrite(args),
    }
}
