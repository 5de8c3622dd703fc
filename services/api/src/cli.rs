use crate::demo::{run_export, run_score, ExportArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use okr_tracker::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "OKR Score Tracker",
    about = "Serve and inspect OKR department scores from the command line",
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
    /// Write the department score report as CSV
    Export(ExportArgs),
    /// Score a single actual value against a threshold set
    Score(ScoreArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Export(args) => run_export(args),
        Command::Score(args) => run_score(args),
    }
}
