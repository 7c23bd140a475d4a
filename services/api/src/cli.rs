use crate::report::{run_predict, run_remote_info, run_show, PredictArgs, RemoteInfoArgs, ShowArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use scoring_dashboard::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Credit Scoring Dashboard",
    about = "Serve or inspect the credit scoring dashboard from the command line",
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
    /// Render one dashboard frame for a client without scoring it
    Show(ShowArgs),
    /// Ask the scoring service for a decision and render the frame
    Predict(PredictArgs),
    /// Fetch a client's feature row from the scoring service
    RemoteInfo(RemoteInfoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) sources: SourceArgs,
}

/// Overrides shared by every command that reads the catalog or calls the scoring service.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct SourceArgs {
    /// Path to the client catalog CSV
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Base URL of the scoring service, e.g. http://127.0.0.1:5002
    #[arg(long)]
    pub(crate) gateway_url: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Show(args) => run_show(args),
        Command::Predict(args) => run_predict(args),
        Command::RemoteInfo(args) => run_remote_info(args),
    }
}
