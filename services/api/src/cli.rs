use crate::demo::{run_demo, run_derive, run_score, DemoArgs, DeriveArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use credit_assess::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Credit Assessment Engine",
    about = "Derive credit metrics and score applications from the command line",
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
    /// Evaluate every calculator against an input document (JSON or Field,Value CSV)
    Derive(DeriveArgs),
    /// Score scorecard selections from a JSON document
    Score(ScoreArgs),
    /// Walk through a sample application end to end
    Demo(DemoArgs),
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
        Command::Derive(args) => run_derive(args),
        Command::Score(args) => run_score(args),
        Command::Demo(args) => run_demo(args),
    }
}
