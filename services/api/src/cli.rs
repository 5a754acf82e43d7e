use crate::demo::{run_commission_quote, run_demo, CommissionArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hirewire::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "HireWire Marketplace",
    about = "Run or demonstrate the HireWire matching and notification service",
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
    /// Run an end-to-end demo: job posting, agency matching, submissions and chat
    Demo(DemoArgs),
    /// Price a placement fee without starting the service
    Commission(CommissionArgs),
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
        Command::Demo(args) => run_demo(args),
        Command::Commission(args) => run_commission_quote(args),
    }
}
