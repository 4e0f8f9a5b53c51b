use crate::demo::{run_demo, run_ranking, DemoArgs, RankingArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use portal_selecao::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Portal Seleção",
    about = "Run the selection process evaluation service or its command line demos",
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
    /// Walk through a seeded selection process from intake to ranking
    Demo(DemoArgs),
    /// Print or save the ranking export of the seeded selection process
    Ranking(RankingArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Preload the demo selection process and candidates
    #[arg(long)]
    pub(crate) seed_demo: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
        Command::Ranking(args) => run_ranking(args),
    }
}
