use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;

mod config;
mod create;
mod list;
mod output;
mod search;
mod show;
mod tui;

use config::Config;

#[derive(Parser)]
#[command(name = "faq")]
#[command(about = "Browse, search and submit frequently asked questions", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    /// Base URL of the FAQ service (overrides FAQ_API_URL and ~/.faq/config.toml)
    #[arg(long = "api-url", global = true, value_name = "URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search FAQs interactively (default)
    #[command(alias = "s")]
    Search(search::SearchArgs),

    /// List all FAQs
    #[command(alias = "ls")]
    List(list::ListArgs),

    /// Show a single FAQ with its neighbours
    Show(show::ShowArgs),

    /// Submit a new FAQ
    #[command(alias = "new")]
    Create(create::CreateArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug, RUST_LOG overrides
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    let config = Config::load(cli.api_url.as_deref())?;
    log::debug!("Using FAQ service at {}", config.api_url);

    match cli.command {
        Some(Commands::Search(args)) => search::execute(args, &config),
        Some(Commands::List(args)) => list::execute(args, &config),
        Some(Commands::Show(args)) => show::execute(args, &config),
        Some(Commands::Create(args)) => create::execute(args, &config),
        None => search::execute(search::SearchArgs::default(), &config),
    }
}
