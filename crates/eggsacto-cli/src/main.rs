use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod cue;
mod display;

#[derive(Parser)]
#[command(name = "eggsacto", version, about = "Eggsacto countdown timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the timer screen in this terminal
    Run(commands::run::RunArgs),
    /// Format seconds as m:ss
    Format {
        /// Seconds (fractions allowed)
        seconds: f64,
    },
    /// Ruler offset for a remaining time
    Offset {
        /// Remaining seconds
        seconds: f64,
        #[arg(long)]
        json: bool,
    },
    /// Duration a ruler drag to this offset would request
    Drag {
        /// Offset in pixels
        #[arg(allow_negative_numbers = true)]
        pixels: f64,
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Format { seconds } => commands::convert::format(seconds),
        Commands::Offset { seconds, json } => commands::convert::offset(seconds, json),
        Commands::Drag { pixels, json } => commands::convert::drag(pixels, json),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
