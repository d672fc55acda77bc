//! Iris CLI - perceptual palette extraction from the terminal.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;
mod utils;

use exit_codes::{ExitCode, SUCCESS, USAGE_ERROR};
use utils::OutputFormat;

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   Success
  1   General error
  64  Usage error (invalid arguments or hex colour)
  65  Data error (file is not a decodable image)
  66  Input error (file cannot be read)
  74  I/O error (output cannot be written)";

#[derive(Parser)]
#[command(name = "iris")]
#[command(author, version, about = "Perceptual palette extraction in Oklab", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Print only the essential result
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the dominant colours of an image, most dominant first
    Extract {
        /// Path to the image file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of colours (clamped to 1..=12)
        #[arg(short = 'n', long = "colors", default_value_t = iris_core::DEFAULT_COLORS as i64, allow_negative_numbers = true)]
        n_colors: i64,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show a hex colour as RGB, Oklab and OKLCH
    Convert {
        /// Colour as #rgb or #rrggbb (leading '#' optional)
        #[arg(value_name = "HEX")]
        hex: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Convert an Oklab coordinate to sRGB hex
    Oklab {
        /// Lightness
        #[arg(value_name = "L", allow_negative_numbers = true)]
        l: f64,

        /// Green-red axis
        #[arg(value_name = "A", allow_negative_numbers = true)]
        a: f64,

        /// Blue-yellow axis
        #[arg(value_name = "B", allow_negative_numbers = true)]
        b: f64,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let quiet = cli.quiet;
    match cli.command {
        Commands::Extract {
            file,
            n_colors,
            format,
        } => commands::extract::execute(file, n_colors, format, quiet),
        Commands::Convert { hex, format } => commands::convert::execute(&hex, format, quiet),
        Commands::Oklab { l, a, b } => commands::oklab::execute(l, a, b, quiet),
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { USAGE_ERROR } else { SUCCESS };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        let exit = ExitCode::from_anyhow(&err);
        if let Some(message) = exit.message {
            eprintln!("{} {}", "error:".red().bold(), message);
        }
        std::process::exit(exit.code);
    }
}
