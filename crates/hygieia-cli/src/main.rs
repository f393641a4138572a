//! CLI for hygieia — score hygiene surveys and compare groups.

mod commands;
mod loader;
mod output;
mod report;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hygieia")]
#[command(about = "hygieia — score hygiene surveys and compare groups")]
#[command(version = hygieia_core::VERSION)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every respondent: knowledge, practice, and derived fields
    Score {
        /// Input CSV, one respondent per row
        input: String,

        /// Write scored records as CSV
        #[arg(long)]
        output: Option<String>,
    },

    /// Audit a survey CSV for missing, out-of-domain, and out-of-range cells
    Quality {
        /// Input CSV, one respondent per row
        input: String,

        /// Write the full quality report as JSON
        #[arg(long)]
        output: Option<String>,

        /// Maximum number of issues to print
        #[arg(long, default_value = "40")]
        limit: usize,
    },

    /// Full analysis: scores, group comparison tests, correlations
    Analyze {
        /// Input CSV, one respondent per row
        input: String,

        /// Demographic field to group by
        #[arg(long, default_value = "maternal_education")]
        group_by: String,

        /// Directory to write a timestamped run under
        #[arg(long)]
        output: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Score { input, output } => commands::score::run(&input, output.as_deref()),
        Commands::Quality {
            input,
            output,
            limit,
        } => commands::quality::run(&input, output.as_deref(), limit),
        Commands::Analyze {
            input,
            group_by,
            output,
        } => commands::analyze::run(&input, &group_by, output.as_deref()),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
