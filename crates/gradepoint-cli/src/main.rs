//! gradepoint CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "gradepoint", version, about = "Retake-aware GPA calculator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate term and cumulative GPA for a transcript
    Calc {
        /// Transcript file (.json or .toml)
        #[arg(long)]
        transcript: PathBuf,

        /// Last term to include (default: all terms)
        #[arg(long)]
        as_of: Option<u32>,

        /// Output format: text, markdown, json, html, all (comma-separated)
        #[arg(long)]
        format: Option<String>,

        /// Output directory for saved reports
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show how one term's figures were calculated
    Details {
        /// Transcript file (.json or .toml)
        #[arg(long)]
        transcript: PathBuf,

        /// Term index
        #[arg(long)]
        term: u32,

        /// Show the cumulative calculation as of the term
        #[arg(long)]
        cumulative: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List retaken courses and which attempt counts
    Groups {
        /// Transcript file (.json or .toml)
        #[arg(long)]
        transcript: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Import a registrar CSV export
    Import {
        /// CSV export to read
        #[arg(long)]
        csv: PathBuf,

        /// Transcript file to write (.json or .toml)
        #[arg(long)]
        out: PathBuf,

        /// Transcript name (default: CSV file name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Check transcript files for data problems
    Validate {
        /// Transcript file or directory
        #[arg(long)]
        transcript: PathBuf,
    },

    /// Manage course-name equivalences in a transcript
    Equiv {
        #[command(subcommand)]
        action: EquivAction,
    },

    /// Create starter config and example transcript
    Init,
}

#[derive(Subcommand)]
enum EquivAction {
    /// Declare two course names equivalent
    Add {
        #[arg(long)]
        transcript: PathBuf,
        course_a: String,
        course_b: String,
    },
    /// Remove an equivalence by id
    Remove {
        #[arg(long)]
        transcript: PathBuf,
        id: u64,
    },
    /// List declared equivalences
    List {
        #[arg(long)]
        transcript: PathBuf,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gradepoint=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Calc {
            transcript,
            as_of,
            format,
            output,
            config,
        } => commands::calc::execute(transcript, as_of, format, output, config),
        Commands::Details {
            transcript,
            term,
            cumulative,
            config,
        } => commands::details::execute(transcript, term, cumulative, config),
        Commands::Groups { transcript, config } => commands::groups::execute(transcript, config),
        Commands::Import { csv, out, name } => commands::import::execute(csv, out, name),
        Commands::Validate { transcript } => commands::validate::execute(transcript),
        Commands::Equiv { action } => match action {
            EquivAction::Add {
                transcript,
                course_a,
                course_b,
            } => commands::equiv::add(transcript, course_a, course_b),
            EquivAction::Remove { transcript, id } => commands::equiv::remove(transcript, id),
            EquivAction::List { transcript } => commands::equiv::list(transcript),
        },
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
