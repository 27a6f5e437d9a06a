//! Cohort command-line interface

use clap::{Parser, Subcommand};
use rwd_cohort::cli::{catalog, explain, funnel, generate, output, search, seed, sql};
use rwd_cohort::store::DEFAULT_PATIENT_COUNT;
use std::path::PathBuf;

/// Cohort command-line tool
#[derive(Parser)]
#[command(name = "cohort")]
#[command(author, version, about = "RWD cohort funnel tools", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Database file (overrides DATABASE_PATH)
    #[arg(short, long, global = true)]
    db: Option<PathBuf>,

    /// Output format (json, pretty)
    #[arg(short = 'f', long, global = true)]
    format: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or refresh the demo claims database
    Seed {
        /// Synthetic population size
        #[arg(short, long, default_value_t = DEFAULT_PATIENT_COUNT)]
        patients: usize,
    },

    /// Print the schema catalog
    Catalog,

    /// Search the reference vocabularies for a clinical concept
    Search {
        /// Search term (e.g. "diabetes")
        term: String,

        /// Restrict to one code system (ICD10CM, CPT, NDC)
        #[arg(short, long)]
        system: Option<String>,
    },

    /// Execute a read-only SQL query
    Sql {
        /// The query to execute
        query: String,

        /// Execution mode (count, preview, full)
        #[arg(short, long, default_value = "preview")]
        mode: String,
    },

    /// Print the execution plan for a query
    Explain {
        /// The query to explain
        query: String,
    },

    /// Compute the what-if attrition funnel for a criteria document
    Funnel {
        /// Criteria document (JSON)
        #[arg(short, long)]
        criteria: PathBuf,

        /// Enabled inclusion criterion ids (default: all)
        #[arg(short, long = "include")]
        include: Vec<String>,

        /// Enabled exclusion criterion ids (default: all)
        #[arg(short = 'x', long = "exclude")]
        exclude: Vec<String>,
    },

    /// Extract cohort SQL from a canned generation response
    Generate {
        /// Criteria document (JSON)
        #[arg(short, long)]
        criteria: PathBuf,

        /// File holding the canned backend response
        #[arg(long)]
        canned: PathBuf,

        /// Execute the extracted SQL and print the attrition summary
        #[arg(short, long)]
        execute: bool,
    },
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    // Set up color output
    output::setup_colors(&cli.color);

    let format = output::OutputFormat::from_flag(cli.format.as_deref());

    let result = match cli.command {
        Commands::Seed { patients } => seed::run(seed::SeedConfig {
            db: cli.db,
            patients,
            verbose: cli.verbose,
        }),

        Commands::Catalog => catalog::run(catalog::CatalogConfig {
            db: cli.db,
            format,
            output_file: cli.output,
        }),

        Commands::Search { term, system } => search::run(search::SearchConfig {
            db: cli.db,
            term,
            system,
            format,
            output_file: cli.output,
            verbose: cli.verbose,
        }),

        Commands::Sql { query, mode } => sql::run(sql::SqlConfig {
            db: cli.db,
            query,
            mode,
            format,
            output_file: cli.output,
        }),

        Commands::Explain { query } => explain::run(explain::ExplainConfig {
            db: cli.db,
            query,
            format,
            output_file: cli.output,
        }),

        Commands::Funnel {
            criteria,
            include,
            exclude,
        } => funnel::run(funnel::FunnelConfig {
            db: cli.db,
            criteria,
            include,
            exclude,
            format,
            output_file: cli.output,
            verbose: cli.verbose,
        }),

        Commands::Generate {
            criteria,
            canned,
            execute,
        } => generate::run(generate::GenerateConfig {
            db: cli.db,
            criteria,
            canned,
            execute,
            format,
            output_file: cli.output,
            verbose: cli.verbose,
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
