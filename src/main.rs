use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "A lightweight SQLite helper", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Options file (defaults to ./sqrl.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log every statement and failure to stderr
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List tables
    Tables {
        /// Database file
        db: PathBuf,
    },

    /// List the columns of a table
    Columns {
        /// Database file
        db: PathBuf,

        /// Table name
        table: String,
    },

    /// Select rows from a table
    Select {
        /// Database file
        db: PathBuf,

        #[command(flatten)]
        args: commands::rows::SelectArgs,
    },

    /// Run an aggregate (count, sum, avg, min, max) over a column
    Aggregate {
        /// Database file
        db: PathBuf,

        /// Table name
        table: String,

        /// Aggregate function
        function: String,

        /// Column (defaults to * for count)
        column: Option<String>,

        /// Decimal places for avg
        #[arg(long, default_value = "2")]
        precision: u32,
    },

    /// Execute an SQL script
    Exec {
        /// Database file
        db: PathBuf,

        /// SQL text, or @file to read it from a file
        sql: String,
    },

    /// Dump the database as SQL
    Dump {
        /// Database file
        db: PathBuf,

        /// Output file (defaults to <name>.sql)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Export tables to CSV files
    ExportCsv {
        /// Database file
        db: PathBuf,

        /// Only export this table
        #[arg(long)]
        table: Option<String>,

        /// Output directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Field delimiter
        #[arg(long, default_value = ",")]
        delimiter: char,
    },

    /// Create a table from a CSV or JSON file
    Import {
        /// Database file
        db: PathBuf,

        /// CSV or JSON file
        file: PathBuf,

        /// Table name (defaults to the file name)
        #[arg(long)]
        table: Option<String>,

        /// Field delimiter for CSV files
        #[arg(long, default_value = ",")]
        delimiter: char,
    },
}

fn init_logging(debug: bool) {
    let default = if debug { "sqrl=debug" } else { "sqrl=warn" };
    let filter = EnvFilter::try_from_env("SQRL_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.debug);
    let global = &cli.global;

    match cli.command {
        Commands::Tables { db } => {
            commands::info::tables(&db, global)?;
        }
        Commands::Columns { db, table } => {
            commands::info::columns(&db, &table, global)?;
        }
        Commands::Select { db, args } => {
            commands::rows::select(&db, &args, global)?;
        }
        Commands::Aggregate {
            db,
            table,
            function,
            column,
            precision,
        } => {
            commands::rows::aggregate(&db, &table, &function, column.as_deref(), precision, global)?;
        }
        Commands::Exec { db, sql } => {
            commands::rows::exec(&db, &sql, global)?;
        }
        Commands::Dump { db, out } => {
            commands::export::dump(&db, out.as_deref(), global)?;
        }
        Commands::ExportCsv {
            db,
            table,
            dir,
            delimiter,
        } => {
            commands::export::csv(&db, table.as_deref(), &dir, delimiter, global)?;
        }
        Commands::Import {
            db,
            file,
            table,
            delimiter,
        } => {
            commands::import::execute(&db, &file, table.as_deref(), delimiter, global)?;
        }
    }

    Ok(())
}
