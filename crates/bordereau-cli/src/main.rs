mod commands;
mod logging;
mod output;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "bordereau",
    version,
    about = "Import a price schedule (bordereau des prix) and export selected items"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a spreadsheet and list its items with reconciled amounts
    Inspect {
        /// Path to an xlsx, xlsm, xls or ods file
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Show the detected header row and how columns were resolved
    Columns {
        /// Path to an xlsx, xlsm, xls or ods file
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Export selected items as a calculation spreadsheet and/or a description document
    Export {
        /// Path to an xlsx, xlsm, xls or ods file
        input_file: PathBuf,

        /// Items to export by index, e.g. "0,2,5-7" (see `inspect`)
        #[arg(short, long, value_name = "INDICES", conflicts_with = "all")]
        select: Option<String>,

        /// Export every item
        #[arg(short, long)]
        all: bool,

        /// Write the calculation spreadsheet (default: both outputs)
        #[arg(long)]
        spreadsheet: bool,

        /// Write the description document (default: both outputs)
        #[arg(long)]
        document: bool,

        /// Docx template for the description document
        #[arg(short, long, value_name = "FILE")]
        template: Option<PathBuf>,

        /// Directory to write exports into
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Replace existing files
        #[arg(short, long)]
        force: bool,

        /// JSON export config
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Inspect { input_file, output } => commands::inspect::run(&input_file, &output),
        Commands::Columns { input_file, output } => commands::columns::run(&input_file, &output),
        Commands::Export {
            input_file,
            select,
            all,
            spreadsheet,
            document,
            template,
            out_dir,
            force,
            config,
        } => commands::export::run(commands::export::ExportArgs {
            input_file,
            select,
            all,
            spreadsheet,
            document,
            template,
            out_dir,
            force,
            config,
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
