use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

use commands::{CommandError, ExitStatus};

#[derive(Parser)]
#[command(name = "ohc")]
#[command(about = "OnlineHashCrack uploader", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile local hash files against the account and submit what is missing
    Upload {
        /// Directory scanned for input files
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Reject config keys this command never reads
        #[arg(long, default_value_t = false)]
        strict_config: bool,

        /// Write <DIR>/<run_id>/report.json after the run
        #[arg(long)]
        report_dir: Option<PathBuf>,

        /// Extra input files, read after the discovered ones
        files: Vec<PathBuf>,
    },

    /// Query the account's task list and print the raw reply
    List {
        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Reject config keys this command never reads
        #[arg(long, default_value_t = false)]
        strict_config: bool,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn main() -> ExitCode {
    // Optional; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();
    init_tracing();

    let result: Result<ExitStatus, CommandError> = match cli.cmd {
        Commands::Upload {
            dir,
            config_paths,
            strict_config,
            report_dir,
            files,
        } => commands::upload::run_upload(commands::upload::UploadArgs {
            dir,
            config_paths,
            strict_config,
            report_dir,
            files,
        }),
        Commands::List {
            config_paths,
            strict_config,
        } => commands::list::run_list(&config_paths, strict_config),
        Commands::ConfigHash { paths } => commands::config_hash(&paths),
    };

    match result {
        Ok(status) => status.into(),
        Err(e) => {
            eprintln!("ERROR: {:#}", e.error);
            e.status.into()
        }
    }
}
