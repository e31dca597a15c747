//! SqlDocs - database schema documentation builder
//!
//! Usage:
//!
//! ```text
//! sqldocs build-json        -d postgres -c "host=localhost dbname=shop user=app"
//! sqldocs build-json-mkdocs -d sqlite -c shop.sqlite -o site -l de
//! sqldocs build-mkdocs      -d postgres -s sqldocs.json -o site
//! ```
//!
//! Every option can also be given through the `SQLDOCS_*` environment
//! variable listed in `--help`.

mod logging;
mod pipeline;
mod progress;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use sqldocs_core::DatabaseEngine;
use tokio_util::sync::CancellationToken;

use logging::LoggingConfig;
use pipeline::{Pipeline, PipelineCommand, PipelineConfig};
use progress::Progress;

/// Exit status of a run interrupted with Ctrl-C
const EXIT_CANCELLED: u8 = 130;

#[derive(Parser)]
#[command(name = "sqldocs")]
#[command(author, version, about = "Document database schemas as JSON and MkDocs sites")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Also write JSON log files to this directory
    #[arg(long, global = true, env = "SQLDOCS_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Introspect a database and create or update the schema file
    BuildJson {
        #[command(flatten)]
        database: DatabaseArgs,

        #[command(flatten)]
        schema: SchemaFileArgs,
    },

    /// Introspect a database, update the schema file and generate the MkDocs project
    BuildJsonMkdocs {
        #[command(flatten)]
        database: DatabaseArgs,

        #[command(flatten)]
        schema: SchemaFileArgs,

        #[command(flatten)]
        site: SiteArgs,
    },

    /// Generate the MkDocs project from an existing schema file
    BuildMkdocs {
        /// Database engine the schema file was generated from
        #[arg(short = 'd', long = "dbengine", env = "SQLDOCS_DBENGINE")]
        engine: DatabaseEngine,

        #[command(flatten)]
        schema: SchemaFileArgs,

        #[command(flatten)]
        site: SiteArgs,
    },
}

#[derive(Args)]
struct DatabaseArgs {
    /// Database engine (postgres, sqlite)
    #[arg(short = 'd', long = "dbengine", env = "SQLDOCS_DBENGINE")]
    engine: DatabaseEngine,

    /// Connection string: URL, `key=value` pairs, or a database file path
    #[arg(short = 'c', long = "dbconnection", env = "SQLDOCS_DBCONNECTION")]
    connection: String,
}

#[derive(Args)]
struct SchemaFileArgs {
    /// Schema file (JSON) to create or update
    #[arg(
        short = 's',
        long = "dbschemafile",
        env = "SQLDOCS_DBSCHEMAFILE",
        default_value = "sqldocs.json"
    )]
    schema_file: PathBuf,
}

#[derive(Args)]
struct SiteArgs {
    /// Folder of the MkDocs project
    #[arg(
        short = 'o',
        long = "outputfolder",
        env = "SQLDOCS_OUTPUTFOLDER",
        default_value = "docs-site"
    )]
    output_folder: PathBuf,

    /// Language of the generated text (en, de)
    #[arg(short = 'l', long, env = "SQLDOCS_LANGUAGE", default_value = "en")]
    language: String,
}

impl Commands {
    fn into_pipeline(self) -> (PipelineCommand, PipelineConfig) {
        match self {
            Commands::BuildJson { database, schema } => (
                PipelineCommand::BuildJson,
                PipelineConfig {
                    engine: database.engine,
                    connection: Some(database.connection),
                    schema_file: schema.schema_file,
                    output_folder: PathBuf::new(),
                    language: String::new(),
                },
            ),
            Commands::BuildJsonMkdocs {
                database,
                schema,
                site,
            } => (
                PipelineCommand::BuildJsonMkDocs,
                PipelineConfig {
                    engine: database.engine,
                    connection: Some(database.connection),
                    schema_file: schema.schema_file,
                    output_folder: site.output_folder,
                    language: site.language,
                },
            ),
            Commands::BuildMkdocs {
                engine,
                schema,
                site,
            } => (
                PipelineCommand::BuildMkDocs,
                PipelineConfig {
                    engine,
                    connection: None,
                    schema_file: schema.schema_file,
                    output_folder: site.output_folder,
                    language: site.language,
                },
            ),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(LoggingConfig::from_flags(cli.verbose, cli.log_dir)) {
        eprintln!("Failed to initialize logging: {:#}", e);
    }

    let (command, config) = cli.command.into_pipeline();
    tracing::debug!(?command, schema_file = %config.schema_file.display(), "starting");

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, cancelling");
                cancel.cancel();
            }
        }
    });

    let started = Instant::now();
    let mut progress = Progress::stdout();
    let result = Pipeline::new(&config, &mut progress, &cancel)
        .run(command)
        .await;

    let exit_code = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_cancelled() => {
            progress.cancelled();
            ExitCode::from(EXIT_CANCELLED)
        }
        Err(e) => {
            let error = anyhow::Error::new(e);
            tracing::error!(error = %error, "build failed");
            progress.failed(&error);
            ExitCode::FAILURE
        }
    };

    progress.elapsed(started.elapsed());
    exit_code
}
