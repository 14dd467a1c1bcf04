mod commands;
mod utils;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use seekdb::{ConfigurationError, ErrorCodes, SeekdbClientError, SeekdbError};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::commands::collection::{
    create_collection, delete_collection, describe_collection, list_collections,
    CollectionNameArgs, CreateCollectionArgs,
};
use crate::commands::execute::{execute, ExecuteArgs};
use crate::utils::ConnectionArgs;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Client(#[from] SeekdbClientError),
    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

impl SeekdbError for CliError {
    fn code(&self) -> ErrorCodes {
        match self {
            CliError::Configuration(err) => err.code(),
            CliError::Client(err) => err.code(),
            CliError::Io(err) => err.code(),
            CliError::Json(_) => ErrorCodes::Internal,
        }
    }

    fn should_trace_error(&self) -> bool {
        match self {
            CliError::Configuration(err) => err.should_trace_error(),
            CliError::Client(err) => err.should_trace_error(),
            CliError::Io(_) | CliError::Json(_) => true,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Run a SQL statement and print rows as JSON lines")]
    Execute(ExecuteArgs),
    #[command(about = "Create a collection table")]
    CreateCollection(CreateCollectionArgs),
    #[command(about = "List collections in the database")]
    ListCollections,
    #[command(about = "Drop a collection table")]
    DeleteCollection(CollectionNameArgs),
    #[command(about = "Print the columns of a collection table")]
    DescribeCollection(CollectionNameArgs),
}

#[derive(Parser, Debug)]
#[command(name = "seekdb")]
#[command(version = "0.1.0")]
#[command(about = "A CLI for SeekDB and OceanBase", long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(subcommand)]
    command: Command,
}

async fn run<W: Write>(out: &mut W, cli: Cli) -> Result<(), CliError> {
    let mut client = cli.connection.client()?;
    let result = match cli.command {
        Command::Execute(args) => execute(out, &mut client, args).await,
        Command::CreateCollection(args) => create_collection(out, &mut client, args).await,
        Command::ListCollections => list_collections(out, &mut client).await,
        Command::DeleteCollection(args) => delete_collection(out, &mut client, args).await,
        Command::DescribeCollection(args) => describe_collection(out, &mut client, args).await,
    };
    if let Err(err) = client.close().await {
        tracing::warn!("Failed to close connection: {}", err);
    }
    result
}

pub fn seekdb_cli(args: Vec<String>) -> ExitCode {
    let cli = Cli::parse_from(args);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: failed to start runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match runtime.block_on(run(&mut out, cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if err.should_trace_error() {
                tracing::error!(code = %err.code(), "{}", err);
            }
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
