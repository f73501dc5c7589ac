use crate::{
    error::CliError,
    shutdown::{ExitCode, ShutdownCoordinator},
};
use clap::Parser;
use commands::Commands;
use engine_config::{env::EnvVars, logging::init_tracing, settings::Settings};
use engine_core::pipeline::EtlPipeline;
use model::core::date::{DateRange, TargetDate};
use planner::query::impressions::build_create_table_ddl;
use server::AppState;
use std::{future::Future, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod commands;
mod error;
mod output;
mod shutdown;
mod warehouse;

#[derive(Parser)]
#[command(
    name = "imp-etl",
    version,
    about = "Daily signage impressions ETL for BigQuery"
)]
struct Cli {
    #[arg(long, global = true, help = "Load variables from this .env file first")]
    env_file: Option<String>,

    #[arg(long, global = true, help = "Overrides LOG_LEVEL, e.g. debug or info,engine_core=trace")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(CliError::ShutdownRequested) => ExitCode::ShutdownRequested,
        Err(err) => {
            error!("{err}");
            eprintln!("Error: {err}");
            ExitCode::GeneralError
        }
    };

    std::process::exit(code.as_i32());
}

fn load_settings(cli: &Cli) -> Result<Settings, CliError> {
    let mut env = EnvVars::from_process();
    if let Some(path) = &cli.env_file {
        env.load_from_file(path)?;
    }

    let mut settings = Settings::from_env(&env)?;
    if let Some(level) = &cli.log_level {
        settings = settings.with_log_level(level.clone());
    }
    Ok(settings)
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let settings = load_settings(&cli)?;
    init_tracing(&settings.log)?;

    info!(
        "Starting impressions ETL ({}) for {}",
        settings.environment, settings.destination
    );

    if let Commands::Ddl = cli.command {
        println!("{}", build_create_table_ddl(&settings.destination));
        return Ok(ExitCode::Success);
    }

    let adapter = warehouse::connect(&settings.bigquery)?;
    let pipeline = EtlPipeline::new(
        Arc::new(adapter),
        settings.destination.clone(),
        settings.etl.clone(),
    );

    let coordinator = ShutdownCoordinator::new(CancellationToken::new());
    coordinator.register_handlers();

    match cli.command {
        Commands::Serve { port } => {
            let addr = match port {
                Some(port) => settings.with_port(port).listen_addr,
                None => settings.listen_addr,
            };
            let listener = server::bind(&addr.to_string()).await?;
            server::serve(listener, AppState::new(pipeline), coordinator.cancel_token()).await?;

            if coordinator.is_shutdown_requested() {
                info!("Server stopped after shutdown request");
            }
            Ok(ExitCode::Success)
        }
        Commands::Run { date, output } => {
            let date = match date {
                Some(raw) => TargetDate::parse_lenient(&raw)?,
                None => TargetDate::yesterday(),
            };
            let result = until_shutdown(&coordinator, pipeline.process(date)).await?;
            output::emit(&result, output).await?;
            Ok(exit_code(result.success))
        }
        Commands::Batch {
            start_date,
            end_date,
            output,
        } => {
            let start = TargetDate::parse_strict(&start_date)?;
            let end = match end_date {
                Some(raw) => TargetDate::parse_strict(&raw)?,
                None => start,
            };
            let range = DateRange::new(start, end)?;
            let result = until_shutdown(&coordinator, pipeline.run_batch(range)).await?;
            output::emit(&result, output).await?;
            Ok(exit_code(result.success))
        }
        Commands::Reprocess { date, output } => {
            let date = TargetDate::parse_strict(&date)?;
            let result = until_shutdown(&coordinator, pipeline.process(date)).await?;
            output::emit(&result, output).await?;
            Ok(exit_code(result.success))
        }
        Commands::Ddl => Ok(ExitCode::Success),
    }
}

/// Drives `work` unless a shutdown signal arrives first.
async fn until_shutdown<F: Future>(
    coordinator: &ShutdownCoordinator,
    work: F,
) -> Result<F::Output, CliError> {
    let token = coordinator.cancel_token();
    tokio::select! {
        output = work => Ok(output),
        _ = token.cancelled() => {
            info!("Run interrupted, staging tables expire on their own");
            Err(CliError::ShutdownRequested)
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::Success
    } else {
        ExitCode::GeneralError
    }
}
