use crate::{
    commands::{HintArgs, ParseArgs},
    conn::{ConnectionPinger, PostgresConnectionPinger},
    env::{ENV_DATABASE_URL, EnvManager},
    error::CliError,
    output::ColumnPreview,
    shutdown::{ExitCode, ShutdownCoordinator},
};
use clap::Parser;
use commands::Commands;
use connectors::{
    file::csv::{lines::LineSplitter, parser::LineParser},
    metadata::hints::{ColumnHints, split_list},
};
use engine_core::{config::IngestConfig, error::IngestError};
use engine_runtime::{factory::PgConnectionFactory, job::HandleOutcome, registry::JobRegistry};
use futures_util::StreamExt;
use model::core::cell::Cell;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod conn;
mod env;
mod error;
mod output;
mod shutdown;

#[derive(Parser)]
#[command(
    name = "cubeload",
    version = "0.1.0",
    about = "Load delimited cube exports into Postgres"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let coordinator = ShutdownCoordinator::new(CancellationToken::new());

    let code = match run(cli.command, &coordinator).await {
        Ok(()) => ExitCode::Success,
        Err(err) if coordinator.is_shutdown_requested() => {
            warn!(error = %err, "Stopped by shutdown request");
            ExitCode::ShutdownRequested
        }
        Err(err) => {
            error!(error = %err, "Command failed");
            ExitCode::GeneralError
        }
    };
    std::process::exit(code.as_i32());
}

async fn run(command: Commands, coordinator: &ShutdownCoordinator) -> Result<(), CliError> {
    match command {
        Commands::Import {
            conn_str,
            subscription,
            files,
            hints,
            parse,
            output,
        } => {
            let env = load_env(&parse)?;
            let config = ingest_config(&env, &parse)?;
            let conn_str = conn_str
                .or_else(|| env.get(ENV_DATABASE_URL).map(str::to_string))
                .ok_or(CliError::MissingArgument("--conn-str or CUBELOAD_DATABASE_URL"))?;

            let factory = Arc::new(PgConnectionFactory::new(&conn_str));
            let registry = JobRegistry::new(config, factory)?;
            coordinator.register_handlers(registry.clone());

            let summary = import(&registry, &subscription, &files, column_hints(&hints)).await?;
            output::emit(&summary, output.as_deref()).await?;
        }
        Commands::Inspect { file, hints, parse } => {
            let env = load_env(&parse)?;
            let config = ingest_config(&env, &parse)?;
            let previews = inspect(&config, &file, &column_hints(&hints)).await?;
            output::print_json(&previews)?;
        }
        Commands::TestConn { conn_str } => {
            PostgresConnectionPinger { conn_str }.ping().await?;
        }
    }

    Ok(())
}

/// Feeds each file as one request against a single job; the last request
/// commits.
async fn import(
    registry: &JobRegistry,
    subscription: &str,
    files: &[PathBuf],
    hints: ColumnHints,
) -> Result<engine_core::summary::ImportSummary, CliError> {
    let id = registry.create(subscription, hints).await?;
    let last = files.len().saturating_sub(1);

    for (i, path) in files.iter().enumerate() {
        let file = match tokio::fs::File::open(path).await {
            Ok(file) => file,
            Err(err) => {
                registry.shutdown().await;
                return Err(err.into());
            }
        };

        info!(job_id = %id, file = %path.display(), "Sending file");
        match registry.handle(&id, file, i < last).await? {
            HandleOutcome::Parked { stats, .. } => {
                debug!(job_id = %id, lines = stats.lines, "Request accepted");
            }
            HandleOutcome::Committed(summary) => return Ok(summary),
        }
    }

    Err(CliError::Unexpected(format!("import job {id} was not committed")))
}

/// Resolves the header of `path` and previews the first data row, if any,
/// through the resolved column types.
async fn inspect(
    config: &IngestConfig,
    path: &Path,
    hints: &ColumnHints,
) -> Result<Vec<ColumnPreview>, CliError> {
    let resolver = config.resolver()?;
    let parser = LineParser::new(config.parser_config());

    let file = tokio::fs::File::open(path).await?;
    let lines = LineSplitter::frame(file, config.max_line_length);
    tokio::pin!(lines);

    let Some(line) = lines.next().await else {
        return Err(CliError::Unexpected(format!(
            "{} has no header line",
            path.display()
        )));
    };
    let line = line.map_err(IngestError::from)?;
    let header: Vec<String> = parser
        .parse_line(&line)
        .map_err(IngestError::from)?
        .into_iter()
        .map(Cell::into_string)
        .collect();

    let columns = resolver.resolve(&header, hints)?;

    let sample = match lines.next().await {
        Some(line) => {
            let line = line.map_err(IngestError::from)?;
            parser.parse_line(&line).map_err(IngestError::from)?
        }
        None => Vec::new(),
    };

    columns
        .into_iter()
        .enumerate()
        .map(|(i, column)| {
            ColumnPreview::new(column, sample.get(i))
                .map_err(|err| CliError::from(IngestError::from(err)))
        })
        .collect()
}

fn load_env(parse: &ParseArgs) -> Result<EnvManager, CliError> {
    let mut env = EnvManager::new();
    if let Some(path) = &parse.env_file {
        env.load_from_file(path)?;
    }
    for (key, value) in env.settings() {
        debug!(%key, %value, "Setting");
    }
    Ok(env)
}

/// Environment settings with command-line parse options on top.
fn ingest_config(env: &EnvManager, parse: &ParseArgs) -> Result<IngestConfig, CliError> {
    let mut config = env.ingest_config()?;
    if let Some(delimiter) = &parse.delimiter {
        config = config.with_delimiters(parse_delimiters(delimiter)?);
    }
    if let Some(quote) = parse.quote {
        config = config.with_quote(quote);
    }
    Ok(config)
}

fn parse_delimiters(value: &str) -> Result<Vec<char>, CliError> {
    match value {
        "" => Err(CliError::Config("delimiter cannot be empty".into())),
        "tab" | "\\t" => Ok(vec!['\t']),
        other => Ok(other.chars().collect()),
    }
}

/// Explicit flags first, then whatever the query string carries.
fn column_hints(args: &HintArgs) -> ColumnHints {
    let explicit = ColumnHints {
        names: args.names.as_deref().map(split_list),
        types: args.types.as_deref().map(split_list),
        descriptions: args.descriptions.as_deref().map(split_list),
    };
    match &args.query {
        Some(query) => explicit.or(ColumnHints::from_query(query)),
        None => explicit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::data_type::DataType;
    use std::collections::HashMap;

    #[test]
    fn flags_win_over_query_hints() {
        let args = HintArgs {
            names: Some("Sex, Count".into()),
            query: Some("names=A,B&types=string,integer".into()),
            ..Default::default()
        };
        let hints = column_hints(&args);
        assert_eq!(hints.names, Some(vec!["Sex".to_string(), "Count".to_string()]));
        assert_eq!(
            hints.types,
            Some(vec!["string".to_string(), "integer".to_string()])
        );
        assert_eq!(hints.descriptions, None);
    }

    #[test]
    fn parse_flags_override_environment() {
        let env = EnvManager::with_vars(HashMap::from([(
            "CUBELOAD_DELIMITERS".to_string(),
            ";".to_string(),
        )]));
        let parse = ParseArgs {
            delimiter: Some("tab".into()),
            quote: Some('\''),
            env_file: None,
        };

        let config = ingest_config(&env, &parse).unwrap();
        assert_eq!(config.delimiters, vec!['\t']);
        assert_eq!(config.quote, '\'');

        let config = ingest_config(&env, &ParseArgs::default()).unwrap();
        assert_eq!(config.delimiters, vec![';']);
    }

    #[test]
    fn empty_delimiter_is_rejected() {
        assert!(parse_delimiters("").is_err());
        assert_eq!(parse_delimiters(",|").unwrap(), vec![',', '|']);
    }

    #[tokio::test]
    async fn inspect_previews_the_first_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.csv");
        std::fs::write(
            &path,
            "sex,age,admit_month,cnt\nF,42,2024-03-17,\nM,\"unterminated\n",
        )
        .unwrap();

        let previews = inspect(&IngestConfig::default(), &path, &ColumnHints::default())
            .await
            .unwrap();

        let columns: Vec<(&str, &str, DataType)> = previews
            .iter()
            .map(|p| (p.column.name.as_str(), p.column.label.as_str(), p.column.data_type))
            .collect();
        assert_eq!(
            columns,
            vec![
                ("sex", "Sex", DataType::String),
                ("age", "Age", DataType::Integer),
                ("admit_month", "Admission Month", DataType::Month),
                ("cnt", "Count", DataType::Integer),
            ]
        );
        assert_eq!(
            previews[0].column.description,
            "Administrative sex as recorded at registration"
        );

        let samples: Vec<Option<&str>> = previews.iter().map(|p| p.sample.as_deref()).collect();
        assert_eq!(samples, vec![Some("F"), Some("42"), Some("2024-03"), None]);
    }

    #[tokio::test]
    async fn inspect_without_rows_has_no_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.csv");
        std::fs::write(&path, "region,cnt\n").unwrap();

        let previews = inspect(&IngestConfig::default(), &path, &ColumnHints::default())
            .await
            .unwrap();
        assert_eq!(previews.len(), 2);
        assert!(previews.iter().all(|p| p.sample.is_none()));
        assert_eq!(previews[1].column.data_type, DataType::Integer);
    }
}
