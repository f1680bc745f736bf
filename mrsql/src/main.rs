use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use mrsql::{FileHeader, Job, Operator, Result, RowFormat, RunSummary, Stage};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "mrsql",
    version,
    about = "Run one map or reduce step of a restricted SQL query over stdin"
)]
struct Cli {
    /// Stage to run: map or reduce.
    #[arg(value_name = "STAGE")]
    stage: Stage,
    /// Relational operator: filter, projection, groupby or join.
    #[arg(long, short = 'o')]
    operator: Operator,
    /// Query text, e.g. "SELECT a FROM t WHERE b > 1".
    #[arg(long, short = 'q', env = "MRSQL_QUERY")]
    query: String,
    /// File whose first line names the input columns.
    #[arg(long = "header-file", value_name = "PATH", env = "MRSQL_HEADER_FILE")]
    header_file: Option<PathBuf>,
    /// Table the map input belongs to (join only).
    #[arg(long, value_name = "TAG")]
    table: Option<String>,
    /// Field delimiter of input rows.
    #[arg(long, default_value_t = ',')]
    delimiter: char,
}

fn main() {
    // Logs go to stderr; stdout carries the data stream.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("mrsql: {err}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let format = RowFormat::with_delimiter(cli.delimiter);
    let mut job = Job::from_query(cli.operator, &cli.query)?.with_format(format);
    if let Some(path) = cli.header_file {
        job = job.with_header_source(FileHeader::with_format(path, format));
    }
    if let Some(table) = cli.table {
        job = job.with_table(table);
    }

    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());
    match mrsql::run(cli.stage, &mut job, stdin, stdout)? {
        RunSummary::Map(stats) => tracing::info!(
            rows_read = stats.rows_read,
            rows_emitted = stats.rows_emitted,
            rows_rejected = stats.rows_rejected,
            "map finished"
        ),
        RunSummary::Reduce(stats) => tracing::info!(
            records_read = stats.records_read,
            records_skipped = stats.records_skipped,
            groups = stats.groups,
            "reduce finished"
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn parses_a_map_invocation() {
        let cli = Cli::try_parse_from([
            "mrsql",
            "map",
            "--operator",
            "filter",
            "--query",
            "SELECT * FROM t WHERE a = 1",
            "--delimiter",
            ";",
        ])
        .expect("valid arguments");
        assert_eq!(cli.stage, Stage::Map);
        assert_eq!(cli.operator, Operator::Filter);
        assert_eq!(cli.delimiter, ';');
        assert!(cli.header_file.is_none());
    }

    #[test]
    fn missing_query_is_a_usage_error() {
        if std::env::var_os("MRSQL_QUERY").is_some() {
            return;
        }
        let err = Cli::try_parse_from(["mrsql", "reduce", "-o", "groupby"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn unknown_stage_is_rejected() {
        let err = Cli::try_parse_from(["mrsql", "shuffle", "-o", "filter", "-q", "SELECT a FROM t"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(err.to_string().contains("unknown stage"));
        assert_ne!(err.exit_code(), 0);
    }
}
