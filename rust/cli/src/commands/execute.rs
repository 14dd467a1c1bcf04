use std::io::Write;

use clap::Args;
use seekdb::SeekdbClient;

use crate::CliError;

#[derive(Args, Debug)]
pub struct ExecuteArgs {
    #[arg(help = "SQL statement to run")]
    pub query: String,
}

/// Runs one statement and writes each returned row as a JSON line.
pub async fn execute<W: Write>(
    out: &mut W,
    client: &mut SeekdbClient,
    args: ExecuteArgs,
) -> Result<(), CliError> {
    let rows = client.execute(&args.query).await?;
    for row in &rows {
        serde_json::to_writer(&mut *out, row)?;
        writeln!(out)?;
    }
    tracing::debug!("Statement returned {} rows", rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use seekdb::ClientOptions;

    #[tokio::test]
    async fn test_rows_are_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = seekdb::client(ClientOptions::embedded(dir.path())).unwrap();
        let mut out = Vec::new();
        execute(
            &mut out,
            &mut client,
            ExecuteArgs {
                query: "SELECT 1, 'a' UNION ALL SELECT 2, NULL".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[1,\"a\"]\n[2,null]\n");
    }

    #[tokio::test]
    async fn test_statement_without_rows_prints_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = seekdb::client(ClientOptions::embedded(dir.path())).unwrap();
        let mut out = Vec::new();
        execute(
            &mut out,
            &mut client,
            ExecuteArgs {
                query: "CREATE TABLE t (x INTEGER)".to_string(),
            },
        )
        .await
        .unwrap();
        assert!(out.is_empty());
    }
}
