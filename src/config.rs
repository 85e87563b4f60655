// Command line and environment configuration

use crate::fetch::{ApiClient, TimeWindow};
use crate::fields::parse_timestamp;
use crate::logging::LogLevel;
use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://b2b.itresume.ru/api/statistics";

#[derive(Debug, Parser)]
#[command(name = "training-etl", version, about = "Load learning-activity statistics into the training store")]
pub struct Cli {
    /// Project directory holding the store, reports and logs
    #[arg(long, env = "ETL_PROJECT_DIR", default_value = "./training_db", global = true)]
    pub project_dir: PathBuf,

    /// SQLite store path (default: <project-dir>/training.db)
    #[arg(long, env = "ETL_DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    #[arg(long, env = "ETL_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Daily log files to keep
    #[arg(long, env = "ETL_KEEP_LOGS", default_value_t = 3, global = true)]
    pub keep_logs: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch, validate, stage and load one window of attempts
    Run(RunArgs),

    /// Load an existing staging CSV into the store
    Load {
        /// Staging CSV written by an earlier run
        csv: PathBuf,
    },
}

#[derive(Debug, clap::Args)]
pub struct RunArgs {
    #[arg(long, env = "ETL_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    #[arg(long, env = "ETL_CLIENT", default_value = "Skillfactory")]
    pub client: String,

    #[arg(long, env = "ETL_CLIENT_KEY", hide_env_values = true)]
    pub client_key: String,

    /// Window start, YYYY-MM-DD HH:MM:SS.ffffff
    #[arg(long, env = "ETL_START", value_parser = timestamp_arg)]
    pub start: NaiveDateTime,

    /// Window end, YYYY-MM-DD HH:MM:SS.ffffff
    #[arg(long, env = "ETL_END", value_parser = timestamp_arg)]
    pub end: NaiveDateTime,
}

impl RunArgs {
    pub fn window(&self) -> Result<TimeWindow> {
        if self.start > self.end {
            bail!("--start must not be after --end");
        }
        Ok(TimeWindow {
            start: self.start,
            end: self.end,
        })
    }

    pub fn credentials(&self) -> ApiClient {
        ApiClient {
            client: self.client.clone(),
            client_key: self.client_key.clone(),
        }
    }
}

fn timestamp_arg(s: &str) -> std::result::Result<NaiveDateTime, String> {
    parse_timestamp(s).ok_or_else(|| format!("expected YYYY-MM-DD HH:MM:SS.ffffff, got {}", s))
}

/// Resolved on-disk layout of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub logs: PathBuf,
    pub db: PathBuf,
}

impl ProjectPaths {
    pub fn resolve(project_dir: &Path, db_path: Option<&Path>) -> Self {
        ProjectPaths {
            root: project_dir.to_path_buf(),
            logs: project_dir.join("logs"),
            db: db_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| project_dir.join("training.db")),
        }
    }

    /// Create the project and logs directories if missing.
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.logs)
            .with_context(|| format!("Failed to create {}", self.logs.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from([
            "training-etl",
            "run",
            "--client-key",
            "secret",
            "--start",
            "2023-04-01 12:46:47.860798",
            "--end",
            "2023-04-04 12:46:47.860798",
        ])
        .unwrap();

        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.api_url, DEFAULT_API_URL);
                assert_eq!(args.client, "Skillfactory");
                assert!(args.window().is_ok());
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.keep_logs, 3);
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let result = Cli::try_parse_from([
            "training-etl",
            "run",
            "--client-key",
            "secret",
            "--start",
            "yesterday",
            "--end",
            "2023-04-04 12:46:47.860798",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_inverted_window_rejected() {
        let args = RunArgs {
            api_url: DEFAULT_API_URL.to_string(),
            client: "c".to_string(),
            client_key: "k".to_string(),
            start: parse_timestamp("2023-04-04 00:00:00.0").unwrap(),
            end: parse_timestamp("2023-04-01 00:00:00.0").unwrap(),
        };
        assert!(args.window().is_err());
    }

    #[test]
    fn test_project_paths() {
        let paths = ProjectPaths::resolve(Path::new("/tmp/etl"), None);
        assert_eq!(paths.logs, PathBuf::from("/tmp/etl/logs"));
        assert_eq!(paths.db, PathBuf::from("/tmp/etl/training.db"));

        let custom = ProjectPaths::resolve(Path::new("/tmp/etl"), Some(Path::new("/data/t.db")));
        assert_eq!(custom.db, PathBuf::from("/data/t.db"));
    }
}
