use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info};
use uuid::Uuid;

use training_etl::{
    open_store, Cli, Command, DedupLoader, EtlRun, FileReportWriter, HttpFetcher, LogConfig,
    ProjectPaths, RecordValidator, RunArgs, STAGING_FILE_NAME,
};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let paths = ProjectPaths::resolve(&cli.project_dir, cli.db_path.as_deref());
    paths.ensure()?;

    let _guard = training_etl::init_logging(&LogConfig {
        level: cli.log_level,
        log_dir: paths.logs.clone(),
        keep_files: cli.keep_logs,
        ..LogConfig::default()
    })?;

    match cli.command {
        Command::Run(args) => run(&args, &paths),
        Command::Load { csv } => {
            let mut conn = open_store(&paths.db)?;
            let outcome = DedupLoader::new()
                .load_staging(&mut conn, &csv)
                .with_context(|| format!("Loading {} failed", csv.display()))?;
            info!(
                inserted = outcome.inserted,
                skipped_duplicates = outcome.skipped_duplicates,
                total_rows = outcome.total_rows,
                "Staging file loaded"
            );
            Ok(())
        }
    }
}

fn run(args: &RunArgs, paths: &ProjectPaths) -> Result<()> {
    let window = args.window()?;
    let run_id = Uuid::new_v4().to_string();
    info!(%run_id, start = %window.start, end = %window.end, "Starting ETL run");

    let fetcher = HttpFetcher::new(&args.api_url, args.credentials())
        .context("Failed to build HTTP client")?;

    let mut etl = EtlRun {
        run_id: run_id.clone(),
        fetcher: Box::new(fetcher),
        validator: RecordValidator::new(),
        loader: DedupLoader::new(),
        report: Box::new(FileReportWriter::in_dir(&paths.root, run_id)),
        staging_path: paths.root.join(STAGING_FILE_NAME),
        db_path: paths.db.clone(),
    };

    let summary = etl.run(&window)?;
    if let Some(e) = &summary.load_error {
        error!(error = %e, "Run finished with a failed load");
        bail!("Load failed: {}", e);
    }

    info!("Run finished");
    Ok(())
}
