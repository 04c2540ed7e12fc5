use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use reap_cmdline::{CmdlineConfig, CommandLineBuilder};
use reap_core::{
    AppIdExtractor, LocalLogFetcher, TerminationConfig, TerminationOrchestrator, YarnLogScraper,
};
use reap_exec::{CancelConfig, CancelOutcome, JobCanceller, KillConfig, ProcessKiller, SystemLauncher};
use reap_model::{ApplicationId, TaskDescriptor};
use reap_observe::{LoggerConfig, LoggerFormat, LoggerLevel, init_logger};

/// Terminates task processes and the cluster applications they started.
#[derive(Parser)]
#[command(name = "reap-agentd")]
#[command(version)]
struct Cli {
    /// Log filter directive
    #[arg(long, global = true, env = "REAP_LOG", default_value = "info")]
    log: String,

    /// Log output format (text, json or journald)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the quoted single-string form of a command
    Cmdline {
        /// Resolve the executable strictly, recovering split paths
        #[arg(long)]
        strict: bool,

        #[arg(last = true, required = true)]
        tokens: Vec<String>,
    },

    /// Kill a task's process and cancel its latest cluster application
    Kill {
        /// Task descriptor (JSON)
        #[arg(long)]
        task: PathBuf,

        /// Pause before reading the task log, in milliseconds
        #[arg(long, default_value = "1000")]
        grace_ms: u64,

        /// Give up on the log fetch after this many seconds (0 waits forever)
        #[arg(long, default_value = "30")]
        fetch_timeout_secs: u64,

        /// Send kill without sudo
        #[arg(long)]
        no_sudo: bool,

        #[command(flatten)]
        cancel: CancelArgs,
    },

    /// Cancel the last of the given cluster applications
    Cancel {
        /// Directory that holds kill scripts
        #[arg(long)]
        work_dir: PathBuf,

        /// Run the kill script as this user
        #[arg(long)]
        tenant: Option<String>,

        #[arg(required = true)]
        ids: Vec<String>,

        #[command(flatten)]
        cancel: CancelArgs,
    },

    /// Print the cluster application ids found in a log file
    Scan {
        log_file: PathBuf,
    },
}

#[derive(Args)]
struct CancelArgs {
    /// Environment file sourced by kill scripts
    #[arg(long, env = "REAP_ENV_FILE")]
    env_file: Option<PathBuf>,

    /// Command the kill script runs with the application id appended
    #[arg(long, default_value = "yarn application -kill")]
    kill_command: String,
}

impl CancelArgs {
    fn into_config(self) -> Result<CancelConfig> {
        let mut cfg = CancelConfig::default().with_kill_command(self.kill_command);
        if let Some(env_file) = self.env_file {
            cfg = cfg.with_env_file(env_file);
        }
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = LoggerConfig {
        format: cli.log_format.parse::<LoggerFormat>()?,
        level: LoggerLevel::new(cli.log.as_str())?,
        ..Default::default()
    };
    init_logger(&cfg)?;

    match cli.command {
        Commands::Cmdline { strict, tokens } => {
            let config = if strict {
                CmdlineConfig::strict()
            } else {
                CmdlineConfig::default()
            };
            let line = CommandLineBuilder::new(config).build(tokens.as_slice())?;
            println!("{line}");
        }

        Commands::Kill {
            task: task_path,
            grace_ms,
            fetch_timeout_secs,
            no_sudo,
            cancel,
        } => {
            let raw = tokio::fs::read(&task_path)
                .await
                .with_context(|| format!("read task descriptor {}", task_path.display()))?;
            let task: TaskDescriptor = serde_json::from_slice(&raw)
                .with_context(|| format!("parse task descriptor {}", task_path.display()))?;

            let termination = TerminationConfig::default()
                .with_grace_period(Duration::from_millis(grace_ms))
                .with_fetch_timeout((fetch_timeout_secs > 0).then(|| Duration::from_secs(fetch_timeout_secs)));
            termination.validate().map_err(anyhow::Error::msg)?;

            let mut kill = KillConfig::default();
            if no_sudo {
                kill = kill.with_sudo(None);
            }

            let launcher = Arc::new(SystemLauncher::new());
            let shutdown = CancellationToken::new();
            let orchestrator = TerminationOrchestrator::new(
                ProcessKiller::new(launcher.clone()).with_config(kill),
                JobCanceller::new(launcher).with_config(cancel.into_config()?),
                Arc::new(LocalLogFetcher::new()),
            )
            .with_config(termination)
            .with_shutdown(shutdown.clone());

            let ctrl_c = shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupted; abandoning termination");
                    ctrl_c.cancel();
                }
            });

            let report = orchestrator.kill(&task).await;
            info!(task = %task.id, local = ?report.local, "termination finished");
            if let Some(Err(e)) = report.cluster {
                return Err(e.into());
            }
        }

        Commands::Cancel {
            work_dir,
            tenant,
            ids,
            cancel,
        } => {
            let ids = ids
                .iter()
                .map(|id| id.parse::<ApplicationId>())
                .collect::<Result<Vec<_>, _>>()?;

            let canceller = JobCanceller::new(Arc::new(SystemLauncher::new())).with_config(cancel.into_config()?);
            match canceller.cancel(&ids, tenant.as_deref(), &work_dir).await {
                CancelOutcome::Launched { app_id, script, .. } => {
                    println!("{app_id} {}", script.display());
                }
                CancelOutcome::NothingToCancel => {}
                CancelOutcome::Failed { app_id, error } => {
                    bail!("cancel {app_id}: {error}");
                }
            }
        }

        Commands::Scan { log_file } => {
            let raw = tokio::fs::read(&log_file)
                .await
                .with_context(|| format!("read log {}", log_file.display()))?;
            for id in YarnLogScraper.extract(&String::from_utf8_lossy(&raw)) {
                println!("{id}");
            }
        }
    }

    Ok(())
}
