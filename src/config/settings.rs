use anyhow::{Context, Result};
use clap::Parser;
use panecast_core::command::{DEFAULT_LOG_FILE, DEFAULT_TAIL_PROGRAM, DEFAULT_WORKER_PROGRAM};
use panecast_core::{CommandSet, DEFAULT_WORKER_COUNT, MAX_WORKERS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Open worker panes in a new tmux window and broadcast input to them"
)]
pub struct Config {
    /// Enable debug mode
    #[arg(short, long)]
    pub debug: bool,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Project directory the panes cd into (default: directory of the executable)
    #[arg(short, long)]
    pub base_dir: Option<PathBuf>,

    /// Number of worker panes
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Print the planned tmux operations instead of running them
    #[arg(long)]
    pub dry_run: bool,

    /// Print the resulting layout as JSON
    #[arg(long)]
    pub json: bool,
}

impl Config {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Application settings (from config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Project directory; falls back to the executable's directory
    #[serde(default)]
    pub base_dir: Option<PathBuf>,

    /// Number of worker panes
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Command run in every worker pane
    #[serde(default = "default_worker_command")]
    pub worker_command: String,

    /// Command used to follow the log file
    #[serde(default = "default_tail_command")]
    pub tail_command: String,

    /// Log file shown in the log pane, relative to the base directory
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_workers() -> usize {
    DEFAULT_WORKER_COUNT
}

fn default_worker_command() -> String {
    DEFAULT_WORKER_PROGRAM.to_string()
}

fn default_tail_command() -> String {
    DEFAULT_TAIL_PROGRAM.to_string()
}

fn default_log_file() -> String {
    DEFAULT_LOG_FILE.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_dir: None,
            workers: default_workers(),
            worker_command: default_worker_command(),
            tail_command: default_tail_command(),
            log_file: default_log_file(),
        }
    }
}

impl Settings {
    /// Load settings from config file or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(p) = path {
            if !p.exists() {
                anyhow::bail!("Config file not found: {:?}", p);
            }
            return Self::read_file(p);
        }

        // Try default config locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("panecast/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/panecast/config.toml")),
            dirs::home_dir().map(|p| p.join(".panecast.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::read_file(path);
            }
        }

        Ok(Self::default())
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Merge CLI config into settings (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: &Config) {
        if let Some(ref base_dir) = cli.base_dir {
            self.base_dir = Some(base_dir.clone());
        }
        if let Some(workers) = cli.workers {
            self.workers = workers;
        }
    }

    /// Reject settings a run cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            anyhow::bail!("workers must be at least 1");
        }
        if self.workers > MAX_WORKERS {
            anyhow::bail!("workers must be at most {}", MAX_WORKERS);
        }
        if self.worker_command.trim().is_empty() {
            anyhow::bail!("worker_command must not be empty");
        }
        if self.log_file.trim().is_empty() {
            anyhow::bail!("log_file must not be empty");
        }
        Ok(())
    }

    /// Absolute project directory the panes change into
    pub fn resolve_base_dir(&self) -> Result<PathBuf> {
        match self.base_dir {
            Some(ref dir) => dir
                .canonicalize()
                .with_context(|| format!("Failed to resolve base directory: {:?}", dir)),
            None => {
                let exe = std::env::current_exe()
                    .and_then(|p| p.canonicalize())
                    .context("Failed to resolve executable path")?;
                exe.parent()
                    .map(Path::to_path_buf)
                    .with_context(|| format!("Executable has no parent directory: {:?}", exe))
            }
        }
    }

    /// Worker and log commands templated with `base`
    pub fn commands(&self, base: &Path) -> CommandSet {
        CommandSet::new(
            base,
            &self.worker_command,
            &self.tail_command,
            &self.log_file,
        )
    }
}
