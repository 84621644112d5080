//! Shell command lines sent into the panes.

use std::path::Path;

use serde::Serialize;

/// Default program run in every worker pane
pub const DEFAULT_WORKER_PROGRAM: &str = "php artisan queue:work";

/// Default program used to follow the log file
pub const DEFAULT_TAIL_PROGRAM: &str = "tail -f";

/// Default log file, relative to the base directory
pub const DEFAULT_LOG_FILE: &str = "storage/logs/laravel.log";

/// The two command lines of a run, templated once with the base directory.
///
/// Both end in `\n` so the host executes them immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSet {
    worker: String,
    log: String,
}

impl CommandSet {
    /// Render the worker and log commands for `base`
    pub fn new(base: &Path, worker_program: &str, tail_program: &str, log_file: &str) -> Self {
        let base = base.display();
        Self {
            worker: format!("cd {}; {}\n", base, worker_program),
            log: format!("cd {}; {} {}\n", base, tail_program, log_file),
        }
    }

    /// Commands with the default worker program and log file
    pub fn with_defaults(base: &Path) -> Self {
        Self::new(
            base,
            DEFAULT_WORKER_PROGRAM,
            DEFAULT_TAIL_PROGRAM,
            DEFAULT_LOG_FILE,
        )
    }

    /// Line sent to every worker pane
    pub fn worker(&self) -> &str {
        &self.worker
    }

    /// Line sent to the log pane
    pub fn log(&self) -> &str {
        &self.log
    }
}
