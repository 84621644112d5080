//! One-shot pane layout: a new tab split into a log pane and worker panes,
//! commands started in each, workers linked into one broadcast group.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::command::CommandSet;
use crate::host::{BroadcastGroup, Host, Orientation, SessionId, TabId};

/// Number of worker panes when not configured otherwise
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Upper bound on worker panes in one tab
pub const MAX_WORKERS: usize = 32;

/// Error type for an orchestration run
#[derive(Debug, Error)]
pub enum OrchestrateError {
    /// The host has no focused window to work in
    #[error("No current window")]
    NoActiveWindow,

    /// A run needs at least one worker pane
    #[error("worker count must be at least 1")]
    NoWorkers,

    /// More worker panes requested than one tab can hold
    #[error("worker count {requested} exceeds the maximum of {max}")]
    TooManyWorkers { requested: usize, max: usize },

    /// A host operation failed; the run was aborted at that point
    #[error("{op} failed: {source}")]
    Host {
        op: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// Attach the failing operation's name to a host error
trait HostResultExt<T> {
    fn op(self, op: &'static str) -> Result<T, OrchestrateError>;
}

impl<T> HostResultExt<T> for anyhow::Result<T> {
    fn op(self, op: &'static str) -> Result<T, OrchestrateError> {
        self.map_err(|source| OrchestrateError::Host { op, source })
    }
}

/// Panes produced by a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    /// Tab hosting every pane
    pub tab: TabId,
    /// Pane following the log file; never broadcast to
    pub log: SessionId,
    /// Worker panes in creation order, the tab's initial pane first
    pub workers: Vec<SessionId>,
    /// Group installed as the host's broadcast configuration
    pub broadcast: BroadcastGroup,
}

/// Drives a [`Host`] through one layout run
pub struct PaneOrchestrator<H> {
    host: H,
    commands: CommandSet,
    workers: usize,
}

impl<H: Host> PaneOrchestrator<H> {
    /// Orchestrator with the default number of worker panes
    pub fn new(host: H, commands: CommandSet) -> Self {
        Self {
            host,
            commands,
            workers: DEFAULT_WORKER_COUNT,
        }
    }

    /// Override the number of worker panes
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Access the underlying host
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Run the layout once.
    ///
    /// Calls are issued strictly in order and the first failure aborts the
    /// run; nothing already created is cleaned up.
    pub fn run(&self) -> Result<Layout, OrchestrateError> {
        if self.workers == 0 {
            return Err(OrchestrateError::NoWorkers);
        }
        if self.workers > MAX_WORKERS {
            return Err(OrchestrateError::TooManyWorkers {
                requested: self.workers,
                max: MAX_WORKERS,
            });
        }

        let window = self
            .host
            .lookup_window()
            .op("lookup window")?
            .ok_or(OrchestrateError::NoActiveWindow)?;
        debug!(window = %window, "Found current window");

        let (tab, first) = self.host.create_tab(&window).op("create tab")?;
        debug!(tab = %tab, pane = %first, "Created tab");

        // Log pane comes off the first split; workers keep splitting the
        // initial pane.
        let log = self
            .host
            .split_pane(&first, Orientation::Vertical)
            .op("split log pane")?;
        debug!(pane = %log, "Created log pane");

        let mut workers = Vec::new();
        workers.push(first.clone());
        for _ in 1..self.workers {
            let pane = self
                .host
                .split_pane(&first, Orientation::Horizontal)
                .op("split worker pane")?;
            debug!(pane = %pane, "Created worker pane");
            workers.push(pane);
        }

        let mut broadcast = BroadcastGroup::new();
        for worker in &workers {
            broadcast.add_session(worker.clone());
            self.host
                .send_text(worker, self.commands.worker())
                .op("send worker command")?;
        }

        self.host
            .send_text(&log, self.commands.log())
            .op("send log command")?;

        self.host
            .install_broadcast(&broadcast)
            .op("install broadcast")?;

        info!(
            tab = %tab,
            log = %log,
            workers = workers.len(),
            "Worker panes started and broadcast enabled"
        );

        Ok(Layout {
            tab,
            log,
            workers,
            broadcast,
        })
    }
}
