//! panecast-core: lay out worker panes, start their commands and link them
//! into one input-broadcast group.
//!
//! The host terminal application is abstracted behind [`host::Host`]; the
//! binary crate supplies the tmux implementation while [`host::RecordingHost`]
//! serves tests and dry runs.

pub mod command;
pub mod host;
pub mod orchestrator;

pub use command::CommandSet;
pub use host::{
    BroadcastGroup, Host, HostCall, Orientation, RecordingHost, SessionId, TabId, WindowId,
};
pub use orchestrator::{
    Layout, OrchestrateError, PaneOrchestrator, DEFAULT_WORKER_COUNT, MAX_WORKERS,
};
