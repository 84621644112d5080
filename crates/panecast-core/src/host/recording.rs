use anyhow::Result;
use parking_lot::Mutex;
use serde::Serialize;

use super::{BroadcastGroup, Host, Orientation, SessionId, TabId, WindowId};

/// A host operation as seen by [`RecordingHost`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostCall {
    LookupWindow,
    CreateTab {
        window: WindowId,
    },
    SplitPane {
        session: SessionId,
        orientation: Orientation,
    },
    SendText {
        session: SessionId,
        text: String,
    },
    InstallBroadcast {
        sessions: Vec<SessionId>,
    },
}

impl HostCall {
    /// One-line human readable form, used by dry-run output
    pub fn describe(&self) -> String {
        match self {
            HostCall::LookupWindow => "lookup window".to_string(),
            HostCall::CreateTab { window } => format!("create tab in {}", window),
            HostCall::SplitPane {
                session,
                orientation,
            } => format!("split {} ({})", session, orientation.as_str()),
            HostCall::SendText { session, text } => {
                format!("send to {}: {:?}", session, text)
            }
            HostCall::InstallBroadcast { sessions } => {
                let ids: Vec<&str> = sessions.iter().map(SessionId::as_str).collect();
                format!("broadcast [{}]", ids.join(", "))
            }
        }
    }
}

#[derive(Debug, Default)]
struct RecordingState {
    calls: Vec<HostCall>,
    broadcast: Option<BroadcastGroup>,
    next_tab: u32,
    next_pane: u32,
}

/// In-memory host that records every call instead of driving a terminal.
///
/// Pane ids are handed out sequentially (`%0`, `%1`, ...). The broadcast
/// configuration is a single value replaced by each install.
#[derive(Debug)]
pub struct RecordingHost {
    window: Option<WindowId>,
    fail_at: Option<usize>,
    state: Mutex<RecordingState>,
}

impl RecordingHost {
    /// Host with one focused window
    pub fn new() -> Self {
        Self {
            window: Some(WindowId("$0".to_string())),
            fail_at: None,
            state: Mutex::new(RecordingState::default()),
        }
    }

    /// Host without any window
    pub fn without_window() -> Self {
        Self {
            window: None,
            ..Self::new()
        }
    }

    /// Make the call at `index` (0-based, counting every call) fail
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Every call attempted so far, in order
    pub fn calls(&self) -> Vec<HostCall> {
        self.state.lock().calls.clone()
    }

    /// The currently installed broadcast group
    pub fn broadcast(&self) -> Option<BroadcastGroup> {
        self.state.lock().broadcast.clone()
    }

    /// Record `call` and fail if it is the configured failing call
    fn record(&self, state: &mut RecordingState, call: HostCall) -> Result<()> {
        let index = state.calls.len();
        let failing = self.fail_at == Some(index);
        state.calls.push(call);
        if failing {
            anyhow::bail!("recording host: injected failure at call {}", index);
        }
        Ok(())
    }

    fn allocate_pane(state: &mut RecordingState) -> SessionId {
        let id = SessionId(format!("%{}", state.next_pane));
        state.next_pane += 1;
        id
    }
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for RecordingHost {
    fn lookup_window(&self) -> Result<Option<WindowId>> {
        let mut state = self.state.lock();
        self.record(&mut state, HostCall::LookupWindow)?;
        Ok(self.window.clone())
    }

    fn create_tab(&self, window: &WindowId) -> Result<(TabId, SessionId)> {
        let mut state = self.state.lock();
        self.record(
            &mut state,
            HostCall::CreateTab {
                window: window.clone(),
            },
        )?;
        let tab = TabId(format!("@{}", state.next_tab));
        state.next_tab += 1;
        let pane = Self::allocate_pane(&mut state);
        Ok((tab, pane))
    }

    fn split_pane(&self, session: &SessionId, orientation: Orientation) -> Result<SessionId> {
        let mut state = self.state.lock();
        self.record(
            &mut state,
            HostCall::SplitPane {
                session: session.clone(),
                orientation,
            },
        )?;
        Ok(Self::allocate_pane(&mut state))
    }

    fn send_text(&self, session: &SessionId, text: &str) -> Result<()> {
        let mut state = self.state.lock();
        self.record(
            &mut state,
            HostCall::SendText {
                session: session.clone(),
                text: text.to_string(),
            },
        )
    }

    fn install_broadcast(&self, group: &BroadcastGroup) -> Result<()> {
        let mut state = self.state.lock();
        self.record(
            &mut state,
            HostCall::InstallBroadcast {
                sessions: group.sessions().to_vec(),
            },
        )?;
        state.broadcast = Some(group.clone());
        Ok(())
    }
}
