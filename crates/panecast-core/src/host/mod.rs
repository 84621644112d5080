//! Capability interface to the host terminal application.

mod recording;

pub use recording::{HostCall, RecordingHost};

use std::fmt;

use anyhow::Result;
use serde::Serialize;

/// Handle to a top-level host window (a tmux session)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct WindowId(pub String);

/// Handle to a tab created inside a window (a tmux window)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TabId(pub String);

/// Handle to a single pane (a tmux pane id such as `%12`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

macro_rules! impl_id_display {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl $ty {
                /// Borrow the raw host identifier
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }
        )*
    };
}

impl_id_display!(WindowId, TabId, SessionId);

/// Direction of the divider introduced by a split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Vertical divider: the new pane opens beside the original
    Vertical,
    /// Horizontal divider: the new pane opens below the original
    Horizontal,
}

impl Orientation {
    /// Short name used in logs and plans
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Vertical => "vertical",
            Orientation::Horizontal => "horizontal",
        }
    }
}

/// Panes whose keyboard input is mirrored to each other.
///
/// Members keep insertion order and are never duplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BroadcastGroup {
    sessions: Vec<SessionId>,
}

impl BroadcastGroup {
    /// Create an empty group
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session; returns false if it was already a member
    pub fn add_session(&mut self, session: SessionId) -> bool {
        if self.contains(&session) {
            return false;
        }
        self.sessions.push(session);
        true
    }

    /// Whether the session is a member
    pub fn contains(&self, session: &SessionId) -> bool {
        self.sessions.contains(session)
    }

    /// Members in insertion order
    pub fn sessions(&self) -> &[SessionId] {
        &self.sessions
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the group has no members
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl FromIterator<SessionId> for BroadcastGroup {
    fn from_iter<I: IntoIterator<Item = SessionId>>(iter: I) -> Self {
        let mut group = Self::new();
        for session in iter {
            group.add_session(session);
        }
        group
    }
}

/// Operations the orchestrator needs from the host terminal application.
///
/// Every call blocks until the host has replied. Implementations must not
/// retry on their own.
pub trait Host {
    /// The currently focused window, or `None` if there is none
    fn lookup_window(&self) -> Result<Option<WindowId>>;

    /// Create a new tab in `window`, returning the tab and its initial pane
    fn create_tab(&self, window: &WindowId) -> Result<(TabId, SessionId)>;

    /// Split `session`, returning the newly created pane
    fn split_pane(&self, session: &SessionId, orientation: Orientation) -> Result<SessionId>;

    /// Type `text` into `session`; each `\n` submits the line
    fn send_text(&self, session: &SessionId, text: &str) -> Result<()>;

    /// Make `group` the only active broadcast configuration
    fn install_broadcast(&self, group: &BroadcastGroup) -> Result<()>;
}

impl<H: Host + ?Sized> Host for &H {
    fn lookup_window(&self) -> Result<Option<WindowId>> {
        (**self).lookup_window()
    }

    fn create_tab(&self, window: &WindowId) -> Result<(TabId, SessionId)> {
        (**self).create_tab(window)
    }

    fn split_pane(&self, session: &SessionId, orientation: Orientation) -> Result<SessionId> {
        (**self).split_pane(session, orientation)
    }

    fn send_text(&self, session: &SessionId, text: &str) -> Result<()> {
        (**self).send_text(session, text)
    }

    fn install_broadcast(&self, group: &BroadcastGroup) -> Result<()> {
        (**self).install_broadcast(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_group_rejects_duplicates() {
        let mut group = BroadcastGroup::new();
        assert!(group.add_session(SessionId("%1".into())));
        assert!(group.add_session(SessionId("%2".into())));
        assert!(!group.add_session(SessionId("%1".into())));
        assert_eq!(group.len(), 2);
        assert_eq!(
            group.sessions(),
            &[SessionId("%1".into()), SessionId("%2".into())]
        );
    }

    #[test]
    fn test_broadcast_group_from_iter() {
        let group: BroadcastGroup = ["%3", "%4", "%3"]
            .into_iter()
            .map(|s| SessionId(s.to_string()))
            .collect();
        assert_eq!(group.len(), 2);
        assert!(group.contains(&SessionId("%4".into())));
        assert!(!group.is_empty());
    }

    #[test]
    fn test_id_display() {
        assert_eq!(SessionId("%7".into()).to_string(), "%7");
        assert_eq!(WindowId("$0".into()).as_str(), "$0");
        assert_eq!(Orientation::Vertical.as_str(), "vertical");
    }
}
