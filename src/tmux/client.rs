use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use panecast_core::{BroadcastGroup, Host, Orientation, SessionId, TabId, WindowId};
use regex::Regex;
use std::process::Command;
use tracing::debug;

/// tmux pane id (`%12`)
static PANE_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^%\d+$").expect("Invalid PANE_ID_PATTERN regex"));

/// tmux window id (`@3`)
static WINDOW_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@\d+$").expect("Invalid WINDOW_ID_PATTERN regex"));

/// tmux session id (`$0`)
static SESSION_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$\d+$").expect("Invalid SESSION_ID_PATTERN regex"));

/// Validate an id reported by tmux before using it as a target
fn validate_id(pattern: &Regex, kind: &str, id: &str) -> Result<()> {
    if !pattern.is_match(id) {
        anyhow::bail!("Invalid tmux {} id: {:?}", kind, id);
    }
    Ok(())
}

/// `split-window` flag for an orientation
fn split_flag(orientation: Orientation) -> &'static str {
    match orientation {
        // tmux names splits by pane placement, not by divider
        Orientation::Vertical => "-h",
        Orientation::Horizontal => "-v",
    }
}

/// A single `send-keys` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyInput {
    /// Text typed as-is (`send-keys -l`)
    Literal(String),
    /// Enter key press
    Enter,
}

/// tmux reads a trailing `;` in any argument as a command separator
fn escape_trailing_semicolon(line: &str) -> String {
    match line.strip_suffix(';') {
        Some(rest) => format!("{}\\;", rest),
        None => line.to_string(),
    }
}

/// Break text into literal chunks and Enter presses, one per newline
fn key_inputs(text: &str) -> Vec<KeyInput> {
    let mut inputs = Vec::new();
    for segment in text.split_inclusive('\n') {
        let (line, submit) = match segment.strip_suffix('\n') {
            Some(line) => (line, true),
            None => (segment, false),
        };
        if !line.is_empty() {
            inputs.push(KeyInput::Literal(escape_trailing_semicolon(line)));
        }
        if submit {
            inputs.push(KeyInput::Enter);
        }
    }
    inputs
}

/// Parse the `#{window_id}\t#{pane_id}` reply of `new-window -P`
fn parse_tab_reply(reply: &str) -> Result<(TabId, SessionId)> {
    let (window, pane) = reply
        .trim()
        .split_once('\t')
        .context("Invalid tmux new-window output")?;
    validate_id(&WINDOW_ID_PATTERN, "window", window)?;
    validate_id(&PANE_ID_PATTERN, "pane", pane)?;
    Ok((TabId(window.to_string()), SessionId(pane.to_string())))
}

/// Client for driving tmux as the pane host
pub struct TmuxClient {
    /// tmux executable
    program: String,
}

impl TmuxClient {
    /// Creates a new TmuxClient using `tmux` from PATH
    pub fn new() -> Self {
        Self {
            program: "tmux".to_string(),
        }
    }

    /// Creates a TmuxClient using a specific tmux executable
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Whether this process runs inside a tmux client
    pub fn is_inside_tmux(&self) -> bool {
        std::env::var_os("TMUX").is_some_and(|v| !v.is_empty())
    }

    /// Run a tmux subcommand and return its trimmed stdout
    fn run(&self, args: &[&str]) -> Result<String> {
        let subcommand = args.first().copied().unwrap_or_default();
        debug!(args = ?args, "tmux");

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .with_context(|| format!("Failed to execute tmux {}", subcommand))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("tmux {} failed: {}", subcommand, stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Sends literal keys (with -l flag) to a pane
    fn send_keys_literal(&self, pane: &str, keys: &str) -> Result<()> {
        self.run(&["send-keys", "-t", pane, "-l", keys]).map(|_| ())
    }

    /// Presses Enter in a pane
    fn send_enter(&self, pane: &str) -> Result<()> {
        self.run(&["send-keys", "-t", pane, "Enter"]).map(|_| ())
    }

    /// Ids of every pane on the server
    fn list_pane_ids(&self) -> Result<Vec<String>> {
        let stdout = self.run(&["list-panes", "-a", "-F", "#{pane_id}"])?;
        let ids = stdout
            .lines()
            .map(str::trim)
            .filter(|id| PANE_ID_PATTERN.is_match(id))
            .map(str::to_string)
            .collect();
        Ok(ids)
    }

    /// Sets the pane-scoped `synchronize-panes` option (tmux 3.2+)
    fn set_synchronized(&self, pane: &str, on: bool) -> Result<()> {
        let value = if on { "on" } else { "off" };
        self.run(&["set-option", "-p", "-t", pane, "synchronize-panes", value])
            .map(|_| ())
    }
}

impl Default for TmuxClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for TmuxClient {
    fn lookup_window(&self) -> Result<Option<WindowId>> {
        if !self.is_inside_tmux() {
            return Ok(None);
        }
        let session = self.run(&["display-message", "-p", "#{session_id}"])?;
        validate_id(&SESSION_ID_PATTERN, "session", &session)?;
        Ok(Some(WindowId(session)))
    }

    fn create_tab(&self, window: &WindowId) -> Result<(TabId, SessionId)> {
        validate_id(&SESSION_ID_PATTERN, "session", window.as_str())?;
        let target = format!("{}:", window);
        let reply = self.run(&[
            "new-window",
            "-t",
            target.as_str(),
            "-P",
            "-F",
            "#{window_id}\t#{pane_id}",
        ])?;
        parse_tab_reply(&reply)
    }

    fn split_pane(&self, session: &SessionId, orientation: Orientation) -> Result<SessionId> {
        validate_id(&PANE_ID_PATTERN, "pane", session.as_str())?;
        let pane = self.run(&[
            "split-window",
            split_flag(orientation),
            "-t",
            session.as_str(),
            "-P",
            "-F",
            "#{pane_id}",
        ])?;
        validate_id(&PANE_ID_PATTERN, "pane", &pane)?;
        Ok(SessionId(pane))
    }

    fn send_text(&self, session: &SessionId, text: &str) -> Result<()> {
        validate_id(&PANE_ID_PATTERN, "pane", session.as_str())?;
        for input in key_inputs(text) {
            match input {
                KeyInput::Literal(line) => self.send_keys_literal(session.as_str(), &line)?,
                KeyInput::Enter => self.send_enter(session.as_str())?,
            }
        }
        Ok(())
    }

    fn install_broadcast(&self, group: &BroadcastGroup) -> Result<()> {
        for session in group.sessions() {
            validate_id(&PANE_ID_PATTERN, "pane", session.as_str())?;
        }

        // Replace, never merge: clear every other pane first
        for pane in self.list_pane_ids()? {
            if !group.contains(&SessionId(pane.clone())) {
                self.set_synchronized(&pane, false)?;
            }
        }
        for session in group.sessions() {
            self.set_synchronized(session.as_str(), true)?;
        }
        Ok(())
    }
}
