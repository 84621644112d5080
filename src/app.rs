//! Glue between settings, a host and the orchestrator.

use anyhow::Result;
use panecast_core::{Host, HostCall, Layout, OrchestrateError, PaneOrchestrator};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

use crate::config::Settings;

/// Result of a launch attempt
#[derive(Debug)]
pub enum Outcome {
    /// The host had no focused window; nothing was created
    NoWindow,
    /// Panes were created and broadcast installed
    Launched(Layout),
}

impl Outcome {
    /// What the binary prints to stdout for this outcome, if anything
    pub fn report(&self, json: bool) -> Result<Option<String>> {
        let report = match self {
            Outcome::NoWindow if json => Some(serde_json::to_string_pretty(
                &serde_json::json!({ "error": OrchestrateError::NoActiveWindow.to_string() }),
            )?),
            Outcome::NoWindow => Some(OrchestrateError::NoActiveWindow.to_string()),
            Outcome::Launched(layout) if json => Some(serde_json::to_string_pretty(layout)?),
            Outcome::Launched(_) => None,
        };
        Ok(report)
    }
}

/// Run the orchestrator once against `host`.
///
/// A missing window is an expected outcome, every other failure is an error.
pub fn launch<H: Host>(host: H, settings: &Settings, base_dir: &Path) -> Result<Outcome> {
    let orchestrator = PaneOrchestrator::new(host, settings.commands(base_dir))
        .with_workers(settings.workers);

    match orchestrator.run() {
        Ok(layout) => Ok(Outcome::Launched(layout)),
        Err(OrchestrateError::NoActiveWindow) => {
            debug!("No current window; nothing to do");
            Ok(Outcome::NoWindow)
        }
        Err(e) => Err(e.into()),
    }
}

/// Dry-run report: every planned host call plus the resulting layout
#[derive(Debug, Serialize)]
pub struct Plan<'a> {
    pub calls: &'a [HostCall],
    pub layout: Option<&'a Layout>,
}

impl Plan<'_> {
    /// Human readable form, one call per line
    pub fn render(&self) -> String {
        self.calls
            .iter()
            .enumerate()
            .map(|(i, call)| format!("{:>2}. {}", i + 1, call.describe()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
