use std::collections::HashSet;
use std::path::Path;

use panecast_core::{
    CommandSet, HostCall, Layout, OrchestrateError, PaneOrchestrator, RecordingHost, SessionId,
};
use pretty_assertions::assert_eq;

const BASE: &str = "/var/www/shop";
const WORKER_TEXT: &str = "cd /var/www/shop; php artisan queue:work\n";
const LOG_TEXT: &str = "cd /var/www/shop; tail -f storage/logs/laravel.log\n";

fn run(host: RecordingHost) -> (Result<Layout, OrchestrateError>, Vec<HostCall>) {
    let orch = PaneOrchestrator::new(host, CommandSet::with_defaults(Path::new(BASE)));
    let result = orch.run();
    let calls = orch.host().calls();
    (result, calls)
}

fn sends(calls: &[HostCall]) -> Vec<(SessionId, String)> {
    calls
        .iter()
        .filter_map(|call| match call {
            HostCall::SendText { session, text } => Some((session.clone(), text.clone())),
            _ => None,
        })
        .collect()
}

#[test]
fn no_window_stops_after_lookup() {
    let (result, calls) = run(RecordingHost::without_window());

    let err = result.expect_err("run should fail without a window");
    assert!(matches!(err, OrchestrateError::NoActiveWindow));
    assert_eq!(err.to_string(), "No current window");
    assert_eq!(calls, vec![HostCall::LookupWindow]);
}

#[test]
fn calls_happen_in_program_order() {
    let (result, calls) = run(RecordingHost::new());
    result.expect("run should succeed");

    let kinds: Vec<&str> = calls
        .iter()
        .map(|call| match call {
            HostCall::LookupWindow => "lookup",
            HostCall::CreateTab { .. } => "tab",
            HostCall::SplitPane { .. } => "split",
            HostCall::SendText { .. } => "send",
            HostCall::InstallBroadcast { .. } => "broadcast",
        })
        .collect();

    assert_eq!(
        kinds,
        vec![
            "lookup",
            "tab",
            "split",
            "split",
            "split",
            "split",
            "send",
            "send",
            "send",
            "send",
            "send",
            "broadcast",
        ]
    );
}

#[test]
fn broadcast_group_holds_workers_only() {
    let host = RecordingHost::new();
    let orch = PaneOrchestrator::new(&host, CommandSet::with_defaults(Path::new(BASE)));
    let layout = orch.run().expect("run should succeed");

    let group = host.broadcast().expect("broadcast should be installed");
    assert_eq!(group, layout.broadcast);
    assert_eq!(group.len(), 4);

    let distinct: HashSet<&SessionId> = group.sessions().iter().collect();
    assert_eq!(distinct.len(), 4);
    assert!(!group.contains(&layout.log));
    assert_eq!(group.sessions(), layout.workers.as_slice());
}

#[test]
fn workers_receive_identical_command() {
    let host = RecordingHost::new();
    let orch = PaneOrchestrator::new(&host, CommandSet::with_defaults(Path::new(BASE)));
    let layout = orch.run().expect("run should succeed");

    let sent = sends(&host.calls());
    assert_eq!(sent.len(), 5);

    let worker_sends = &sent[..4];
    for ((session, text), worker) in worker_sends.iter().zip(&layout.workers) {
        assert_eq!(session, worker);
        assert_eq!(text, WORKER_TEXT);
    }
}

#[test]
fn log_pane_receives_tail_command() {
    let host = RecordingHost::new();
    let orch = PaneOrchestrator::new(&host, CommandSet::with_defaults(Path::new(BASE)));
    let layout = orch.run().expect("run should succeed");

    let sent = sends(&host.calls());
    let (session, text) = sent.last().expect("log send");
    assert_eq!(session, &layout.log);
    assert_eq!(text, LOG_TEXT);
    for (_, worker_text) in &sent[..4] {
        assert_ne!(worker_text, text);
    }
}

#[test]
fn any_failure_aborts_immediately() {
    let (_, full) = run(RecordingHost::new());

    for index in 0..full.len() {
        let (result, calls) = run(RecordingHost::new().failing_at(index));

        assert!(
            matches!(result, Err(OrchestrateError::Host { .. })),
            "call {} should abort the run",
            index
        );
        assert_eq!(calls.len(), index + 1, "no call after failing call {}", index);
        assert_eq!(calls.as_slice(), &full[..=index]);
    }
}

#[test]
fn second_run_replaces_broadcast() {
    let host = RecordingHost::new();
    let orch = PaneOrchestrator::new(&host, CommandSet::with_defaults(Path::new(BASE)));

    let first = orch.run().expect("first run");
    let second = orch.run().expect("second run");

    let group = host.broadcast().expect("broadcast should be installed");
    assert_eq!(group, second.broadcast);
    for worker in &first.workers {
        assert!(!group.contains(worker));
    }
}
