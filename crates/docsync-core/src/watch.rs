//! Directory watching with debounced re-sync
//!
//! A single recursive watcher feeds a channel; qualifying create/modify
//! events trigger a full synchronizer pass, gated by a per-session debounce
//! keyed on pass start time. Cancellation is cooperative through a shared
//! atomic flag polled between channel receives.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecursiveMode, Watcher};
use tracing::{debug, error, info, warn};

use crate::Result;
use crate::discover::is_candidate_document;
use crate::sync::Synchronizer;

/// Minimum interval between two triggered passes.
pub const DEBOUNCE_INTERVAL: Duration = Duration::from_secs(2);

/// How often the loop wakes to check the cancel flag.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Debounce state for one watch session: the gating interval and the last
/// trigger instant. Events landing inside the window are dropped, not
/// queued. Gating happens on pass *start* time so a slow pass does not
/// immediately retrigger itself.
#[derive(Debug)]
pub struct DebounceGate {
    interval: Duration,
    last_trigger: Option<Instant>,
}

impl DebounceGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_trigger: None,
        }
    }

    /// Whether a pass may start at `now`; records `now` as the new gate
    /// point when it may.
    pub fn should_trigger(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_trigger
            && now.duration_since(last) < self.interval
        {
            return false;
        }
        self.last_trigger = Some(now);
        true
    }
}

/// Watches a directory tree and re-runs the synchronizer on changes.
pub struct ChangeWatcher {
    root: PathBuf,
    gate: DebounceGate,
}

impl ChangeWatcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            gate: DebounceGate::new(DEBOUNCE_INTERVAL),
        }
    }

    /// Run until `cancelled` is set. Each qualifying event outside the
    /// debounce window triggers one full pass; a failed pass is logged and
    /// the loop keeps running.
    pub fn watch(&mut self, synchronizer: &Synchronizer, cancelled: &AtomicBool) -> Result<()> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx)?;
        watcher.watch(&self.root, RecursiveMode::Recursive)?;
        info!(root = %self.root.display(), "watching for document changes");

        while !cancelled.load(Ordering::SeqCst) {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(Ok(event)) => {
                    if is_document_event(&event) {
                        self.trigger(synchronizer, &event);
                    }
                }
                Ok(Err(e)) => warn!(error = %e, "watch backend error"),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        info!("watcher stopped");
        Ok(())
    }

    fn trigger(&mut self, synchronizer: &Synchronizer, event: &Event) {
        if !self.gate.should_trigger(Instant::now()) {
            debug!(paths = ?event.paths, "change inside debounce window, dropped");
            return;
        }

        info!(paths = ?event.paths, "change detected, starting sync pass");
        match synchronizer.run_pass() {
            Ok(report) if report.success() => info!("sync pass completed"),
            Ok(report) => warn!(
                errors = report.errors.len(),
                "sync pass completed with errors"
            ),
            Err(e) => error!(error = %e, "sync pass failed"),
        }
    }
}

/// A create or modify event touching at least one candidate document.
fn is_document_event(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_)
    ) && event.paths.iter().any(|path| is_candidate_document(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use tempfile::TempDir;

    #[test]
    fn gate_opens_once_per_interval() {
        let mut gate = DebounceGate::new(Duration::from_secs(2));
        let t0 = Instant::now();

        assert!(gate.should_trigger(t0));
        assert!(!gate.should_trigger(t0 + Duration::from_millis(500)));
        assert!(!gate.should_trigger(t0 + Duration::from_millis(1999)));
        assert!(gate.should_trigger(t0 + Duration::from_secs(2)));
    }

    #[test]
    fn dropped_events_do_not_extend_the_window() {
        let mut gate = DebounceGate::new(Duration::from_secs(2));
        let t0 = Instant::now();

        assert!(gate.should_trigger(t0));
        // A burst of dropped events must not push the gate point forward.
        assert!(!gate.should_trigger(t0 + Duration::from_secs(1)));
        assert!(gate.should_trigger(t0 + Duration::from_secs(2)));
    }

    #[test]
    fn document_events_are_filtered_by_kind_and_path() {
        let doc_create = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/cv/Resume.docx"));
        assert!(is_document_event(&doc_create));

        let doc_modify = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/cv/Resume.docx"));
        assert!(is_document_event(&doc_modify));

        let temp_lock = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/cv/~$Resume.docx"));
        assert!(!is_document_event(&temp_lock));

        let other_file = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/cv/notes.txt"));
        assert!(!is_document_event(&other_file));

        let removal = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/cv/Resume.docx"));
        assert!(!is_document_event(&removal));
    }

    #[test]
    fn watch_returns_once_cancelled() {
        let dir = TempDir::new().unwrap();
        let synchronizer = Synchronizer::new(dir.path());
        let mut watcher = ChangeWatcher::new(dir.path());

        let cancelled = AtomicBool::new(true);
        watcher.watch(&synchronizer, &cancelled).unwrap();
    }
}
