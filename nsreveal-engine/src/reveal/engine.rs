//! Engine driver
//!
//!     [`Engine`] ties the shared [`Settings`], the exclusion policy and the [`ChangeWatcher`]
//!     together. Lifecycle:
//!
//!         1. `Engine::new`    settings and policy, no watcher yet
//!         2. `start`          one full pass over the document, then the watcher goes Idle
//!         3. `flush`          deliver pending host notifications batch by batch
//!
//!     Every pass and every batch loads the current snapshot afresh. Nothing read from the
//!     settings outlives the call that read it, so updates apply to all work scheduled after
//!     them. Content rewritten before an update is not revisited.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::reveal::dom::DocumentHost;
use crate::reveal::policy::{ExclusionPolicy, NodePolicy};
use crate::reveal::settings::Settings;
use crate::reveal::walker::{WalkReport, Walker};
use crate::reveal::watcher::{ChangeWatcher, DispatchReport, WatcherState};

/// Bounds on reactive work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineLimits {
    /// Maximum batches delivered by one [`Engine::flush`] call.
    pub max_flush_rounds: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_flush_rounds: 64,
        }
    }
}

/// Outcome of one [`Engine::flush`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Batches delivered.
    pub rounds: usize,
    pub events: usize,
    pub skipped: usize,
    pub walk: WalkReport,
    /// True when notifications were still pending after the round limit.
    pub truncated: bool,
}

impl FlushReport {
    fn absorb(&mut self, dispatch: DispatchReport) {
        self.rounds += 1;
        self.events += dispatch.events;
        self.skipped += dispatch.skipped;
        self.walk.merge(dispatch.walk);
    }
}

pub struct Engine<P = ExclusionPolicy> {
    settings: Arc<Settings>,
    policy: P,
    limits: EngineLimits,
    watcher: Option<ChangeWatcher>,
}

impl<P: NodePolicy> Engine<P> {
    pub fn new(settings: Arc<Settings>, policy: P) -> Self {
        Self {
            settings,
            policy,
            limits: EngineLimits::default(),
            watcher: None,
        }
    }

    pub fn with_limits(mut self, limits: EngineLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// `None` until [`Engine::start`] has run.
    pub fn watcher_state(&self) -> Option<WatcherState> {
        self.watcher.as_ref().map(ChangeWatcher::state)
    }

    pub fn is_started(&self) -> bool {
        self.watcher.is_some()
    }

    /// Full pass over the document, after which the watcher is Idle.
    ///
    /// Notifications that were pending before the pass describe content the pass has just
    /// covered and are dropped. The pass's own replacements stay queued for the next flush.
    pub fn start(&mut self, host: &DocumentHost) -> WalkReport {
        let stale = host.take_records();
        let snapshot = self.settings.load();
        let report = Walker::new(host, &snapshot, &self.policy).walk(host.document());
        debug!(
            dropped = stale.len(),
            scanned = report.scanned,
            rewritten = report.rewritten,
            mode = %snapshot.mode,
            "initial pass complete"
        );
        self.watcher = Some(ChangeWatcher::new());
        report
    }

    /// Deliver pending notifications until the host is quiet or the round limit is hit.
    ///
    /// Does nothing before [`Engine::start`].
    pub fn flush(&mut self, host: &DocumentHost) -> FlushReport {
        let mut report = FlushReport::default();
        let Some(watcher) = self.watcher.as_mut() else {
            return report;
        };

        while host.has_pending() {
            if report.rounds == self.limits.max_flush_rounds {
                warn!(
                    rounds = report.rounds,
                    "mutation notifications still pending after round limit"
                );
                report.truncated = true;
                break;
            }
            let batch = host.take_records();
            let snapshot = self.settings.load();
            report.absorb(watcher.dispatch(host, batch, &snapshot, &self.policy));
        }
        report
    }

    /// Convenience for a fresh document: [`Engine::start`] then [`Engine::flush`].
    pub fn run(&mut self, host: &DocumentHost) -> WalkReport {
        let mut report = self.start(host);
        report.merge(self.flush(host).walk);
        report
    }
}
