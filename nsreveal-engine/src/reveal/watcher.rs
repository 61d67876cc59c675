//! Incremental re-scan
//!
//!     The [`ChangeWatcher`] is the callback the host invokes with each batch of mutation
//!     notifications. It only ever looks at the nodes named in the batch:
//!
//!         node added, text     → scan and rewrite that leaf
//!         node added, element  → walk that subtree
//!         node removed         → nothing
//!         text changed         → scan and rewrite that leaf
//!
//!     Nodes that are no longer attached, or that sit under an excluded element or engine
//!     output, are skipped.
//!
//! State
//!
//!     Idle between callbacks, Dispatching while a batch is being processed. The watcher only
//!     exists once the initial full pass has completed, so its first state is Idle.
//!
//! Self-triggering
//!
//!     Each replacement the watcher performs queues a removal plus one addition per fragment.
//!     Those come back in the next batch and settle immediately: plain fragments hold no
//!     resolvable tokens and engine output is never descended into.

use markup5ever_rcdom::{Handle, NodeData};
use tracing::{debug, trace};

use crate::reveal::dom::{describe, parent_of, DocumentHost, Mutation, MutationBatch};
use crate::reveal::policy::NodePolicy;
use crate::reveal::settings::Snapshot;
use crate::reveal::walker::{WalkReport, Walker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Idle,
    Dispatching,
}

/// What one batch dispatch did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Events in the batch.
    pub events: usize,
    /// Events skipped because their node was detached or shielded.
    pub skipped: usize,
    pub walk: WalkReport,
}

#[derive(Debug)]
pub struct ChangeWatcher {
    state: WatcherState,
}

impl ChangeWatcher {
    pub(crate) fn new() -> Self {
        Self {
            state: WatcherState::Idle,
        }
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    /// Process one batch in event order against `snapshot`.
    pub fn dispatch(
        &mut self,
        host: &DocumentHost,
        batch: MutationBatch,
        snapshot: &Snapshot,
        policy: &dyn NodePolicy,
    ) -> DispatchReport {
        self.state = WatcherState::Dispatching;

        let walker = Walker::new(host, snapshot, policy);
        let mut report = DispatchReport {
            events: batch.len(),
            ..Default::default()
        };

        for mutation in &batch {
            match mutation {
                Mutation::NodeRemoved(_) => {}
                Mutation::NodeAdded(node) | Mutation::TextChanged(node) => {
                    if !is_attached(node) || walker.is_shielded(node) {
                        trace!(?mutation, "skipping");
                        report.skipped += 1;
                        continue;
                    }
                    match (&node.data, mutation) {
                        (NodeData::Text { .. }, _) => {
                            report.walk.merge(walker.rewrite_text(node));
                        }
                        (NodeData::Element { .. }, Mutation::NodeAdded(_)) => {
                            report.walk.merge(walker.walk(node));
                        }
                        _ => {}
                    }
                }
            }
        }

        debug!(
            events = report.events,
            skipped = report.skipped,
            scanned = report.walk.scanned,
            rewritten = report.walk.rewritten,
            "dispatched mutation batch"
        );
        self.state = WatcherState::Idle;
        report
    }
}

fn is_attached(node: &Handle) -> bool {
    let attached = parent_of(node).is_some();
    if !attached {
        trace!(node = %describe(node), "node detached before dispatch");
    }
    attached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reveal::dom::{create_comment, create_element_with, create_text, text_content};
    use crate::reveal::mapping::Mapping;
    use crate::reveal::policy::ExclusionPolicy;
    use crate::reveal::settings::Mode;

    fn snapshot() -> Snapshot {
        Snapshot::new(
            Mapping::from_pairs([("xabc0000000000001", "teams-prod")]),
            Mode::Translate,
        )
    }

    #[test]
    fn starts_idle_and_returns_to_idle() {
        let root = create_element_with("div", vec![], vec![]);
        let host = DocumentHost::new(root.clone());
        let mut watcher = ChangeWatcher::new();
        assert_eq!(watcher.state(), WatcherState::Idle);

        host.append_child(&root, create_text("xabc0000000000001"));
        let report = watcher.dispatch(
            &host,
            host.take_records(),
            &snapshot(),
            &ExclusionPolicy::default(),
        );
        assert_eq!(watcher.state(), WatcherState::Idle);
        assert_eq!(report.walk.rewritten, 1);
        assert_eq!(text_content(&root), "teams-prod");
    }

    #[test]
    fn removed_and_detached_nodes_are_ignored() {
        let leaf = create_text("xabc0000000000001");
        let root = create_element_with("div", vec![], vec![]);
        let host = DocumentHost::new(root.clone());

        host.append_child(&root, leaf.clone());
        host.remove_child(&root, &leaf);
        let report = ChangeWatcher::new().dispatch(
            &host,
            host.take_records(),
            &snapshot(),
            &ExclusionPolicy::default(),
        );
        assert_eq!(report.events, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.walk, WalkReport::default());
        assert!(!host.has_pending());
    }

    #[test]
    fn added_comment_is_left_alone() {
        let root = create_element_with("div", vec![], vec![]);
        let host = DocumentHost::new(root.clone());
        let comment = create_comment("xabc0000000000001");

        host.append_child(&root, comment.clone());
        let report = ChangeWatcher::new().dispatch(
            &host,
            host.take_records(),
            &snapshot(),
            &ExclusionPolicy::default(),
        );
        assert_eq!(report.events, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.walk, WalkReport::default());
        assert!(std::rc::Rc::ptr_eq(&root.children.borrow()[0], &comment));
        assert!(!host.has_pending());
    }

    #[test]
    fn text_change_inside_editable_is_ignored() {
        let leaf = create_text("");
        let root = create_element_with(
            "div",
            vec![],
            vec![create_element_with("textarea", vec![], vec![leaf.clone()])],
        );
        let host = DocumentHost::new(root);

        host.set_text(&leaf, "xabc0000000000001");
        let report = ChangeWatcher::new().dispatch(
            &host,
            host.take_records(),
            &snapshot(),
            &ExclusionPolicy::default(),
        );
        assert_eq!(report.skipped, 1);
        assert_eq!(text_content(&leaf), "xabc0000000000001");
    }
}
