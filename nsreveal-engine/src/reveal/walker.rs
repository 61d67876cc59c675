//! Subtree traversal
//!
//!     [`Walker`] visits a subtree depth-first, pre-order. Each text leaf is scanned; when at
//!     least one of its tokens resolves, the leaf is swapped for the rewritten fragments at the
//!     same position in its parent. Elements are descended in child order unless the policy
//!     excludes them or they are engine output. Comments, doctypes and processing instructions
//!     are ignored.
//!
//!     A leaf whose tokens are all unresolved is left exactly as it is. Re-inserting an
//!     identical copy would only produce another notification for the same text.

use std::rc::Rc;

use markup5ever_rcdom::{Handle, NodeData};
use tracing::trace;

use crate::reveal::dom::{describe, fragment_node, is_engine_output, parent_of, DocumentHost};
use crate::reveal::policy::NodePolicy;
use crate::reveal::rewriter::{is_passthrough, rewrite};
use crate::reveal::scanner::scan;
use crate::reveal::settings::Snapshot;

/// What a traversal did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkReport {
    /// Text leaves handed to the scanner.
    pub scanned: usize,
    /// Text leaves replaced by fragments.
    pub rewritten: usize,
}

impl WalkReport {
    pub fn merge(&mut self, other: WalkReport) {
        self.scanned += other.scanned;
        self.rewritten += other.rewritten;
    }
}

pub struct Walker<'a> {
    host: &'a DocumentHost,
    snapshot: &'a Snapshot,
    policy: &'a dyn NodePolicy,
}

impl<'a> Walker<'a> {
    pub fn new(host: &'a DocumentHost, snapshot: &'a Snapshot, policy: &'a dyn NodePolicy) -> Self {
        Self {
            host,
            snapshot,
            policy,
        }
    }

    /// Rewrite every eligible text leaf under `node`, `node` included.
    pub fn walk(&self, node: &Handle) -> WalkReport {
        let mut report = WalkReport::default();
        self.visit(node, &mut report);
        report
    }

    /// Scan one text leaf and replace it when it holds a resolvable token.
    pub fn rewrite_text(&self, node: &Handle) -> WalkReport {
        let mut report = WalkReport::default();
        self.visit_text(node, &mut report);
        report
    }

    /// True when `node` or one of its ancestors must not be touched.
    pub fn is_shielded(&self, node: &Handle) -> bool {
        let mut current = Some(Rc::clone(node));
        while let Some(candidate) = current {
            if self.is_opaque(&candidate) {
                return true;
            }
            current = parent_of(&candidate);
        }
        false
    }

    fn is_opaque(&self, node: &Handle) -> bool {
        matches!(node.data, NodeData::Element { .. })
            && (is_engine_output(node) || self.policy.is_excluded(node))
    }

    fn visit(&self, node: &Handle, report: &mut WalkReport) {
        match node.data {
            NodeData::Text { .. } => self.visit_text(node, report),
            NodeData::Element { .. } if self.is_opaque(node) => {
                trace!(node = %describe(node), "skipping opaque element");
            }
            NodeData::Element { .. } | NodeData::Document => {
                // Children may be replaced while we iterate, so walk a copy of the list.
                let children: Vec<Handle> = node.children.borrow().clone();
                for child in &children {
                    self.visit(child, report);
                }
            }
            _ => {}
        }
    }

    fn visit_text(&self, node: &Handle, report: &mut WalkReport) {
        let NodeData::Text { contents } = &node.data else {
            return;
        };
        report.scanned += 1;

        let fragments = {
            let text = contents.borrow();
            let matches = scan(&text);
            if matches.is_empty() {
                return;
            }
            rewrite(&text, &matches, self.snapshot)
        };
        if is_passthrough(&fragments) {
            return;
        }

        let replacements = fragments.iter().map(fragment_node).collect();
        if self.host.replace_with(node, replacements) {
            trace!(node = %describe(node), fragments = fragments.len(), "rewrote text");
            report.rewritten += 1;
        }
    }
}
