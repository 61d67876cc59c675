//! Testing utilities
//!
//!     Helpers shared by unit tests, integration tests and the CLI tests. They let a test state
//!     its document as HTML, run the engine on it, and compare the `<body>` markup or its text.
//!
//!     ```rust,ignore
//!     let host = host_from_html("<p>see xabc0000000000001 now</p>");
//!     let mut engine = engine_with_pairs([("xabc0000000000001", "teams-prod")], Mode::Translate);
//!     engine.run(&host);
//!     assert_eq!(body_text(&host), "see teams-prod now");
//!     ```

use std::sync::Arc;

use markup5ever_rcdom::Handle;

use crate::reveal::dom::{tag_name, text_content, DocumentHost};
use crate::reveal::engine::Engine;
use crate::reveal::html::{parse_html, serialize_children};
use crate::reveal::mapping::Mapping;
use crate::reveal::policy::ExclusionPolicy;
use crate::reveal::settings::{Mode, Settings, Snapshot};

/// Parse `html` into a fresh host.
pub fn host_from_html(html: &str) -> DocumentHost {
    let dom = parse_html(html);
    DocumentHost::new(dom.document.clone())
}

/// Engine over a fixed token → name table with the default policy.
pub fn engine_with_pairs<I>(pairs: I, mode: Mode) -> Engine
where
    I: IntoIterator<Item = (&'static str, &'static str)>,
{
    let settings = Settings::from_snapshot(Snapshot::new(Mapping::from_pairs(pairs), mode));
    Engine::new(Arc::new(settings), ExclusionPolicy::default())
}

/// First element named `tag` in document order.
pub fn find_element(root: &Handle, tag: &str) -> Option<Handle> {
    if tag_name(root) == Some(tag) {
        return Some(root.clone());
    }
    root.children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}

/// The document's `<body>`.
pub fn body(host: &DocumentHost) -> Handle {
    find_element(host.document(), "body").expect("parsed documents always have a body")
}

/// Inner HTML of the document's `<body>`.
pub fn body_html(host: &DocumentHost) -> String {
    serialize_children(&body(host)).expect("serializing an in-memory tree cannot fail")
}

/// Text content of the document's `<body>`.
pub fn body_text(host: &DocumentHost) -> String {
    text_content(&body(host))
}
