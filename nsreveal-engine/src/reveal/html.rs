//! HTML in and out (html5ever)

use html5ever::serialize::{SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, serialize, ParseOpts};
use markup5ever_rcdom::{Handle, RcDom, SerializableHandle};

use crate::reveal::error::RevealError;

/// Parse a full HTML document. html5ever recovers from any malformed input.
pub fn parse_html(source: &str) -> RcDom {
    parse_document(RcDom::default(), ParseOpts::default()).one(source)
}

/// Serialize the children of `node` (typically the document node) back to HTML.
pub fn serialize_children(node: &Handle) -> Result<String, RevealError> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };
    let serializable = SerializableHandle::from(node.clone());
    serialize(&mut output, &serializable, opts)?;
    Ok(String::from_utf8(output)?)
}

/// Serialize `node` itself together with its subtree.
pub fn serialize_node(node: &Handle) -> Result<String, RevealError> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    let serializable = SerializableHandle::from(node.clone());
    serialize(&mut output, &serializable, opts)?;
    Ok(String::from_utf8(output)?)
}
