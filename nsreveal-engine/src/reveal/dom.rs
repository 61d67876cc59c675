//! Document host
//!
//!     The tree itself is a `markup5ever_rcdom` DOM. The host owns it; the engine only ever holds
//!     `Rc` handles for the length of one pass or one callback.
//!
//!     Every structural or text edit goes through [`DocumentHost`], which queues a [`Mutation`]
//!     for it. The queue plays the part of the host's change-notification subsystem: whoever
//!     drives the engine drains it with [`DocumentHost::take_records`] and hands the records over
//!     as one batch. Edits made by the engine itself land in the same queue, which is how the
//!     self-triggered notifications arise.
//!
//! Fragment markup
//!
//!     Rewritten tokens become `span` elements tagged with [`MARKER_ATTR`]. Anything carrying
//!     that attribute is engine output and is never descended into again.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use html5ever::{ns, Attribute, LocalName, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData};

use crate::reveal::rewriter::{annotation_note, Fragment};

/// Attribute set on every element the engine creates.
pub const MARKER_ATTR: &str = "data-nsreveal";
/// Attribute carrying the original token on rewritten elements.
pub const TOKEN_ATTR: &str = "data-token";
pub const NAME_CLASS: &str = "nsreveal-name";
pub const ANNOTATED_CLASS: &str = "nsreveal-annotated";
pub const NOTE_CLASS: &str = "nsreveal-note";

/// A single change notification.
#[derive(Clone)]
pub enum Mutation {
    NodeAdded(Handle),
    NodeRemoved(Handle),
    TextChanged(Handle),
}

impl Mutation {
    pub fn node(&self) -> &Handle {
        match self {
            Mutation::NodeAdded(node) | Mutation::NodeRemoved(node) | Mutation::TextChanged(node) => {
                node
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Mutation::NodeAdded(_) => "added",
            Mutation::NodeRemoved(_) => "removed",
            Mutation::TextChanged(_) => "text",
        }
    }
}

impl fmt::Debug for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), describe(self.node()))
    }
}

/// Ordered group of mutations delivered in one callback.
pub type MutationBatch = Vec<Mutation>;

/// Owner of the document and its pending change notifications.
pub struct DocumentHost {
    document: Handle,
    pending: RefCell<MutationBatch>,
}

impl DocumentHost {
    pub fn new(document: Handle) -> Self {
        Self {
            document,
            pending: RefCell::new(Vec::new()),
        }
    }

    pub fn document(&self) -> &Handle {
        &self.document
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// An attached `child` is moved: it is first removed from its current parent.
    pub fn append_child(&self, parent: &Handle, child: Handle) {
        self.detach(&child);
        set_parent(&child, parent);
        parent.children.borrow_mut().push(child.clone());
        self.record(Mutation::NodeAdded(child));
    }

    /// Insert `child` before `reference`. Appends when `reference` is not a child of `parent`.
    ///
    /// An attached `child` is moved, as with [`DocumentHost::append_child`].
    pub fn insert_before(&self, parent: &Handle, child: Handle, reference: &Handle) {
        self.detach(&child);
        set_parent(&child, parent);
        {
            let mut children = parent.children.borrow_mut();
            match children.iter().position(|c| Rc::ptr_eq(c, reference)) {
                Some(index) => children.insert(index, child.clone()),
                None => children.push(child.clone()),
            }
        }
        self.record(Mutation::NodeAdded(child));
    }

    /// Detach `child` from `parent`. Returns false when it was not a child.
    pub fn remove_child(&self, parent: &Handle, child: &Handle) -> bool {
        let removed = {
            let mut children = parent.children.borrow_mut();
            match children.iter().position(|c| Rc::ptr_eq(c, child)) {
                Some(index) => Some(children.remove(index)),
                None => None,
            }
        };
        match removed {
            Some(node) => {
                node.parent.set(None);
                self.record(Mutation::NodeRemoved(node));
                true
            }
            None => false,
        }
    }

    /// Replace the value of a text node. Ignored for any other kind of node.
    pub fn set_text(&self, node: &Handle, text: &str) {
        if let NodeData::Text { contents } = &node.data {
            *contents.borrow_mut() = text.to_string().into();
            self.record(Mutation::TextChanged(node.clone()));
        }
    }

    /// Put `replacements` where `node` is, in order, and detach `node`.
    ///
    /// Returns false, changing nothing, when `node` has no parent or its parent does not
    /// list it as a child.
    pub fn replace_with(&self, node: &Handle, replacements: Vec<Handle>) -> bool {
        let Some(parent) = parent_of(node) else {
            return false;
        };
        {
            let mut children = parent.children.borrow_mut();
            let Some(index) = children.iter().position(|c| Rc::ptr_eq(c, node)) else {
                return false;
            };
            for replacement in &replacements {
                set_parent(replacement, &parent);
            }
            children.remove(index);
            for (offset, replacement) in replacements.iter().enumerate() {
                children.insert(index + offset, replacement.clone());
            }
        }
        node.parent.set(None);

        self.record(Mutation::NodeRemoved(node.clone()));
        for replacement in replacements {
            self.record(Mutation::NodeAdded(replacement));
        }
        true
    }

    /// Drain the pending notifications as one batch.
    pub fn take_records(&self) -> MutationBatch {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.borrow().is_empty()
    }

    fn detach(&self, node: &Handle) {
        if let Some(parent) = parent_of(node) {
            if !self.remove_child(&parent, node) {
                node.parent.set(None);
            }
        }
    }

    fn record(&self, mutation: Mutation) {
        self.pending.borrow_mut().push(mutation);
    }
}

fn set_parent(child: &Handle, parent: &Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
}

/// Parent of `node`, if it is attached.
pub fn parent_of(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take()?;
    let parent = weak.upgrade();
    node.parent.set(Some(weak));
    parent
}

/// Create an HTML element with attributes
pub fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
pub fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Create a comment node
pub fn create_comment(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Comment {
            contents: text.to_string().into(),
        },
    })
}

/// Create an element and attach `children` to it directly, without recording anything.
///
/// Meant for assembling detached subtrees before they are inserted through the host.
pub fn create_element_with(tag: &str, attrs: Vec<(&str, &str)>, children: Vec<Handle>) -> Handle {
    let element = create_element(tag, attrs);
    for child in children {
        set_parent(&child, &element);
        element.children.borrow_mut().push(child);
    }
    element
}

/// Lowercase local tag name of an element.
pub fn tag_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

/// Value of attribute `name` on an element.
pub fn attribute(node: &Handle, name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// Value of a text node.
pub fn text_value(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

pub fn is_text(node: &Handle) -> bool {
    matches!(node.data, NodeData::Text { .. })
}

/// True for elements produced by the engine.
pub fn is_engine_output(node: &Handle) -> bool {
    attribute(node, MARKER_ATTR).is_some()
}

/// Concatenated text of `node` and all its descendants, in document order.
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
        return;
    }
    for child in node.children.borrow().iter() {
        collect_text(child, out);
    }
}

/// Build the node for one rewrite fragment.
pub fn fragment_node(fragment: &Fragment) -> Handle {
    match fragment {
        Fragment::Plain(text) => create_text(text),
        Fragment::Translated { token, name } => create_element_with(
            "span",
            vec![
                ("class", NAME_CLASS),
                (MARKER_ATTR, "translated"),
                (TOKEN_ATTR, token),
                ("title", token),
            ],
            vec![create_text(name)],
        ),
        Fragment::Annotated { token, name } => {
            let note = create_element_with(
                "span",
                vec![("class", NOTE_CLASS)],
                vec![create_text(&annotation_note(name))],
            );
            create_element_with(
                "span",
                vec![
                    ("class", ANNOTATED_CLASS),
                    (MARKER_ATTR, "annotated"),
                    (TOKEN_ATTR, token),
                ],
                vec![create_text(token), note],
            )
        }
    }
}

/// Short human readable description of a node, for logs.
pub fn describe(node: &Handle) -> String {
    match &node.data {
        NodeData::Document => "#document".to_string(),
        NodeData::Doctype { name, .. } => format!("<!DOCTYPE {}>", name),
        NodeData::Text { contents } => {
            let text = contents.borrow();
            let mut preview: String = text.chars().take(24).collect();
            if text.chars().count() > 24 {
                preview.push('…');
            }
            format!("#text {:?}", preview)
        }
        NodeData::Comment { .. } => "#comment".to_string(),
        NodeData::Element { name, .. } => format!("<{}>", &*name.local),
        NodeData::ProcessingInstruction { target, .. } => format!("<?{}>", target),
    }
}
