//! Editable-node exclusion
//!
//! The host decides which elements the engine must leave alone, typically anything a user can
//! type into. An excluded element is skipped together with its whole subtree.

use markup5ever_rcdom::Handle;

use crate::reveal::dom::{attribute, tag_name};

/// Predicate identifying elements the engine must not descend into or rewrite.
pub trait NodePolicy {
    fn is_excluded(&self, node: &Handle) -> bool;
}

impl<F> NodePolicy for F
where
    F: Fn(&Handle) -> bool,
{
    fn is_excluded(&self, node: &Handle) -> bool {
        self(node)
    }
}

pub const DEFAULT_EXCLUDED_TAGS: &[&str] = &["input", "textarea", "select", "script", "style"];

/// Exclusion by tag name plus the `contenteditable` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionPolicy {
    tags: Vec<String>,
    content_editable: bool,
}

impl ExclusionPolicy {
    pub fn new<I, S>(tags: I, content_editable: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tags: tags
                .into_iter()
                .map(|tag| tag.as_ref().to_ascii_lowercase())
                .collect(),
            content_editable,
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_TAGS, true)
    }
}

impl NodePolicy for ExclusionPolicy {
    fn is_excluded(&self, node: &Handle) -> bool {
        let Some(tag) = tag_name(node) else {
            return false;
        };
        if self.tags.iter().any(|excluded| excluded == tag) {
            return true;
        }
        self.content_editable
            && attribute(node, "contenteditable")
                .is_some_and(|value| !value.eq_ignore_ascii_case("false"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reveal::dom::{create_element, create_text};
    use rstest::rstest;

    #[rstest]
    #[case("input", vec![], true)]
    #[case("textarea", vec![], true)]
    #[case("div", vec![], false)]
    #[case("div", vec![("contenteditable", "")], true)]
    #[case("div", vec![("contenteditable", "true")], true)]
    #[case("div", vec![("contenteditable", "plaintext-only")], true)]
    #[case("div", vec![("contenteditable", "FALSE")], false)]
    fn default_policy(
        #[case] tag: &str,
        #[case] attrs: Vec<(&str, &str)>,
        #[case] excluded: bool,
    ) {
        let node = create_element(tag, attrs);
        assert_eq!(ExclusionPolicy::default().is_excluded(&node), excluded);
    }

    #[test]
    fn content_editable_can_be_ignored() {
        let policy = ExclusionPolicy::new(["INPUT"], false);
        let editable = create_element("div", vec![("contenteditable", "true")]);
        assert!(!policy.is_excluded(&editable));
        assert!(policy.is_excluded(&create_element("input", vec![])));
    }

    #[test]
    fn text_nodes_are_never_excluded() {
        assert!(!ExclusionPolicy::default().is_excluded(&create_text("input")));
    }

    #[test]
    fn closures_are_policies() {
        let policy = |node: &Handle| tag_name(node) == Some("code");
        assert!(policy.is_excluded(&create_element("code", vec![])));
    }
}
