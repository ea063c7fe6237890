#![forbid(unsafe_code)]

//! Focusability rules and the tabbable-set resolver.
//!
//! An element is *focusable* when it can receive programmatic focus and
//! *tabbable* when sequential keyboard navigation can reach it.
//!
//! | Rule | focusable | tabbable |
//! |------|-----------|----------|
//! | `button`, `input`, `select`, `textarea`, `iframe`, `summary`, `a[href]`, `[contenteditable]` | yes | yes |
//! | explicit `tabindex >= 0` | yes | yes |
//! | explicit negative `tabindex` | yes | no |
//! | `disabled` form control, `input[type=hidden]` | no | no |
//! | form control inside `fieldset[disabled]` (outside its first `legend`) | no | no |
//! | inside a `hidden` subtree | no | no |
//! | inside an `inert` subtree | yes | no |
//!
//! Order is document order; positive `tabindex` values do not reorder.

use crate::document::Document;
use crate::node::NodeId;

const NATIVE_FOCUSABLE: &[&str] = &["button", "input", "select", "textarea", "iframe", "summary"];
const DISABLEABLE: &[&str] = &["button", "input", "select", "textarea", "fieldset"];

/// Effective tab index, or `None` when the element is not focusable by kind.
pub fn tab_index(doc: &Document, id: NodeId) -> Option<i32> {
    if let Some(raw) = doc.attribute(id, "tabindex")
        && let Ok(value) = raw.trim().parse::<i32>()
    {
        return Some(value);
    }
    let tag = doc.tag_name(id)?;
    let native = NATIVE_FOCUSABLE.contains(&tag.as_str())
        || (matches!(tag.as_str(), "a" | "area") && doc.has_attribute(id, "href"))
        || doc
            .attribute(id, "contenteditable")
            .is_some_and(|v| !v.eq_ignore_ascii_case("false"));
    native.then_some(0)
}

fn excluded_locally(doc: &Document, id: NodeId) -> bool {
    let tag = doc.tag_name(id).unwrap_or_default();
    (DISABLEABLE.contains(&tag.as_str())
        && (doc.has_attribute(id, "disabled") || within_disabled_fieldset(doc, id)))
        || (tag == "input"
            && doc
                .attribute(id, "type")
                .is_some_and(|t| t.eq_ignore_ascii_case("hidden")))
}

/// A disabled `fieldset` disables every control below it except those in
/// its first `legend` child.
fn within_disabled_fieldset(doc: &Document, id: NodeId) -> bool {
    let mut child = id;
    while let Some(parent) = doc.parent(child) {
        if doc.has_attribute(parent, "disabled")
            && doc.tag_name(parent).as_deref() == Some("fieldset")
            && first_legend(doc, parent) != Some(child)
        {
            return true;
        }
        child = parent;
    }
    false
}

fn first_legend(doc: &Document, fieldset: NodeId) -> Option<NodeId> {
    doc.children(fieldset)
        .into_iter()
        .find(|c| doc.tag_name(*c).as_deref() == Some("legend"))
}

fn within_marked(doc: &Document, id: NodeId, marker: &str) -> bool {
    let mut cursor = Some(id);
    while let Some(node) = cursor {
        if doc.has_attribute(node, marker) {
            return true;
        }
        cursor = doc.parent(node);
    }
    false
}

/// Whether the element itself or an ancestor carries `hidden` or `inert`.
pub fn is_in_excluded_subtree(doc: &Document, id: NodeId) -> bool {
    within_marked(doc, id, "hidden") || within_marked(doc, id, "inert")
}

/// Can receive programmatic focus.
pub fn is_focusable(doc: &Document, id: NodeId) -> bool {
    doc.is_alive(id)
        && tab_index(doc, id).is_some()
        && !excluded_locally(doc, id)
        && !within_marked(doc, id, "hidden")
}

/// Reachable by sequential keyboard navigation.
pub fn is_tabbable(doc: &Document, id: NodeId) -> bool {
    is_focusable(doc, id)
        && tab_index(doc, id).is_some_and(|i| i >= 0)
        && !within_marked(doc, id, "inert")
}

/// The ordered tabbable descendants of a root.
///
/// Nothing is cached: every [`iter`](Self::iter) walks the live tree, so the
/// set reflects mutations made since the last call.
#[derive(Debug, Clone)]
pub struct TabbableSet {
    document: Document,
    root: NodeId,
}

impl TabbableSet {
    pub fn new(document: &Document, root: NodeId) -> Self {
        Self {
            document: document.clone(),
            root,
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Fresh lazy walk in document order.
    pub fn iter(&self) -> Tabbables {
        let blocked =
            !self.document.is_alive(self.root) || is_in_excluded_subtree(&self.document, self.root);
        let stack = if blocked {
            Vec::new()
        } else {
            self.document.children(self.root).into_iter().rev().collect()
        };
        Tabbables {
            document: self.document.clone(),
            stack,
        }
    }

    pub fn first(&self) -> Option<NodeId> {
        self.iter().next()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.iter().last()
    }

    pub fn is_empty(&self) -> bool {
        self.first().is_none()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.iter().any(|n| n == id)
    }
}

/// Lazy walk produced by [`TabbableSet::iter`]. Subtrees marked `hidden` or
/// `inert` are pruned without being visited.
pub struct Tabbables {
    document: Document,
    stack: Vec<NodeId>,
}

impl Iterator for Tabbables {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while let Some(id) = self.stack.pop() {
            let doc = &self.document;
            if !doc.is_alive(id) || doc.has_attribute(id, "hidden") || doc.has_attribute(id, "inert")
            {
                continue;
            }
            self.stack.extend(doc.children(id).into_iter().rev());
            if tab_index(doc, id).is_some_and(|i| i >= 0) && !excluded_locally(doc, id) {
                return Some(id);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(doc: &Document, parent: NodeId, tag: &str) -> NodeId {
        doc.append_element(parent, tag).unwrap()
    }

    #[test]
    fn native_controls_are_tabbable() {
        let doc = Document::new();
        let body = doc.body();
        let button = el(&doc, body, "button");
        let input = el(&doc, body, "input");
        let div = el(&doc, body, "div");
        let link = el(&doc, body, "a");
        assert!(is_tabbable(&doc, button));
        assert!(is_tabbable(&doc, input));
        assert!(!is_focusable(&doc, div));
        assert!(!is_focusable(&doc, link));
        doc.set_attribute(link, "href", "#").unwrap();
        assert!(is_tabbable(&doc, link));
    }

    #[test]
    fn negative_tabindex_is_focusable_not_tabbable() {
        let doc = Document::new();
        let div = el(&doc, doc.body(), "div");
        doc.set_attribute(div, "tabindex", "-1").unwrap();
        assert!(is_focusable(&doc, div));
        assert!(!is_tabbable(&doc, div));
        assert_eq!(tab_index(&doc, div), Some(-1));
    }

    #[test]
    fn disabled_and_hidden_inputs_excluded() {
        let doc = Document::new();
        let button = el(&doc, doc.body(), "button");
        doc.set_attribute(button, "disabled", "").unwrap();
        let hidden_input = el(&doc, doc.body(), "input");
        doc.set_attribute(hidden_input, "type", "hidden").unwrap();
        assert!(!is_focusable(&doc, button));
        assert!(!is_focusable(&doc, hidden_input));
    }

    #[test]
    fn disabled_fieldset_excludes_descendant_controls() {
        let doc = Document::new();
        let root = el(&doc, doc.body(), "form");
        let fieldset = el(&doc, root, "fieldset");
        doc.set_attribute(fieldset, "disabled", "").unwrap();
        let legend = el(&doc, fieldset, "legend");
        let in_legend = el(&doc, legend, "button");
        let group = el(&doc, fieldset, "div");
        let nested = el(&doc, group, "input");
        let link = el(&doc, group, "a");
        doc.set_attribute(link, "href", "#").unwrap();
        let second_legend = el(&doc, fieldset, "legend");
        let in_second_legend = el(&doc, second_legend, "button");

        assert!(!is_focusable(&doc, nested));
        assert!(!is_focusable(&doc, in_second_legend));
        assert!(is_tabbable(&doc, in_legend));
        assert!(is_tabbable(&doc, link));
        assert_eq!(
            TabbableSet::new(&doc, root).iter().collect::<Vec<_>>(),
            vec![in_legend, link]
        );

        doc.remove_attribute(fieldset, "disabled").unwrap();
        assert!(is_tabbable(&doc, nested));
    }

    #[test]
    fn inert_blocks_tabbing_but_not_programmatic_focus() {
        let doc = Document::new();
        let region = el(&doc, doc.body(), "div");
        doc.set_attribute(region, "inert", "true").unwrap();
        let button = el(&doc, region, "button");
        assert!(is_focusable(&doc, button));
        assert!(!is_tabbable(&doc, button));
    }

    #[test]
    fn set_follows_document_order_and_prunes() {
        let doc = Document::new();
        let root = el(&doc, doc.body(), "section");
        let first = el(&doc, root, "button");
        let hidden = el(&doc, root, "div");
        doc.set_attribute(hidden, "hidden", "").unwrap();
        let _buried = el(&doc, hidden, "button");
        let nested = el(&doc, root, "div");
        let late = el(&doc, nested, "input");
        doc.set_attribute(late, "tabindex", "5").unwrap();
        let last = el(&doc, root, "textarea");

        let set = TabbableSet::new(&doc, root);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![first, late, last]);
        assert_eq!(set.first(), Some(first));
        assert_eq!(set.last(), Some(last));
        assert!(!set.contains(root));
    }

    #[test]
    fn set_is_recomputed_on_each_walk() {
        let doc = Document::new();
        let root = el(&doc, doc.body(), "div");
        let set = TabbableSet::new(&doc, root);
        assert!(set.is_empty());
        let button = el(&doc, root, "button");
        assert_eq!(set.first(), Some(button));
        doc.set_attribute(button, "disabled", "").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn root_inside_inert_region_yields_nothing() {
        let doc = Document::new();
        let outer = el(&doc, doc.body(), "div");
        doc.set_attribute(outer, "inert", "").unwrap();
        let root = el(&doc, outer, "div");
        el(&doc, root, "button");
        assert!(TabbableSet::new(&doc, root).is_empty());
    }
}
