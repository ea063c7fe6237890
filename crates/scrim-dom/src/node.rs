#![forbid(unsafe_code)]

//! Node identity and generational storage for the document arena.
//!
//! A [`NodeId`] is a weak reference: it stays `Copy` and cheap to hold, and
//! once the node it names is destroyed every outstanding copy becomes stale.
//! Stale ids are answered as "absent" by every query instead of aliasing a
//! newer node that reused the same slot.

use std::fmt;

use slotmap::{Key, SlotMap};

slotmap::new_key_type! {
    /// Weak, generation-checked handle to an element in a [`crate::Document`].
    pub struct NodeId;
}

impl NodeId {
    /// Arena slot index.
    #[inline]
    pub fn index(self) -> u32 {
        (self.data().as_ffi() & u64::from(u32::MAX)) as u32
    }

    /// Slot version this id was minted for.
    #[inline]
    pub fn generation(self) -> u32 {
        (self.data().as_ffi() >> 32) as u32
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index(), self.generation())
    }
}

/// Element payload stored in the arena.
#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) tag: String,
    /// Attributes in insertion order; names are unique.
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) text: String,
}

impl NodeData {
    pub(crate) fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            parent: None,
            children: Vec::new(),
            text: String::new(),
        }
    }

    pub(crate) fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Generational node storage.
///
/// Removing a node bumps its slot version, so ids minted before the removal
/// never match again even after the slot is reused.
pub(crate) type Arena = SlotMap<NodeId, NodeData>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_ids_go_stale() {
        let mut arena = Arena::default();
        let a = arena.insert(NodeData::new("div"));
        assert!(arena.get(a).is_some());
        assert!(arena.remove(a).is_some());
        assert!(arena.get(a).is_none());
        assert_eq!(arena.len(), 0);
    }

    #[test]
    fn reused_slot_does_not_alias() {
        let mut arena = Arena::default();
        let a = arena.insert(NodeData::new("div"));
        arena.remove(a);
        let b = arena.insert(NodeData::new("span"));
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(b).map(|n| n.tag.as_str()), Some("span"));
    }

    #[test]
    fn tag_is_lowercased() {
        let node = NodeData::new("BUTTON");
        assert_eq!(node.tag, "button");
    }
}
