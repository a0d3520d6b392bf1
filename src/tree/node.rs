use std::path::Path;

use slotmap::{new_key_type, SlotMap};

use crate::fs::discovery::PathEntry;
use crate::icons;

new_key_type! {
    /// Generational handle into the node arena. Stale ids (from a cleared
    /// arena or a removed node) never resolve.
    pub struct NodeId;
}

/// Arena holding every node of the current tree.
pub type NodeArena = SlotMap<NodeId, TreeNode>;

/// What a node stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A real filesystem entry.
    Entry(PathEntry),
    /// Transient child shown while discovery is in flight.
    Loading,
    /// Child carrying a discovery failure message.
    Error { message: String },
}

/// Expand/collapse marker shown before a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrefixIcon {
    #[default]
    None,
    Collapsed,
    Expanded,
}

/// A node in the file tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub kind: NodeKind,
    pub name: String,
    pub children: Vec<NodeId>,
    pub loaded: bool,
    pub loading: bool,
    pub expanded: bool,
    pub prefix_icon: PrefixIcon,
    pub level: usize,
    pub level_offset: u16,
    pub parent: Option<NodeId>,
    /// Previous node in the visible sequence.
    pub prev: Option<NodeId>,
    /// Next node in the visible sequence. For the last visible descendant of a
    /// subtree this is whatever follows the whole subtree.
    pub next: Option<NodeId>,
}

/// Where a new node sits in the tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct Position {
    pub level: usize,
    pub parent: Option<NodeId>,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
}

impl TreeNode {
    /// Create a node in its initial state: collapsed, unloaded, no children.
    pub fn new(kind: NodeKind, name: String, pos: Position, indent_per_level: u16) -> Self {
        let mut node = Self {
            kind,
            name,
            children: Vec::new(),
            loaded: false,
            loading: false,
            expanded: false,
            prefix_icon: PrefixIcon::None,
            level: 0,
            level_offset: 0,
            parent: pos.parent,
            prev: pos.prev,
            next: pos.next,
        };
        node.set_level(pos.level, indent_per_level);
        node.refresh_prefix_icon();
        node
    }

    pub fn entry(entry: PathEntry, pos: Position, indent_per_level: u16) -> Self {
        let name = entry.name.clone();
        Self::new(NodeKind::Entry(entry), name, pos, indent_per_level)
    }

    /// Placeholder shown while a directory is being discovered.
    pub fn loading(pos: Position, indent_per_level: u16) -> Self {
        let mut node = Self::new(NodeKind::Loading, "loading...".to_string(), pos, indent_per_level);
        node.loaded = true;
        node
    }

    /// Child that reports a failed discovery in place.
    pub fn error(message: &str, pos: Position, indent_per_level: u16) -> Self {
        let mut node = Self::new(
            NodeKind::Error {
                message: message.to_string(),
            },
            format!("Error: {message}"),
            pos,
            indent_per_level,
        );
        node.loaded = true;
        node
    }

    /// Root node for an opened path, named after its last `/` segment.
    pub fn root(path: &str, indent_per_level: u16) -> Self {
        let name = path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(path)
            .to_string();
        let entry = PathEntry {
            path: path.into(),
            name,
            is_dir: true,
            file_type: String::new(),
            icon: icons::FOLDER.to_string(),
        };
        Self::entry(entry, Position::default(), indent_per_level)
    }

    /// Root shown before any path is opened.
    pub fn placeholder_root(indent_per_level: u16) -> Self {
        let entry = PathEntry {
            path: Default::default(),
            name: "No Project loaded".to_string(),
            is_dir: true,
            file_type: String::new(),
            icon: icons::FOLDER.to_string(),
        };
        let mut node = Self::entry(entry, Position::default(), indent_per_level);
        node.loaded = true;
        node.refresh_prefix_icon();
        node
    }

    pub fn set_level(&mut self, level: usize, indent_per_level: u16) {
        self.level = level;
        self.level_offset = (level as u16).saturating_mul(indent_per_level);
    }

    /// Recompute the expand/collapse marker from the current state.
    ///
    /// A loaded directory without children shows no marker.
    pub fn refresh_prefix_icon(&mut self) {
        self.prefix_icon = if !self.is_dir() || (self.loaded && self.children.is_empty()) {
            PrefixIcon::None
        } else if self.expanded {
            PrefixIcon::Expanded
        } else {
            PrefixIcon::Collapsed
        };
    }

    pub fn path(&self) -> &Path {
        match &self.kind {
            NodeKind::Entry(e) => &e.path,
            _ => Path::new(""),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(&self.kind, NodeKind::Entry(e) if e.is_dir)
    }

    pub fn file_type(&self) -> &str {
        match &self.kind {
            NodeKind::Entry(e) => &e.file_type,
            _ => "",
        }
    }

    pub fn icon(&self) -> &str {
        match &self.kind {
            NodeKind::Entry(e) => &e.icon,
            NodeKind::Loading => icons::LOADING,
            NodeKind::Error { .. } => icons::ERROR,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        !matches!(self.kind, NodeKind::Entry(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, NodeKind::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDENT: u16 = 24;

    fn file(name: &str) -> PathEntry {
        PathEntry::from_path(Path::new(&format!("/proj/{name}")), false)
    }

    #[test]
    fn new_node_has_derived_defaults() {
        let pos = Position {
            level: 2,
            ..Default::default()
        };
        let node = TreeNode::entry(file("a.txt"), pos, INDENT);
        assert_eq!(node.name, "a.txt");
        assert_eq!(node.level, 2);
        assert_eq!(node.level_offset, 48);
        assert!(!node.loaded);
        assert!(!node.loading);
        assert!(!node.expanded);
        assert!(node.children.is_empty());
        assert_eq!(node.prefix_icon, PrefixIcon::None);
    }

    #[test]
    fn unloaded_directory_shows_collapsed_marker() {
        let entry = PathEntry::from_path(Path::new("/proj/sub"), true);
        let node = TreeNode::entry(entry, Position::default(), INDENT);
        assert_eq!(node.prefix_icon, PrefixIcon::Collapsed);
    }

    #[test]
    fn loaded_empty_directory_has_no_marker() {
        let entry = PathEntry::from_path(Path::new("/proj/empty"), true);
        let mut node = TreeNode::entry(entry, Position::default(), INDENT);
        node.loaded = true;
        node.refresh_prefix_icon();
        assert_eq!(node.prefix_icon, PrefixIcon::None);
    }

    #[test]
    fn root_named_after_last_segment() {
        assert_eq!(TreeNode::root("/home/me/proj", INDENT).name, "proj");
        assert_eq!(TreeNode::root("proj", INDENT).name, "proj");
        assert_eq!(TreeNode::root("/home/me/proj/", INDENT).name, "proj");
        assert_eq!(TreeNode::root("/", INDENT).name, "/");
    }

    #[test]
    fn root_is_unloaded_directory() {
        let root = TreeNode::root("proj", INDENT);
        assert!(root.is_dir());
        assert!(!root.loaded);
        assert_eq!(root.level, 0);
        assert!(root.prev.is_none());
        assert!(root.parent.is_none());
        assert_eq!(root.path(), Path::new("proj"));
    }

    #[test]
    fn synthetic_nodes_are_tagged() {
        let loading = TreeNode::loading(Position::default(), INDENT);
        assert_eq!(loading.name, "loading...");
        assert!(loading.is_synthetic());
        assert!(!loading.is_dir());
        assert_eq!(loading.path(), Path::new(""));
        assert_eq!(loading.icon(), icons::LOADING);

        let error = TreeNode::error("permission denied", Position::default(), INDENT);
        assert_eq!(error.name, "Error: permission denied");
        assert!(error.is_error());
        assert_eq!(error.file_type(), "");
    }

    #[test]
    fn placeholder_root_is_loaded_and_empty() {
        let root = TreeNode::placeholder_root(INDENT);
        assert_eq!(root.name, "No Project loaded");
        assert!(root.loaded);
        assert!(root.children.is_empty());
    }
}
