//! Tree state: the node arena, the expand/collapse/load state machine, and
//! the virtual window that renders a bounded slice of it.

pub mod linkage;
pub mod node;
pub mod window;

use std::path::{Path, PathBuf};

pub use node::{NodeArena, NodeId, NodeKind, Position, PrefixIcon, TreeNode};
pub use window::VirtualWindow;

use crate::fs::discovery::{DiscoveryError, PathEntry};

/// Layout and behavior knobs for the tree, resolved from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeSettings {
    pub row_height: u32,
    pub indent_per_level: u16,
    pub viewport_capacity: usize,
    /// Re-run discovery when a directory whose listing failed is expanded again.
    pub retry_failed: bool,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            row_height: 1,
            indent_per_level: 2,
            viewport_capacity: 10,
            retry_failed: true,
        }
    }
}

/// A directory listing the host should fetch and feed back through
/// [`TreeState::finish_discovery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryRequest {
    pub node: NodeId,
    pub path: PathBuf,
}

/// What a click did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing happened (stale index, or the directory is already loading).
    Ignored,
    /// A file or synthetic node was focused.
    Focused,
    Expanded { inserted: usize },
    Collapsed { removed: usize },
    /// First expansion: a placeholder is shown until discovery finishes.
    Loading(DiscoveryRequest),
}

/// State for the tree view.
pub struct TreeState {
    arena: NodeArena,
    root: NodeId,
    window: VirtualWindow,
    focused: Option<NodeId>,
    settings: TreeSettings,
}

impl TreeState {
    /// Create a tree showing the "No Project loaded" placeholder root.
    pub fn new(settings: TreeSettings) -> Self {
        let mut arena = NodeArena::with_key();
        let root = arena.insert(TreeNode::placeholder_root(settings.indent_per_level));
        let mut window = VirtualWindow::new(settings.viewport_capacity, settings.row_height);
        window.reset(root);
        Self {
            arena,
            root,
            window,
            focused: None,
            settings,
        }
    }

    /// Replace the whole tree with a fresh root for `path` and start loading it.
    ///
    /// An empty path is a no-op.
    pub fn open_path(&mut self, path: &Path) -> Option<DiscoveryRequest> {
        if !self.reset_root(path) {
            return None;
        }
        match self.click_node(self.root) {
            ClickOutcome::Loading(request) => Some(request),
            _ => None,
        }
    }

    /// Replace the tree with an unloaded, collapsed root for `path`.
    ///
    /// Every previously issued [`NodeId`] stops resolving.
    pub fn reset_root(&mut self, path: &Path) -> bool {
        if path.as_os_str().is_empty() {
            return false;
        }
        self.arena.clear();
        self.root = self.arena.insert(TreeNode::root(
            &path.to_string_lossy(),
            self.settings.indent_per_level,
        ));
        self.window.reset(self.root);
        self.focused = None;
        tracing::info!(path = %path.display(), "opened root");
        true
    }

    #[cfg(test)]
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &TreeNode {
        &self.arena[self.root]
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.arena.get(id)
    }

    pub fn window(&self) -> &VirtualWindow {
        &self.window
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Window index of the focused node, if it is on screen.
    pub fn focused_index(&self) -> Option<usize> {
        self.focused.and_then(|id| self.window.position(id))
    }

    /// Nodes currently in the window, in display order.
    pub fn window_nodes(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> + '_ {
        self.window
            .buffer()
            .iter()
            .filter_map(move |&id| self.arena.get(id).map(|n| (id, n)))
    }

    /// The whole visible sequence, walked from the root.
    pub fn visible_sequence(&self) -> impl Iterator<Item = NodeId> + '_ {
        linkage::walk_forward(&self.arena, self.root)
    }

    /// Click the node shown at `index` in the window.
    pub fn click(&mut self, index: usize) -> ClickOutcome {
        match self.window.get(index) {
            Some(id) => self.click_node(id),
            None => ClickOutcome::Ignored,
        }
    }

    /// Advance `id` through its state machine.
    pub fn click_node(&mut self, id: NodeId) -> ClickOutcome {
        let Some(node) = self.arena.get(id) else {
            return ClickOutcome::Ignored;
        };
        self.focused = Some(id);

        if !node.is_dir() {
            return ClickOutcome::Focused;
        }
        if node.loading {
            tracing::debug!(name = %node.name, "click ignored while loading");
            return ClickOutcome::Ignored;
        }
        match (node.loaded, node.expanded) {
            (true, true) => self.collapse(id),
            (true, false) => self.expand(id),
            (false, _) => self.begin_load(id),
        }
    }

    fn expand(&mut self, id: NodeId) -> ClickOutcome {
        let indent = self.settings.indent_per_level;
        let node = &mut self.arena[id];
        node.expanded = true;
        node.refresh_prefix_icon();
        let children = node.children.clone();

        let inserted = linkage::link_children(&mut self.arena, id, indent);
        self.notify_inserted(id, &children);
        tracing::debug!(inserted, "expanded");
        ClickOutcome::Expanded { inserted }
    }

    fn collapse(&mut self, id: NodeId) -> ClickOutcome {
        let removed = linkage::unlink_subtree(&mut self.arena, id);
        self.arena[id].expanded = false;

        let node = &self.arena[id];
        let failed = node.children.len() == 1
            && self
                .arena
                .get(node.children[0])
                .is_some_and(TreeNode::is_error);
        if failed && self.settings.retry_failed {
            let node = &mut self.arena[id];
            let stale = std::mem::take(&mut node.children);
            node.loaded = false;
            for child in stale {
                self.arena.remove(child);
            }
        }
        self.arena[id].refresh_prefix_icon();

        self.notify_removed(id, removed);
        tracing::debug!(removed, "collapsed");
        ClickOutcome::Collapsed { removed }
    }

    fn begin_load(&mut self, id: NodeId) -> ClickOutcome {
        let indent = self.settings.indent_per_level;
        let placeholder = self.arena.insert(TreeNode::loading(
            Position {
                parent: Some(id),
                ..Default::default()
            },
            indent,
        ));

        let node = &mut self.arena[id];
        node.children = vec![placeholder];
        node.loading = true;
        node.expanded = true;
        node.refresh_prefix_icon();
        let request = DiscoveryRequest {
            node: id,
            path: node.path().to_path_buf(),
        };

        linkage::link_children(&mut self.arena, id, indent);
        self.notify_inserted(id, &[placeholder]);
        tracing::debug!(path = %request.path.display(), "discovery requested");
        ClickOutcome::Loading(request)
    }

    /// Apply a finished discovery to `id`.
    ///
    /// Returns `false` without touching anything when the node is gone, no
    /// longer attached to the current root, or not waiting for a result.
    pub fn finish_discovery(
        &mut self,
        id: NodeId,
        result: Result<Vec<PathEntry>, DiscoveryError>,
    ) -> bool {
        match self.arena.get(id) {
            Some(node) if node.loading && self.is_attached(id) => {}
            _ => {
                tracing::debug!("dropping discovery result for a detached node");
                return false;
            }
        }

        let removed = linkage::unlink_subtree(&mut self.arena, id);
        let stale = std::mem::take(&mut self.arena[id].children);
        if self.focused.is_some_and(|f| stale.contains(&f)) {
            self.focused = Some(id);
        }
        for child in stale {
            self.arena.remove(child);
        }
        self.notify_removed(id, removed);

        let indent = self.settings.indent_per_level;
        let pos = Position {
            level: self.arena[id].level + 1,
            parent: Some(id),
            ..Default::default()
        };
        let children: Vec<NodeId> = match result {
            Ok(entries) => entries
                .into_iter()
                .map(|entry| self.arena.insert(TreeNode::entry(entry, pos, indent)))
                .collect(),
            Err(err) => {
                tracing::warn!(%err, "showing discovery error in tree");
                vec![self.arena.insert(TreeNode::error(&err.message, pos, indent))]
            }
        };

        let node = &mut self.arena[id];
        node.children = children.clone();
        node.loading = false;
        node.loaded = true;
        node.refresh_prefix_icon();
        if node.expanded {
            linkage::link_children(&mut self.arena, id, indent);
            self.notify_inserted(id, &children);
        }
        true
    }

    /// Whether `id` still hangs off the current root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            match self.arena.get(current) {
                Some(node) => match node.parent {
                    Some(parent) => current = parent,
                    None => return current == self.root,
                },
                None => return false,
            }
        }
    }

    /// Logical index of `id` in the visible sequence.
    pub fn logical_index(&self, id: NodeId) -> Option<usize> {
        self.visible_sequence().position(|n| n == id)
    }

    fn notify_inserted(&mut self, id: NodeId, nodes: &[NodeId]) {
        if nodes.is_empty() {
            return;
        }
        match self.window.position(id) {
            Some(index) => self.window.insert_after(index, nodes),
            None => {
                if let Some(at) = self.logical_index(id) {
                    self.window
                        .shift_and_resync(at, nodes.len() as isize, self.root, &self.arena);
                }
            }
        }
    }

    fn notify_removed(&mut self, id: NodeId, count: usize) {
        if count == 0 {
            return;
        }
        match self.window.position(id) {
            Some(index) => {
                self.window.remove_after(index, count, &self.arena);
                self.window.settle(self.root, &self.arena);
            }
            None => {
                if let Some(at) = self.logical_index(id) {
                    self.window
                        .shift_and_resync(at, -(count as isize), self.root, &self.arena);
                }
            }
        }
    }

    /// Apply a wheel delta in display units.
    pub fn scroll_by(&mut self, delta: i64) -> bool {
        self.window.scroll_by(delta, self.root, &self.arena)
    }

    /// Scroll by whole rows.
    pub fn scroll_rows(&mut self, rows: i64) -> bool {
        self.scroll_by(rows * i64::from(self.settings.row_height))
    }

    /// Resize the window, e.g. after a terminal resize.
    pub fn set_viewport_capacity(&mut self, rows: usize) {
        self.settings.viewport_capacity = rows.max(1);
        self.window.set_capacity(rows, self.root, &self.arena);
    }

    /// Move focus to the next visible node, scrolling it into view.
    pub fn focus_next(&mut self) {
        let target = match self.focused.and_then(|f| self.arena.get(f)) {
            Some(node) => node.next,
            None => self.window.get(0),
        };
        if let Some(id) = target {
            self.focused = Some(id);
            self.reveal(id);
        }
    }

    /// Move focus to the previous visible node, scrolling it into view.
    pub fn focus_prev(&mut self) {
        let target = match self.focused.and_then(|f| self.arena.get(f)) {
            Some(node) => node.prev,
            None => self.window.get(0),
        };
        if let Some(id) = target {
            self.focused = Some(id);
            self.reveal(id);
        }
    }

    pub fn focus_first(&mut self) {
        self.focused = Some(self.root);
        self.window.scroll_to_row(0, self.root, &self.arena);
    }

    pub fn focus_last(&mut self) {
        let last = self.visible_sequence().last();
        if let Some(id) = last {
            self.focused = Some(id);
            self.reveal(id);
        }
    }

    /// Focus the node at `index` in the window without clicking it.
    pub fn focus_index(&mut self, index: usize) {
        if let Some(id) = self.window.get(index) {
            self.focused = Some(id);
        }
    }

    /// Move focus to the focused node's parent.
    pub fn focus_parent(&mut self) {
        let parent = self
            .focused
            .and_then(|f| self.arena.get(f))
            .and_then(|n| n.parent);
        if let Some(id) = parent {
            self.focused = Some(id);
            self.reveal(id);
        }
    }

    fn reveal(&mut self, id: NodeId) {
        if self.window.position(id).is_some() {
            return;
        }
        let Some(row) = self.logical_index(id) else {
            return;
        };
        let top = if row < self.window.top_index() {
            row
        } else {
            (row + 1).saturating_sub(self.window.capacity())
        };
        self.window.scroll_to_row(top, self.root, &self.arena);
    }
}
