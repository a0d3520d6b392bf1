//! Maintenance of the `prev`/`next` chain that flattens the tree into its
//! visible, depth-first order.
//!
//! Only nodes in the visible sequence carry meaningful links. Children of a
//! collapsed node keep whatever links they had and are relinked on expand.

use super::node::{NodeArena, NodeId};

/// Splice `parent`'s children into the sequence right after `parent`.
///
/// Children are expected to be collapsed. Returns the number of nodes that
/// became visible.
pub fn link_children(arena: &mut NodeArena, parent: NodeId, indent_per_level: u16) -> usize {
    let Some(p) = arena.get(parent) else {
        return 0;
    };
    if p.children.is_empty() {
        return 0;
    }
    let children = p.children.clone();
    let level = p.level + 1;
    let after = p.next;

    let mut prev = parent;
    for (i, &child) in children.iter().enumerate() {
        let next = children.get(i + 1).copied().or(after);
        if let Some(node) = arena.get_mut(child) {
            node.set_level(level, indent_per_level);
            node.parent = Some(parent);
            node.prev = Some(prev);
            node.next = next;
        }
        prev = child;
    }

    if let Some(follower) = after.and_then(|a| arena.get_mut(a)) {
        follower.prev = Some(prev);
    }
    if let Some(p) = arena.get_mut(parent) {
        p.next = Some(children[0]);
    }
    children.len()
}

/// Take `id`'s visible descendants out of the sequence and collapse every
/// expanded descendant, deepest first.
///
/// Afterwards `id.next` is whatever followed the subtree. `id` itself keeps
/// its `expanded` flag; the caller owns that transition. Returns the number
/// of nodes removed from the sequence.
pub fn unlink_subtree(arena: &mut NodeArena, id: NodeId) -> usize {
    match arena.get(id) {
        Some(node) if node.expanded && !node.children.is_empty() => {}
        _ => return 0,
    }

    let removed = visible_descendants(arena, id);
    let successor = successor_of(arena, id);
    collapse_descendants(arena, id);

    if let Some(node) = arena.get_mut(id) {
        node.next = successor;
    }
    if let Some(follower) = successor.and_then(|s| arena.get_mut(s)) {
        follower.prev = Some(id);
    }
    removed
}

fn collapse_descendants(arena: &mut NodeArena, id: NodeId) {
    let children = match arena.get(id) {
        Some(node) => node.children.clone(),
        None => return,
    };
    for child in children {
        let expanded_with_children = arena
            .get(child)
            .is_some_and(|c| c.expanded && !c.children.is_empty());
        if expanded_with_children {
            let successor = successor_of(arena, child);
            collapse_descendants(arena, child);
            if let Some(c) = arena.get_mut(child) {
                c.next = successor;
            }
        }
        if let Some(c) = arena.get_mut(child) {
            c.expanded = false;
            c.refresh_prefix_icon();
        }
    }
}

/// The node that follows `id`'s whole visible subtree.
pub fn successor_of(arena: &NodeArena, id: NodeId) -> Option<NodeId> {
    arena
        .get(last_visible_descendant(arena, id))
        .and_then(|n| n.next)
}

/// Deepest last visible node of `id`'s subtree, or `id` itself when nothing
/// below it is visible.
pub fn last_visible_descendant(arena: &NodeArena, id: NodeId) -> NodeId {
    let mut current = id;
    while let Some(node) = arena.get(current) {
        match node.children.last() {
            Some(&last) if node.expanded => current = last,
            _ => break,
        }
    }
    current
}

/// Number of nodes currently visible below `id`.
pub fn visible_descendants(arena: &NodeArena, id: NodeId) -> usize {
    match arena.get(id) {
        Some(node) if node.expanded => node
            .children
            .iter()
            .map(|&c| 1 + visible_descendants(arena, c))
            .sum(),
        _ => 0,
    }
}

/// Walk the sequence forward from `start`, inclusive.
pub fn walk_forward(arena: &NodeArena, start: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    std::iter::successors(arena.contains_key(start).then_some(start), move |id| {
        arena.get(*id).and_then(|n| n.next)
    })
}

/// Walk the sequence backward from `start`, inclusive.
pub fn walk_backward(arena: &NodeArena, start: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    std::iter::successors(arena.contains_key(start).then_some(start), move |id| {
        arena.get(*id).and_then(|n| n.prev)
    })
}
