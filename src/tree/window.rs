//! Bounded buffer of the nodes that are actually rendered.
//!
//! The buffer is a contiguous slice of the visible sequence starting at the
//! node whose logical index is `top_index`. Structural changes patch the
//! buffer in place; scrolling re-derives the start node by walking links.

use super::linkage::{walk_backward, walk_forward};
use super::node::{NodeArena, NodeId};

#[derive(Debug, Clone)]
pub struct VirtualWindow {
    buffer: Vec<NodeId>,
    capacity: usize,
    node_count: usize,
    row_height: u32,
    raw_offset: u64,
    top_index: usize,
}

impl VirtualWindow {
    pub fn new(capacity: usize, row_height: u32) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            node_count: 0,
            row_height: row_height.max(1),
            raw_offset: 0,
            top_index: 0,
        }
    }

    /// Start over with `root` as the only visible node.
    pub fn reset(&mut self, root: NodeId) {
        self.buffer.clear();
        self.buffer.push(root);
        self.node_count = 1;
        self.raw_offset = 0;
        self.top_index = 0;
    }

    pub fn buffer(&self) -> &[NodeId] {
        &self.buffer
    }

    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.buffer.get(index).copied()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of nodes in the whole visible sequence.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn row_height(&self) -> u32 {
        self.row_height
    }

    /// Logical index of the first buffered node.
    pub fn top_index(&self) -> usize {
        self.top_index
    }

    /// Height of the whole visible sequence, for sizing a scroll container.
    pub fn total_extent(&self) -> u64 {
        self.node_count as u64 * u64::from(self.row_height)
    }

    /// Accumulated scroll offset, before row alignment.
    #[cfg(test)]
    pub fn raw_offset(&self) -> u64 {
        self.raw_offset
    }

    /// Scroll offset snapped down to a row boundary.
    pub fn offset(&self) -> u64 {
        let row = u64::from(self.row_height);
        (self.raw_offset / row) * row
    }

    fn max_offset(&self) -> u64 {
        self.node_count.saturating_sub(self.capacity) as u64 * u64::from(self.row_height)
    }

    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.buffer.iter().position(|&n| n == id)
    }

    /// `nodes` became visible right after the buffered node at `index`.
    ///
    /// New nodes take the slots after `index` as far as capacity allows; what
    /// does not fit is dropped from the buffer only. Slots left over are
    /// backfilled with what used to follow `index`.
    pub fn insert_after(&mut self, index: usize, nodes: &[NodeId]) {
        if nodes.is_empty() {
            return;
        }
        self.node_count += nodes.len();

        let split = (index + 1).min(self.buffer.len());
        let drawable = self.capacity.saturating_sub(split);
        let draw = drawable.min(nodes.len());
        let rest = drawable.saturating_sub(nodes.len());

        let tail: Vec<NodeId> = self.buffer.drain(split..).collect();
        self.buffer.extend_from_slice(&nodes[..draw]);
        self.buffer.extend(tail.into_iter().take(rest));
    }

    /// `count` nodes following the buffered node at `index` left the visible
    /// sequence. Links in `arena` must already reflect the removal.
    pub fn remove_after(&mut self, index: usize, count: usize, arena: &NodeArena) {
        if count == 0 {
            return;
        }
        self.node_count = self.node_count.saturating_sub(count);

        let start = (index + 1).min(self.buffer.len());
        let end = (start + count).min(self.buffer.len());
        self.buffer.drain(start..end);
        self.refill(arena);
    }

    /// Append nodes after the last buffered one until full or the chain ends.
    pub fn refill(&mut self, arena: &NodeArena) {
        let mut next = self
            .buffer
            .last()
            .and_then(|&id| arena.get(id))
            .and_then(|n| n.next);
        while let Some(id) = next {
            if self.buffer.len() >= self.capacity {
                break;
            }
            self.buffer.push(id);
            next = arena.get(id).and_then(|n| n.next);
        }
    }

    /// Apply a wheel/scroll delta. Returns `true` when the first visible row changed.
    pub fn scroll_by(&mut self, delta: i64, root: NodeId, arena: &NodeArena) -> bool {
        let raw = if delta.is_negative() {
            self.raw_offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.raw_offset.saturating_add(delta as u64)
        };
        self.raw_offset = raw.min(self.max_offset());
        self.sync_top(root, arena)
    }

    /// Scroll so that logical row `row` is at the top (clamped).
    pub fn scroll_to_row(&mut self, row: usize, root: NodeId, arena: &NodeArena) -> bool {
        self.raw_offset = (row as u64 * u64::from(self.row_height)).min(self.max_offset());
        self.sync_top(root, arena)
    }

    /// Re-clamp the offset after the sequence shrank and reseek if needed.
    pub fn settle(&mut self, root: NodeId, arena: &NodeArena) -> bool {
        self.raw_offset = self.raw_offset.min(self.max_offset());
        self.sync_top(root, arena)
    }

    pub fn set_capacity(&mut self, capacity: usize, root: NodeId, arena: &NodeArena) {
        let capacity = capacity.max(1);
        if capacity == self.capacity {
            return;
        }
        self.capacity = capacity;
        self.buffer.truncate(capacity);
        self.refill(arena);
        self.settle(root, arena);
    }

    /// Shift the top row after `delta` nodes appeared (or disappeared, when
    /// negative) right after logical index `at`, then rebuild the buffer.
    ///
    /// Used when the changed node is not in the buffer.
    pub fn shift_and_resync(&mut self, at: usize, delta: isize, root: NodeId, arena: &NodeArena) {
        if delta >= 0 {
            self.node_count += delta as usize;
            if at < self.top_index {
                self.top_index += delta as usize;
            }
        } else {
            let removed = delta.unsigned_abs();
            self.node_count = self.node_count.saturating_sub(removed);
            if at < self.top_index {
                self.top_index = if self.top_index > at + removed {
                    self.top_index - removed
                } else {
                    at + 1
                };
            }
        }
        self.raw_offset = self.top_index as u64 * u64::from(self.row_height);
        self.raw_offset = self.raw_offset.min(self.max_offset());
        self.top_index = (self.offset() / u64::from(self.row_height)) as usize;
        self.resync(root, arena);
    }

    /// Rebuild the buffer from scratch by walking from the root anchor.
    pub fn resync(&mut self, root: NodeId, arena: &NodeArena) {
        let top = walk_forward(arena, root)
            .take(self.top_index + 1)
            .enumerate()
            .last();
        if let Some((index, id)) = top {
            self.top_index = index;
            self.buffer = walk_forward(arena, id).take(self.capacity).collect();
        }
    }

    fn sync_top(&mut self, root: NodeId, arena: &NodeArena) -> bool {
        let row = (self.offset() / u64::from(self.row_height)) as usize;
        if row == self.top_index {
            return false;
        }

        let current = self.buffer.first().copied().filter(|&t| arena.contains_key(t));
        let target = current
            .and_then(|top| {
                if row > self.top_index {
                    walk_forward(arena, top).nth(row - self.top_index)
                } else {
                    walk_backward(arena, top).nth(self.top_index - row)
                }
            })
            .or_else(|| walk_forward(arena, root).nth(row));

        match target {
            Some(top) => {
                self.top_index = row;
                self.buffer = walk_forward(arena, top).take(self.capacity).collect();
                true
            }
            None => {
                self.top_index = 0;
                self.raw_offset = 0;
                self.buffer = walk_forward(arena, root).take(self.capacity).collect();
                true
            }
        }
    }
}
