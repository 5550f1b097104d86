//! Work captured while a host is not ready

use std::collections::VecDeque;

use crate::protocol::{NodeDescriptor, Op};

/// At most one buffered reset root plus the ops queued after it
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PendingState {
    root: Option<NodeDescriptor>,
    ops: VecDeque<Op>,
}

impl PendingState {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a reset
    ///
    /// Replaces any earlier root and drops the ops queued before it, since
    /// applying this reset would clear their effects anyway.
    pub fn buffer_reset(&mut self, root: NodeDescriptor) {
        if !self.ops.is_empty() {
            log::debug!("Buffered reset supersedes {} queued ops", self.ops.len());
        }
        self.ops.clear();
        self.root = Some(root);
    }

    /// Queue ops behind everything buffered so far
    pub fn buffer_ops(&mut self, ops: &[Op]) {
        self.ops.extend(ops.iter().cloned());
    }

    /// Whether a reset root is buffered
    pub const fn has_root(&self) -> bool {
        self.root.is_some()
    }

    /// Number of queued ops
    pub fn queued_ops(&self) -> usize {
        self.ops.len()
    }

    /// Whether nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.root.is_none() && self.ops.is_empty()
    }

    /// Take everything out, root first, leaving the buffer empty
    pub fn take(&mut self) -> (Option<NodeDescriptor>, Vec<Op>) {
        (self.root.take(), self.ops.drain(..).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Kind;

    #[test]
    fn test_ops_keep_their_order() {
        let mut pending = PendingState::new();
        pending.buffer_ops(&[Op::create(1, Kind::Group)]);
        pending.buffer_ops(&[Op::create(2, Kind::Mesh), Op::attach(1, 2)]);

        let (root, ops) = pending.take();
        assert!(root.is_none());
        assert_eq!(ops, vec![Op::create(1, Kind::Group), Op::create(2, Kind::Mesh), Op::attach(1, 2)]);
        assert!(pending.is_empty());
    }

    #[test]
    fn test_reset_supersedes_earlier_work() {
        let mut pending = PendingState::new();
        pending.buffer_reset(NodeDescriptor::new(1, Kind::Scene));
        pending.buffer_ops(&[Op::create(2, Kind::Group)]);
        pending.buffer_reset(NodeDescriptor::new(10, Kind::Scene));
        pending.buffer_ops(&[Op::create(11, Kind::Group)]);

        assert_eq!(pending.queued_ops(), 1);
        let (root, ops) = pending.take();
        assert_eq!(root.map(|r| r.id.0), Some(10));
        assert_eq!(ops, vec![Op::create(11, Kind::Group)]);
    }
}
