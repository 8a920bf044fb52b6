//! Nested list tracking: kinds, depth tags, ordered-item counters.

/// Depth beyond this renders with the deepest style tag.
const MAX_DEPTH_TAG: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
}

/// Stack of open lists. Ordered entries each own one counter; the two stacks
/// stay in lockstep on every pop path, including tolerant unwinding.
#[derive(Clone, Debug, Default)]
pub(crate) struct ListStack {
    kinds: Vec<ListKind>,
    counters: Vec<u32>,
}

impl ListStack {
    pub(crate) fn open(&mut self, kind: ListKind) {
        self.kinds.push(kind);
        if kind == ListKind::Ordered {
            self.counters.push(0);
        }
        self.check_invariant();
    }

    /// Close the innermost list of `kind`, discarding unclosed lists of the
    /// other kind opened above it. A close with no matching entry empties
    /// the stack; counters stay in lockstep throughout.
    pub(crate) fn close(&mut self, kind: ListKind) {
        while let Some(popped) = self.kinds.pop() {
            if popped == ListKind::Ordered {
                self.counters.pop();
            }
            if popped == kind {
                break;
            }
        }
        self.check_invariant();
    }

    pub(crate) fn current(&self) -> Option<ListKind> {
        self.kinds.last().copied()
    }

    /// Advance and return the innermost ordered counter (1-based).
    pub(crate) fn next_ordinal(&mut self) -> Option<u32> {
        let counter = self.counters.last_mut()?;
        *counter += 1;
        Some(*counter)
    }

    pub(crate) fn depth(&self) -> usize {
        self.kinds.len()
    }

    /// Style tag for the current nesting depth (`list1`..`list5`).
    pub(crate) fn depth_tag(&self) -> Option<String> {
        match self.depth() {
            0 => None,
            depth => Some(format!("list{}", depth.min(MAX_DEPTH_TAG))),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.kinds.clear();
        self.counters.clear();
    }

    fn check_invariant(&self) {
        debug_assert!(
            self.counters.len()
                == self
                    .kinds
                    .iter()
                    .filter(|&&k| k == ListKind::Ordered)
                    .count(),
            "ordered counters out of step with ordered entries"
        );
    }
}
