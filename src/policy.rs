/// How [`BalancedTree::insert`](crate::BalancedTree::insert) treats a key that is already stored
///
/// Duplicates are never stored as separate nodes. Folding them into the
/// existing node keeps the left/right ordering strict across rotations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DuplicatePolicy {
    /// Each duplicate increments the multiplicity of the existing node (multiset behavior)
    #[default]
    Count,
    /// Duplicates are dropped, the tree behaves as an ordered set
    Ignore,
}

impl DuplicatePolicy {
    /// Returns `true` if duplicates are counted
    ///
    /// # Returns
    ///
    /// * `bool` - Whether repeated inserts grow the tree length
    pub const fn counts_duplicates(self) -> bool {
        matches!(self, Self::Count)
    }
}
