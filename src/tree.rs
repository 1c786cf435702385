use alloc::vec::Vec;
use core::cmp::Ordering;
use ordered_float::OrderedFloat;

use crate::{
    DuplicatePolicy, Traversal, TreeError, traversal,
    utils::{Arena, NIL, helper::midpoint},
};

/// A [`BalancedTree`] keyed by floats, ordered with [`OrderedFloat`] so that NaN
/// sorts above every other value instead of breaking the total order
pub type FloatBalancedTree<T> = BalancedTree<OrderedFloat<T>>;

/// An AVL tree: a binary search tree that restores `|height(left) - height(right)| <= 1`
/// at every node after each insertion and removal.
///
/// Nodes live in a contiguous arena and link to each other by index. Every
/// mutation recurses down the search path and returns the (possibly rotated)
/// subtree root to its caller, which relinks it, so heights are refreshed and
/// rebalancing applied on the way back up.
///
/// - Insertion time complexity: O(log n)
/// - Removal time complexity: O(log n)
/// - Search time complexity: O(log n)
/// - Height and length queries: O(1)
///
/// Equal keys are folded into a single node with a multiplicity, see
/// [`DuplicatePolicy`].
///
/// # Examples
///
/// ```
/// use balanced_tree::{BalancedTree, Traversal};
///
/// let mut tree = BalancedTree::new();
/// tree.insert(1).insert(2).insert(3);
///
/// assert_eq!(tree.root(), Some(&2));
/// assert_eq!(tree.height(), 2);
/// assert!(tree.search(&3, Traversal::InOrder).is_some());
/// ```
#[derive(Debug, Clone)]
pub struct BalancedTree<T> {
    /// Node storage
    arena: Arena<T>,
    /// Index of the root node, NIL when the tree is empty
    root: usize,
    /// Number of stored keys, duplicates included
    len: usize,
    /// Treatment of repeated keys
    policy: DuplicatePolicy,
}

impl<T> BalancedTree<T> {
    /// Creates an empty tree that counts duplicate keys
    ///
    /// # Returns
    ///
    /// * `Self` - The empty tree
    pub const fn new() -> Self {
        Self::with_policy(DuplicatePolicy::Count)
    }

    /// Creates an empty tree with the given duplicate policy
    ///
    /// # Arguments
    ///
    /// * `policy` - How repeated keys are treated on insertion
    ///
    /// # Returns
    ///
    /// * `Self` - The empty tree
    pub const fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            arena: Arena::new(),
            root: NIL,
            len: 0,
            policy,
        }
    }

    /// Returns the number of stored keys, each duplicate occurrence included
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of distinct keys, which is the number of nodes
    #[inline]
    pub fn distinct_len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the tree holds no keys
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the duplicate policy in effect
    pub const fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Sets the duplicate policy used by subsequent insertions
    ///
    /// Keys already counted more than once keep their multiplicity.
    ///
    /// # Arguments
    ///
    /// * `policy` - The new policy
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The tree
    pub const fn set_policy(&mut self, policy: DuplicatePolicy) -> &mut Self {
        self.policy = policy;
        self
    }

    /// Returns the height of the tree, 0 for an empty tree and 1 for a single node
    ///
    /// # Returns
    ///
    /// * `usize` - The cached height of the root
    #[inline]
    pub fn height(&self) -> usize {
        self.arena.get_height(self.root)
    }

    /// Returns the key stored at the root
    pub fn root(&self) -> Option<&T> {
        (self.root != NIL).then(|| self.arena.key(self.root))
    }

    /// Removes every key
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = NIL;
        self.len = 0;
    }

    /// Returns the smallest key, following left links from the root
    pub fn min(&self) -> Option<&T> {
        if self.root == NIL {
            return None;
        }
        Some(self.arena.key(self.find_minimum(self.root)))
    }

    /// Returns the largest key, following right links from the root
    pub fn max(&self) -> Option<&T> {
        if self.root == NIL {
            return None;
        }
        Some(self.arena.key(self.find_maximum(self.root)))
    }

    /// Checks the AVL balance property at every node from scratch
    ///
    /// Subtree heights are recomputed during the walk, the cached heights are
    /// not trusted, which makes this usable as an independent oracle.
    ///
    /// # Returns
    ///
    /// * `bool` - Whether every balance factor lies in `{-1, 0, 1}`
    pub fn is_balanced(&self) -> bool {
        self.balanced_height(self.root).is_some()
    }

    /// Linearizes the tree in the given order, repeating duplicated keys
    ///
    /// # Arguments
    ///
    /// * `order` - The visiting order
    ///
    /// # Returns
    ///
    /// * `Vec<&T>` - The keys in visiting order
    pub fn traverse(&self, order: Traversal) -> Vec<&T> {
        let mut out = Vec::with_capacity(self.len);
        traversal::collect(&self.arena, self.root, order, &mut out);
        out
    }

    /// Returns the keys in ascending order (for an uninverted tree)
    pub fn in_order(&self) -> Vec<&T> {
        self.traverse(Traversal::InOrder)
    }

    /// Returns the keys in pre-order
    pub fn pre_order(&self) -> Vec<&T> {
        self.traverse(Traversal::PreOrder)
    }

    /// Returns the keys in post-order
    pub fn post_order(&self) -> Vec<&T> {
        self.traverse(Traversal::PostOrder)
    }

    /// Mirrors the tree by swapping the children of every node
    ///
    /// Heights and balance are unaffected, but the result is a mirror image in
    /// which larger keys sit on the left: it is no longer a search tree, and
    /// lookups may miss stored keys until the tree is inverted back or
    /// [`rebuild`](Self::rebuild) is called. Inverting twice restores the
    /// original shape exactly.
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The tree
    pub fn invert(&mut self) -> &mut Self {
        self.invert_subtree(self.root);
        self
    }

    fn invert_subtree(&mut self, idx: usize) {
        if idx == NIL {
            return;
        }
        self.arena.swap_children(idx);
        let (left, right) = (self.arena.get_left(idx), self.arena.get_right(idx));
        self.invert_subtree(left);
        self.invert_subtree(right);
    }

    fn set_root(&mut self, idx: usize) {
        self.root = idx;
        if idx != NIL {
            self.arena.node_at_mut(idx).parent = NIL;
        }
    }

    fn find_minimum(&self, mut idx: usize) -> usize {
        while self.arena.get_left(idx) != NIL {
            idx = self.arena.get_left(idx);
        }
        idx
    }

    fn find_maximum(&self, mut idx: usize) -> usize {
        while self.arena.get_right(idx) != NIL {
            idx = self.arena.get_right(idx);
        }
        idx
    }

    fn balanced_height(&self, idx: usize) -> Option<usize> {
        if idx == NIL {
            return Some(0);
        }
        let left = self.balanced_height(self.arena.get_left(idx))?;
        let right = self.balanced_height(self.arena.get_right(idx))?;
        if left.abs_diff(right) > 1 {
            return None;
        }
        Some(1 + left.max(right))
    }

    /// Left-rotates the subtree at `z` and returns its new root.
    ///
    /// ```text
    ///     z                y
    ///    / \              / \
    ///   T1  y     =>     z   T3
    ///      / \          / \
    ///     T2  T3       T1  T2
    /// ```
    ///
    /// The caller relinks the returned root to the parent of `z`.
    fn rotate_left(&mut self, z: usize) -> usize {
        let y = self.arena.get_right(z);
        if y == NIL {
            return z;
        }
        tracing::trace!(pivot = z, "rotate left");

        let t2 = self.arena.get_left(y);
        self.arena.set_right(z, t2);
        self.arena.set_left(y, z);

        self.arena.update_height(z);
        self.arena.update_height(y);
        y
    }

    /// Right-rotates the subtree at `z` and returns its new root, mirror of
    /// [`rotate_left`](Self::rotate_left)
    fn rotate_right(&mut self, z: usize) -> usize {
        let y = self.arena.get_left(z);
        if y == NIL {
            return z;
        }
        tracing::trace!(pivot = z, "rotate right");

        let t3 = self.arena.get_right(y);
        self.arena.set_left(z, t3);
        self.arena.set_right(y, z);

        self.arena.update_height(z);
        self.arena.update_height(y);
        y
    }

    /// Restores balance at `z` after a removal below it.
    ///
    /// No inserted key exists to tell the cases apart, so the taller grandchild
    /// under the heavy child decides between a single and a double rotation.
    fn rebalance_after_removal(&mut self, z: usize) -> usize {
        let balance = self.arena.balance_factor(z);

        if balance > 1 {
            let child = self.arena.get_left(z);
            let outer = self.arena.get_height(self.arena.get_left(child));
            let inner = self.arena.get_height(self.arena.get_right(child));
            if outer >= inner {
                return self.rotate_right(z);
            }
            let rotated = self.rotate_left(child);
            self.arena.set_left(z, rotated);
            return self.rotate_right(z);
        }

        if balance < -1 {
            let child = self.arena.get_right(z);
            let outer = self.arena.get_height(self.arena.get_right(child));
            let inner = self.arena.get_height(self.arena.get_left(child));
            if outer >= inner {
                return self.rotate_left(z);
            }
            let rotated = self.rotate_right(child);
            self.arena.set_right(z, rotated);
            return self.rotate_left(z);
        }

        z
    }

    /// Unlinks the minimum of the subtree at `idx`.
    ///
    /// # Returns
    ///
    /// * `(usize, usize)` - The new subtree root and the index of the unlinked node
    fn detach_min(&mut self, idx: usize) -> (usize, usize) {
        let left = self.arena.get_left(idx);
        if left == NIL {
            return (self.arena.get_right(idx), idx);
        }

        let (subtree, min) = self.detach_min(left);
        self.arena.set_left(idx, subtree);
        self.arena.update_height(idx);
        (self.rebalance_after_removal(idx), min)
    }

    /// Links the nodes `lo..hi`, which must already be in ascending key order,
    /// into a perfectly balanced subtree and returns its root
    fn link_sorted(&mut self, lo: usize, hi: usize) -> usize {
        if lo >= hi {
            return NIL;
        }
        let mid = midpoint(lo, hi);
        let left = self.link_sorted(lo, mid);
        let right = self.link_sorted(mid + 1, hi);
        self.arena.set_left(mid, left);
        self.arena.set_right(mid, right);
        self.arena.update_height(mid);
        mid
    }

    #[cfg(debug_assertions)]
    fn verify_invariants(&self) -> bool {
        match self.verify_subtree(self.root, NIL) {
            Some((_, nodes, total)) => nodes == self.arena.len() && total == self.len,
            None => false,
        }
    }

    /// Checks parent links, cached heights and balance below `idx`.
    ///
    /// Returns `(height, nodes, total count)` of the subtree when consistent.
    #[cfg(debug_assertions)]
    fn verify_subtree(&self, idx: usize, parent: usize) -> Option<(usize, usize, usize)> {
        if idx == NIL {
            return Some((0, 0, 0));
        }

        let node = self.arena.node_at(idx);
        if node.parent != parent || node.count == 0 {
            return None;
        }

        let (left_height, left_nodes, left_total) = self.verify_subtree(node.left, idx)?;
        let (right_height, right_nodes, right_total) = self.verify_subtree(node.right, idx)?;

        let height = 1 + left_height.max(right_height);
        if node.height != height || left_height.abs_diff(right_height) > 1 {
            return None;
        }

        Some((
            height,
            1 + left_nodes + right_nodes,
            node.count + left_total + right_total,
        ))
    }
}

impl<T: Ord> BalancedTree<T> {
    /// Inserts a key, rebalancing on the way back to the root
    ///
    /// Smaller keys go left and larger keys go right. A key that is already
    /// stored is handled according to the tree's [`DuplicatePolicy`]. Insertion
    /// always succeeds.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to insert
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The tree, for chained insertions
    pub fn insert(&mut self, key: T) -> &mut Self {
        let (root, _) = self.insert_at(self.root, key);
        self.set_root(root);

        #[cfg(debug_assertions)]
        debug_assert!(
            self.verify_invariants(),
            "AVL invariants violated after insertion"
        );

        self
    }

    /// Removes one occurrence of `key`
    ///
    /// A key counted several times loses one occurrence and keeps its node.
    /// Otherwise the node is unlinked: a node with at most one child is
    /// replaced by that child, a node with two children takes over the key of
    /// its in-order successor, whose node is unlinked instead. Every ancestor
    /// is rebalanced on the way back to the root.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to remove
    ///
    /// # Returns
    ///
    /// * `Result<(), TreeError>` - `TreeError::KeyNotFound` if the key is absent, in which
    ///   case the tree is unchanged
    pub fn remove(&mut self, key: &T) -> Result<(), TreeError> {
        if self.find_node(key) == NIL {
            return Err(TreeError::KeyNotFound);
        }

        let mut detached = NIL;
        let root = self.remove_at(self.root, key, &mut detached);
        self.set_root(root);
        if detached != NIL {
            self.arena.release(detached, &mut self.root);
        }
        self.len -= 1;

        #[cfg(debug_assertions)]
        debug_assert!(
            self.verify_invariants(),
            "AVL invariants violated after removal"
        );

        Ok(())
    }

    /// Searches for `key`, visiting nodes in the given traversal order
    ///
    /// The descent direction at every node is decided by comparing keys, so
    /// all orders return the same result, only the point at which the current
    /// node is tested for equality differs.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to look for
    /// * `order` - The traversal order
    ///
    /// # Returns
    ///
    /// * `Option<&T>` - The stored key if found, `None` otherwise
    pub fn search(&self, key: &T, order: Traversal) -> Option<&T> {
        let idx = traversal::search(&self.arena, self.root, key, order);
        if idx == NIL {
            None
        } else {
            Some(self.arena.key(idx))
        }
    }

    /// Returns `true` if `key` is stored
    pub fn contains(&self, key: &T) -> bool {
        self.find_node(key) != NIL
    }

    /// Returns how many times `key` is stored, 0 if absent
    pub fn count(&self, key: &T) -> usize {
        match self.find_node(key) {
            NIL => 0,
            idx => self.arena.node_at(idx).count,
        }
    }

    /// Checks the search-tree ordering at every node
    ///
    /// Holds after any sequence of insertions and removals, and fails after an
    /// odd number of [`invert`](Self::invert) calls on a tree with two or more
    /// distinct keys.
    ///
    /// # Returns
    ///
    /// * `bool` - Whether every left subtree holds smaller keys and every right subtree larger ones
    pub fn is_ordered(&self) -> bool {
        self.ordered_within(self.root, None, None)
    }

    /// Rebuilds the tree into a perfectly height-balanced shape
    ///
    /// All nodes are sorted by key and relinked by repeatedly choosing the
    /// median as subtree root. Equal keys left in separate nodes (possible
    /// after inserting into an inverted tree) are merged. This also restores
    /// the search-tree order after [`invert`](Self::invert).
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The tree
    pub fn rebuild(&mut self) -> &mut Self {
        let counts_duplicates = self.policy.counts_duplicates();

        let mut entries: Vec<(T, usize)> = self
            .arena
            .drain()
            .into_iter()
            .map(|node| (node.key, node.count))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.dedup_by(|next, kept| {
            if next.0 != kept.0 {
                return false;
            }
            if counts_duplicates {
                kept.1 += next.1;
            }
            true
        });

        self.len = entries.iter().map(|(_, count)| count).sum();
        for (key, count) in entries {
            self.arena.allocate(key, count);
        }
        let root = self.link_sorted(0, self.arena.len());
        self.set_root(root);

        tracing::debug!(len = self.len, height = self.height(), "rebuilt tree");

        #[cfg(debug_assertions)]
        debug_assert!(
            self.verify_invariants() && self.is_ordered(),
            "AVL invariants violated after rebuild"
        );

        self
    }

    fn find_node(&self, key: &T) -> usize {
        let mut current = self.root;

        while current != NIL {
            let node = self.arena.node_at(current);
            match key.cmp(&node.key) {
                Ordering::Equal => return current,
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
            }
        }
        NIL
    }

    /// Inserts into the subtree at `idx`.
    ///
    /// # Returns
    ///
    /// * `(usize, usize)` - The new subtree root and the index of the node holding `key`
    fn insert_at(&mut self, idx: usize, key: T) -> (usize, usize) {
        if idx == NIL {
            self.len += 1;
            let leaf = self.arena.allocate(key, 1);
            return (leaf, leaf);
        }

        let ordering = key.cmp(self.arena.key(idx));
        let inserted = match ordering {
            Ordering::Less => {
                let left = self.arena.get_left(idx);
                let (child, inserted) = self.insert_at(left, key);
                self.arena.set_left(idx, child);
                inserted
            }
            Ordering::Greater => {
                let right = self.arena.get_right(idx);
                let (child, inserted) = self.insert_at(right, key);
                self.arena.set_right(idx, child);
                inserted
            }
            Ordering::Equal => {
                if self.policy.counts_duplicates() {
                    self.arena.node_at_mut(idx).count += 1;
                    self.len += 1;
                }
                return (idx, idx);
            }
        };

        self.arena.update_height(idx);
        (self.rebalance_after_insert(idx, inserted), inserted)
    }

    /// Restores balance at `z` after an insertion below it.
    ///
    /// The inserted key, compared against the heavy child, tells whether the
    /// new node sits on the outer side (single rotation) or the inner side
    /// (double rotation).
    fn rebalance_after_insert(&mut self, z: usize, inserted: usize) -> usize {
        let balance = self.arena.balance_factor(z);

        if balance > 1 {
            let child = self.arena.get_left(z);
            if self.arena.key(inserted) < self.arena.key(child) {
                return self.rotate_right(z);
            }
            let rotated = self.rotate_left(child);
            self.arena.set_left(z, rotated);
            return self.rotate_right(z);
        }

        if balance < -1 {
            let child = self.arena.get_right(z);
            if self.arena.key(inserted) >= self.arena.key(child) {
                return self.rotate_left(z);
            }
            let rotated = self.rotate_right(child);
            self.arena.set_right(z, rotated);
            return self.rotate_left(z);
        }

        z
    }

    /// Removes one occurrence of `key` from the subtree at `idx` and returns the
    /// new subtree root. The index of an unlinked node, if any, is written to
    /// `detached` so the caller can release it once no index is held on the stack.
    fn remove_at(&mut self, idx: usize, key: &T, detached: &mut usize) -> usize {
        if idx == NIL {
            return NIL;
        }

        let ordering = key.cmp(self.arena.key(idx));
        match ordering {
            Ordering::Less => {
                let left = self.arena.get_left(idx);
                let child = self.remove_at(left, key, detached);
                self.arena.set_left(idx, child);
            }
            Ordering::Greater => {
                let right = self.arena.get_right(idx);
                let child = self.remove_at(right, key, detached);
                self.arena.set_right(idx, child);
            }
            Ordering::Equal => {
                let node = self.arena.node_at_mut(idx);
                if node.count > 1 {
                    node.count -= 1;
                    return idx;
                }

                let (left, right) = (node.left, node.right);
                if left == NIL || right == NIL {
                    *detached = idx;
                    return if left == NIL { right } else { left };
                }

                let (subtree, successor) = self.detach_min(right);
                self.arena.set_right(idx, subtree);
                self.arena.swap_payload(idx, successor);
                *detached = successor;
            }
        }

        self.arena.update_height(idx);
        self.rebalance_after_removal(idx)
    }

    fn ordered_within(&self, idx: usize, lower: Option<&T>, upper: Option<&T>) -> bool {
        if idx == NIL {
            return true;
        }
        let node = self.arena.node_at(idx);
        let below = lower.is_some_and(|lower| node.key <= *lower);
        let above = upper.is_some_and(|upper| node.key >= *upper);
        if below || above {
            return false;
        }
        self.ordered_within(node.left, lower, Some(&node.key))
            && self.ordered_within(node.right, Some(&node.key), upper)
    }
}

impl<T> Default for BalancedTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> FromIterator<T> for BalancedTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for BalancedTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}
