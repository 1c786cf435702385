use alloc::vec::Vec;
use core::mem;

/// Sentinel index representing an absent node (no child, no parent, empty tree)
pub const NIL: usize = usize::MAX;

/// A node of the AVL tree stored inside the [`Arena`].
///
/// Links are arena indices rather than owned boxes, so rotations only rewrite
/// a handful of integers and never move keys around.
#[derive(Debug, Clone)]
pub struct Node<T> {
    /// The stored key
    pub key: T,

    /// Number of occurrences of `key` folded into this node (multiset behavior)
    pub count: usize,

    /// Index of the parent node (NIL for the root)
    pub parent: usize,

    /// Index of the left child (NIL if no left child)
    pub left: usize,

    /// Index of the right child (NIL if no right child)
    pub right: usize,

    /// Height of the subtree rooted at this node, a leaf has height 1
    pub height: usize,
}

impl<T> Node<T> {
    const fn leaf(key: T, count: usize) -> Self {
        Self {
            key,
            count,
            parent: NIL,
            left: NIL,
            right: NIL,
            height: 1,
        }
    }
}

/// Densely packed node storage.
///
/// Live nodes always occupy `0..len()`. Releasing a slot moves the last node
/// into the hole and rewrites every link that pointed at it, so no free list
/// is needed and iteration over the backing vector only sees live nodes.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    nodes: Vec<Node<T>>,
}

impl<T> Arena<T> {
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Appends a detached node and returns its index
    pub fn allocate(&mut self, key: T, count: usize) -> usize {
        self.nodes.push(Node::leaf(key, count));
        self.nodes.len() - 1
    }

    /// Takes every node out of the arena, leaving it empty
    pub fn drain(&mut self) -> Vec<Node<T>> {
        mem::take(&mut self.nodes)
    }

    #[inline]
    pub fn node_at(&self, idx: usize) -> &Node<T> {
        debug_assert!(idx < self.nodes.len());
        &self.nodes[idx]
    }

    #[inline]
    pub fn node_at_mut(&mut self, idx: usize) -> &mut Node<T> {
        debug_assert!(idx < self.nodes.len());
        &mut self.nodes[idx]
    }

    #[inline]
    pub fn key(&self, idx: usize) -> &T {
        &self.node_at(idx).key
    }

    #[inline]
    pub fn get_left(&self, idx: usize) -> usize {
        if idx == NIL { NIL } else { self.node_at(idx).left }
    }

    #[inline]
    pub fn get_right(&self, idx: usize) -> usize {
        if idx == NIL { NIL } else { self.node_at(idx).right }
    }

    #[inline]
    pub fn get_height(&self, idx: usize) -> usize {
        if idx == NIL { 0 } else { self.node_at(idx).height }
    }

    /// Height of the left subtree minus height of the right subtree
    #[inline]
    pub fn balance_factor(&self, idx: usize) -> isize {
        self.get_height(self.get_left(idx)) as isize
            - self.get_height(self.get_right(idx)) as isize
    }

    pub fn update_height(&mut self, idx: usize) {
        if idx == NIL {
            return;
        }
        let left = self.get_height(self.get_left(idx));
        let right = self.get_height(self.get_right(idx));
        self.node_at_mut(idx).height = 1 + left.max(right);
    }

    /// Makes `child` the left child of `parent`, fixing the child's parent link
    pub fn set_left(&mut self, parent: usize, child: usize) {
        self.node_at_mut(parent).left = child;
        if child != NIL {
            self.node_at_mut(child).parent = parent;
        }
    }

    /// Makes `child` the right child of `parent`, fixing the child's parent link
    pub fn set_right(&mut self, parent: usize, child: usize) {
        self.node_at_mut(parent).right = child;
        if child != NIL {
            self.node_at_mut(child).parent = parent;
        }
    }

    /// Exchanges key and multiplicity of two nodes, links stay in place
    pub fn swap_payload(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.nodes.split_at_mut(hi);
        let (first, second) = (&mut head[lo], &mut tail[0]);
        mem::swap(&mut first.key, &mut second.key);
        mem::swap(&mut first.count, &mut second.count);
    }

    /// Mirrors the links of a single node
    pub fn swap_children(&mut self, idx: usize) {
        let node = self.node_at_mut(idx);
        mem::swap(&mut node.left, &mut node.right);
    }

    /// Releases a node that is no longer linked into the tree.
    ///
    /// The last node of the arena is moved into the freed slot, and its parent
    /// (or `root`), and its children are relinked to the new index.
    ///
    /// # Arguments
    ///
    /// * `idx` - Index of the unlinked node
    /// * `root` - The tree root, rewritten if the moved node was the root
    ///
    /// # Returns
    ///
    /// * `Node<T>` - The released node
    pub fn release(&mut self, idx: usize, root: &mut usize) -> Node<T> {
        debug_assert!(idx < self.nodes.len());
        debug_assert!(*root != idx, "releasing a node that is still the root");

        let last = self.nodes.len() - 1;
        let released = self.nodes.swap_remove(idx);
        tracing::trace!(slot = idx, moved_from = last, "released arena slot");

        if idx == last {
            return released;
        }

        let (parent, left, right) = {
            let moved = self.node_at(idx);
            (moved.parent, moved.left, moved.right)
        };

        if parent == NIL {
            debug_assert_eq!(*root, last);
            *root = idx;
        } else if self.node_at(parent).left == last {
            self.node_at_mut(parent).left = idx;
        } else {
            self.node_at_mut(parent).right = idx;
        }

        if left != NIL {
            self.node_at_mut(left).parent = idx;
        }
        if right != NIL {
            self.node_at_mut(right).parent = idx;
        }

        released
    }
}
