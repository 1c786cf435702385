use alloc::vec::Vec;
use core::{cmp::Ordering, fmt, str::FromStr};

use crate::{
    TreeError,
    utils::{Arena, NIL},
};

/// Depth-first visiting order used by searches and linearizations.
///
/// For a search, the order only decides when the current node is compared
/// for equality relative to the descent. The direction of descent is always
/// decided by comparing keys, so every order reaches the same verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Traversal {
    /// Node, then left subtree, then right subtree
    #[default]
    PreOrder,
    /// Left subtree, then node, then right subtree
    InOrder,
    /// Left subtree, then right subtree, then node
    PostOrder,
}

impl Traversal {
    /// All traversal orders, in declaration order
    pub const ALL: [Traversal; 3] = [Self::PreOrder, Self::InOrder, Self::PostOrder];

    /// Returns the short name of the order (`pre`, `in` or `post`)
    ///
    /// # Returns
    ///
    /// * `&'static str` - The short name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreOrder => "pre",
            Self::InOrder => "in",
            Self::PostOrder => "post",
        }
    }
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Traversal {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre" => Ok(Self::PreOrder),
            "in" => Ok(Self::InOrder),
            "post" => Ok(Self::PostOrder),
            _ => Err(TreeError::UnsupportedTraversal),
        }
    }
}

/// Returns the index of the node holding `key`, or NIL
pub(crate) fn search<T: Ord>(
    arena: &Arena<T>,
    root: usize,
    key: &T,
    order: Traversal,
) -> usize {
    match order {
        Traversal::PreOrder => search_pre_order(arena, root, key),
        Traversal::InOrder => search_in_order(arena, root, key),
        Traversal::PostOrder => search_post_order(arena, root, key),
    }
}

fn search_pre_order<T: Ord>(arena: &Arena<T>, idx: usize, key: &T) -> usize {
    if idx == NIL {
        return NIL;
    }
    let node = arena.node_at(idx);
    if *key == node.key {
        return idx;
    }
    if *key < node.key {
        search_pre_order(arena, node.left, key)
    } else {
        search_pre_order(arena, node.right, key)
    }
}

fn search_in_order<T: Ord>(arena: &Arena<T>, idx: usize, key: &T) -> usize {
    if idx == NIL {
        return NIL;
    }
    let node = arena.node_at(idx);
    if *key < node.key {
        search_in_order(arena, node.left, key)
    } else if *key == node.key {
        idx
    } else {
        search_in_order(arena, node.right, key)
    }
}

fn search_post_order<T: Ord>(arena: &Arena<T>, idx: usize, key: &T) -> usize {
    if idx == NIL {
        return NIL;
    }
    let node = arena.node_at(idx);
    match key.cmp(&node.key) {
        Ordering::Less => search_post_order(arena, node.left, key),
        Ordering::Greater => search_post_order(arena, node.right, key),
        Ordering::Equal => idx,
    }
}

/// Appends every key of the subtree at `idx` to `out` in the given order,
/// repeating each key as many times as it was counted
pub(crate) fn collect<'a, T>(
    arena: &'a Arena<T>,
    idx: usize,
    order: Traversal,
    out: &mut Vec<&'a T>,
) {
    if idx == NIL {
        return;
    }
    let node = arena.node_at(idx);
    let (key, count) = (&node.key, node.count);
    let emit = move |out: &mut Vec<&'a T>| out.extend(core::iter::repeat_n(key, count));

    match order {
        Traversal::PreOrder => {
            emit(out);
            collect(arena, node.left, order, out);
            collect(arena, node.right, order, out);
        }
        Traversal::InOrder => {
            collect(arena, node.left, order, out);
            emit(out);
            collect(arena, node.right, order, out);
        }
        Traversal::PostOrder => {
            collect(arena, node.left, order, out);
            collect(arena, node.right, order, out);
            emit(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{format, vec};

    #[test]
    fn test_traversal_parse_and_display() {
        for order in Traversal::ALL {
            let parsed: Traversal = order.as_str().parse().unwrap();
            assert_eq!(parsed, order);
            assert_eq!(format!("{order}"), order.as_str());
        }
        assert_eq!(
            "level".parse::<Traversal>(),
            Err(TreeError::UnsupportedTraversal)
        );
    }

    #[test]
    fn test_traversal_default_is_pre_order() {
        assert_eq!(Traversal::default(), Traversal::PreOrder);
    }

    #[test]
    fn test_search_on_empty_arena() {
        let arena: Arena<i32> = Arena::new();
        for order in Traversal::ALL {
            assert_eq!(search(&arena, NIL, &1, order), NIL);
        }
    }

    #[test]
    fn test_collect_orders_on_three_nodes() {
        let mut arena = Arena::new();
        let root = arena.allocate(2, 1);
        let left = arena.allocate(1, 1);
        let right = arena.allocate(3, 2);
        arena.set_left(root, left);
        arena.set_right(root, right);

        let mut pre = Vec::new();
        collect(&arena, root, Traversal::PreOrder, &mut pre);
        assert_eq!(pre, vec![&2, &1, &3, &3]);

        let mut inorder = Vec::new();
        collect(&arena, root, Traversal::InOrder, &mut inorder);
        assert_eq!(inorder, vec![&1, &2, &3, &3]);

        let mut post = Vec::new();
        collect(&arena, root, Traversal::PostOrder, &mut post);
        assert_eq!(post, vec![&1, &3, &3, &2]);
    }
}
