//! Numeric helpers shared by the tree and its tests

use num_traits::Float;

/// Growth constant of the AVL worst case, `1 / log2(golden ratio)` rounded down
pub const AVL_HEIGHT_FACTOR: f64 = 1.44;

/// Returns the worst-case AVL height bound for a tree holding `len` nodes
///
/// An AVL tree with `n` nodes never grows taller than `1.44 * log2(n + 2)`.
///
/// # Arguments
///
/// * `len` - The number of nodes in the tree
///
/// # Returns
///
/// * `f64` - The height bound
///
/// # Examples
///
/// ```
/// use balanced_tree::helper::height_bound;
///
/// assert!(height_bound(1_000) < 15.0);
/// ```
#[inline]
pub fn height_bound(len: usize) -> f64 {
    AVL_HEIGHT_FACTOR * Float::log2(len as f64 + 2.0)
}

/// Returns `true` if `height` respects the AVL bound for `len` nodes
///
/// # Arguments
///
/// * `height` - The observed tree height
/// * `len` - The number of nodes in the tree
///
/// # Returns
///
/// * `bool` - Whether the height is within the bound
#[inline]
pub fn within_height_bound(height: usize, len: usize) -> bool {
    height as f64 <= height_bound(len)
}

/// Returns the midpoint of the half-open range `lo..hi`, rounding down
///
/// Used to pick the median of a sorted run as subtree root when rebuilding.
#[inline]
pub(crate) const fn midpoint(lo: usize, hi: usize) -> usize {
    lo + (hi - lo) / 2
}
