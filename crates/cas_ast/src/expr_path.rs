//! Tree path types for occurrence-based rewriting.
//!
//! A `TreePath` identifies one location in a tree, so a rewrite can target a
//! single occurrence even when the same subtree appears several times.

/// A path from the root to a specific node.
///
/// Each element is an operand index (0-based). For `apply` nodes index 0 is
/// the function name and index 1 the argument.
///
/// Example: in `(a + b) * c`, the path to `b` is `[0, 1]`.
pub type TreePath = Vec<usize>;

/// Dotted form of a path for logs and errors; the empty path is `root`.
pub fn path_to_string(path: &[usize]) -> String {
    if path.is_empty() {
        return "root".to_string();
    }
    path.iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(".")
}
