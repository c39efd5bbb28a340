//! Tree traversal visitors

/// Visitor for pre-order tree traversal.
///
/// The value passed to the callbacks is `None` for the root sentinel (and
/// for any other value-less tree node).
pub trait TreeVisitor<K> {
    /// Called when the traversal enters a node, before any of its children.
    fn enter_node(&mut self, _value: Option<K>) {}

    /// Called when the traversal leaves a node, after all of its children.
    fn leave_node(&mut self, _value: Option<K>) {}

    /// Checked after each child subtree has been visited. Returning true
    /// skips the remaining siblings at every level; `leave_node` is still
    /// called for the nodes on the current path.
    fn is_done(&self) -> bool {
        false
    }
}

/// Adapter turning a closure into a visitor that only observes `enter_node`
pub struct ForEachVisitor<F> {
    callback: F,
}

impl<F> ForEachVisitor<F> {
    /// Wrap the callback
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<K, F: FnMut(Option<K>)> TreeVisitor<K> for ForEachVisitor<F> {
    fn enter_node(&mut self, value: Option<K>) {
        (self.callback)(value);
    }
}
