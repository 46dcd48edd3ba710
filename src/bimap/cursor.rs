use crate::arena::{NodeArena, NodeId};
use crate::bimap::node::{Handle, Node, Side, SENTINEL};
use std::fmt;
use std::marker::PhantomData;

/// A bidirectional cursor over one side's ordering of a `Bimap`.
///
/// A cursor borrows the bimap and walks it through the parent links of the nodes. Stepping past
/// the last pair lands on the end position; stepping forward from the end position or backward
/// from the first pair panics.
///
/// # Examples
///
/// ```
/// use treap_bimap::Bimap;
///
/// let mut map = Bimap::new();
/// map.insert(1, 'c');
/// map.insert(2, 'b');
/// map.insert(3, 'a');
///
/// let mut cursor = map.cursor(map.begin_left());
/// assert_eq!(cursor.key(), Some(&1));
/// cursor.move_next();
/// assert_eq!(cursor.value(), Some(&'b'));
///
/// let mut flipped = cursor.flip();
/// flipped.move_next();
/// assert_eq!(flipped.key(), Some(&'c'));
/// flipped.move_next();
/// assert!(flipped.is_end());
/// ```
pub struct Cursor<'a, L: 'a, R: 'a, S> {
    nodes: &'a NodeArena<Node<L, R>>,
    handle: Handle<S>,
}

impl<'a, L: 'a, R: 'a, S> Cursor<'a, L, R, S> {
    pub(crate) fn new(nodes: &'a NodeArena<Node<L, R>>, handle: Handle<S>) -> Self {
        Cursor { nodes, handle }
    }

    /// Returns the position the cursor is at.
    pub fn handle(&self) -> Handle<S> {
        self.handle
    }

    /// Returns `true` if the cursor is at the end position.
    pub fn is_end(&self) -> bool {
        self.handle.id() == SENTINEL
    }
}

impl<'a, L: 'a, R: 'a, S: Side<L, R>> Cursor<'a, L, R, S> {
    /// Returns the key the cursor is at, or `None` at the end position.
    pub fn key(&self) -> Option<&'a S::Key> {
        let nodes = self.nodes;
        nodes
            .get(self.handle.id())
            .and_then(|node| node.pair.as_ref())
            .map(S::key)
    }

    /// Returns the key paired with the one the cursor is at, or `None` at the end position.
    pub fn value(&self) -> Option<&'a S::Value> {
        let nodes = self.nodes;
        nodes
            .get(self.handle.id())
            .and_then(|node| node.pair.as_ref())
            .map(S::value)
    }

    /// Moves to the next key in order.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the end position.
    pub fn move_next(&mut self) {
        self.handle = Handle::new(S::successor(self.nodes, self.handle.id()));
    }

    /// Moves to the previous key in order. From the end position this moves to the last key.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the first key.
    pub fn move_prev(&mut self) {
        self.handle = Handle::new(S::predecessor(self.nodes, self.handle.id()));
    }

    /// Returns a cursor at the same pair on the other side.
    pub fn flip(self) -> Cursor<'a, L, R, S::Other> {
        Cursor::new(self.nodes, self.handle.flip())
    }
}

impl<'a, L: 'a, R: 'a, S> Clone for Cursor<'a, L, R, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, L: 'a, R: 'a, S> Copy for Cursor<'a, L, R, S> {}

impl<'a, L: 'a, R: 'a, S> PartialEq for Cursor<'a, L, R, S> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl<'a, L: 'a, R: 'a, S> Eq for Cursor<'a, L, R, S> {}

impl<'a, L: 'a, R: 'a, S> fmt::Debug for Cursor<'a, L, R, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Cursor").field("handle", &self.handle).finish()
    }
}

/// An iterator over the pairs of a `Bimap` in one side's order.
///
/// Yields `(&L, &R)` for the left side and `(&R, &L)` for the right side.
pub struct Iter<'a, L: 'a, R: 'a, S> {
    nodes: &'a NodeArena<Node<L, R>>,
    front: NodeId,
    back: NodeId,
    remaining: usize,
    side: PhantomData<S>,
}

impl<'a, L: 'a, R: 'a, S: Side<L, R>> Iter<'a, L, R, S> {
    pub(crate) fn new(nodes: &'a NodeArena<Node<L, R>>, len: usize) -> Self {
        Iter {
            nodes,
            front: S::leftmost(nodes, SENTINEL),
            back: SENTINEL,
            remaining: len,
            side: PhantomData,
        }
    }

    fn entry(&self, id: NodeId) -> (&'a S::Key, &'a S::Value) {
        let nodes = self.nodes;
        let pair = nodes[id].pair();
        (S::key(pair), S::value(pair))
    }
}

impl<'a, L: 'a, R: 'a, S: Side<L, R>> Iterator for Iter<'a, L, R, S>
where
    S::Key: 'a,
    S::Value: 'a,
{
    type Item = (&'a S::Key, &'a S::Value);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.front = S::successor(self.nodes, id);
        }
        Some(self.entry(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, L: 'a, R: 'a, S: Side<L, R>> DoubleEndedIterator for Iter<'a, L, R, S>
where
    S::Key: 'a,
    S::Value: 'a,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.back = S::predecessor(self.nodes, self.back);
        self.remaining -= 1;
        Some(self.entry(self.back))
    }
}

impl<'a, L: 'a, R: 'a, S: Side<L, R>> ExactSizeIterator for Iter<'a, L, R, S>
where
    S::Key: 'a,
    S::Value: 'a,
{
}

impl<'a, L: 'a, R: 'a, S> Clone for Iter<'a, L, R, S> {
    fn clone(&self) -> Self {
        Iter {
            nodes: self.nodes,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
            side: PhantomData,
        }
    }
}
