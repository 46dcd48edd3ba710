//! Index-addressed node pool with slot reuse.

use std::mem;
use std::ops::{Index, IndexMut};
use std::vec::Vec;

/// A stable handle to an object stored in a `NodeArena<T>`.
///
/// The handle stays valid until the object is freed. Afterwards the slot may be handed out again
/// by a later allocation, so a stale handle can alias an unrelated object.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the slot index the handle refers to.
    pub fn index(self) -> usize {
        self.0
    }
}

enum Slot<T> {
    Occupied(T),
    Vacant(Option<NodeId>),
}

/// A pool of objects of a single type addressed by `NodeId`.
///
/// Linked structures keep `NodeId`s instead of references, so nodes can point at their parents and
/// at each other without shared ownership. Freed slots form an intrusive free list and are reused
/// before the underlying `Vec` grows. No unsafe code is involved.
///
/// # Examples
///
/// ```
/// use treap_bimap::arena::NodeArena;
///
/// let mut arena = NodeArena::new();
///
/// let x = arena.allocate(1);
/// assert_eq!(arena[x], 1);
///
/// arena[x] += 1;
/// assert_eq!(arena[x], 2);
///
/// assert_eq!(arena.free(x), 2);
/// assert!(arena.is_empty());
/// ```
pub struct NodeArena<T> {
    head: Option<NodeId>,
    slots: Vec<Slot<T>>,
    len: usize,
}

impl<T> NodeArena<T> {
    /// Constructs a new, empty `NodeArena<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_bimap::arena::NodeArena;
    ///
    /// let arena: NodeArena<u32> = NodeArena::new();
    /// ```
    pub fn new() -> Self {
        NodeArena {
            head: None,
            slots: Vec::new(),
            len: 0,
        }
    }

    /// Constructs a new, empty `NodeArena<T>` with room for `capacity` objects before the
    /// underlying storage reallocates.
    pub fn with_capacity(capacity: usize) -> Self {
        NodeArena {
            head: None,
            slots: Vec::with_capacity(capacity),
            len: 0,
        }
    }

    /// Stores an object in the arena and returns its `NodeId`. Vacant slots are reused in
    /// last-freed-first order.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_bimap::arena::NodeArena;
    ///
    /// let mut arena = NodeArena::new();
    /// let x = arena.allocate(0);
    /// arena.free(x);
    /// assert_eq!(arena.allocate(1), x);
    /// ```
    pub fn allocate(&mut self, value: T) -> NodeId {
        self.len += 1;
        match self.head.take() {
            None => {
                self.slots.push(Slot::Occupied(value));
                NodeId(self.slots.len() - 1)
            },
            Some(id) => {
                let vacant_slot = mem::replace(&mut self.slots[id.0], Slot::Occupied(value));
                match vacant_slot {
                    Slot::Vacant(next_id) => {
                        self.head = next_id;
                        id
                    },
                    Slot::Occupied(_) => panic!("Error: free list points at an occupied slot."),
                }
            },
        }
    }

    /// Removes an object from the arena and returns it.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to an occupied slot.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_bimap::arena::NodeArena;
    ///
    /// let mut arena = NodeArena::new();
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.free(x), 0);
    /// ```
    pub fn free(&mut self, id: NodeId) -> T {
        if id.0 >= self.slots.len() {
            panic!("Error: attempting to free invalid slot.");
        }
        if let Slot::Vacant(_) = self.slots[id.0] {
            panic!("Error: attempting to free vacant slot.");
        }
        let old_slot = mem::replace(&mut self.slots[id.0], Slot::Vacant(self.head.take()));
        self.head = Some(id);
        self.len -= 1;
        match old_slot {
            Slot::Occupied(value) => value,
            Slot::Vacant(_) => unreachable!(),
        }
    }

    /// Returns an immutable reference to an object in the arena, or `None` if `id` does not refer
    /// to an occupied slot.
    pub fn get(&self, id: NodeId) -> Option<&T> {
        match self.slots.get(id.0) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to an object in the arena, or `None` if `id` does not refer to
    /// an occupied slot.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        match self.slots.get_mut(id.0) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the arena holds no objects.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<NodeId> for NodeArena<T> {
    type Output = T;

    fn index(&self, id: NodeId) -> &Self::Output {
        self.get(id).expect("Error: node id out of bounds.")
    }
}

impl<T> IndexMut<NodeId> for NodeArena<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        self.get_mut(id).expect("Error: node id out of bounds.")
    }
}

#[cfg(test)]
mod tests {
    use super::{NodeArena, NodeId};

    #[test]
    #[should_panic]
    fn test_free_invalid_slot() {
        let mut arena: NodeArena<u32> = NodeArena::new();
        arena.free(NodeId(0));
    }

    #[test]
    #[should_panic]
    fn test_free_vacant_slot() {
        let mut arena = NodeArena::new();
        let x = arena.allocate(0);
        arena.free(x);
        arena.free(x);
    }

    #[test]
    fn test_allocate() {
        let mut arena = NodeArena::new();
        assert_eq!(arena.allocate(0), NodeId(0));
        assert_eq!(arena.allocate(0), NodeId(1));
        assert_eq!(arena.allocate(0), NodeId(2));
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn test_free_reuses_slots_lifo() {
        let mut arena = NodeArena::new();
        let a = arena.allocate('a');
        let b = arena.allocate('b');
        let c = arena.allocate('c');
        assert_eq!(arena.free(a), 'a');
        assert_eq!(arena.free(c), 'c');
        assert_eq!(arena.len(), 1);

        assert_eq!(arena.allocate('d'), c);
        assert_eq!(arena.allocate('e'), a);
        assert_eq!(arena.allocate('f'), NodeId(3));
        assert_eq!(arena[b], 'b');
    }

    #[test]
    fn test_get_vacant_slot() {
        let mut arena = NodeArena::new();
        let x = arena.allocate(0);
        arena.free(x);
        assert_eq!(arena.get(x), None);
        assert!(arena.is_empty());
    }

    #[test]
    fn test_get_invalid_slot() {
        let mut arena: NodeArena<u32> = NodeArena::with_capacity(4);
        assert_eq!(arena.get(NodeId(0)), None);
        assert_eq!(arena.get_mut(NodeId(0)), None);
    }

    #[test]
    fn test_get_mut() {
        let mut arena = NodeArena::new();
        let x = arena.allocate(0);
        *arena.get_mut(x).unwrap() = 1;
        assert_eq!(arena.get(x), Some(&1));
    }
}
