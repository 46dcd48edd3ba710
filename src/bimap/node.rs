use crate::arena::{NodeArena, NodeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// The slot every bimap allocates first. It carries no pair and its `left` links hold the roots of
/// both trees.
pub const SENTINEL: NodeId = NodeId(0);

/// Tree membership of a node under one role.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Links {
    pub parent: Option<NodeId>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
}

/// One stored association.
pub struct Pair<L, R> {
    pub left: L,
    pub right: R,
}

/// A single allocation that is simultaneously a member of the left tree and of the right tree.
pub struct Node<L, R> {
    pub left_links: Links,
    pub right_links: Links,
    pub priority: u32,
    pub pair: Option<Pair<L, R>>,
}

impl<L, R> Node<L, R> {
    pub fn new(left: L, right: R, priority: u32) -> Self {
        Node {
            left_links: Links::default(),
            right_links: Links::default(),
            priority,
            pair: Some(Pair { left, right }),
        }
    }

    pub fn sentinel() -> Self {
        Node {
            left_links: Links::default(),
            right_links: Links::default(),
            priority: 0,
            pair: None,
        }
    }

    pub fn pair(&self) -> &Pair<L, R> {
        self.pair.as_ref().expect("Error: dereferenced the end position.")
    }
}

/// One side of a bimap.
///
/// `Left` and `Right` are the only roles. Each is the other's `Other`, which is what lets a handle
/// be flipped without looking at the node. The trait cannot be implemented outside this crate.
///
/// ```compile_fail
/// use treap_bimap::bimap::Role;
///
/// enum Middle {}
///
/// impl Role for Middle {
///     type Other = Middle;
/// }
/// ```
pub trait Role: Linked {
    type Other: Role<Other = Self>;
}

/// Selects which set of link fields of a `Node` is in use. Not nameable outside the crate.
pub trait Linked: Sized {
    fn links<L, R>(node: &Node<L, R>) -> &Links;

    fn links_mut<L, R>(node: &mut Node<L, R>) -> &mut Links;

    /// Makes `child` the left child of `parent` and repoints the child's parent link.
    fn attach_left<L, R>(nodes: &mut NodeArena<Node<L, R>>, parent: NodeId, child: Option<NodeId>) {
        Self::links_mut(&mut nodes[parent]).left = child;
        if let Some(child) = child {
            Self::links_mut(&mut nodes[child]).parent = Some(parent);
        }
    }

    /// Makes `child` the right child of `parent` and repoints the child's parent link.
    fn attach_right<L, R>(
        nodes: &mut NodeArena<Node<L, R>>,
        parent: NodeId,
        child: Option<NodeId>,
    ) {
        Self::links_mut(&mut nodes[parent]).right = child;
        if let Some(child) = child {
            Self::links_mut(&mut nodes[child]).parent = Some(parent);
        }
    }

    /// Returns the leftmost node of the subtree rooted at `id`.
    fn leftmost<L, R>(nodes: &NodeArena<Node<L, R>>, mut id: NodeId) -> NodeId {
        while let Some(left) = Self::links(&nodes[id]).left {
            id = left;
        }
        id
    }

    /// Returns the rightmost node of the subtree rooted at `id`.
    fn rightmost<L, R>(nodes: &NodeArena<Node<L, R>>, mut id: NodeId) -> NodeId {
        while let Some(right) = Self::links(&nodes[id]).right {
            id = right;
        }
        id
    }

    /// Returns the in-order successor of `id`. The successor of the maximum is the sentinel.
    ///
    /// # Panics
    ///
    /// Panics if `id` is the sentinel.
    fn successor<L, R>(nodes: &NodeArena<Node<L, R>>, id: NodeId) -> NodeId {
        if let Some(right) = Self::links(&nodes[id]).right {
            return Self::leftmost(nodes, right);
        }
        let mut curr = id;
        loop {
            let parent = Self::links(&nodes[curr])
                .parent
                .expect("Error: advanced past the end position.");
            if Self::links(&nodes[parent]).left == Some(curr) {
                return parent;
            }
            curr = parent;
        }
    }

    /// Returns the in-order predecessor of `id`. The predecessor of the sentinel is the maximum.
    ///
    /// # Panics
    ///
    /// Panics if `id` is the minimum.
    fn predecessor<L, R>(nodes: &NodeArena<Node<L, R>>, id: NodeId) -> NodeId {
        if let Some(left) = Self::links(&nodes[id]).left {
            return Self::rightmost(nodes, left);
        }
        let mut curr = id;
        loop {
            let parent = Self::links(&nodes[curr])
                .parent
                .expect("Error: retreated past the first position.");
            if Self::links(&nodes[parent]).right == Some(curr) {
                return parent;
            }
            curr = parent;
        }
    }
}

/// A role together with the key it orders by for a particular pair type.
pub trait Side<L, R>: Role {
    /// The key this side is ordered by.
    type Key;
    /// The key of the opposite side.
    type Value;

    fn key(pair: &Pair<L, R>) -> &Self::Key;

    fn value(pair: &Pair<L, R>) -> &Self::Value;
}

/// The role of a node as a member of the tree ordered by left keys.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Left {}

/// The role of a node as a member of the tree ordered by right keys.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Right {}

impl Role for Left {
    type Other = Right;
}

impl Linked for Left {
    fn links<L, R>(node: &Node<L, R>) -> &Links {
        &node.left_links
    }

    fn links_mut<L, R>(node: &mut Node<L, R>) -> &mut Links {
        &mut node.left_links
    }
}

impl Role for Right {
    type Other = Left;
}

impl Linked for Right {
    fn links<L, R>(node: &Node<L, R>) -> &Links {
        &node.right_links
    }

    fn links_mut<L, R>(node: &mut Node<L, R>) -> &mut Links {
        &mut node.right_links
    }
}

impl<L, R> Side<L, R> for Left {
    type Key = L;
    type Value = R;

    fn key(pair: &Pair<L, R>) -> &L {
        &pair.left
    }

    fn value(pair: &Pair<L, R>) -> &R {
        &pair.right
    }
}

impl<L, R> Side<L, R> for Right {
    type Key = R;
    type Value = L;

    fn key(pair: &Pair<L, R>) -> &R {
        &pair.right
    }

    fn value(pair: &Pair<L, R>) -> &L {
        &pair.left
    }
}

/// A position in one side's ordering of a bimap.
///
/// A handle is a plain node identity scoped to a role; it does not borrow the bimap. Two handles
/// are equal when they name the same node. The end position of either side is the shared sentinel,
/// so `end_left().flip() == end_right()`.
///
/// Erasing a pair invalidates the handles naming it on both sides. All other handles stay valid.
pub struct Handle<S> {
    id: NodeId,
    role: PhantomData<S>,
}

/// A position in the left ordering.
pub type LeftHandle = Handle<Left>;

/// A position in the right ordering.
pub type RightHandle = Handle<Right>;

impl<S> Handle<S> {
    pub(crate) fn new(id: NodeId) -> Self {
        Handle {
            id,
            role: PhantomData,
        }
    }

    pub(crate) fn id(self) -> NodeId {
        self.id
    }
}

impl<S: Role> Handle<S> {
    /// Returns the handle to the same pair viewed from the other side.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_bimap::Bimap;
    ///
    /// let mut map = Bimap::new();
    /// let left = map.insert(1, "one");
    /// let right = left.flip();
    ///
    /// assert_eq!(map.get(right), Some(&"one"));
    /// assert_eq!(right.flip(), left);
    /// assert_eq!(map.end_left().flip(), map.end_right());
    /// ```
    pub fn flip(self) -> Handle<S::Other> {
        Handle::new(self.id)
    }
}

impl<S> Clone for Handle<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Handle<S> {}

impl<S> PartialEq for Handle<S> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<S> Eq for Handle<S> {}

impl<S> Hash for Handle<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<S> fmt::Debug for Handle<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.id == SENTINEL {
            write!(f, "Handle(end)")
        } else {
            write!(f, "Handle({})", self.id.index())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Handle, Left, Linked, Links, Node, Right, Side, SENTINEL};
    use crate::arena::NodeArena;

    // Builds   sentinel -> 2
    //                     / \
    //                    1   3
    // on the left role only.
    fn small_tree() -> NodeArena<Node<u32, char>> {
        let mut nodes = NodeArena::new();
        nodes.allocate(Node::sentinel());
        let one = nodes.allocate(Node::new(1, 'a', 0));
        let two = nodes.allocate(Node::new(2, 'b', 0));
        let three = nodes.allocate(Node::new(3, 'c', 0));
        Left::attach_left(&mut nodes, SENTINEL, Some(two));
        Left::attach_left(&mut nodes, two, Some(one));
        Left::attach_right(&mut nodes, two, Some(three));
        nodes
    }

    fn key_of(nodes: &NodeArena<Node<u32, char>>, id: crate::arena::NodeId) -> u32 {
        *<Left as Side<u32, char>>::key(nodes[id].pair())
    }

    #[test]
    fn test_attach_sets_parent() {
        let nodes = small_tree();
        let root = Left::links(&nodes[SENTINEL]).left.unwrap();
        assert_eq!(Left::links(&nodes[root]).parent, Some(SENTINEL));
        assert_eq!(Right::links(&nodes[root]), &Links::default());
    }

    #[test]
    fn test_successor_walk() {
        let nodes = small_tree();
        let mut curr = Left::leftmost(&nodes, SENTINEL);
        let mut keys = Vec::new();
        while curr != SENTINEL {
            keys.push(key_of(&nodes, curr));
            curr = Left::successor(&nodes, curr);
        }
        assert_eq!(keys, vec![1, 2, 3]);
    }

    #[test]
    fn test_predecessor_walk() {
        let nodes = small_tree();
        let mut curr = Left::predecessor(&nodes, SENTINEL);
        let mut keys = Vec::new();
        loop {
            keys.push(key_of(&nodes, curr));
            if curr == Left::leftmost(&nodes, SENTINEL) {
                break;
            }
            curr = Left::predecessor(&nodes, curr);
        }
        assert_eq!(keys, vec![3, 2, 1]);
    }

    #[test]
    #[should_panic]
    fn test_successor_of_sentinel() {
        let nodes = small_tree();
        Left::successor(&nodes, SENTINEL);
    }

    #[test]
    fn test_side_projection() {
        let node = Node::new(7u32, "seven", 1);
        assert_eq!(<Left as Side<u32, &str>>::key(node.pair()), &7);
        assert_eq!(<Left as Side<u32, &str>>::value(node.pair()), &"seven");
        assert_eq!(<Right as Side<u32, &str>>::key(node.pair()), &"seven");
        assert_eq!(<Right as Side<u32, &str>>::value(node.pair()), &7);
    }

    #[test]
    fn test_flip() {
        let handle: Handle<Left> = Handle::new(SENTINEL);
        let flipped: Handle<Right> = handle.flip();
        assert_eq!(flipped.id(), SENTINEL);
        assert_eq!(flipped.flip(), handle);
    }
}
