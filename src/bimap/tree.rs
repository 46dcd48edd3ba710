use crate::arena::{NodeArena, NodeId};
use crate::bimap::node::{Links, Node, Role, Side, SENTINEL};
use crate::compare::Compare;
use std::marker::PhantomData;

/// One side's treap over the nodes of a shared arena.
///
/// The tree owns no nodes and no root: the root is the left child of the sentinel under role `S`.
/// Nodes are addressed only through their `S` links, so the two trees of a bimap never disturb
/// each other. The tree performs no deduplication; callers insert only absent keys.
pub struct Tree<S, C> {
    comparator: C,
    side: PhantomData<S>,
}

impl<S, C> Tree<S, C> {
    pub fn new(comparator: C) -> Self {
        Tree {
            comparator,
            side: PhantomData,
        }
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }
}

impl<S: Role, C> Tree<S, C> {
    pub fn root<L, R>(&self, nodes: &NodeArena<Node<L, R>>) -> Option<NodeId> {
        S::links(&nodes[SENTINEL]).left
    }

    fn set_root<L, R>(&self, nodes: &mut NodeArena<Node<L, R>>, root: Option<NodeId>) {
        S::attach_left(nodes, SENTINEL, root);
    }

    pub fn begin<L, R>(&self, nodes: &NodeArena<Node<L, R>>) -> NodeId {
        S::leftmost(nodes, SENTINEL)
    }

    pub fn end(&self) -> NodeId {
        SENTINEL
    }

    /// Merges two treaps where every key of `l_tree` precedes every key of `r_tree`. The root with
    /// the strictly greater priority stays on top.
    pub fn merge<L, R>(
        &self,
        nodes: &mut NodeArena<Node<L, R>>,
        l_tree: Option<NodeId>,
        r_tree: Option<NodeId>,
    ) -> Option<NodeId> {
        match (l_tree, r_tree) {
            (Some(l_id), Some(r_id)) => {
                if nodes[l_id].priority > nodes[r_id].priority {
                    let l_right = S::links(&nodes[l_id]).right;
                    let merged = self.merge(nodes, l_right, Some(r_id));
                    S::attach_right(nodes, l_id, merged);
                    Some(l_id)
                } else {
                    let r_left = S::links(&nodes[r_id]).left;
                    let merged = self.merge(nodes, Some(l_id), r_left);
                    S::attach_left(nodes, r_id, merged);
                    Some(r_id)
                }
            },
            (tree, None) | (None, tree) => tree,
        }
    }

    /// Removes `id` from the tree by merging its children into the slot it occupied. The node's
    /// links under this role are cleared; nothing else outside its neighborhood is touched.
    pub fn erase<L, R>(&self, nodes: &mut NodeArena<Node<L, R>>, id: NodeId) {
        let Links {
            parent,
            left,
            right,
        } = *S::links(&nodes[id]);
        let parent = parent.expect("Error: attempting to erase a detached node.");
        let merged = self.merge(nodes, left, right);
        if S::links(&nodes[parent]).left == Some(id) {
            S::attach_left(nodes, parent, merged);
        } else {
            S::attach_right(nodes, parent, merged);
        }
        *S::links_mut(&mut nodes[id]) = Links::default();
    }
}

impl<S, C> Tree<S, C> {
    fn less_than_pivot<L, R>(
        &self,
        nodes: &NodeArena<Node<L, R>>,
        id: NodeId,
        pivot: NodeId,
        inclusive: bool,
    ) -> bool
    where
        S: Side<L, R>,
        C: Compare<S::Key>,
    {
        let key = S::key(nodes[id].pair());
        let pivot_key = S::key(nodes[pivot].pair());
        if inclusive {
            !self.comparator.less(pivot_key, key)
        } else {
            self.comparator.less(key, pivot_key)
        }
    }

    /// Splits `tree` around the key of `pivot` into the nodes ordered before it and the nodes
    /// ordered at or after it. With `inclusive`, nodes equivalent to the pivot go to the low half.
    /// The pivot itself need not be part of `tree`.
    pub fn split<L, R>(
        &self,
        nodes: &mut NodeArena<Node<L, R>>,
        tree: Option<NodeId>,
        pivot: NodeId,
        inclusive: bool,
    ) -> (Option<NodeId>, Option<NodeId>)
    where
        S: Side<L, R>,
        C: Compare<S::Key>,
    {
        let id = match tree {
            Some(id) => id,
            None => return (None, None),
        };
        if self.less_than_pivot(nodes, id, pivot, inclusive) {
            let right = S::links(&nodes[id]).right;
            let (low, high) = self.split(nodes, right, pivot, inclusive);
            S::attach_right(nodes, id, low);
            (Some(id), high)
        } else {
            let left = S::links(&nodes[id]).left;
            let (low, high) = self.split(nodes, left, pivot, inclusive);
            S::attach_left(nodes, id, high);
            (low, Some(id))
        }
    }

    /// Links a freshly allocated node into the tree. Its key must not be present yet.
    pub fn insert<L, R>(&self, nodes: &mut NodeArena<Node<L, R>>, id: NodeId)
    where
        S: Side<L, R>,
        C: Compare<S::Key>,
    {
        *S::links_mut(&mut nodes[id]) = Links::default();
        let root = self.root(nodes);
        let (low, high) = self.split(nodes, root, id, false);
        let low = self.merge(nodes, low, Some(id));
        let root = self.merge(nodes, low, high);
        self.set_root(nodes, root);
    }

    fn bound<L, R>(&self, nodes: &NodeArena<Node<L, R>>, key: &S::Key, inclusive: bool) -> NodeId
    where
        S: Side<L, R>,
        C: Compare<S::Key>,
    {
        let mut candidate = SENTINEL;
        let mut curr = self.root(nodes);
        while let Some(id) = curr {
            let node = &nodes[id];
            let node_key = S::key(node.pair());
            let goes_right = if inclusive {
                !self.comparator.less(key, node_key)
            } else {
                self.comparator.less(node_key, key)
            };
            if goes_right {
                curr = S::links(node).right;
            } else {
                candidate = id;
                curr = S::links(node).left;
            }
        }
        candidate
    }

    /// Returns the first node whose key is not ordered before `key`, or the sentinel.
    pub fn lower_bound<L, R>(&self, nodes: &NodeArena<Node<L, R>>, key: &S::Key) -> NodeId
    where
        S: Side<L, R>,
        C: Compare<S::Key>,
    {
        self.bound(nodes, key, false)
    }

    /// Returns the first node whose key is ordered after `key`, or the sentinel.
    pub fn upper_bound<L, R>(&self, nodes: &NodeArena<Node<L, R>>, key: &S::Key) -> NodeId
    where
        S: Side<L, R>,
        C: Compare<S::Key>,
    {
        self.bound(nodes, key, true)
    }

    /// Returns the node whose key is equivalent to `key`, or the sentinel.
    pub fn find<L, R>(&self, nodes: &NodeArena<Node<L, R>>, key: &S::Key) -> NodeId
    where
        S: Side<L, R>,
        C: Compare<S::Key>,
    {
        let id = self.lower_bound(nodes, key);
        if id != SENTINEL && self.comparator.equivalent(S::key(nodes[id].pair()), key) {
            id
        } else {
            SENTINEL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Tree;
    use crate::arena::{NodeArena, NodeId};
    use crate::bimap::node::{Left, Linked, Node, Right, Role, SENTINEL};
    use crate::compare::Natural;
    use rand::{Rng, SeedableRng, XorShiftRng};

    type Nodes = NodeArena<Node<u32, u32>>;

    fn setup() -> Nodes {
        let mut nodes = NodeArena::new();
        nodes.allocate(Node::sentinel());
        nodes
    }

    fn in_order<S: Role>(nodes: &Nodes, tree: &Tree<S, Natural>) -> Vec<NodeId> {
        let mut ret = Vec::new();
        let mut curr = tree.begin(nodes);
        while curr != tree.end() {
            ret.push(curr);
            curr = S::successor(nodes, curr);
        }
        ret
    }

    fn check_heap<S: Role>(nodes: &Nodes, id: Option<NodeId>, parent: NodeId) {
        if let Some(id) = id {
            let links = S::links(&nodes[id]);
            assert_eq!(links.parent, Some(parent));
            if parent != SENTINEL {
                assert!(nodes[parent].priority >= nodes[id].priority);
            }
            check_heap::<S>(nodes, links.left, id);
            check_heap::<S>(nodes, links.right, id);
        }
    }

    #[test]
    fn test_insert_with_fixed_priorities() {
        let mut nodes = setup();
        let tree: Tree<Left, Natural> = Tree::new(Natural);
        let a = nodes.allocate(Node::new(2, 0, 10));
        let b = nodes.allocate(Node::new(1, 0, 30));
        let c = nodes.allocate(Node::new(3, 0, 20));
        tree.insert(&mut nodes, a);
        tree.insert(&mut nodes, b);
        tree.insert(&mut nodes, c);

        assert_eq!(tree.root(&nodes), Some(b));
        assert_eq!(Left::links(&nodes[b]).right, Some(c));
        assert_eq!(Left::links(&nodes[c]).left, Some(a));
        assert_eq!(in_order(&nodes, &tree), vec![b, a, c]);
        check_heap::<Left>(&nodes, tree.root(&nodes), SENTINEL);
    }

    #[test]
    fn test_merge_tie_favors_right_root() {
        let mut nodes = setup();
        let tree: Tree<Left, Natural> = Tree::new(Natural);
        let low = nodes.allocate(Node::new(1, 0, 5));
        let high = nodes.allocate(Node::new(2, 0, 5));
        let root = tree.merge(&mut nodes, Some(low), Some(high));
        assert_eq!(root, Some(high));
        assert_eq!(Left::links(&nodes[high]).left, Some(low));
    }

    #[test]
    fn test_split_inclusive() {
        let mut nodes = setup();
        let tree: Tree<Left, Natural> = Tree::new(Natural);
        let ids: Vec<NodeId> = (0..10)
            .map(|key| {
                let id = nodes.allocate(Node::new(key, 0, key * 7 % 11));
                tree.insert(&mut nodes, id);
                id
            })
            .collect();
        let pivot = nodes.allocate(Node::new(4, 0, 0));

        let root = tree.root(&nodes);
        let (low, high) = tree.split(&mut nodes, root, pivot, false);
        assert_eq!(Left::leftmost(&nodes, low.unwrap()), ids[0]);
        assert_eq!(Left::rightmost(&nodes, low.unwrap()), ids[3]);
        assert_eq!(Left::leftmost(&nodes, high.unwrap()), ids[4]);

        let root = tree.merge(&mut nodes, low, high);
        let (low, high) = tree.split(&mut nodes, root, pivot, true);
        assert_eq!(Left::rightmost(&nodes, low.unwrap()), ids[4]);
        assert_eq!(Left::leftmost(&nodes, high.unwrap()), ids[5]);
    }

    #[test]
    fn test_erase_relinks_parent() {
        let mut nodes = setup();
        let tree: Tree<Left, Natural> = Tree::new(Natural);
        let ids: Vec<NodeId> = (0..5)
            .map(|key| {
                let id = nodes.allocate(Node::new(key, 0, 100 - key));
                tree.insert(&mut nodes, id);
                id
            })
            .collect();

        tree.erase(&mut nodes, ids[2]);
        assert_eq!(in_order(&nodes, &tree), vec![ids[0], ids[1], ids[3], ids[4]]);
        check_heap::<Left>(&nodes, tree.root(&nodes), SENTINEL);

        tree.erase(&mut nodes, ids[0]);
        assert_eq!(tree.root(&nodes), Some(ids[1]));
        check_heap::<Left>(&nodes, tree.root(&nodes), SENTINEL);
    }

    #[test]
    fn test_roles_are_independent() {
        let mut nodes = setup();
        let left: Tree<Left, Natural> = Tree::new(Natural);
        let right: Tree<Right, Natural> = Tree::new(Natural);
        let ids: Vec<NodeId> = (0..6)
            .map(|key| {
                let id = nodes.allocate(Node::new(key, 10 - key, key * 13 % 7));
                left.insert(&mut nodes, id);
                right.insert(&mut nodes, id);
                id
            })
            .collect();

        let mut reversed = ids.clone();
        reversed.reverse();
        assert_eq!(in_order(&nodes, &left), ids);
        assert_eq!(in_order(&nodes, &right), reversed);

        left.erase(&mut nodes, ids[3]);
        assert_eq!(in_order(&nodes, &right), reversed);
    }

    #[test]
    fn test_bounds_and_find() {
        let mut nodes = setup();
        let tree: Tree<Left, Natural> = Tree::new(Natural);
        let ids: Vec<NodeId> = [1, 3, 5]
            .iter()
            .map(|&key| {
                let id = nodes.allocate(Node::new(key, 0, key * 31));
                tree.insert(&mut nodes, id);
                id
            })
            .collect();

        assert_eq!(tree.lower_bound(&nodes, &0), ids[0]);
        assert_eq!(tree.lower_bound(&nodes, &3), ids[1]);
        assert_eq!(tree.lower_bound(&nodes, &4), ids[2]);
        assert_eq!(tree.lower_bound(&nodes, &6), SENTINEL);

        assert_eq!(tree.upper_bound(&nodes, &0), ids[0]);
        assert_eq!(tree.upper_bound(&nodes, &3), ids[2]);
        assert_eq!(tree.upper_bound(&nodes, &5), SENTINEL);

        assert_eq!(tree.find(&nodes, &5), ids[2]);
        assert_eq!(tree.find(&nodes, &4), SENTINEL);
    }

    #[test]
    fn test_random_insert_erase_keeps_invariants() {
        let mut rng: XorShiftRng = SeedableRng::from_seed([1, 1, 1, 1]);
        let mut nodes = setup();
        let tree: Tree<Left, Natural> = Tree::new(Natural);
        let mut live: Vec<(u32, NodeId)> = Vec::new();

        for _ in 0..2000 {
            let key = rng.gen_range(0, 500);
            match live.iter().position(|&(k, _)| k == key) {
                Some(index) => {
                    let (_, id) = live.swap_remove(index);
                    tree.erase(&mut nodes, id);
                    nodes.free(id);
                },
                None => {
                    let id = nodes.allocate(Node::new(key, 0, rng.next_u32()));
                    tree.insert(&mut nodes, id);
                    live.push((key, id));
                },
            }
        }

        live.sort();
        let expected: Vec<NodeId> = live.iter().map(|&(_, id)| id).collect();
        assert_eq!(in_order(&nodes, &tree), expected);
        check_heap::<Left>(&nodes, tree.root(&nodes), SENTINEL);
    }
}
