use crate::arena::{NodeArena, NodeId};
use crate::bimap::cursor::{Cursor, Iter};
use crate::bimap::node::{Handle, Left, LeftHandle, Node, Right, RightHandle, Role, Side, SENTINEL};
use crate::bimap::tree::Tree;
use crate::bimap::{Error, Result};
use crate::compare::{Compare, Natural};
use rand::{Rng, SeedableRng, XorShiftRng};
use std::fmt;
use std::iter::FromIterator;
use std::mem;

/// A bidirectional map implemented by two treaps that share their nodes.
///
/// A bimap stores pairs `(L, R)` in which every left key and every right key is unique. Both sides
/// are ordered, each by its own comparator, and either side can be searched or traversed in order.
/// Every pair is a single allocation that is linked into both trees at once, so moving from a
/// position on one side to the same pair on the other side (`Handle::flip`) costs nothing.
///
/// A treap is a tree that satisfies both the binary search tree property and a heap property. Each
/// node has a key and a priority. The key of any node is greater than all keys in its left subtree
/// and less than all keys occuring in its right subtree. The priority of a node is greater than the
/// priority of all nodes in its subtrees. By randomly generating priorities, the expected height of
/// the tree is proportional to the logarithm of the number of keys. A pair draws one priority that
/// both of its trees use.
///
/// Positions are `Handle`s: copyable node identities that do not borrow the map. Erasing a pair
/// invalidates the handles that name it on either side and no others.
///
/// # Examples
///
/// ```
/// use treap_bimap::Bimap;
///
/// let mut map = Bimap::new();
/// map.insert(1, "a");
/// map.insert(2, "b");
/// map.insert(3, "c");
///
/// assert_eq!(map.at_left(&2), Ok(&"b"));
/// assert_eq!(map.at_right(&"c"), Ok(&3));
/// assert_eq!(map.len(), 3);
///
/// assert!(map.erase_left_key(&2));
/// assert_eq!(map.find_right(&"b"), map.end_right());
/// assert_eq!(map.len(), 2);
/// ```
pub struct Bimap<L, R, CL = Natural, CR = Natural> {
    nodes: NodeArena<Node<L, R>>,
    left_tree: Tree<Left, CL>,
    right_tree: Tree<Right, CR>,
    rng: XorShiftRng,
    len: usize,
}

fn seeded_rng(seed: u64) -> XorShiftRng {
    // the high words keep the state non-zero for every seed
    SeedableRng::from_seed([seed as u32, (seed >> 32) as u32, 0x9e37_79b9, 0x7f4a_7c15])
}

impl<L, R> Bimap<L, R>
where
    L: Ord,
    R: Ord,
{
    /// Constructs a new, empty `Bimap<L, R>` ordered by `Ord` on both sides.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_bimap::Bimap;
    ///
    /// let map: Bimap<u32, String> = Bimap::new();
    /// ```
    pub fn new() -> Self {
        Self::with_comparators(Natural, Natural)
    }

    /// Constructs a new, empty `Bimap<L, R>` ordered by `Ord` on both sides whose priorities are
    /// drawn from a generator seeded with `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_comparators_and_seed(Natural, Natural, seed)
    }
}

impl<L, R, CL, CR> Bimap<L, R, CL, CR>
where
    CL: Compare<L>,
    CR: Compare<R>,
{
    fn from_parts(compare_left: CL, compare_right: CR, rng: XorShiftRng, capacity: usize) -> Self {
        let mut nodes = NodeArena::with_capacity(capacity + 1);
        let sentinel = nodes.allocate(Node::sentinel());
        debug_assert_eq!(sentinel, SENTINEL);
        Bimap {
            nodes,
            left_tree: Tree::new(compare_left),
            right_tree: Tree::new(compare_right),
            rng,
            len: 0,
        }
    }

    /// Constructs a new, empty `Bimap<L, R, CL, CR>` with custom comparators.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_bimap::Bimap;
    ///
    /// let mut map = Bimap::with_comparators(
    ///     |a: &u32, b: &u32| b.cmp(a),
    ///     |a: &char, b: &char| a.cmp(b),
    /// );
    /// map.insert(1, 'x');
    /// map.insert(2, 'y');
    /// assert_eq!(map.get(map.begin_left()), Some(&2));
    /// assert_eq!(map.get(map.begin_right()), Some(&'x'));
    /// ```
    pub fn with_comparators(compare_left: CL, compare_right: CR) -> Self {
        Self::from_parts(compare_left, compare_right, XorShiftRng::new_unseeded(), 0)
    }

    /// Constructs a new, empty `Bimap<L, R, CL, CR>` with custom comparators whose priorities are
    /// drawn from a generator seeded with `seed`.
    pub fn with_comparators_and_seed(compare_left: CL, compare_right: CR, seed: u64) -> Self {
        Self::from_parts(compare_left, compare_right, seeded_rng(seed), 0)
    }

    /// Inserts the pair `(left, right)` and returns the position of `left`. If `left` or `right` is
    /// already present, nothing is inserted and `end_left()` is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_bimap::Bimap;
    ///
    /// let mut map = Bimap::new();
    /// let inserted = map.insert(1, 'a');
    /// assert_eq!(map.get(inserted), Some(&1));
    ///
    /// assert_eq!(map.insert(1, 'b'), map.end_left());
    /// assert_eq!(map.insert(2, 'a'), map.end_left());
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, left: L, right: R) -> LeftHandle {
        if self.find_left(&left) != self.end_left() || self.find_right(&right) != self.end_right() {
            trace!("rejected insert: key already present");
            return self.end_left();
        }
        let Bimap {
            ref mut nodes,
            ref left_tree,
            ref right_tree,
            ref mut rng,
            ref mut len,
        } = *self;
        let id = nodes.allocate(Node::new(left, right, rng.next_u32()));
        left_tree.insert(nodes, id);
        right_tree.insert(nodes, id);
        *len += 1;
        Handle::new(id)
    }

    /// Returns the position of `left`, or `end_left()` if it is absent.
    pub fn find_left(&self, left: &L) -> LeftHandle {
        Handle::new(self.left_tree.find(&self.nodes, left))
    }

    /// Returns the position of `right`, or `end_right()` if it is absent.
    pub fn find_right(&self, right: &R) -> RightHandle {
        Handle::new(self.right_tree.find(&self.nodes, right))
    }

    /// Returns the right key paired with `left`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if `left` is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_bimap::{Bimap, Error};
    ///
    /// let mut map = Bimap::new();
    /// map.insert(1, 'a');
    /// assert_eq!(map.at_left(&1), Ok(&'a'));
    /// assert_eq!(map.at_left(&2), Err(Error::NotFound));
    /// ```
    pub fn at_left(&self, left: &L) -> Result<&R> {
        let handle = self.find_left(left);
        if handle == self.end_left() {
            return Err(Error::NotFound);
        }
        Ok(&self.nodes[handle.id()].pair().right)
    }

    /// Returns the left key paired with `right`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if `right` is absent.
    pub fn at_right(&self, right: &R) -> Result<&L> {
        let handle = self.find_right(right);
        if handle == self.end_right() {
            return Err(Error::NotFound);
        }
        Ok(&self.nodes[handle.id()].pair().left)
    }

    /// Returns the right key paired with `left`, inserting `(left, R::default())` if `left` is
    /// absent.
    ///
    /// **Warning:** right keys are unique, so if `left` is absent and some other pair already holds
    /// `R::default()`, that pair is erased first. The default value moves to `left`; the pair that
    /// held it is gone.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_bimap::Bimap;
    ///
    /// let mut map: Bimap<u32, String> = Bimap::new();
    /// assert_eq!(map.at_left_or_default(5), "");
    /// assert_eq!(map.at_left_or_default(6), "");
    ///
    /// assert_eq!(map.len(), 1);
    /// assert_eq!(map.at_right(&String::new()), Ok(&6));
    /// ```
    pub fn at_left_or_default(&mut self, left: L) -> &R
    where
        R: Default,
    {
        let mut handle = self.find_left(&left);
        if handle == self.end_left() {
            let right = R::default();
            if self.erase_right_key(&right) {
                debug!("evicted the pair holding the default right key");
            }
            handle = self.insert(left, right);
        }
        &self.nodes[handle.id()].pair().right
    }

    /// Returns the left key paired with `right`, inserting `(L::default(), right)` if `right` is
    /// absent.
    ///
    /// **Warning:** left keys are unique, so if `right` is absent and some other pair already holds
    /// `L::default()`, that pair is erased first.
    pub fn at_right_or_default(&mut self, right: R) -> &L
    where
        L: Default,
    {
        let mut handle = self.find_right(&right).flip();
        if handle == self.end_left() {
            let left = L::default();
            if self.erase_left_key(&left) {
                debug!("evicted the pair holding the default left key");
            }
            handle = self.insert(left, right);
        }
        &self.nodes[handle.id()].pair().left
    }

    /// Returns the first position whose left key is not ordered before `left`.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_bimap::Bimap;
    ///
    /// let mut map = Bimap::new();
    /// map.insert(1, 'a');
    /// map.insert(3, 'b');
    /// assert_eq!(map.get(map.lower_bound_left(&2)), Some(&3));
    /// assert_eq!(map.get(map.upper_bound_left(&1)), Some(&3));
    /// assert_eq!(map.lower_bound_left(&4), map.end_left());
    /// ```
    pub fn lower_bound_left(&self, left: &L) -> LeftHandle {
        Handle::new(self.left_tree.lower_bound(&self.nodes, left))
    }

    /// Returns the first position whose left key is ordered after `left`.
    pub fn upper_bound_left(&self, left: &L) -> LeftHandle {
        Handle::new(self.left_tree.upper_bound(&self.nodes, left))
    }

    /// Returns the first position whose right key is not ordered before `right`.
    pub fn lower_bound_right(&self, right: &R) -> RightHandle {
        Handle::new(self.right_tree.lower_bound(&self.nodes, right))
    }

    /// Returns the first position whose right key is ordered after `right`.
    pub fn upper_bound_right(&self, right: &R) -> RightHandle {
        Handle::new(self.right_tree.upper_bound(&self.nodes, right))
    }

    /// Erases the pair with left key `left`. Returns `true` if such a pair existed.
    pub fn erase_left_key(&mut self, left: &L) -> bool {
        let handle = self.find_left(left);
        if handle == self.end_left() {
            return false;
        }
        self.erase_left(handle);
        true
    }

    /// Erases the pair with right key `right`. Returns `true` if such a pair existed.
    pub fn erase_right_key(&mut self, right: &R) -> bool {
        let handle = self.find_right(right);
        if handle == self.end_right() {
            return false;
        }
        self.erase_right(handle);
        true
    }

    /// Returns `true` if the two maps hold the same number of pairs and, walking both in left
    /// order, every left key and every right key is equivalent under this map's comparators.
    fn equivalent_to(&self, other: &Self) -> bool {
        let compare_left = self.left_tree.comparator();
        let compare_right = self.right_tree.comparator();
        self.len == other.len
            && self
                .iter_left()
                .zip(other.iter_left())
                .all(|((a_left, a_right), (b_left, b_right))| {
                    compare_left.equivalent(a_left, b_left)
                        && compare_right.equivalent(a_right, b_right)
                })
    }
}

impl<L, R, CL, CR> Bimap<L, R, CL, CR> {
    /// Erases the pair at `handle` from both sides and returns the position after it in left
    /// order. Handles to the erased pair on either side become invalid.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is `end_left()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_bimap::Bimap;
    ///
    /// let mut map = Bimap::new();
    /// map.insert(1, 'a');
    /// map.insert(2, 'b');
    ///
    /// let next = map.erase_left(map.begin_left());
    /// assert_eq!(map.get(next), Some(&2));
    /// assert_eq!(map.find_right(&'a'), map.end_right());
    /// ```
    pub fn erase_left(&mut self, handle: LeftHandle) -> LeftHandle {
        let next = self.next(handle);
        self.unlink(handle.id());
        next
    }

    /// Erases the pair at `handle` from both sides and returns the position after it in right
    /// order.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is `end_right()`.
    pub fn erase_right(&mut self, handle: RightHandle) -> RightHandle {
        let next = self.next(handle);
        self.unlink(handle.id());
        next
    }

    /// Erases the pairs in `[first, last)` in left order and returns `last`.
    pub fn erase_left_range(&mut self, first: LeftHandle, last: LeftHandle) -> LeftHandle {
        let mut curr = first;
        while curr != last {
            curr = self.erase_left(curr);
        }
        trace!("erased left range, {} pairs remain", self.len);
        last
    }

    /// Erases the pairs in `[first, last)` in right order and returns `last`.
    pub fn erase_right_range(&mut self, first: RightHandle, last: RightHandle) -> RightHandle {
        let mut curr = first;
        while curr != last {
            curr = self.erase_right(curr);
        }
        trace!("erased right range, {} pairs remain", self.len);
        last
    }

    fn unlink(&mut self, id: NodeId) {
        assert!(id != SENTINEL, "Error: attempting to erase the end position.");
        let Bimap {
            ref mut nodes,
            ref left_tree,
            ref right_tree,
            ref mut len,
            ..
        } = *self;
        left_tree.erase(nodes, id);
        right_tree.erase(nodes, id);
        *len -= 1;
        nodes.free(id);
    }

    /// Removes every pair. Comparators and the priority generator are kept.
    pub fn clear(&mut self) {
        let first = self.begin_left();
        let last = self.end_left();
        self.erase_left_range(first, last);
    }

    /// Returns the position of the smallest left key, or `end_left()` if the map is empty.
    pub fn begin_left(&self) -> LeftHandle {
        Handle::new(self.left_tree.begin(&self.nodes))
    }

    /// Returns the position after the largest left key.
    pub fn end_left(&self) -> LeftHandle {
        Handle::new(self.left_tree.end())
    }

    /// Returns the position of the smallest right key, or `end_right()` if the map is empty.
    pub fn begin_right(&self) -> RightHandle {
        Handle::new(self.right_tree.begin(&self.nodes))
    }

    /// Returns the position after the largest right key.
    pub fn end_right(&self) -> RightHandle {
        Handle::new(self.right_tree.end())
    }

    /// Returns the key at `handle`, or `None` at the end position.
    pub fn get<S: Side<L, R>>(&self, handle: Handle<S>) -> Option<&S::Key> {
        self.nodes
            .get(handle.id())
            .and_then(|node| node.pair.as_ref())
            .map(S::key)
    }

    /// Returns the position after `handle` in its side's order.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is the end position.
    pub fn next<S: Role>(&self, handle: Handle<S>) -> Handle<S> {
        Handle::new(S::successor(&self.nodes, handle.id()))
    }

    /// Returns the position before `handle` in its side's order. The position before the end is
    /// the last key.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is the first position.
    pub fn prev<S: Role>(&self, handle: Handle<S>) -> Handle<S> {
        Handle::new(S::predecessor(&self.nodes, handle.id()))
    }

    /// Returns a cursor at `handle`.
    pub fn cursor<S: Side<L, R>>(&self, handle: Handle<S>) -> Cursor<L, R, S> {
        Cursor::new(&self.nodes, handle)
    }

    /// Returns an iterator over `(&L, &R)` in left order.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_bimap::Bimap;
    ///
    /// let mut map = Bimap::new();
    /// map.insert(2, 'a');
    /// map.insert(1, 'b');
    ///
    /// let mut iterator = map.iter_left();
    /// assert_eq!(iterator.next(), Some((&1, &'b')));
    /// assert_eq!(iterator.next(), Some((&2, &'a')));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter_left(&self) -> Iter<L, R, Left> {
        Iter::new(&self.nodes, self.len)
    }

    /// Returns an iterator over `(&R, &L)` in right order.
    pub fn iter_right(&self) -> Iter<L, R, Right> {
        Iter::new(&self.nodes, self.len)
    }

    /// Returns the number of pairs.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Swaps the contents of two maps in constant time. Each map keeps the comparators its pairs
    /// are ordered by, so comparators travel with the contents.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }
}

impl<L, R, CL, CR> Default for Bimap<L, R, CL, CR>
where
    CL: Compare<L> + Default,
    CR: Compare<R> + Default,
{
    fn default() -> Self {
        Self::with_comparators(CL::default(), CR::default())
    }
}

/// Copies by reinserting every pair in left order. The copy's generator is seeded from a draw of
/// the source's, so its priorities and later insertions do not mirror the source.
impl<L, R, CL, CR> Clone for Bimap<L, R, CL, CR>
where
    L: Clone,
    R: Clone,
    CL: Compare<L> + Clone,
    CR: Compare<R> + Clone,
{
    fn clone(&self) -> Self {
        let seed = self.rng.clone().next_u64();
        let mut ret = Self::from_parts(
            self.left_tree.comparator().clone(),
            self.right_tree.comparator().clone(),
            seeded_rng(seed),
            self.len,
        );
        for (left, right) in self.iter_left() {
            ret.insert(left.clone(), right.clone());
        }
        ret
    }
}

impl<L, R, CL, CR> PartialEq for Bimap<L, R, CL, CR>
where
    CL: Compare<L>,
    CR: Compare<R>,
{
    fn eq(&self, other: &Self) -> bool {
        self.equivalent_to(other)
    }
}

impl<L, R, CL, CR> fmt::Debug for Bimap<L, R, CL, CR>
where
    L: fmt::Debug,
    R: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter_left()).finish()
    }
}

impl<L, R, CL, CR> Extend<(L, R)> for Bimap<L, R, CL, CR>
where
    CL: Compare<L>,
    CR: Compare<R>,
{
    fn extend<I: IntoIterator<Item = (L, R)>>(&mut self, iter: I) {
        for (left, right) in iter {
            self.insert(left, right);
        }
    }
}

impl<L, R, CL, CR> FromIterator<(L, R)> for Bimap<L, R, CL, CR>
where
    CL: Compare<L> + Default,
    CR: Compare<R> + Default,
{
    fn from_iter<I: IntoIterator<Item = (L, R)>>(iter: I) -> Self {
        let mut ret = Self::default();
        ret.extend(iter);
        ret
    }
}

impl<'a, L: 'a, R: 'a, CL, CR> IntoIterator for &'a Bimap<L, R, CL, CR> {
    type Item = (&'a L, &'a R);
    type IntoIter = Iter<'a, L, R, Left>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_left()
    }
}
