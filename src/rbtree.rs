use std::{
    borrow::Borrow,
    cmp::{Ord, Ordering},
    mem,
};

use log::{debug, trace};
use rand::Rng;

use crate::depth::Depth;
use crate::error::Error;
use crate::node::{Link, Node, NIL};

/// Rbtree manage a single instance of in-memory index using
/// [red-black][rbtree] tree.
///
/// Nodes are held in an arena and linked by index, the sentinel is
/// addressed by a reserved index and owned by this instance. Rbtree is
/// not safe for concurrent mutation, wrap it with [`RbtreeSync`] to
/// share it between threads.
///
/// [rbtree]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
/// [`RbtreeSync`]: crate::RbtreeSync
#[derive(Clone)]
pub struct Rbtree<K, V> {
    name: String,
    nodes: Vec<Node<K, V>>,
    sentinel: Link,
    root: usize,
    n_count: usize, // number of entries in the tree.
}

/// Different ways to construct a new Rbtree instance.
impl<K, V> Rbtree<K, V>
where
    K: Ord,
{
    /// Create an empty instance of Rbtree, identified by `name`.
    /// Applications can choose unique names.
    pub fn new<S>(name: S) -> Rbtree<K, V>
    where
        S: AsRef<str>,
    {
        Rbtree {
            name: name.as_ref().to_string(),
            nodes: Default::default(),
            sentinel: Link::sentinel(),
            root: NIL,
            n_count: Default::default(),
        }
    }

    /// Create a new instance of Rbtree tree and load it with entries
    /// from `iter`. Note that iterator should return (key, value) tuples,
    /// a repeated key overwrites the value loaded before it.
    pub fn load_from<S, I>(name: S, iter: I) -> Rbtree<K, V>
    where
        S: AsRef<str>,
        I: Iterator<Item = (K, V)>,
    {
        let mut tree = Rbtree::new(name);
        for (key, value) in iter {
            tree.set(key, value);
        }
        debug!("{}: loaded {} entries", tree.name, tree.n_count);
        tree
    }
}

/// Maintenance API.
impl<K, V> Rbtree<K, V>
where
    K: Ord,
{
    /// Identify this instance. Applications can choose unique names while
    /// creating Rbtree instances.
    #[inline]
    pub fn id(&self) -> String {
        self.name.clone()
    }

    /// Return number of entries in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_count
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_count == 0
    }

    /// Return quickly with basic statisics, only entries() method is valid
    /// with this statisics.
    pub fn stats(&self) -> Stats {
        Stats::new(self.n_count, mem::size_of::<Node<K, V>>())
    }

    /// Drop all entries, root goes back to the sentinel.
    pub fn empty(&mut self) {
        debug!("{}: emptied {} entries", self.name, self.n_count);
        self.nodes.clear();
        self.sentinel = Link::sentinel();
        self.root = NIL;
        self.n_count = 0;
    }
}

/// Write operations on Rbtree instance.
impl<K, V> Rbtree<K, V>
where
    K: Ord,
{
    /// Set value for key. If there is an existing entry for key,
    /// overwrite the old value with new value. Return true only if a
    /// new entry was created.
    pub fn set(&mut self, key: K, value: V) -> bool {
        self.insert(key, value, true)
    }

    /// Create a new {key, value} entry in the index. If key is already
    /// present leave it untouched and return false.
    pub fn set_nx(&mut self, key: K, value: V) -> bool {
        self.insert(key, value, false)
    }

    /// Delete key from this instance. If key is not present, then
    /// delete is effectively a no-op and returns false.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.find(key) {
            NIL => false,
            z => {
                self.delete_node(z);
                true
            }
        }
    }

    /// Move the value at `old_key` under `new_key`, overwriting any
    /// value already held by `new_key`. This is a delete followed by an
    /// insert, not an atomic relink. Return false if `old_key` is missing.
    pub fn move_key<Q>(&mut self, old_key: &Q, new_key: K) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let z = self.find(old_key);
        if z == NIL {
            return false;
        } else if self.nodes[z].key == new_key {
            return true;
        }
        let value = self.delete_node(z);
        let created = self.insert(new_key, value, true);
        trace!("{}: moved entry, created:{}", self.name, created);
        true
    }

    /// Validate Rbtree with following rules:
    ///
    /// * Root is black, sentinel is black.
    /// * From root to any leaf, no consecutive reds allowed in its path.
    /// * Number of blacks should be same under left child and right child.
    /// * Make sure keys are in sorted order.
    /// * Every child points back to its parent.
    /// * Number of reachable entries matches len().
    ///
    /// Additionally return full statistics on the tree. Refer to [`Stats`]
    /// for more information.
    pub fn validate(&self) -> Result<Stats, Error<K>>
    where
        K: Clone,
    {
        if !self.is_black(self.root) || !self.sentinel.black {
            return Err(Error::RedRoot);
        }
        let mut stats = Stats::new(self.n_count, mem::size_of::<Node<K, V>>());
        let mut check = Check {
            prev: NIL,
            count: 0,
            depths: Depth::new(),
        };
        let blacks = self.validate_tree(self.root, NIL, false, 0, 0, &mut check)?;
        if check.count != self.n_count {
            let (expected, found) = (self.n_count, check.count);
            return Err(Error::EntryCount { expected, found });
        }
        stats.set_blacks(blacks);
        stats.set_depths(check.depths);
        Ok(stats)
    }
}

/// Read operations on Rbtree instance.
impl<K, V> Rbtree<K, V>
where
    K: Ord,
{
    /// Get the value for key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.find(key) {
            NIL => None,
            n => Some(&self.nodes[n].value),
        }
    }

    /// Get the value for key, or the default value if key is missing.
    pub fn get_value<Q>(&self, key: &Q) -> V
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        V: Clone + Default,
    {
        self.get(key).cloned().unwrap_or_default()
    }

    /// Check whether key is present in this instance.
    pub fn exists<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key) != NIL
    }

    /// Return the entry with smallest key, None if index is empty.
    pub fn min(&self) -> Option<(&K, &V)> {
        match self.minimum(self.root) {
            NIL => None,
            n => Some(self.entry(n)),
        }
    }

    /// Return the entry with largest key, None if index is empty.
    pub fn max(&self) -> Option<(&K, &V)> {
        match self.maximum(self.root) {
            NIL => None,
            n => Some(self.entry(n)),
        }
    }

    /// Return a random entry from this index.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<(&K, &V)> {
        let mut n = self.root;
        if n == NIL {
            return None;
        }

        let mut at_depth = rng.gen::<u8>() % 40;
        loop {
            let next = match rng.gen::<u8>() % 2 {
                0 => self.left(n),
                _ => self.right(n),
            };
            if at_depth == 0 || next == NIL {
                break Some(self.entry(n));
            }
            at_depth -= 1;
            n = next;
        }
    }

    /// Return an iterator over all entries in this instance, in key
    /// order. Iterate in reverse with `iter().rev()`.
    pub fn iter(&self) -> Iter<K, V> {
        Iter {
            tree: self,
            front: self.minimum(self.root),
            back: self.maximum(self.root),
            remaining: self.n_count,
        }
    }
}

// Engine primitives, walk and iteration are built on top of these.
impl<K, V> Rbtree<K, V>
where
    K: Ord,
{
    pub(crate) fn find<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while current != NIL {
            let node = &self.nodes[current];
            current = match node.key.borrow().cmp(key) {
                Ordering::Less => node.link.right,
                Ordering::Greater => node.link.left,
                Ordering::Equal => return current,
            };
        }
        NIL
    }

    #[inline]
    pub(crate) fn root(&self) -> usize {
        self.root
    }

    #[inline]
    pub(crate) fn node(&self, n: usize) -> &Node<K, V> {
        &self.nodes[n]
    }

    #[inline]
    fn entry(&self, n: usize) -> (&K, &V) {
        let node = &self.nodes[n];
        (&node.key, &node.value)
    }

    fn minimum(&self, mut n: usize) -> usize {
        if n != NIL {
            while self.left(n) != NIL {
                n = self.left(n);
            }
        }
        n
    }

    fn maximum(&self, mut n: usize) -> usize {
        if n != NIL {
            while self.right(n) != NIL {
                n = self.right(n);
            }
        }
        n
    }

    fn successor(&self, mut n: usize) -> usize {
        if self.right(n) != NIL {
            return self.minimum(self.right(n));
        }
        let mut p = self.parent(n);
        while p != NIL && n == self.right(p) {
            n = p;
            p = self.parent(p);
        }
        p
    }

    fn predecessor(&self, mut n: usize) -> usize {
        if self.left(n) != NIL {
            return self.maximum(self.left(n));
        }
        let mut p = self.parent(n);
        while p != NIL && n == self.left(p) {
            n = p;
            p = self.parent(p);
        }
        p
    }

    fn insert(&mut self, key: K, value: V, overwrite: bool) -> bool {
        let (mut current, mut parent) = (self.root, NIL);
        let mut less = false;
        while current != NIL {
            parent = current;
            let node = &mut self.nodes[current];
            match key.cmp(&node.key) {
                Ordering::Less => {
                    less = true;
                    current = node.link.left;
                }
                Ordering::Greater => {
                    less = false;
                    current = node.link.right;
                }
                Ordering::Equal => {
                    if overwrite {
                        node.value = value;
                    }
                    return false;
                }
            }
        }

        let x = self.nodes.len();
        self.nodes.push(Node::new(key, value, parent));
        if parent == NIL {
            self.root = x;
        } else if less {
            self.link_mut(parent).left = x;
        } else {
            self.link_mut(parent).right = x;
        }

        self.insert_fixup(x);
        self.n_count += 1;
        true
    }

    // Unlink `z` from the tree and return its value. A node with two
    // children takes over its successor's entry and the successor is
    // unlinked in its place.
    fn delete_node(&mut self, z: usize) -> V {
        let y = if self.left(z) == NIL || self.right(z) == NIL {
            z
        } else {
            self.minimum(self.right(z))
        };
        let x = match self.left(y) {
            NIL => self.right(y),
            left => left,
        };

        let yp = self.parent(y);
        self.link_mut(x).parent = yp; // x may be the sentinel.
        if yp == NIL {
            self.root = x;
        } else if y == self.left(yp) {
            self.link_mut(yp).left = x;
        } else {
            self.link_mut(yp).right = x;
        }

        if self.is_black(y) {
            self.delete_fixup(x);
        }
        self.sentinel = Link::sentinel();
        self.n_count -= 1;

        let last = self.nodes.len() - 1;
        let removed = self.release(y);
        if y == z {
            return removed.value;
        }
        let z = if z == last { y } else { z };
        let node = &mut self.nodes[z];
        node.key = removed.key;
        mem::replace(&mut node.value, removed.value)
    }

    // Drop an unlinked node from the arena. The last node in the arena
    // fills the hole, its neighbours are re-pointed at the new index.
    fn release(&mut self, y: usize) -> Node<K, V> {
        let last = self.nodes.len() - 1;
        let removed = self.nodes.swap_remove(y);
        if y == last {
            return removed;
        }

        let Link {
            left,
            right,
            parent,
            ..
        } = self.nodes[y].link;
        if parent == NIL {
            self.root = y;
        } else if self.left(parent) == last {
            self.link_mut(parent).left = y;
        } else {
            self.link_mut(parent).right = y;
        }
        if left != NIL {
            self.link_mut(left).parent = y;
        }
        if right != NIL {
            self.link_mut(right).parent = y;
        }
        removed
    }

    fn validate_tree(
        &self,
        n: usize,
        parent: usize,
        fromred: bool,
        mut nb: usize,
        depth: usize,
        check: &mut Check,
    ) -> Result<usize, Error<K>>
    where
        K: Clone,
    {
        if n == NIL {
            check.depths.sample(depth);
            return Ok(nb);
        }

        let node = &self.nodes[n];
        if node.link.parent != parent {
            return Err(Error::BrokenLink(node.key.clone()));
        }
        let red = !node.link.black;
        if fromred && red {
            return Err(Error::ConsecutiveReds);
        }
        if !red {
            nb += 1;
        }

        let (left, right) = (node.link.left, node.link.right);
        let lblacks = self.validate_tree(left, n, red, nb, depth + 1, check)?;

        if check.prev != NIL {
            let prev = &self.nodes[check.prev];
            if prev.key >= node.key {
                let (key, prev_key) = (node.key.clone(), prev.key.clone());
                return Err(Error::SortError(key, prev_key));
            }
        }
        check.prev = n;
        check.count += 1;

        let rblacks = self.validate_tree(right, n, red, nb, depth + 1, check)?;
        if lblacks != rblacks {
            let err = format!("left: {} right: {}", lblacks, rblacks);
            return Err(Error::UnbalancedBlacks(err));
        }
        Ok(lblacks)
    }
}

// Accessors that treat NIL as the sentinel.
impl<K, V> Rbtree<K, V> {
    #[inline]
    fn link(&self, n: usize) -> &Link {
        match n {
            NIL => &self.sentinel,
            n => &self.nodes[n].link,
        }
    }

    #[inline]
    fn link_mut(&mut self, n: usize) -> &mut Link {
        match n {
            NIL => &mut self.sentinel,
            n => &mut self.nodes[n].link,
        }
    }

    #[inline]
    pub(crate) fn left(&self, n: usize) -> usize {
        self.link(n).left
    }

    #[inline]
    pub(crate) fn right(&self, n: usize) -> usize {
        self.link(n).right
    }

    #[inline]
    fn parent(&self, n: usize) -> usize {
        self.link(n).parent
    }

    #[inline]
    fn is_black(&self, n: usize) -> bool {
        self.link(n).black
    }

    #[inline]
    fn is_red(&self, n: usize) -> bool {
        !self.link(n).black
    }

    #[inline]
    fn set_black(&mut self, n: usize) {
        self.link_mut(n).black = true
    }

    #[inline]
    fn set_red(&mut self, n: usize) {
        self.link_mut(n).black = false
    }
}

// Rotation and fixup routines.
impl<K, V> Rbtree<K, V> {
    //              (p)                       (p)
    //               |                         |
    //               x                         y
    //              / \                       / \
    //             /   \                     /   \
    //            a     y                   x     c
    //                 / \                 / \
    //                b   c               a   b
    //
    fn rotate_left(&mut self, x: usize) {
        let y = self.right(x);
        let b = self.left(y);
        self.link_mut(x).right = b;
        if b != NIL {
            self.link_mut(b).parent = x;
        }

        let p = self.parent(x);
        if y != NIL {
            self.link_mut(y).parent = p;
        }
        if p == NIL {
            self.root = y;
        } else if x == self.left(p) {
            self.link_mut(p).left = y;
        } else {
            self.link_mut(p).right = y;
        }

        self.link_mut(y).left = x;
        self.link_mut(x).parent = y;
    }

    //              (p)                       (p)
    //               |                         |
    //               x                         y
    //              / \                       / \
    //             /   \                     /   \
    //            y     c                   a     x
    //           / \                             / \
    //          a   b                           b   c
    //
    fn rotate_right(&mut self, x: usize) {
        let y = self.left(x);
        let b = self.right(y);
        self.link_mut(x).left = b;
        if b != NIL {
            self.link_mut(b).parent = x;
        }

        let p = self.parent(x);
        if y != NIL {
            self.link_mut(y).parent = p;
        }
        if p == NIL {
            self.root = y;
        } else if x == self.right(p) {
            self.link_mut(p).right = y;
        } else {
            self.link_mut(p).left = y;
        }

        self.link_mut(y).right = x;
        self.link_mut(x).parent = y;
    }

    fn insert_fixup(&mut self, mut x: usize) {
        while x != self.root && self.is_red(self.parent(x)) {
            // parent is red, hence not root, hence grandparent is real.
            let p = self.parent(x);
            let g = self.parent(p);
            if p == self.left(g) {
                let uncle = self.right(g);
                if self.is_red(uncle) {
                    self.set_black(p);
                    self.set_black(uncle);
                    self.set_red(g);
                    x = g;
                } else {
                    if x == self.right(p) {
                        x = p;
                        self.rotate_left(x);
                    }
                    let p = self.parent(x);
                    let g = self.parent(p);
                    self.set_black(p);
                    self.set_red(g);
                    self.rotate_right(g);
                }
            } else {
                let uncle = self.left(g);
                if self.is_red(uncle) {
                    self.set_black(p);
                    self.set_black(uncle);
                    self.set_red(g);
                    x = g;
                } else {
                    if x == self.left(p) {
                        x = p;
                        self.rotate_right(x);
                    }
                    let p = self.parent(x);
                    let g = self.parent(p);
                    self.set_black(p);
                    self.set_red(g);
                    self.rotate_left(g);
                }
            }
        }

        let root = self.root;
        self.set_black(root);
    }

    // `x` carries the extra black, it can be the sentinel in which case
    // the sentinel's parent link locates it in the tree.
    fn delete_fixup(&mut self, mut x: usize) {
        while x != self.root && self.is_black(x) {
            let p = self.parent(x);
            if x == self.left(p) {
                let mut w = self.right(p);
                if self.is_red(w) {
                    self.set_black(w);
                    self.set_red(p);
                    self.rotate_left(p);
                    w = self.right(self.parent(x));
                }
                if self.is_black(self.left(w)) && self.is_black(self.right(w)) {
                    self.set_red(w);
                    x = self.parent(x);
                } else {
                    if self.is_black(self.right(w)) {
                        let wl = self.left(w);
                        self.set_black(wl);
                        self.set_red(w);
                        self.rotate_right(w);
                        w = self.right(self.parent(x));
                    }
                    let p = self.parent(x);
                    let black = self.is_black(p);
                    self.link_mut(w).black = black;
                    self.set_black(p);
                    let wr = self.right(w);
                    self.set_black(wr);
                    self.rotate_left(p);
                    x = self.root;
                }
            } else {
                let mut w = self.left(p);
                if self.is_red(w) {
                    self.set_black(w);
                    self.set_red(p);
                    self.rotate_right(p);
                    w = self.left(self.parent(x));
                }
                if self.is_black(self.right(w)) && self.is_black(self.left(w)) {
                    self.set_red(w);
                    x = self.parent(x);
                } else {
                    if self.is_black(self.left(w)) {
                        let wr = self.right(w);
                        self.set_black(wr);
                        self.set_red(w);
                        self.rotate_left(w);
                        w = self.left(self.parent(x));
                    }
                    let p = self.parent(x);
                    let black = self.is_black(p);
                    self.link_mut(w).black = black;
                    self.set_black(p);
                    let wl = self.left(w);
                    self.set_black(wl);
                    self.rotate_right(p);
                    x = self.root;
                }
            }
        }

        self.set_black(x);
    }
}

// scratch state for validate_tree().
struct Check {
    prev: usize,
    count: usize,
    depths: Depth,
}

/// Iterator over entries of [`Rbtree`] in key order, front to back,
/// stepping through parent links.
pub struct Iter<'a, K, V> {
    tree: &'a Rbtree<K, V>,
    front: usize,
    back: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V>
where
    K: Ord,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let n = self.front;
        self.front = self.tree.successor(n);
        self.remaining -= 1;
        Some(self.tree.entry(n))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V>
where
    K: Ord,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let n = self.back;
        self.back = self.tree.predecessor(n);
        self.remaining -= 1;
        Some(self.tree.entry(n))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> where K: Ord {}

/// Statistics on [`Rbtree`] tree. Serves two purpose:
///
/// * To get partial but quick statistics via [`Rbtree::stats`] method.
/// * To get full statisics via [`Rbtree::validate`] method.
#[derive(Default, Debug)]
pub struct Stats {
    entries: usize, // number of entries in the tree.
    node_size: usize,
    blacks: Option<usize>,
    depths: Option<Depth>,
}

impl Stats {
    fn new(entries: usize, node_size: usize) -> Stats {
        Stats {
            entries,
            node_size,
            blacks: Default::default(),
            depths: Default::default(),
        }
    }

    #[inline]
    fn set_blacks(&mut self, blacks: usize) {
        self.blacks = Some(blacks)
    }

    #[inline]
    fn set_depths(&mut self, depths: Depth) {
        self.depths = Some(depths)
    }

    /// Return number entries in [`Rbtree`] instance.
    #[inline]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Return node-size, including over-head for `Rbtree<k,V>`. Although
    /// the node overhead is constant, the node size varies based on
    /// key and value types. EG:
    ///
    /// ```
    /// use rbtree_index::Rbtree;
    /// let tree: Rbtree<u64,u64> = Rbtree::new("myinstance");
    ///
    /// // size of key: 8 bytes
    /// // size of value: 8 bytes
    /// // colour and three links: 32 bytes
    /// assert_eq!(tree.stats().node_size(), 48);
    /// ```
    #[inline]
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Return number of black nodes from root to leaf, on both left
    /// and right child.
    #[inline]
    pub fn blacks(&self) -> Option<usize> {
        self.blacks
    }

    /// Return [`Depth`] statistics.
    pub fn depths(&self) -> Option<Depth> {
        match &self.depths {
            Some(depths) if depths.samples() > 0 => Some(depths.clone()),
            _ => None,
        }
    }
}
