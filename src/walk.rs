use std::{borrow::Borrow, cmp::Ordering, convert::Infallible};

use crate::node::NIL;
use crate::rbtree::Rbtree;

/// Bounded walks over Rbtree instance.
///
/// Bounds are inclusive, direction follows the order of the bounds:
/// `from < to` walks ascending, `from > to` walks descending and
/// `from == to` is a point lookup. To pass through the entire tree use
/// the minimum and maximum possible keys, EG:
///
/// ```
/// use rbtree_index::{Error, Rbtree};
///
/// let mut tree: Rbtree<u64, &str> = Rbtree::new("walk");
/// tree.set(1, "one");
/// tree.set(2, "two");
/// tree.set(3, "three");
///
/// let mut seen = vec![];
/// let res = tree.walk(&u64::MAX, &u64::MIN, |key, _value| {
///     seen.push(*key);
///     if seen.len() == 2 { Err(Error::<u64>::Stop) } else { Ok(()) }
/// });
/// assert_eq!(res, Err(Error::Stop));
/// assert_eq!(seen, vec![3, 2]);
/// ```
impl<K, V> Rbtree<K, V>
where
    K: Ord,
{
    /// Walk entries between `from` and `to`, both inclusive, calling
    /// `callback` for each entry. The walk stops at the first error
    /// returned by callback and hands it back to the caller, use
    /// [`Error::Stop`] to tell a deliberate stop from a real failure.
    ///
    /// Recursive, stack depth is proportional to the height of the tree.
    /// Tree shall not be mutated from inside the callback.
    ///
    /// [`Error::Stop`]: crate::Error::Stop
    pub fn walk<Q, F, E>(&self, from: &Q, to: &Q, mut callback: F) -> Result<(), E>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        F: FnMut(&K, &V) -> Result<(), E>,
    {
        match from.cmp(to) {
            Ordering::Equal => match self.find(from) {
                NIL => Ok(()),
                n => {
                    let node = self.node(n);
                    callback(&node.key, &node.value)
                }
            },
            Ordering::Less => self.walk_asc(self.root(), from, to, &mut callback),
            Ordering::Greater => self.walk_desc(self.root(), from, to, &mut callback),
        }
    }

    /// Return all values between `from` and `to`, both inclusive, in
    /// walk order. Empty if there are no entries in range.
    pub fn slice<Q>(&self, from: &Q, to: &Q) -> Vec<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        V: Clone,
    {
        let mut values = vec![];
        let res = self.walk(from, to, |_, value| -> Result<(), Infallible> {
            values.push(value.clone());
            Ok(())
        });
        match res {
            Ok(()) => values,
            Err(never) => match never {},
        }
    }

    /// Return all keys between `from` and `to`, both inclusive, in walk
    /// order. Empty if there are no entries in range.
    pub fn slice_keys<Q>(&self, from: &Q, to: &Q) -> Vec<K>
    where
        K: Borrow<Q> + Clone,
        Q: Ord + ?Sized,
    {
        let mut keys = vec![];
        let res = self.walk(from, to, |key, _| -> Result<(), Infallible> {
            keys.push(key.clone());
            Ok(())
        });
        match res {
            Ok(()) => keys,
            Err(never) => match never {},
        }
    }

    fn walk_asc<Q, F, E>(&self, n: usize, from: &Q, to: &Q, callback: &mut F) -> Result<(), E>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        F: FnMut(&K, &V) -> Result<(), E>,
    {
        if n == NIL {
            return Ok(());
        }

        let node = self.node(n);
        let key: &Q = node.key.borrow();
        if key > from {
            self.walk_asc(self.left(n), from, to, callback)?;
        }
        if key >= from && key <= to {
            callback(&node.key, &node.value)?;
        }
        if key < to {
            self.walk_asc(self.right(n), from, to, callback)?;
        }
        Ok(())
    }

    // mirror of walk_asc, here `from` is the high bound.
    fn walk_desc<Q, F, E>(&self, n: usize, from: &Q, to: &Q, callback: &mut F) -> Result<(), E>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        F: FnMut(&K, &V) -> Result<(), E>,
    {
        if n == NIL {
            return Ok(());
        }

        let node = self.node(n);
        let key: &Q = node.key.borrow();
        if key < from {
            self.walk_desc(self.right(n), from, to, callback)?;
        }
        if key <= from && key >= to {
            callback(&node.key, &node.value)?;
        }
        if key > to {
            self.walk_desc(self.left(n), from, to, callback)?;
        }
        Ok(())
    }
}
