use std::borrow::Borrow;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::error::Error;
use crate::rbtree::{Rbtree, Stats};

/// RbtreeSync shares a single [`Rbtree`] instance between threads.
///
/// Every call holds one reader/writer lock for its whole duration,
/// read operations share the lock and write operations hold it
/// exclusively. The lock is not re-entrant, calling back into this
/// instance from a walk callback can deadlock.
pub struct RbtreeSync<K, V> {
    tree: RwLock<Rbtree<K, V>>,
}

impl<K, V> From<Rbtree<K, V>> for RbtreeSync<K, V> {
    fn from(tree: Rbtree<K, V>) -> RbtreeSync<K, V> {
        RbtreeSync {
            tree: RwLock::new(tree),
        }
    }
}

impl<K, V> RbtreeSync<K, V>
where
    K: Ord,
{
    /// Create an empty instance, identified by `name`.
    pub fn new<S>(name: S) -> RbtreeSync<K, V>
    where
        S: AsRef<str>,
    {
        Rbtree::new(name).into()
    }

    /// Wrap an existing tree.
    pub fn wrap(tree: Rbtree<K, V>) -> RbtreeSync<K, V> {
        tree.into()
    }

    /// Unwrap and return the underlying tree.
    pub fn into_inner(self) -> Rbtree<K, V> {
        self.tree.into_inner()
    }

    /// Hold the read lock and return the underlying tree. Writers are
    /// blocked until the guard is dropped.
    pub fn read(&self) -> RwLockReadGuard<Rbtree<K, V>> {
        self.tree.read()
    }

    pub fn id(&self) -> String {
        self.tree.read().id()
    }

    pub fn len(&self) -> usize {
        self.tree.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.read().is_empty()
    }

    pub fn stats(&self) -> Stats {
        self.tree.read().stats()
    }

    /// Refer to [`Rbtree::set`].
    pub fn set(&self, key: K, value: V) -> bool {
        self.tree.write().set(key, value)
    }

    /// Refer to [`Rbtree::set_nx`].
    pub fn set_nx(&self, key: K, value: V) -> bool {
        self.tree.write().set_nx(key, value)
    }

    /// Refer to [`Rbtree::delete`].
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.write().delete(key)
    }

    /// Refer to [`Rbtree::move_key`].
    pub fn move_key<Q>(&self, old_key: &Q, new_key: K) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.write().move_key(old_key, new_key)
    }

    /// Refer to [`Rbtree::empty`].
    pub fn empty(&self) {
        self.tree.write().empty()
    }

    /// Get a copy of the value for key.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        V: Clone,
    {
        self.tree.read().get(key).cloned()
    }

    /// Get a copy of the value for key, or the default value if key
    /// is missing.
    pub fn get_value<Q>(&self, key: &Q) -> V
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        V: Clone + Default,
    {
        self.tree.read().get_value(key)
    }

    pub fn exists<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.read().exists(key)
    }

    /// Return a copy of the entry with smallest key.
    pub fn min(&self) -> Option<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        let tree = self.tree.read();
        tree.min().map(|(k, v)| (k.clone(), v.clone()))
    }

    /// Return a copy of the entry with largest key.
    pub fn max(&self) -> Option<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        let tree = self.tree.read();
        tree.max().map(|(k, v)| (k.clone(), v.clone()))
    }

    /// Refer to [`Rbtree::walk`]. The read lock is held for the entire
    /// walk, a long walk stalls writers.
    pub fn walk<Q, F, E>(&self, from: &Q, to: &Q, callback: F) -> Result<(), E>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        F: FnMut(&K, &V) -> Result<(), E>,
    {
        self.tree.read().walk(from, to, callback)
    }

    /// Refer to [`Rbtree::slice`].
    pub fn slice<Q>(&self, from: &Q, to: &Q) -> Vec<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        V: Clone,
    {
        self.tree.read().slice(from, to)
    }

    /// Refer to [`Rbtree::slice_keys`].
    pub fn slice_keys<Q>(&self, from: &Q, to: &Q) -> Vec<K>
    where
        K: Borrow<Q> + Clone,
        Q: Ord + ?Sized,
    {
        self.tree.read().slice_keys(from, to)
    }

    /// Refer to [`Rbtree::validate`].
    pub fn validate(&self) -> Result<Stats, Error<K>>
    where
        K: Clone,
    {
        self.tree.read().validate()
    }
}
