//! In-memory ordered index backed by a [red-black][rbtree] tree.
//!
//! [`Rbtree`] is the single threaded index, [`RbtreeSync`] wraps it
//! behind a reader/writer lock for sharing between threads.
//!
//! [rbtree]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree

mod depth;
mod error;
mod node;
mod rbtree;
mod sync;
mod walk;

pub use crate::depth::Depth;
pub use crate::error::Error;
pub use crate::rbtree::{Iter, Rbtree, Stats};
pub use crate::sync::RbtreeSync;

#[cfg(test)]
mod sync_test;
