/// Reserved index for the sentinel. Stands in for every absent child
/// and for the parent of root.
pub(crate) const NIL: usize = usize::MAX;

/// Colour and links of a tree vertex. Links are indices into the
/// tree's arena, [`NIL`] addresses the sentinel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Link {
    pub(crate) black: bool,
    pub(crate) left: usize,
    pub(crate) right: usize,
    pub(crate) parent: usize,
}

impl Link {
    /// Links for the sentinel, always black and both children point
    /// back to itself.
    pub(crate) fn sentinel() -> Link {
        Link {
            black: true,
            left: NIL,
            right: NIL,
            parent: NIL,
        }
    }

    // new vertices are always red leaves.
    fn leaf(parent: usize) -> Link {
        Link {
            black: false,
            left: NIL,
            right: NIL,
            parent,
        }
    }
}

/// Node corresponds to a single entry in Rbtree instance.
#[derive(Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) link: Link,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(key: K, value: V, parent: usize) -> Node<K, V> {
        Node {
            key,
            value,
            link: Link::leaf(parent),
        }
    }
}
