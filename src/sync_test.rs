use crossbeam_utils::thread;
use rand::prelude::random;

use crate::error::Error;
use crate::rbtree::Rbtree;
use crate::sync::RbtreeSync;

#[test]
fn test_sync_ops() {
    let tree: RbtreeSync<i64, String> = RbtreeSync::new("test-sync");
    let (x, y) = ("x".to_string(), "y".to_string());

    assert_eq!(tree.id(), "test-sync".to_string());
    assert_eq!(tree.get(&579), None);
    assert_eq!(tree.get_value(&579), "".to_string());
    assert!(!tree.delete(&579));

    assert!(tree.set(0, x.clone()));
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.get(&0), Some(x.clone()));
    assert!(!tree.set_nx(0, y.clone()));
    assert_eq!(tree.get(&0), Some(x.clone()));
    assert!(tree.set_nx(1, y.clone()));
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.get_value(&1), y);

    assert!(tree.delete(&1));
    assert_eq!(tree.len(), 1);
    assert!(tree.delete(&0));
    assert!(tree.is_empty());

    assert!(!tree.exists(&0));
    tree.set(0, x.clone());
    assert!(tree.exists(&0));
    assert!(tree.move_key(&0, 1));
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.get(&0), None);
    assert_eq!(tree.get(&1), Some(x.clone()));

    tree.empty();
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.min(), None);
    assert_eq!(tree.max(), None);
}

#[test]
fn test_sync_range() {
    let tree: RbtreeSync<i64, &str> = RbtreeSync::new("test-sync");
    tree.set(1, "one");
    tree.set(2, "two");
    tree.set(3, "three");

    assert_eq!(tree.min(), Some((1, "one")));
    assert_eq!(tree.max(), Some((3, "three")));
    assert_eq!(
        tree.slice(&i64::min_value(), &i64::max_value()),
        vec!["one", "two", "three"]
    );
    assert_eq!(tree.slice_keys(&3, &2), vec![3, 2]);

    let mut items = vec![];
    let res = tree.walk(&0, &i64::max_value(), |k, v| {
        items.push((*k, *v));
        if items.len() == 2 {
            Err(Error::<i64>::Stop)
        } else {
            Ok(())
        }
    });
    assert_eq!(res, Err(Error::Stop));
    assert_eq!(items, vec![(1, "one"), (2, "two")]);
}

#[test]
fn test_sync_wrap() {
    let mut inner: Rbtree<i64, i64> = Rbtree::new("test-sync");
    for key in 0..100 {
        inner.set(key, -key);
    }
    let tree = RbtreeSync::wrap(inner);
    assert_eq!(tree.len(), 100);
    assert_eq!(tree.read().get(&10), Some(&-10));
    assert!(tree.validate().is_ok());
    assert_eq!(tree.stats().entries(), 100);

    let tree: RbtreeSync<i64, i64> = tree.into_inner().into();
    let inner = tree.into_inner();
    assert_eq!(inner.len(), 100);
    assert_eq!(inner.max(), Some((&99, &-99)));
}

#[test]
fn test_sync_writers() {
    let (n_threads, n_keys) = (8_i64, 10_000_i64);
    let tree: RbtreeSync<i64, i64> = RbtreeSync::new("test-sync");

    thread::scope(|scope| {
        for id in 0..n_threads {
            let tree = &tree;
            scope.spawn(move |_| {
                for key in (0..n_keys).filter(|key| key % n_threads == id) {
                    assert!(tree.set(key, key * 2));
                }
            });
        }
    })
    .unwrap();

    assert_eq!(tree.len(), n_keys as usize);
    assert!(tree.validate().is_ok());

    let mut count = 0;
    let res: Result<(), Error<i64>> = tree.walk(&0, &n_keys, |k, v| {
        assert_eq!(*k, count);
        assert_eq!(*v, count * 2);
        count += 1;
        Ok(())
    });
    assert!(res.is_ok());
    assert_eq!(count, n_keys);
}

#[test]
fn test_sync_readers_writers() {
    let size = 1000_i64;
    let tree: RbtreeSync<i64, i64> = RbtreeSync::new("test-sync");
    for key in 0..size {
        tree.set(key, key);
    }

    thread::scope(|scope| {
        for _ in 0..4 {
            let tree = &tree;
            scope.spawn(move |_| {
                for _ in 0..10_000 {
                    let key = (random::<i64>() % size).abs();
                    match random::<u8>() % 3 {
                        0 => {
                            tree.set(key, key);
                        }
                        1 => {
                            tree.delete(&key);
                        }
                        _ => {
                            tree.move_key(&key, (key + 1) % size);
                        }
                    }
                }
            });
        }
        for _ in 0..4 {
            let tree = &tree;
            scope.spawn(move |_| {
                for _ in 0..1_000 {
                    let keys = tree.slice_keys(&0, &size);
                    assert!(keys.windows(2).all(|w| w[0] < w[1]));
                    assert!(tree.validate().is_ok());
                }
            });
        }
    })
    .unwrap();

    assert!(tree.validate().is_ok());
}
