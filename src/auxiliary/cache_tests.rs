use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::auxiliary::cache::ComputeOnceCache;

#[test]
fn test_cache_computes_once() {
    let cache = ComputeOnceCache::<(u32, u32), Vec<u32>>::new();
    let calls = AtomicUsize::new(0);
    assert!(!cache.contains(&(1, 2)));

    let first = cache.get_or_compute(&(1, 2), || {
        calls.fetch_add(1, Ordering::SeqCst);
        vec![1, 2]
    });
    let second = cache.get_or_compute(&(1, 2), || {
        calls.fetch_add(1, Ordering::SeqCst);
        vec![0]
    });
    assert_eq!(first, vec![1, 2]);
    assert_eq!(second, vec![1, 2]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(cache.contains(&(1, 2)));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_concurrent_first_writers() {
    let cache = Arc::new(ComputeOnceCache::<u32, u64>::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let values = (0..64)
        .into_par_iter()
        .map(|i| {
            cache.get_or_compute(&(i % 4), || {
                calls.fetch_add(1, Ordering::SeqCst);
                u64::from(i % 4) * 10
            })
        })
        .collect::<Vec<_>>();
    for (i, value) in values.iter().enumerate() {
        assert_eq!(*value, (i % 4) as u64 * 10);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(cache.len(), 4);
}
