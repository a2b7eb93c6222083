// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! This module provides a concurrent closed set backed by a sharded hash set.

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashSet;

use crate::{ClosedSet, Fingerprint};

/// Simple implementation of the closed set: one concurrent hash set which
/// all worker threads insert into.
///
/// A limit can be imposed on the number of recorded fingerprints. Once it is
/// reached, new fingerprints are no longer recorded and are reported as
/// unknown: duplicates are explored again, which wastes time but remains
/// correct. The limit holds even when many workers insert concurrently.
#[derive(Debug)]
pub struct SimpleClosedSet {
    fingerprints: DashSet<Fingerprint, fxhash::FxBuildHasher>,
    limit: Option<usize>,
    size: AtomicUsize,
}
impl Default for SimpleClosedSet {
    fn default() -> Self {
        Self::new(None)
    }
}
impl SimpleClosedSet {
    pub fn new(limit: Option<usize>) -> Self {
        SimpleClosedSet {
            fingerprints: DashSet::with_hasher(Default::default()),
            limit,
            size: AtomicUsize::new(0),
        }
    }
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}
impl ClosedSet for SimpleClosedSet {
    fn insert(&self, fingerprint: Fingerprint) -> bool {
        let Some(limit) = self.limit else {
            return self.fingerprints.insert(fingerprint);
        };
        if self.fingerprints.contains(&fingerprint) {
            return false;
        }
        // a slot is reserved before recording, so that racing workers can
        // never push the set past its limit
        let reserved = self
            .size
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |size| (size < limit).then_some(size + 1))
            .is_ok();
        if !reserved {
            return true;
        }
        let inserted = self.fingerprints.insert(fingerprint);
        if !inserted {
            self.size.fetch_sub(1, Ordering::AcqRel);
        }
        inserted
    }
    fn contains(&self, fingerprint: Fingerprint) -> bool {
        self.fingerprints.contains(&fingerprint)
    }
    fn len(&self) -> usize {
        self.fingerprints.len()
    }
    fn clear(&self) {
        self.fingerprints.clear();
        self.size.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod test_simple_closed_set {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::*;

    #[test]
    fn by_default_it_is_empty() {
        let closed = SimpleClosedSet::default();
        assert!(closed.is_empty());
        assert_eq!(None, closed.limit());
    }
    #[test]
    fn insert_tells_whether_the_fingerprint_is_new() {
        let closed = SimpleClosedSet::default();
        assert!(closed.insert(Fingerprint(42)));
        assert!(!closed.insert(Fingerprint(42)));
        assert!(closed.insert(Fingerprint(43)));
        assert!(closed.contains(Fingerprint(42)));
        assert!(!closed.contains(Fingerprint(44)));
        assert_eq!(2, closed.len());
    }
    #[test]
    fn when_cleared_it_forgets_everything() {
        let closed = SimpleClosedSet::default();
        closed.insert(Fingerprint(1));
        closed.clear();
        assert!(closed.is_empty());
        assert!(closed.insert(Fingerprint(1)));
    }
    #[test]
    fn past_its_limit_it_stops_recording() {
        let closed = SimpleClosedSet::new(Some(2));
        assert!(closed.insert(Fingerprint(1)));
        assert!(closed.insert(Fingerprint(2)));
        assert!(closed.insert(Fingerprint(3)));
        assert!(closed.insert(Fingerprint(3)));
        assert!(!closed.insert(Fingerprint(1)));
        assert_eq!(2, closed.len());
    }
    #[test]
    fn concurrent_inserts_never_exceed_the_limit() {
        let closed = SimpleClosedSet::new(Some(100));
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for fp in 0..1_000 {
                        closed.insert(Fingerprint(fp));
                    }
                });
            }
        });
        assert!(closed.len() <= 100);
        assert!(!closed.is_empty());
    }
    #[test]
    fn concurrent_inserts_of_the_same_fingerprint_succeed_once() {
        let closed = SimpleClosedSet::default();
        let successes = AtomicUsize::new(0);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for fp in 0..1_000 {
                        if closed.insert(Fingerprint(fp)) {
                            successes.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                });
            }
        });
        assert_eq!(1_000, successes.load(Ordering::Relaxed));
        assert_eq!(1_000, closed.len());
    }
}
