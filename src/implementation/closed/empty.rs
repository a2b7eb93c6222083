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

//! This module provides a closed set which records nothing.

use crate::{ClosedSet, Fingerprint};

/// Dummy implementation of the closed set: every state is considered new,
/// which disables duplicate detection altogether.
#[derive(Debug, Default, Copy, Clone)]
pub struct EmptyClosedSet;

impl ClosedSet for EmptyClosedSet {
    fn insert(&self, _: Fingerprint) -> bool {
        true
    }
    fn contains(&self, _: Fingerprint) -> bool {
        false
    }
    fn len(&self) -> usize {
        0
    }
    fn clear(&self) {}
}

#[cfg(test)]
mod test_empty_closed_set {
    use crate::*;

    #[test]
    fn it_never_remembers_anything() {
        let closed = EmptyClosedSet;
        assert!(closed.insert(Fingerprint(7)));
        assert!(closed.insert(Fingerprint(7)));
        assert!(!closed.contains(Fingerprint(7)));
        assert!(closed.is_empty());
    }
}
