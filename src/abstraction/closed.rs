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

//! This module defines the `ClosedSet` abstraction: the memory of all the
//! states a search has already generated.

use crate::Fingerprint;

/// The closed set records the fingerprints of the partial schedules that were
/// already generated so that the same state, reached through a different
/// order of decisions, is not explored twice.
///
/// Implementations must be safe to share among worker threads: `insert` is
/// atomic with respect to concurrent inserts of the same fingerprint.
pub trait ClosedSet: Send + Sync {
    /// Records the fingerprint and returns true iff it was not known yet.
    fn insert(&self, fingerprint: Fingerprint) -> bool;
    /// Returns true iff the fingerprint has been recorded.
    fn contains(&self, fingerprint: Fingerprint) -> bool;
    /// The number of recorded fingerprints
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Forgets everything.
    fn clear(&self);
}
