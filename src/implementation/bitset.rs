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

//! This module provides the compact set representation used everywhere in
//! the search: a 32 bits bitmap. The scheduled tasks, the ready tasks, the
//! tasks running on one processor and the parents of a task are all stored
//! as such bitsets.

use std::ops::{BitAnd, BitOr, Not, Sub};

use crate::{Error, IndexResolver, Indexable};

// ----------------------------------------------------------------------------
// --- BITSET -----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// A set of indices in `0..=BitSet::MAX_INDEX`. It is `Copy`, which makes the
/// set algebra as cheap as a few machine instructions.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitSet(u32);

impl BitSet {
    /// The maximum number of elements that fit in a bitset
    pub const CAPACITY: usize = 32;
    /// The largest index that may be stored in a bitset
    pub const MAX_INDEX: usize = Self::CAPACITY - 1;

    pub const fn empty() -> Self {
        BitSet(0)
    }
    pub const fn from_bitmap(bitmap: u32) -> Self {
        BitSet(bitmap)
    }
    pub const fn bitmap(self) -> u32 {
        self.0
    }
    /// The set of the `n` first indices `{0, .., n-1}`
    pub fn full(n: usize) -> Result<Self, Error> {
        match n {
            0 => Ok(BitSet(0)),
            n if n <= Self::CAPACITY => Ok(BitSet(u32::MAX >> (Self::CAPACITY - n))),
            n => Err(Error::Capacity { index: n - 1, capacity: Self::CAPACITY }),
        }
    }
    /// A set comprising the single given index
    pub fn singleton(index: usize) -> Result<Self, Error> {
        let mut set = BitSet::empty();
        set.add(index)?;
        Ok(set)
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
    /// Indices beyond capacity are never part of the set
    pub fn contains(self, index: usize) -> bool {
        index <= Self::MAX_INDEX && self.0 & (1 << index) != 0
    }
    /// Adds the index to the set and tells whether the set has changed.
    pub fn add(&mut self, index: usize) -> Result<bool, Error> {
        if index > Self::MAX_INDEX {
            return Err(Error::Capacity { index, capacity: Self::CAPACITY });
        }
        let before = self.0;
        self.0 |= 1 << index;
        Ok(before != self.0)
    }
    /// Removes the index from the set and tells whether the set has changed.
    pub fn remove(&mut self, index: usize) -> bool {
        if index > Self::MAX_INDEX {
            return false;
        }
        let before = self.0;
        self.0 &= !(1 << index);
        before != self.0
    }
    /// Returns a copy of this set which also comprises `index`.
    ///
    /// # Panics
    /// When `index` exceeds `MAX_INDEX`. Only use this with indices that are
    /// known to be valid (the index of a task of a graph, of a processor..).
    pub fn with(self, index: usize) -> Self {
        assert!(index <= Self::MAX_INDEX, "index {index} exceeds the bitset capacity");
        BitSet(self.0 | (1 << index))
    }
    /// Returns a copy of this set from which `index` was removed.
    pub fn without(self, index: usize) -> Self {
        if index > Self::MAX_INDEX {
            self
        } else {
            BitSet(self.0 & !(1 << index))
        }
    }
    /// Is `other` a subset of this set ?
    pub fn contains_all(self, other: BitSet) -> bool {
        other.0 & !self.0 == 0
    }
    /// Adds all the elements of `other` and tells whether the set has changed.
    pub fn union_with(&mut self, other: BitSet) -> bool {
        let before = self.0;
        self.0 |= other.0;
        before != self.0
    }
    /// Only retains the elements of `other` and tells whether the set has changed.
    pub fn intersect_with(&mut self, other: BitSet) -> bool {
        let before = self.0;
        self.0 &= other.0;
        before != self.0
    }
    /// Removes all the elements of `other` and tells whether the set has changed.
    pub fn subtract(&mut self, other: BitSet) -> bool {
        let before = self.0;
        self.0 &= !other.0;
        before != self.0
    }
    /// The smallest index in the set
    pub fn first(self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as usize)
        }
    }
    /// Iterates over the indices of the set in increasing order
    pub fn iter(self) -> BitSetIter {
        BitSetIter(self.0)
    }
    /// Iterates over the elements denoted by the indices of the set
    pub fn resolve<R: IndexResolver>(self, resolver: &R) -> Resolved<'_, R> {
        Resolved { bits: self.iter(), resolver }
    }
}

impl BitOr for BitSet {
    type Output = BitSet;
    fn bitor(self, rhs: BitSet) -> BitSet {
        BitSet(self.0 | rhs.0)
    }
}
impl BitAnd for BitSet {
    type Output = BitSet;
    fn bitand(self, rhs: BitSet) -> BitSet {
        BitSet(self.0 & rhs.0)
    }
}
impl Sub for BitSet {
    type Output = BitSet;
    fn sub(self, rhs: BitSet) -> BitSet {
        BitSet(self.0 & !rhs.0)
    }
}
impl Not for BitSet {
    type Output = BitSet;
    fn not(self) -> BitSet {
        BitSet(!self.0)
    }
}
impl IntoIterator for BitSet {
    type Item = usize;
    type IntoIter = BitSetIter;
    fn into_iter(self) -> BitSetIter {
        self.iter()
    }
}

/// Iterates over the indices of a bitset in increasing order
#[derive(Debug, Clone)]
pub struct BitSetIter(u32);
impl Iterator for BitSetIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            let index = self.0.trailing_zeros() as usize;
            self.0 &= self.0 - 1;
            Some(index)
        }
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}
impl ExactSizeIterator for BitSetIter {}

/// Iterates over the elements denoted by the indices of a bitset. Indices
/// the resolver knows nothing about are skipped.
pub struct Resolved<'r, R: IndexResolver> {
    bits: BitSetIter,
    resolver: &'r R,
}
impl<'r, R: IndexResolver> Iterator for Resolved<'r, R> {
    type Item = &'r R::Item;

    fn next(&mut self) -> Option<Self::Item> {
        for index in self.bits.by_ref() {
            if let Some(item) = self.resolver.resolve(index) {
                return Some(item);
            }
        }
        None
    }
}

// ----------------------------------------------------------------------------
// --- INDEXED SET ------------------------------------------------------------
// ----------------------------------------------------------------------------
/// A set of `Indexable` elements backed by a `BitSet`. Membership and the set
/// algebra only need the indices; iterating over the elements requires a
/// resolver to map them back.
pub struct IndexedSet<'r, R: IndexResolver> {
    bits: BitSet,
    resolver: Option<&'r R>,
}
impl<'r, R: IndexResolver> Clone for IndexedSet<'r, R> {
    fn clone(&self) -> Self {
        IndexedSet { bits: self.bits, resolver: self.resolver }
    }
}
impl<'r, R: IndexResolver> Default for IndexedSet<'r, R> {
    fn default() -> Self {
        Self::new()
    }
}
impl<'r, R: IndexResolver> IndexedSet<'r, R> {
    /// An empty set without any resolver
    pub fn new() -> Self {
        IndexedSet { bits: BitSet::empty(), resolver: None }
    }
    /// An empty set whose elements can be iterated with the given resolver
    pub fn with_resolver(resolver: &'r R) -> Self {
        IndexedSet { bits: BitSet::empty(), resolver: Some(resolver) }
    }
    pub fn from_bits(bits: BitSet, resolver: Option<&'r R>) -> Self {
        IndexedSet { bits, resolver }
    }
    pub fn bits(&self) -> BitSet {
        self.bits
    }
    pub fn len(&self) -> usize {
        self.bits.len()
    }
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
    pub fn contains(&self, item: &R::Item) -> bool {
        self.bits.contains(item.index())
    }
    pub fn add(&mut self, item: &R::Item) -> Result<bool, Error> {
        self.bits.add(item.index())
    }
    pub fn remove(&mut self, item: &R::Item) -> bool {
        self.bits.remove(item.index())
    }

    pub fn contains_all(&self, other: &IndexedSet<'_, R>) -> bool {
        self.bits.contains_all(other.bits)
    }
    pub fn union_with(&mut self, other: &IndexedSet<'_, R>) -> bool {
        self.bits.union_with(other.bits)
    }
    pub fn intersect_with(&mut self, other: &IndexedSet<'_, R>) -> bool {
        self.bits.intersect_with(other.bits)
    }
    pub fn subtract(&mut self, other: &IndexedSet<'_, R>) -> bool {
        self.bits.subtract(other.bits)
    }

    /// Adds every item and tells whether the set changed. This is the
    /// element-wise counterpart of `union_with`, for collections that are not
    /// backed by a bitset.
    pub fn extend_from<'i, I>(&mut self, items: I) -> Result<bool, Error>
    where
        I: IntoIterator<Item = &'i R::Item>,
        R::Item: 'i,
    {
        let mut changed = false;
        for item in items {
            changed |= self.add(item)?;
        }
        Ok(changed)
    }

    /// Iterates over the elements of the set. This is an invalid operation
    /// when the set was created without a resolver.
    pub fn iter(&self) -> Result<Resolved<'r, R>, Error> {
        match self.resolver {
            Some(resolver) => Ok(self.bits.resolve(resolver)),
            None => Err(Error::MissingResolver),
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
