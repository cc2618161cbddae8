//! Canonical result sequences.

use std::ops::Index;
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// An ordered, already-filtered and already-sorted query result.
///
/// Backed by a shared slice: cloning is cheap and every iteration starts
/// from the first record again.
#[derive(Debug)]
pub struct RecordSet<T> {
    rows: Arc<[T]>,
}

impl<T> RecordSet<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self { rows: rows.into() }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.rows
    }

    pub fn first(&self) -> Option<&T> {
        self.rows.first()
    }
}

impl<T> Clone for RecordSet<T> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<T> Default for RecordSet<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Index<usize> for RecordSet<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.rows[index]
    }
}

impl<'a, T> IntoIterator for &'a RecordSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl<T: Serialize> Serialize for RecordSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.as_ref().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_is_restartable() {
        let set = RecordSet::new(vec![1, 2, 3]);
        let first: Vec<_> = set.iter().copied().collect();
        let second: Vec<_> = (&set).into_iter().copied().collect();
        assert_eq!(first, second);
        let cloned = set.clone();
        assert_eq!(cloned.len(), 3);
        assert_eq!(cloned[2], 3);
    }
}
