// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Named constant pools for `ConstantReference` operands.
//!
//! A pool is an immutable block of bytes shared between graphs: a
//! sub-graph extracted from a parent graph re-binds to the *same* pool
//! at the same offset, so large weights are never duplicated during
//! partitioning.

/// An immutable, named block of constant bytes.
///
/// Pools are shared via `Arc`; a graph stores the pools it references
/// and operands point into them with `(pool index, offset, length)`.
#[derive(Debug, Clone)]
pub struct ConstantPool {
    name: String,
    data: Vec<u8>,
}

impl ConstantPool {
    /// Creates a pool from a name and its backing bytes.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// The pool's name (diagnostic only).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the pool holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the byte range `[offset, offset + length)`, or `None` if
    /// it falls outside the pool.
    pub fn bytes(&self, offset: usize, length: usize) -> Option<&[u8]> {
        let end = offset.checked_add(length)?;
        self.data.get(offset..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_in_range() {
        let pool = ConstantPool::new("weights", vec![1, 2, 3, 4, 5]);
        assert_eq!(pool.bytes(1, 3), Some(&[2, 3, 4][..]));
        assert_eq!(pool.len(), 5);
    }

    #[test]
    fn test_bytes_out_of_range() {
        let pool = ConstantPool::new("weights", vec![1, 2, 3]);
        assert_eq!(pool.bytes(2, 2), None);
        assert_eq!(pool.bytes(usize::MAX, 1), None);
    }

    #[test]
    fn test_empty() {
        let pool = ConstantPool::new("empty", vec![]);
        assert!(pool.is_empty());
        assert_eq!(pool.bytes(0, 0), Some(&[][..]));
    }
}
