// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The scratch buffer backing cross-step temporaries.
//!
//! One buffer per execution, sized by a [`crate::ScratchLayout`] and
//! accessed by `(offset, length)` ranges; every access is bounds
//! checked.

use crate::{MemoryError, ScratchLayout};

/// A zero-initialized byte buffer with range-checked access.
#[derive(Debug)]
pub struct ScratchBuffer {
    data: Vec<u8>,
}

impl ScratchBuffer {
    /// Allocates a zeroed buffer of `size` bytes.
    pub fn with_size(size: usize) -> Self {
        tracing::debug!(size, "scratch buffer allocated");
        Self {
            data: vec![0u8; size],
        }
    }

    /// Allocates a buffer sized to a finished layout.
    pub fn from_layout(layout: &ScratchLayout) -> Self {
        Self::with_size(layout.total_bytes())
    }

    /// Total size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reads the byte range `[offset, offset + length)`.
    pub fn read(&self, offset: usize, length: usize) -> Result<&[u8], MemoryError> {
        let end = offset.checked_add(length).ok_or(MemoryError::OutOfRange {
            offset,
            length,
            size: self.data.len(),
        })?;
        self.data.get(offset..end).ok_or(MemoryError::OutOfRange {
            offset,
            length,
            size: self.data.len(),
        })
    }

    /// Writes `bytes` starting at `offset`.
    pub fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<(), MemoryError> {
        let size = self.data.len();
        let end = offset
            .checked_add(bytes.len())
            .ok_or(MemoryError::OutOfRange {
                offset,
                length: bytes.len(),
                size,
            })?;
        let slot = self
            .data
            .get_mut(offset..end)
            .ok_or(MemoryError::OutOfRange {
                offset,
                length: bytes.len(),
                size,
            })?;
        slot.copy_from_slice(bytes);
        Ok(())
    }
}
