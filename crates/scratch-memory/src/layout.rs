// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Bump layout: assigns byte offsets before any memory exists.
//!
//! The planner lays out every cross-step temporary in a single pass,
//! then allocates one buffer at the final running total. Slots are
//! never released — the layout lives exactly as long as one execution.

/// A running bump-allocation layout with per-slot alignment.
#[derive(Debug, Clone, Default)]
pub struct ScratchLayout {
    total: usize,
}

impl ScratchLayout {
    /// Creates an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves `length` bytes aligned to `alignment` and returns the
    /// slot's offset. A zero alignment is treated as 1.
    pub fn reserve(&mut self, length: usize, alignment: usize) -> usize {
        let alignment = alignment.max(1);
        let padding = match self.total % alignment {
            0 => 0,
            rem => alignment - rem,
        };
        let offset = self.total + padding;
        self.total = offset + length;
        offset
    }

    /// Total bytes reserved so far, including alignment padding.
    pub fn total_bytes(&self) -> usize {
        self.total
    }
}
