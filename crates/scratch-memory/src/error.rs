// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for scratch storage access.

/// Errors that can occur when accessing a scratch buffer.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// A read or write fell outside the buffer.
    #[error("range {offset}+{length} exceeds scratch buffer of {size} bytes")]
    OutOfRange {
        offset: usize,
        length: usize,
        size: usize,
    },
}
