// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for graph construction and finishing.

/// Errors that can occur when building or finishing a graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// An operand index does not exist in the graph.
    #[error("operand index {index} out of range ({count} operands)")]
    InvalidOperandIndex { index: usize, count: usize },

    /// An operation index does not exist in the graph.
    #[error("operation index {index} out of range ({count} operations)")]
    InvalidOperationIndex { index: usize, count: usize },

    /// An operand's lifetime has already been fixed and cannot change.
    #[error("operand {index} already has lifetime '{lifetime}'")]
    LifetimeConflict { index: usize, lifetime: &'static str },

    /// A constant value's byte length does not match the operand size.
    #[error("value of {got} bytes does not match operand {index} size of {want} bytes")]
    ValueSizeMismatch {
        index: usize,
        want: usize,
        got: usize,
    },

    /// A constant value was supplied for an operand of unknown size.
    #[error("operand {index} has unknown size and cannot carry a constant value")]
    UnknownOperandSize { index: usize },

    /// A pool reference points outside the pool's byte range.
    #[error("range {offset}+{length} exceeds pool '{pool}' of {pool_len} bytes")]
    PoolRangeError {
        pool: String,
        offset: usize,
        length: usize,
        pool_len: usize,
    },

    /// An operand is written by more than one operation.
    #[error("operand {index} is defined by more than one operation")]
    MultipleDefinition { index: usize },

    /// A computed operand is consumed or exported but never produced.
    #[error("operand {index} is never produced by any operation")]
    UndefinedOperand { index: usize },

    /// An operation output has an incompatible lifetime (e.g., a constant).
    #[error("operand {index} with lifetime '{lifetime}' cannot be an operation output")]
    InvalidOutputLifetime { index: usize, lifetime: &'static str },
}
