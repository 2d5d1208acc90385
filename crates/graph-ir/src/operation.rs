// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operations: the computational steps of the graph.
//!
//! An operation is an opcode plus ordered lists of input and output
//! operand indices. Outputs are always computed values
//! (`TemporaryVariable` or `ModelOutput`); inputs may be any lifetime.

/// The opcode of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Add,
    AveragePool2d,
    Concat,
    Conv2d,
    DepthwiseConv2d,
    FullyConnected,
    Logistic,
    MaxPool2d,
    Mul,
    Relu,
    Reshape,
    Softmax,
}

impl OperationType {
    /// Returns a human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::AveragePool2d => "average_pool_2d",
            Self::Concat => "concat",
            Self::Conv2d => "conv_2d",
            Self::DepthwiseConv2d => "depthwise_conv_2d",
            Self::FullyConnected => "fully_connected",
            Self::Logistic => "logistic",
            Self::MaxPool2d => "max_pool_2d",
            Self::Mul => "mul",
            Self::Relu => "relu",
            Self::Reshape => "reshape",
            Self::Softmax => "softmax",
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single operation: opcode plus operand index lists.
#[derive(Debug, Clone)]
pub struct Operation {
    /// The opcode.
    pub operation_type: OperationType,
    /// Ordered input operand indices (into the owning graph).
    pub inputs: Vec<usize>,
    /// Ordered output operand indices (into the owning graph).
    pub outputs: Vec<usize>,
}

impl Operation {
    /// Returns a concise summary string for display.
    pub fn summary(&self) -> String {
        format!(
            "{} {:?} -> {:?}",
            self.operation_type, self.inputs, self.outputs
        )
    }
}
