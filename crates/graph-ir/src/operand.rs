// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operands: the typed values flowing through the computation graph.
//!
//! Every operand carries a type, a dimension list, and a **lifetime** that
//! classifies how its value becomes known: supplied by the caller
//! (`ModelInput`), computed by an operation (`TemporaryVariable`,
//! `ModelOutput`), embedded in the graph (`ConstantCopy`), referenced in
//! a shared pool (`ConstantReference`), or absent (`NoValue`).

/// The data type of an operand (scalar or tensor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperandType {
    /// 32-bit IEEE float scalar.
    Float32,
    /// 32-bit signed integer scalar.
    Int32,
    /// 32-bit unsigned integer scalar.
    UInt32,
    /// Tensor of 32-bit floats.
    TensorFloat32,
    /// Tensor of 32-bit signed integers.
    TensorInt32,
    /// Tensor of 8-bit asymmetric quantized values (scale + zero point).
    TensorQuant8Asymm,
}

impl OperandType {
    /// Size of one element in bytes.
    pub fn element_size(&self) -> usize {
        match self {
            Self::Float32 | Self::Int32 | Self::UInt32 => 4,
            Self::TensorFloat32 | Self::TensorInt32 => 4,
            Self::TensorQuant8Asymm => 1,
        }
    }

    /// Returns `true` for tensor types (dimension list is meaningful).
    pub fn is_tensor(&self) -> bool {
        matches!(
            self,
            Self::TensorFloat32 | Self::TensorInt32 | Self::TensorQuant8Asymm
        )
    }

    /// Returns `true` for float32 types; everything else scores against
    /// the quantized8 performance entry when ranking devices.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::TensorFloat32)
    }

    /// Returns a human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Float32 => "float32",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::TensorFloat32 => "tensor_float32",
            Self::TensorInt32 => "tensor_int32",
            Self::TensorQuant8Asymm => "tensor_quant8_asymm",
        }
    }
}

impl std::fmt::Display for OperandType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an operand's value becomes known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperandLifetime {
    /// Computed by an operation, consumed inside the graph.
    TemporaryVariable,
    /// Supplied by the caller at execution time.
    ModelInput,
    /// Computed by an operation and returned to the caller.
    ModelOutput,
    /// Constant bytes copied into the graph's inline value pool.
    ConstantCopy,
    /// Constant bytes referenced at an offset in a shared pool.
    ConstantReference,
    /// Explicitly absent (optional operation argument).
    NoValue,
}

impl OperandLifetime {
    /// Returns `true` if the value only exists once some operation in the
    /// graph has run. These are the inputs that are "unknown" when
    /// readiness is seeded.
    pub fn is_produced_in_graph(&self) -> bool {
        matches!(self, Self::TemporaryVariable | Self::ModelOutput)
    }

    /// Returns a human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TemporaryVariable => "temporary_variable",
            Self::ModelInput => "model_input",
            Self::ModelOutput => "model_output",
            Self::ConstantCopy => "constant_copy",
            Self::ConstantReference => "constant_reference",
            Self::NoValue => "no_value",
        }
    }
}

impl std::fmt::Display for OperandLifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a constant operand's bytes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLocation {
    /// Offset into the graph's inline value pool (`ConstantCopy`).
    Inline { offset: usize, length: usize },
    /// Offset into a named shared pool (`ConstantReference`).
    Pool {
        pool: usize,
        offset: usize,
        length: usize,
    },
}

/// A single operand in a graph, identified by its index.
#[derive(Debug, Clone)]
pub struct Operand {
    /// The operand's data type.
    pub operand_type: OperandType,
    /// Dimension list (empty for scalars). A zero dimension means the
    /// extent is unknown until execution.
    pub dimensions: Vec<u32>,
    /// Quantization scale (0.0 for non-quantized types).
    pub scale: f32,
    /// Quantization zero point (0 for non-quantized types).
    pub zero_point: i32,
    /// How the value becomes known.
    pub lifetime: OperandLifetime,
    /// Byte location for constant lifetimes, `None` otherwise.
    pub location: Option<DataLocation>,
}

impl Operand {
    /// Number of elements, or 0 if any dimension is unknown.
    pub fn num_elements(&self) -> usize {
        if !self.operand_type.is_tensor() {
            return 1;
        }
        self.dimensions.iter().product::<u32>() as usize
    }

    /// Size in bytes, or 0 if the size is unknown at build time.
    pub fn size_bytes(&self) -> usize {
        self.num_elements() * self.operand_type.element_size()
    }

    /// Returns `true` if the byte size cannot be determined yet
    /// (some tensor dimension is zero).
    pub fn has_unknown_size(&self) -> bool {
        self.operand_type.is_tensor() && self.dimensions.iter().any(|&d| d == 0)
    }
}
