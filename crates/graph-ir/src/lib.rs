// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # graph-ir
//!
//! A lightweight intermediate representation for dataflow computation
//! graphs, consumed read-only by the partition planner.
//!
//! Rather than depending on a heavy framework, this crate defines the
//! minimal IR the execution planner needs:
//!
//! - [`OperandType`] / [`OperandLifetime`] / [`Operand`] — typed values
//!   and the classification of how each value becomes known.
//! - [`OperationType`] / [`Operation`] — opcodes with ordered operand
//!   index lists.
//! - [`ConstantPool`] — shared, named constant byte pools that
//!   sub-graphs re-bind to without copying.
//! - [`GraphBuilder`] / [`Graph`] — two-phase construction: mutable
//!   builder, then an immutable, validated graph.
//!
//! # Example
//! ```
//! use graph_ir::{GraphBuilder, OperandType, OperationType};
//!
//! let mut b = GraphBuilder::new("tiny");
//! let a = b.add_operand(OperandType::TensorFloat32, &[1, 8], 0.0, 0);
//! let c = b.add_operand(OperandType::TensorFloat32, &[1, 8], 0.0, 0);
//! let out = b.add_operand(OperandType::TensorFloat32, &[1, 8], 0.0, 0);
//! b.add_operation(OperationType::Add, &[a, c], &[out]).unwrap();
//! b.identify_inputs_outputs(&[a, c], &[out]).unwrap();
//! let graph = b.finish().unwrap();
//! println!("{}", graph.summary());
//! ```

mod error;
mod graph;
mod operand;
mod operation;
mod pool;

pub use error::GraphError;
pub use graph::{Graph, GraphBuilder};
pub use operand::{DataLocation, Operand, OperandLifetime, OperandType};
pub use operation::{Operation, OperationType};
pub use pool::ConstantPool;
