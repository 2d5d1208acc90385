// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Graph construction and the finished, immutable graph.
//!
//! The two-phase split mirrors the rest of the workspace:
//!
//! ```text
//! GraphBuilder   — operands/operations being added, lifetimes mutable.
//!       │  .finish()
//!       ▼
//! Graph          — immutable, validated, ready for partitioning.
//! ```
//!
//! Operands start life as `TemporaryVariable`. Lifetimes are refined by
//! `set_operand_value` (→ `ConstantCopy`), `set_operand_value_from_pool`
//! (→ `ConstantReference`), `set_operand_no_value` (→ `NoValue`) and
//! `identify_inputs_outputs` (→ `ModelInput` / `ModelOutput`). The
//! builder is also how the planner assembles per-step sub-graphs, so it
//! validates eagerly and never panics on caller mistakes.

use crate::{
    ConstantPool, DataLocation, GraphError, Operand, OperandLifetime, OperandType, Operation,
    OperationType,
};
use std::fmt;
use std::sync::Arc;

/// Inline constant values are aligned to this boundary so that typed
/// views of the value pool stay well-formed.
const VALUE_ALIGNMENT: usize = 4;

// ── GraphBuilder ───────────────────────────────────────────────────

/// A graph under construction.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    name: String,
    operands: Vec<Operand>,
    operations: Vec<Operation>,
    inputs: Vec<usize>,
    outputs: Vec<usize>,
    /// Backing store for `ConstantCopy` values.
    operand_values: Vec<u8>,
    /// Pools referenced by `ConstantReference` operands.
    pools: Vec<Arc<ConstantPool>>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operands: Vec::new(),
            operations: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            operand_values: Vec::new(),
            pools: Vec::new(),
        }
    }

    /// Number of operands added so far.
    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    /// Number of operations added so far.
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Adds an operand and returns its index.
    ///
    /// The operand starts as `TemporaryVariable`; its lifetime is refined
    /// by later calls.
    pub fn add_operand(
        &mut self,
        operand_type: OperandType,
        dimensions: &[u32],
        scale: f32,
        zero_point: i32,
    ) -> usize {
        let index = self.operands.len();
        self.operands.push(Operand {
            operand_type,
            dimensions: dimensions.to_vec(),
            scale,
            zero_point,
            lifetime: OperandLifetime::TemporaryVariable,
            location: None,
        });
        index
    }

    /// Sets an operand to a constant value copied into the graph's
    /// inline value pool (`ConstantCopy`).
    pub fn set_operand_value(&mut self, index: usize, value: &[u8]) -> Result<(), GraphError> {
        let operand = self.operand_mut(index)?;
        if operand.lifetime != OperandLifetime::TemporaryVariable {
            return Err(GraphError::LifetimeConflict {
                index,
                lifetime: operand.lifetime.as_str(),
            });
        }
        if operand.has_unknown_size() {
            return Err(GraphError::UnknownOperandSize { index });
        }
        let want = operand.size_bytes();
        if value.len() != want {
            return Err(GraphError::ValueSizeMismatch {
                index,
                want,
                got: value.len(),
            });
        }

        // Keep inline values aligned within the pool.
        let padding = self.operand_values.len().next_multiple_of(VALUE_ALIGNMENT)
            - self.operand_values.len();
        self.operand_values.extend(std::iter::repeat(0u8).take(padding));
        let offset = self.operand_values.len();
        self.operand_values.extend_from_slice(value);

        let operand = &mut self.operands[index];
        operand.lifetime = OperandLifetime::ConstantCopy;
        operand.location = Some(DataLocation::Inline {
            offset,
            length: value.len(),
        });
        Ok(())
    }

    /// Sets an operand to reference bytes in a shared pool
    /// (`ConstantReference`). The pool is registered with the builder if
    /// it is not already known.
    pub fn set_operand_value_from_pool(
        &mut self,
        index: usize,
        pool: &Arc<ConstantPool>,
        offset: usize,
        length: usize,
    ) -> Result<(), GraphError> {
        let operand = self.operand_mut(index)?;
        if operand.lifetime != OperandLifetime::TemporaryVariable {
            return Err(GraphError::LifetimeConflict {
                index,
                lifetime: operand.lifetime.as_str(),
            });
        }
        if pool.bytes(offset, length).is_none() {
            return Err(GraphError::PoolRangeError {
                pool: pool.name().to_string(),
                offset,
                length,
                pool_len: pool.len(),
            });
        }

        let pool_index = match self.pools.iter().position(|p| Arc::ptr_eq(p, pool)) {
            Some(i) => i,
            None => {
                self.pools.push(Arc::clone(pool));
                self.pools.len() - 1
            }
        };

        let operand = &mut self.operands[index];
        operand.lifetime = OperandLifetime::ConstantReference;
        operand.location = Some(DataLocation::Pool {
            pool: pool_index,
            offset,
            length,
        });
        Ok(())
    }

    /// Marks an operand as explicitly absent (`NoValue`).
    pub fn set_operand_no_value(&mut self, index: usize) -> Result<(), GraphError> {
        let operand = self.operand_mut(index)?;
        if operand.lifetime != OperandLifetime::TemporaryVariable {
            return Err(GraphError::LifetimeConflict {
                index,
                lifetime: operand.lifetime.as_str(),
            });
        }
        operand.lifetime = OperandLifetime::NoValue;
        Ok(())
    }

    /// Adds an operation and returns its index.
    ///
    /// All operand indices must already exist; outputs must still be
    /// `TemporaryVariable` (constants and identified inputs cannot be
    /// written).
    pub fn add_operation(
        &mut self,
        operation_type: OperationType,
        inputs: &[usize],
        outputs: &[usize],
    ) -> Result<usize, GraphError> {
        for &i in inputs.iter().chain(outputs) {
            self.operand(i)?;
        }
        for &o in outputs {
            let lifetime = self.operands[o].lifetime;
            if lifetime != OperandLifetime::TemporaryVariable {
                return Err(GraphError::InvalidOutputLifetime {
                    index: o,
                    lifetime: lifetime.as_str(),
                });
            }
        }
        let index = self.operations.len();
        self.operations.push(Operation {
            operation_type,
            inputs: inputs.to_vec(),
            outputs: outputs.to_vec(),
        });
        Ok(index)
    }

    /// Declares which operands are graph inputs and outputs, fixing
    /// their lifetimes to `ModelInput` / `ModelOutput`.
    pub fn identify_inputs_outputs(
        &mut self,
        inputs: &[usize],
        outputs: &[usize],
    ) -> Result<(), GraphError> {
        for &i in inputs {
            let operand = self.operand_mut(i)?;
            if operand.lifetime != OperandLifetime::TemporaryVariable {
                return Err(GraphError::LifetimeConflict {
                    index: i,
                    lifetime: operand.lifetime.as_str(),
                });
            }
            operand.lifetime = OperandLifetime::ModelInput;
        }
        for &o in outputs {
            let operand = self.operand_mut(o)?;
            if operand.lifetime != OperandLifetime::TemporaryVariable {
                return Err(GraphError::LifetimeConflict {
                    index: o,
                    lifetime: operand.lifetime.as_str(),
                });
            }
            operand.lifetime = OperandLifetime::ModelOutput;
        }
        self.inputs = inputs.to_vec();
        self.outputs = outputs.to_vec();
        Ok(())
    }

    /// Validates the graph and freezes it.
    ///
    /// # Checks
    /// - Every computed operand (`TemporaryVariable` consumed anywhere,
    ///   `ModelOutput`) is produced by exactly one operation.
    /// - No operand is written by more than one operation.
    pub fn finish(self) -> Result<Graph, GraphError> {
        let mut producer: Vec<Option<usize>> = vec![None; self.operands.len()];
        for (op_index, op) in self.operations.iter().enumerate() {
            for &o in &op.outputs {
                if producer[o].is_some() {
                    return Err(GraphError::MultipleDefinition { index: o });
                }
                producer[o] = Some(op_index);
            }
        }

        for op in &self.operations {
            for &i in &op.inputs {
                if self.operands[i].lifetime.is_produced_in_graph() && producer[i].is_none() {
                    return Err(GraphError::UndefinedOperand { index: i });
                }
            }
        }
        for &o in &self.outputs {
            if producer[o].is_none() {
                return Err(GraphError::UndefinedOperand { index: o });
            }
        }

        tracing::debug!(
            name = %self.name,
            operands = self.operands.len(),
            operations = self.operations.len(),
            "graph finished"
        );

        Ok(Graph {
            name: self.name,
            operands: self.operands,
            operations: self.operations,
            inputs: self.inputs,
            outputs: self.outputs,
            operand_values: Arc::new(self.operand_values),
            pools: self.pools,
        })
    }

    // ── Private helpers ────────────────────────────────────────────

    fn operand(&self, index: usize) -> Result<&Operand, GraphError> {
        self.operands.get(index).ok_or(GraphError::InvalidOperandIndex {
            index,
            count: self.operands.len(),
        })
    }

    fn operand_mut(&mut self, index: usize) -> Result<&mut Operand, GraphError> {
        let count = self.operands.len();
        self.operands
            .get_mut(index)
            .ok_or(GraphError::InvalidOperandIndex { index, count })
    }
}

// ── Graph ──────────────────────────────────────────────────────────

/// A finished, immutable dataflow graph.
///
/// Consumed read-only by the partition planner; shared via `Arc`.
#[derive(Debug, Clone)]
pub struct Graph {
    name: String,
    operands: Vec<Operand>,
    operations: Vec<Operation>,
    inputs: Vec<usize>,
    outputs: Vec<usize>,
    operand_values: Arc<Vec<u8>>,
    pools: Vec<Arc<ConstantPool>>,
}

impl Graph {
    /// The graph's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All operands.
    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    /// All operations, in insertion (topological) order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Graph input operand indices, in declaration order.
    pub fn inputs(&self) -> &[usize] {
        &self.inputs
    }

    /// Graph output operand indices, in declaration order.
    pub fn outputs(&self) -> &[usize] {
        &self.outputs
    }

    /// Number of operands.
    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    /// Number of operations.
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Returns an operand by index.
    pub fn operand(&self, index: usize) -> Option<&Operand> {
        self.operands.get(index)
    }

    /// Returns an operation by index.
    pub fn operation(&self, index: usize) -> Option<&Operation> {
        self.operations.get(index)
    }

    /// Resolves a `ConstantCopy` operand's inline bytes.
    pub fn operand_value(&self, index: usize) -> Option<&[u8]> {
        match self.operand(index)?.location? {
            DataLocation::Inline { offset, length } => {
                self.operand_values.get(offset..offset + length)
            }
            DataLocation::Pool { .. } => None,
        }
    }

    /// Returns a referenced pool by index.
    pub fn pool(&self, index: usize) -> Option<&Arc<ConstantPool>> {
        self.pools.get(index)
    }

    /// Returns a summary string describing the graph.
    pub fn summary(&self) -> String {
        format!(
            "Graph '{}': {} operations, {} operands, {} inputs, {} outputs",
            self.name,
            self.operations.len(),
            self.operands.len(),
            self.inputs.len(),
            self.outputs.len(),
        )
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        for (i, op) in self.operations.iter().enumerate() {
            writeln!(f, "  [{i}] {}", op.summary())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// a, b -> add -> t -> relu -> out
    fn chain_builder() -> GraphBuilder {
        let mut b = GraphBuilder::new("chain");
        let a = b.add_operand(OperandType::TensorFloat32, &[1, 4], 0.0, 0);
        let w = b.add_operand(OperandType::TensorFloat32, &[1, 4], 0.0, 0);
        let t = b.add_operand(OperandType::TensorFloat32, &[1, 4], 0.0, 0);
        let out = b.add_operand(OperandType::TensorFloat32, &[1, 4], 0.0, 0);
        b.add_operation(OperationType::Add, &[a, w], &[t]).unwrap();
        b.add_operation(OperationType::Relu, &[t], &[out]).unwrap();
        b.identify_inputs_outputs(&[a, w], &[out]).unwrap();
        b
    }

    #[test]
    fn test_finish_ok() {
        let graph = chain_builder().finish().unwrap();
        assert_eq!(graph.operation_count(), 2);
        assert_eq!(graph.inputs(), &[0, 1]);
        assert_eq!(graph.outputs(), &[3]);
        assert_eq!(graph.operand(2).unwrap().lifetime, OperandLifetime::TemporaryVariable);
        assert_eq!(graph.operand(0).unwrap().lifetime, OperandLifetime::ModelInput);
        assert_eq!(graph.operand(3).unwrap().lifetime, OperandLifetime::ModelOutput);
    }

    #[test]
    fn test_constant_copy() {
        let mut b = GraphBuilder::new("consts");
        let c = b.add_operand(OperandType::TensorFloat32, &[2], 0.0, 0);
        b.set_operand_value(c, &[0u8; 8]).unwrap();
        let a = b.add_operand(OperandType::TensorFloat32, &[2], 0.0, 0);
        let out = b.add_operand(OperandType::TensorFloat32, &[2], 0.0, 0);
        b.add_operation(OperationType::Add, &[a, c], &[out]).unwrap();
        b.identify_inputs_outputs(&[a], &[out]).unwrap();
        let graph = b.finish().unwrap();

        assert_eq!(graph.operand(c).unwrap().lifetime, OperandLifetime::ConstantCopy);
        assert_eq!(graph.operand_value(c).unwrap().len(), 8);
    }

    #[test]
    fn test_constant_copy_wrong_size() {
        let mut b = GraphBuilder::new("bad");
        let c = b.add_operand(OperandType::TensorFloat32, &[2], 0.0, 0);
        let err = b.set_operand_value(c, &[0u8; 3]).unwrap_err();
        assert!(matches!(err, GraphError::ValueSizeMismatch { want: 8, got: 3, .. }));
    }

    #[test]
    fn test_constant_reference() {
        let pool = Arc::new(ConstantPool::new("weights", vec![7u8; 64]));
        let mut b = GraphBuilder::new("pooled");
        let c = b.add_operand(OperandType::TensorQuant8Asymm, &[16], 0.5, 0);
        b.set_operand_value_from_pool(c, &pool, 16, 16).unwrap();
        let a = b.add_operand(OperandType::TensorQuant8Asymm, &[16], 0.5, 0);
        let out = b.add_operand(OperandType::TensorQuant8Asymm, &[16], 0.5, 0);
        b.add_operation(OperationType::Add, &[a, c], &[out]).unwrap();
        b.identify_inputs_outputs(&[a], &[out]).unwrap();
        let graph = b.finish().unwrap();

        let operand = graph.operand(c).unwrap();
        assert_eq!(operand.lifetime, OperandLifetime::ConstantReference);
        assert_eq!(
            operand.location,
            Some(DataLocation::Pool { pool: 0, offset: 16, length: 16 })
        );
        assert_eq!(graph.pool(0).unwrap().name(), "weights");
    }

    #[test]
    fn test_pool_range_error() {
        let pool = Arc::new(ConstantPool::new("small", vec![0u8; 8]));
        let mut b = GraphBuilder::new("bad");
        let c = b.add_operand(OperandType::TensorQuant8Asymm, &[16], 0.5, 0);
        let err = b.set_operand_value_from_pool(c, &pool, 4, 16).unwrap_err();
        assert!(matches!(err, GraphError::PoolRangeError { .. }));
    }

    #[test]
    fn test_pool_deduplicated() {
        let pool = Arc::new(ConstantPool::new("w", vec![0u8; 32]));
        let mut b = GraphBuilder::new("dedupe");
        let c0 = b.add_operand(OperandType::TensorQuant8Asymm, &[8], 0.5, 0);
        let c1 = b.add_operand(OperandType::TensorQuant8Asymm, &[8], 0.5, 0);
        b.set_operand_value_from_pool(c0, &pool, 0, 8).unwrap();
        b.set_operand_value_from_pool(c1, &pool, 8, 8).unwrap();
        let a = b.add_operand(OperandType::TensorQuant8Asymm, &[8], 0.5, 0);
        let out = b.add_operand(OperandType::TensorQuant8Asymm, &[8], 0.5, 0);
        b.add_operation(OperationType::Concat, &[a, c0, c1], &[out]).unwrap();
        b.identify_inputs_outputs(&[a], &[out]).unwrap();
        let graph = b.finish().unwrap();

        assert!(graph.pool(0).is_some());
        assert!(graph.pool(1).is_none());
    }

    #[test]
    fn test_no_value() {
        let mut b = GraphBuilder::new("optional");
        let bias = b.add_operand(OperandType::TensorFloat32, &[4], 0.0, 0);
        b.set_operand_no_value(bias).unwrap();
        // The lifetime is fixed at first classification.
        let err = b.set_operand_no_value(bias).unwrap_err();
        assert!(matches!(err, GraphError::LifetimeConflict { lifetime: "no_value", .. }));
    }

    #[test]
    fn test_output_cannot_be_constant() {
        let mut b = GraphBuilder::new("bad");
        let c = b.add_operand(OperandType::TensorFloat32, &[2], 0.0, 0);
        b.set_operand_value(c, &[0u8; 8]).unwrap();
        let a = b.add_operand(OperandType::TensorFloat32, &[2], 0.0, 0);
        let err = b.add_operation(OperationType::Relu, &[a], &[c]).unwrap_err();
        assert!(matches!(err, GraphError::InvalidOutputLifetime { .. }));
    }

    #[test]
    fn test_multiple_definition_rejected() {
        let mut b = GraphBuilder::new("double");
        let a = b.add_operand(OperandType::TensorFloat32, &[2], 0.0, 0);
        let t = b.add_operand(OperandType::TensorFloat32, &[2], 0.0, 0);
        b.add_operation(OperationType::Relu, &[a], &[t]).unwrap();
        b.add_operation(OperationType::Logistic, &[a], &[t]).unwrap();
        b.identify_inputs_outputs(&[a], &[t]).unwrap();
        assert!(matches!(b.finish(), Err(GraphError::MultipleDefinition { index: 1 })));
    }

    #[test]
    fn test_undefined_output_rejected() {
        let mut b = GraphBuilder::new("dangling");
        let a = b.add_operand(OperandType::TensorFloat32, &[2], 0.0, 0);
        let out = b.add_operand(OperandType::TensorFloat32, &[2], 0.0, 0);
        b.identify_inputs_outputs(&[a], &[out]).unwrap();
        assert!(matches!(b.finish(), Err(GraphError::UndefinedOperand { index: 1 })));
    }

    #[test]
    fn test_invalid_operand_index() {
        let mut b = GraphBuilder::new("oob");
        let err = b.add_operation(OperationType::Relu, &[42], &[]).unwrap_err();
        assert!(matches!(err, GraphError::InvalidOperandIndex { index: 42, .. }));
    }

    #[test]
    fn test_empty_graph_finishes() {
        let graph = GraphBuilder::new("empty").finish().unwrap();
        assert_eq!(graph.operation_count(), 0);
    }

    #[test]
    fn test_display_lists_operations() {
        let graph = chain_builder().finish().unwrap();
        let text = format!("{graph}");
        assert!(text.contains("add"));
        assert!(text.contains("relu"));
    }

    #[test]
    fn test_inline_values_aligned() {
        let mut b = GraphBuilder::new("align");
        let c0 = b.add_operand(OperandType::TensorQuant8Asymm, &[3], 0.5, 0);
        b.set_operand_value(c0, &[1, 2, 3]).unwrap();
        let c1 = b.add_operand(OperandType::TensorFloat32, &[1], 0.0, 0);
        b.set_operand_value(c1, &1.0f32.to_le_bytes()).unwrap();
        let graph = b.finish().unwrap();
        match graph.operand(c1).unwrap().location {
            Some(DataLocation::Inline { offset, .. }) => assert_eq!(offset % 4, 0),
            other => panic!("unexpected location {other:?}"),
        }
    }
}
