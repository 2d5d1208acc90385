// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! One partition of the main graph, bound to one execution target.
//!
//! An [`ExecutionStep`] owns a sub-graph under construction plus the
//! remapping tables between main-graph operand indices and the
//! sub-graph's local index space. Operands fall into four roles when
//! they enter a step:
//!
//! - **model inputs / model outputs** — main-graph ports this step
//!   passes through unchanged;
//! - **model outputs as inputs** — main-graph outputs another step
//!   produces and this step reads, straight from the request's output
//!   buffer;
//! - **sub-model inputs** — temporaries some *other* step produces,
//!   read from the shared scratch region;
//! - **sub-model outputs** — temporaries this step produces that at
//!   least one other step consumes, written to the scratch region.
//!
//! Each operand enters the map exactly once and its role is fixed at
//! first sight. Sub-model outputs are only known once all steps exist,
//! so they are recorded during the plan's finish pass, not here.

use crate::PlannerError;
use device_hal::{DeviceRegistry, PreparedModel, Target};
use graph_ir::{DataLocation, Graph, GraphBuilder, OperandLifetime};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// The role an operand plays for the operation currently being added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperandKind {
    Input,
    Output,
}

/// One contiguous chunk of the main graph assigned to one target.
pub struct ExecutionStep {
    index: usize,
    target: Target,
    builder: Option<GraphBuilder>,
    sub_graph: Option<Arc<Graph>>,
    /// main operand index -> sub-graph operand index.
    operand_map: HashMap<usize, usize>,
    model_inputs: Vec<(usize, usize)>,
    model_outputs: Vec<(usize, usize)>,
    /// Main-graph outputs another step produces and this step reads,
    /// in discovery order.
    model_outputs_as_inputs: Vec<(usize, usize)>,
    /// Temporaries defined by other steps, in discovery order.
    sub_model_inputs: Vec<(usize, usize)>,
    /// Temporaries this step defines for other steps. A set ordered by
    /// ascending main-graph index; discovery order deliberately does
    /// not apply here.
    sub_model_outputs: BTreeSet<(usize, usize)>,
    has_unknown_output_size: bool,
    prepared: Option<Arc<dyn PreparedModel>>,
}

impl ExecutionStep {
    pub(crate) fn new(index: usize, target: Target, main: &Graph) -> Self {
        Self {
            index,
            target,
            builder: Some(GraphBuilder::new(format!("{}#step{}", main.name(), index))),
            sub_graph: None,
            operand_map: HashMap::new(),
            model_inputs: Vec::new(),
            model_outputs: Vec::new(),
            model_outputs_as_inputs: Vec::new(),
            sub_model_inputs: Vec::new(),
            sub_model_outputs: BTreeSet::new(),
            has_unknown_output_size: false,
            prepared: None,
        }
    }

    /// Position of this step in the plan.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The target this step executes on.
    pub fn target(&self) -> Target {
        self.target
    }

    /// (main index, local index) pairs for main-graph inputs this step
    /// reads, in discovery order.
    pub fn model_inputs(&self) -> &[(usize, usize)] {
        &self.model_inputs
    }

    /// (main index, local index) pairs for main-graph outputs this step
    /// writes, in discovery order.
    pub fn model_outputs(&self) -> &[(usize, usize)] {
        &self.model_outputs
    }

    /// (main index, local index) pairs for main-graph outputs another
    /// step produces and this step reads, in discovery order.
    pub fn model_outputs_as_inputs(&self) -> &[(usize, usize)] {
        &self.model_outputs_as_inputs
    }

    /// Cross-step temporaries this step consumes, in discovery order.
    pub fn sub_model_inputs(&self) -> &[(usize, usize)] {
        &self.sub_model_inputs
    }

    /// Cross-step temporaries this step produces, ascending by
    /// main-graph operand index.
    pub fn sub_model_outputs(&self) -> &BTreeSet<(usize, usize)> {
        &self.sub_model_outputs
    }

    /// Set during the finish pass when a sub-model output has a zero
    /// dimension; such values have no fixed byte size and cannot be
    /// given a scratch slot.
    pub fn has_unknown_output_size(&self) -> bool {
        self.has_unknown_output_size
    }

    /// The compiled sub-graph, present after a successful finish on an
    /// accelerator target.
    pub fn prepared(&self) -> Option<&Arc<dyn PreparedModel>> {
        self.prepared.as_ref()
    }

    /// The finished sub-graph.
    pub fn sub_graph(&self) -> Result<&Arc<Graph>, PlannerError> {
        self.sub_graph
            .as_ref()
            .ok_or(PlannerError::InvalidState("step sub-graph not finished"))
    }

    fn builder_mut(&mut self) -> Result<&mut GraphBuilder, PlannerError> {
        self.builder
            .as_mut()
            .ok_or(PlannerError::InvalidState("step already finished"))
    }

    /// Maps one main-graph operand into the sub-graph, classifying it
    /// by lifetime and role on first sight.
    ///
    /// `temps` is the plan-wide temporary-to-defining-step map; a
    /// temporary first seen as an output registers this step there.
    pub(crate) fn add_operand(
        &mut self,
        from_index: usize,
        main: &Graph,
        temps: &mut HashMap<usize, usize>,
        kind: OperandKind,
    ) -> Result<usize, PlannerError> {
        if let Some(&local) = self.operand_map.get(&from_index) {
            if kind == OperandKind::Output {
                // An operand first seen as an input belongs to another
                // step's definition; producing it here would split
                // ownership.
                return Err(PlannerError::OperandRoleConflict {
                    operand: from_index,
                    step: self.index,
                });
            }
            return Ok(local);
        }

        let operand = main
            .operand(from_index)
            .ok_or(graph_ir::GraphError::InvalidOperandIndex {
                index: from_index,
                count: main.operand_count(),
            })?
            .clone();

        let local = {
            let builder = self.builder_mut()?;
            builder.add_operand(
                operand.operand_type,
                &operand.dimensions,
                operand.scale,
                operand.zero_point,
            )
        };
        self.operand_map.insert(from_index, local);

        match operand.lifetime {
            OperandLifetime::ConstantCopy => {
                let value = main.operand_value(from_index).ok_or(
                    PlannerError::InvalidState("constant operand has no inline value"),
                )?;
                let value = value.to_vec();
                self.builder_mut()?.set_operand_value(local, &value)?;
            }
            OperandLifetime::ConstantReference => {
                let Some(DataLocation::Pool { pool, offset, length }) = operand.location
                else {
                    return Err(PlannerError::InvalidState(
                        "constant reference has no pool location",
                    ));
                };
                let pool = main
                    .pool(pool)
                    .ok_or(PlannerError::InvalidState("constant pool missing"))?
                    .clone();
                self.builder_mut()?
                    .set_operand_value_from_pool(local, &pool, offset, length)?;
            }
            OperandLifetime::NoValue => {
                self.builder_mut()?.set_operand_no_value(local)?;
            }
            OperandLifetime::TemporaryVariable => {
                if kind == OperandKind::Input {
                    // First seen as an input: some other step defines
                    // it, so it arrives through the scratch region.
                    self.sub_model_inputs.push((from_index, local));
                } else {
                    // First seen as an output: this step defines it. A
                    // later step may claim it as its input; the finish
                    // pass turns that claim into a sub-model output.
                    temps.insert(from_index, self.index);
                }
            }
            OperandLifetime::ModelInput => {
                self.model_inputs.push((from_index, local));
            }
            OperandLifetime::ModelOutput => {
                if kind == OperandKind::Input {
                    // Another step produces this output; at execution
                    // time it is read back from the request's output
                    // buffer, which the producing step already filled.
                    self.model_outputs_as_inputs.push((from_index, local));
                } else {
                    self.model_outputs.push((from_index, local));
                }
            }
        }

        Ok(local)
    }

    /// Translates one main-graph operation into the sub-graph, inputs
    /// before outputs, each list in original order.
    pub(crate) fn add_operation(
        &mut self,
        op_index: usize,
        main: &Graph,
        temps: &mut HashMap<usize, usize>,
    ) -> Result<(), PlannerError> {
        let operation = main
            .operation(op_index)
            .ok_or(graph_ir::GraphError::InvalidOperationIndex {
                index: op_index,
                count: main.operation_count(),
            })?
            .clone();

        let mut inputs = Vec::with_capacity(operation.inputs.len());
        for &from in &operation.inputs {
            inputs.push(self.add_operand(from, main, temps, OperandKind::Input)?);
        }
        let mut outputs = Vec::with_capacity(operation.outputs.len());
        for &from in &operation.outputs {
            outputs.push(self.add_operand(from, main, temps, OperandKind::Output)?);
        }

        self.builder_mut()?
            .add_operation(operation.operation_type, &inputs, &outputs)?;
        tracing::trace!(
            step = self.index,
            operation = op_index,
            opcode = %operation.operation_type,
            "operation added to step"
        );
        Ok(())
    }

    /// Marks a temporary this step defines as consumed by another step.
    /// Called by the plan's finish pass once all steps exist.
    pub(crate) fn record_sub_model_output(&mut self, from_index: usize) {
        if let Some(&local) = self.operand_map.get(&from_index) {
            self.sub_model_outputs.insert((from_index, local));
        }
    }

    /// Identifies the sub-graph's ports, finishes it, and compiles it
    /// for an accelerator target.
    ///
    /// Input order is model inputs, then sub-model inputs, then model
    /// outputs read from other steps, discovery order within each.
    /// Output order is model outputs in discovery order, then
    /// sub-model outputs ascending by main-graph index.
    pub(crate) fn finish_sub_model(
        &mut self,
        main: &Graph,
        registry: &DeviceRegistry,
    ) -> Result<(), PlannerError> {
        for &(from_index, _) in &self.sub_model_outputs {
            if main.operand(from_index).is_some_and(|o| o.has_unknown_size()) {
                self.has_unknown_output_size = true;
            }
        }

        let inputs: Vec<usize> = self
            .model_inputs
            .iter()
            .chain(&self.sub_model_inputs)
            .chain(&self.model_outputs_as_inputs)
            .map(|&(_, local)| local)
            .collect();
        let outputs: Vec<usize> = self
            .model_outputs
            .iter()
            .map(|&(_, local)| local)
            .chain(self.sub_model_outputs.iter().map(|&(_, local)| local))
            .collect();

        let mut builder = self
            .builder
            .take()
            .ok_or(PlannerError::InvalidState("step already finished"))?;
        builder.identify_inputs_outputs(&inputs, &outputs)?;
        let sub_graph = Arc::new(builder.finish()?);

        if let Target::Accelerator(id) = self.target {
            let driver = registry
                .driver(id)
                .ok_or(device_hal::DeviceError::UnknownDevice(id.index()))?;
            tracing::debug!(
                step = self.index,
                device = driver.name(),
                graph = sub_graph.name(),
                "compiling step sub-graph"
            );
            self.prepared = Some(driver.prepare(&sub_graph)?);
        }

        self.sub_graph = Some(sub_graph);
        Ok(())
    }

    /// One-line diagnostic listing for plan dumps.
    pub fn summary(&self, registry: &DeviceRegistry) -> String {
        let graph = match &self.sub_graph {
            Some(g) => g.summary(),
            None => "(unfinished)".to_string(),
        };
        format!(
            "step {} on {}: {} | model in {:?} out {:?}, cross-step in {:?} out {:?}, model-out in {:?}",
            self.index,
            registry.target_name(self.target),
            graph,
            self.model_inputs.iter().map(|&(i, _)| i).collect::<Vec<_>>(),
            self.model_outputs.iter().map(|&(i, _)| i).collect::<Vec<_>>(),
            self.sub_model_inputs.iter().map(|&(i, _)| i).collect::<Vec<_>>(),
            self.sub_model_outputs.iter().map(|&(i, _)| i).collect::<Vec<_>>(),
            self.model_outputs_as_inputs.iter().map(|&(i, _)| i).collect::<Vec<_>>(),
        )
    }
}
