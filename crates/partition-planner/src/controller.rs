// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Execution driving over a finished plan.
//!
//! A [`Controller`] is a per-invocation cursor: it owns the scratch
//! buffer holding cross-step temporaries and remembers which step runs
//! next. The caller repeatedly asks the plan for the next
//! [`StepExecutor`], runs it to completion, and only then asks again;
//! the single cursor enforces step order without locks. When a
//! device-targeted step fails at run time, [`ExecutionPlan::fallback`]
//! re-issues the same step with the software target, exactly once per
//! `next`.
//!
//! Cross-step temporaries are written by exactly one step and read
//! only by later steps, so the linear step order is the only
//! synchronization the scratch buffer needs.

use crate::plan::{Body, CompoundBody, SimpleBody};
use crate::{ExecutionPlan, ExecutionStep, PlannerError};
use device_hal::{PreparedModel, StepIo, Target};
use graph_ir::Graph;
use scratch_memory::{ScratchBuffer, ScratchLayout};
use std::collections::HashMap;
use std::sync::Arc;

/// Cursor value meaning "exhausted or poisoned".
pub const BAD_STEP_INDEX: usize = usize::MAX;

/// The caller's input and output buffers for one whole-graph run.
#[derive(Debug)]
pub struct ExecutionRequest {
    inputs: Vec<Vec<u8>>,
    outputs: Vec<Vec<u8>>,
}

impl ExecutionRequest {
    /// Wraps caller input buffers, checking count and byte sizes
    /// against the graph's ports, and pre-sizes one output buffer per
    /// graph output.
    pub fn new(graph: &Graph, inputs: Vec<Vec<u8>>) -> Result<Self, PlannerError> {
        if inputs.len() != graph.inputs().len() {
            return Err(PlannerError::RequestMismatch(format!(
                "graph '{}' takes {} inputs, got {}",
                graph.name(),
                graph.inputs().len(),
                inputs.len()
            )));
        }
        for (pos, (&index, buffer)) in graph.inputs().iter().zip(&inputs).enumerate() {
            let want = graph
                .operand(index)
                .map(|o| o.size_bytes())
                .ok_or(PlannerError::InvalidState("graph input operand missing"))?;
            if buffer.len() != want {
                return Err(PlannerError::RequestMismatch(format!(
                    "input {pos} is {} bytes, operand {index} wants {want}",
                    buffer.len()
                )));
            }
        }
        let mut outputs = Vec::with_capacity(graph.outputs().len());
        for &index in graph.outputs() {
            let size = graph
                .operand(index)
                .map(|o| o.size_bytes())
                .ok_or(PlannerError::InvalidState("graph output operand missing"))?;
            outputs.push(vec![0u8; size]);
        }
        Ok(Self { inputs, outputs })
    }

    pub fn inputs(&self) -> &[Vec<u8>] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Vec<u8>] {
        &self.outputs
    }

    /// Consumes the request, yielding the filled output buffers.
    pub fn into_outputs(self) -> Vec<Vec<u8>> {
        self.outputs
    }
}

/// Where one step-level port reads from or writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandSlot {
    /// Position in the request's input list.
    RequestInput(usize),
    /// Position in the request's output list.
    RequestOutput(usize),
    /// Byte range in the controller's scratch buffer.
    Scratch { offset: usize, length: usize },
}

/// Per-invocation execution state over a finished plan.
pub struct Controller {
    next_step_index: usize,
    scratch: ScratchBuffer,
    /// main operand index -> scratch byte offset.
    scratch_offsets: HashMap<usize, usize>,
}

impl Controller {
    /// The cursor value; [`BAD_STEP_INDEX`] once exhausted or poisoned.
    pub fn next_step_index(&self) -> usize {
        self.next_step_index
    }

    /// Total scratch bytes reserved for cross-step temporaries.
    pub fn scratch_size(&self) -> usize {
        self.scratch.len()
    }
}

/// One step's sub-graph, target, and port wiring, ready to run.
pub struct StepExecutor {
    step_index: Option<usize>,
    target: Target,
    graph: Arc<Graph>,
    prepared: Option<Arc<dyn PreparedModel>>,
    input_slots: Vec<OperandSlot>,
    output_slots: Vec<OperandSlot>,
}

impl StepExecutor {
    /// Step position in the plan; `None` for a whole-graph executor.
    pub fn step_index(&self) -> Option<usize> {
        self.step_index
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// The graph this executor runs (a step sub-graph, or the whole
    /// graph for a simple plan).
    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    /// The device-compiled model; `None` on the software path.
    pub fn prepared(&self) -> Option<&Arc<dyn PreparedModel>> {
        self.prepared.as_ref()
    }

    pub fn input_slots(&self) -> &[OperandSlot] {
        &self.input_slots
    }

    pub fn output_slots(&self) -> &[OperandSlot] {
        &self.output_slots
    }

    /// Collects input bytes from the request and scratch buffer into an
    /// owned [`StepIo`], with outputs pre-sized for the device to fill.
    pub fn gather(
        &self,
        request: &ExecutionRequest,
        controller: &Controller,
    ) -> Result<StepIo, PlannerError> {
        let mut io = StepIo::default();
        for slot in &self.input_slots {
            let buffer = match *slot {
                OperandSlot::RequestInput(pos) => request
                    .inputs
                    .get(pos)
                    .ok_or(PlannerError::InvalidState("request input out of range"))?
                    .clone(),
                OperandSlot::RequestOutput(pos) => request
                    .outputs
                    .get(pos)
                    .ok_or(PlannerError::InvalidState("request output out of range"))?
                    .clone(),
                OperandSlot::Scratch { offset, length } => {
                    controller.scratch.read(offset, length)?.to_vec()
                }
            };
            io.inputs.push(buffer);
        }
        for slot in &self.output_slots {
            let size = match *slot {
                OperandSlot::RequestOutput(pos) => request
                    .outputs
                    .get(pos)
                    .ok_or(PlannerError::InvalidState("request output out of range"))?
                    .len(),
                OperandSlot::Scratch { length, .. } => length,
                OperandSlot::RequestInput(_) => {
                    return Err(PlannerError::InvalidState(
                        "request input wired as a step output",
                    ))
                }
            };
            io.outputs.push(vec![0u8; size]);
        }
        io.check_against(&self.graph).map_err(PlannerError::from)?;
        Ok(io)
    }

    /// Writes a finished step's output bytes back to the request and
    /// the scratch buffer.
    pub fn scatter(
        &self,
        io: StepIo,
        request: &mut ExecutionRequest,
        controller: &mut Controller,
    ) -> Result<(), PlannerError> {
        if io.outputs.len() != self.output_slots.len() {
            return Err(PlannerError::RequestMismatch(format!(
                "step produced {} outputs, expected {}",
                io.outputs.len(),
                self.output_slots.len()
            )));
        }
        for (slot, buffer) in self.output_slots.iter().zip(io.outputs) {
            match *slot {
                OperandSlot::RequestOutput(pos) => {
                    let target = request
                        .outputs
                        .get_mut(pos)
                        .ok_or(PlannerError::InvalidState("request output out of range"))?;
                    if target.len() != buffer.len() {
                        return Err(PlannerError::RequestMismatch(format!(
                            "output {pos} is {} bytes, step produced {}",
                            target.len(),
                            buffer.len()
                        )));
                    }
                    *target = buffer;
                }
                OperandSlot::Scratch { offset, .. } => {
                    controller.scratch.write(offset, &buffer)?;
                }
                OperandSlot::RequestInput(_) => {
                    return Err(PlannerError::InvalidState(
                        "request input wired as a step output",
                    ))
                }
            }
        }
        Ok(())
    }
}

impl ExecutionPlan {
    /// Builds a fresh execution cursor for one run of the plan.
    ///
    /// For a compound plan this lays out one scratch slot per
    /// cross-step temporary, naturally aligned, and allocates the
    /// backing buffer.
    pub fn make_controller(
        &self,
        request: &ExecutionRequest,
    ) -> Result<Controller, PlannerError> {
        if !self.is_valid() {
            return Err(PlannerError::PlanNotFinished);
        }
        match &self.body {
            Body::Empty { .. } => Ok(Controller {
                next_step_index: 0,
                scratch: ScratchBuffer::with_size(0),
                scratch_offsets: HashMap::new(),
            }),
            Body::Simple(simple) => {
                check_request(request, &simple.graph)?;
                Ok(Controller {
                    next_step_index: 0,
                    scratch: ScratchBuffer::with_size(0),
                    scratch_offsets: HashMap::new(),
                })
            }
            Body::Compound(compound) => {
                check_request(request, &compound.main_graph)?;
                let mut layout = ScratchLayout::new();
                let mut offsets = HashMap::new();
                for step in &compound.steps {
                    for &(orig, _) in step.sub_model_outputs() {
                        let operand = compound
                            .main_graph
                            .operand(orig)
                            .ok_or(PlannerError::InvalidState("cross-step operand missing"))?;
                        let offset = layout
                            .reserve(operand.size_bytes(), operand.operand_type.element_size());
                        offsets.insert(orig, offset);
                    }
                }
                tracing::debug!(
                    bytes = layout.total_bytes(),
                    slots = offsets.len(),
                    "scratch region laid out"
                );
                Ok(Controller {
                    next_step_index: 0,
                    scratch: ScratchBuffer::from_layout(&layout),
                    scratch_offsets: offsets,
                })
            }
        }
    }

    /// Yields the next unexecuted step, or `None` once the plan is
    /// exhausted. Wiring errors poison the controller.
    pub fn next(&self, controller: &mut Controller) -> Result<Option<StepExecutor>, PlannerError> {
        self.next_with(controller, false)
    }

    /// Re-issues the previous step on the software path. Fails if
    /// `next` was never called or the controller is poisoned.
    pub fn fallback(
        &self,
        controller: &mut Controller,
    ) -> Result<Option<StepExecutor>, PlannerError> {
        if controller.next_step_index == BAD_STEP_INDEX {
            return Err(PlannerError::ControllerMisuse(
                "fallback on a poisoned or exhausted controller",
            ));
        }
        if controller.next_step_index == 0 {
            return Err(PlannerError::ControllerMisuse("fallback before any next"));
        }
        controller.next_step_index -= 1;
        self.next_with(controller, true)
    }

    fn next_with(
        &self,
        controller: &mut Controller,
        force_software: bool,
    ) -> Result<Option<StepExecutor>, PlannerError> {
        match &self.body {
            Body::Empty { .. } => {
                // Running an empty graph is an immediate no-op.
                controller.next_step_index = BAD_STEP_INDEX;
                Ok(None)
            }
            Body::Simple(simple) => {
                if controller.next_step_index != 0 {
                    return Ok(None);
                }
                controller.next_step_index = 1;
                Ok(Some(simple_executor(simple, force_software)))
            }
            Body::Compound(compound) => {
                if controller.next_step_index >= compound.steps.len() {
                    return Ok(None);
                }
                let step = &compound.steps[controller.next_step_index];
                match step_executor(compound, step, controller, force_software) {
                    Ok(executor) => {
                        tracing::debug!(
                            step = step.index(),
                            software = force_software,
                            "issuing step executor"
                        );
                        controller.next_step_index += 1;
                        Ok(Some(executor))
                    }
                    Err(err) => {
                        controller.next_step_index = BAD_STEP_INDEX;
                        Err(err)
                    }
                }
            }
        }
    }
}

fn check_request(request: &ExecutionRequest, graph: &Graph) -> Result<(), PlannerError> {
    if request.inputs.len() != graph.inputs().len()
        || request.outputs.len() != graph.outputs().len()
    {
        return Err(PlannerError::RequestMismatch(format!(
            "graph '{}' has {} inputs / {} outputs, request has {} / {}",
            graph.name(),
            graph.inputs().len(),
            graph.outputs().len(),
            request.inputs.len(),
            request.outputs.len()
        )));
    }
    Ok(())
}

fn simple_executor(simple: &SimpleBody, force_software: bool) -> StepExecutor {
    let ports = |count: usize, make: fn(usize) -> OperandSlot| -> Vec<OperandSlot> {
        (0..count).map(make).collect()
    };
    StepExecutor {
        step_index: None,
        target: if force_software { Target::Cpu } else { simple.target },
        graph: Arc::clone(&simple.graph),
        prepared: if force_software {
            None
        } else {
            simple.prepared.clone()
        },
        input_slots: ports(simple.graph.inputs().len(), OperandSlot::RequestInput),
        output_slots: ports(simple.graph.outputs().len(), OperandSlot::RequestOutput),
    }
}

fn step_executor(
    compound: &CompoundBody,
    step: &ExecutionStep,
    controller: &Controller,
    force_software: bool,
) -> Result<StepExecutor, PlannerError> {
    let main = &compound.main_graph;

    // Slot order mirrors the sub-graph's port order: model-level ports
    // first, cross-step ports after.
    let mut input_slots = Vec::with_capacity(
        step.model_inputs().len()
            + step.sub_model_inputs().len()
            + step.model_outputs_as_inputs().len(),
    );
    for &(orig, _) in step.model_inputs() {
        let pos = main
            .inputs()
            .iter()
            .position(|&i| i == orig)
            .ok_or(PlannerError::InvalidState("step input is not a graph input"))?;
        input_slots.push(OperandSlot::RequestInput(pos));
    }
    for &(orig, _) in step.sub_model_inputs() {
        input_slots.push(scratch_slot(compound, controller, orig)?);
    }
    // Model outputs read by this step were filled into the request by
    // an earlier step.
    for &(orig, _) in step.model_outputs_as_inputs() {
        let pos = main
            .outputs()
            .iter()
            .position(|&i| i == orig)
            .ok_or(PlannerError::InvalidState(
                "step input is not a graph output",
            ))?;
        input_slots.push(OperandSlot::RequestOutput(pos));
    }

    let mut output_slots = Vec::with_capacity(
        step.model_outputs().len() + step.sub_model_outputs().len(),
    );
    for &(orig, _) in step.model_outputs() {
        let pos = main
            .outputs()
            .iter()
            .position(|&i| i == orig)
            .ok_or(PlannerError::InvalidState(
                "step output is not a graph output",
            ))?;
        output_slots.push(OperandSlot::RequestOutput(pos));
    }
    for &(orig, _) in step.sub_model_outputs() {
        output_slots.push(scratch_slot(compound, controller, orig)?);
    }

    Ok(StepExecutor {
        step_index: Some(step.index()),
        target: if force_software { Target::Cpu } else { step.target() },
        graph: Arc::clone(step.sub_graph()?),
        prepared: if force_software {
            None
        } else {
            step.prepared().cloned()
        },
        input_slots,
        output_slots,
    })
}

fn scratch_slot(
    compound: &CompoundBody,
    controller: &Controller,
    orig: usize,
) -> Result<OperandSlot, PlannerError> {
    let offset = *controller
        .scratch_offsets
        .get(&orig)
        .ok_or(PlannerError::MissingScratchSlot { operand: orig })?;
    let length = compound
        .main_graph
        .operand(orig)
        .map(|o| o.size_bytes())
        .ok_or(PlannerError::InvalidState("cross-step operand missing"))?;
    Ok(OperandSlot::Scratch { offset, length })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::partition;
    use crate::testutil::{chain_graph, test_registry, two_level_graph, TestDriver};
    use device_hal::{Capabilities, DeviceId, ExecutionPreference};
    use graph_ir::OperationType;

    fn float_buffer(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_empty_plan_exhausts_immediately() {
        let mut plan = ExecutionPlan::new();
        plan.finish(&device_hal::DeviceRegistry::empty()).unwrap();
        let request = ExecutionRequest {
            inputs: vec![],
            outputs: vec![],
        };
        let mut controller = plan.make_controller(&request).unwrap();
        assert!(plan.next(&mut controller).unwrap().is_none());
        assert_eq!(controller.next_step_index(), BAD_STEP_INDEX);
        assert!(matches!(
            plan.fallback(&mut controller),
            Err(PlannerError::ControllerMisuse(_))
        ));
    }

    #[test]
    fn test_unfinished_plan_refuses_controller() {
        let plan = ExecutionPlan::new();
        let request = ExecutionRequest {
            inputs: vec![],
            outputs: vec![],
        };
        assert!(matches!(
            plan.make_controller(&request),
            Err(PlannerError::PlanNotFinished)
        ));
    }

    #[test]
    fn test_simple_plan_yields_once() {
        let graph = Arc::new(chain_graph(&[OperationType::Relu]));
        let registry = device_hal::DeviceRegistry::empty();
        let plan = partition(&graph, &registry, ExecutionPreference::FastSingleAnswer).unwrap();

        let request = ExecutionRequest::new(&graph, vec![float_buffer(&[0.0; 8])]).unwrap();
        let mut controller = plan.make_controller(&request).unwrap();

        let executor = plan.next(&mut controller).unwrap().unwrap();
        assert_eq!(executor.step_index(), None);
        assert_eq!(executor.target(), Target::Cpu);
        assert_eq!(executor.input_slots(), &[OperandSlot::RequestInput(0)]);
        assert_eq!(executor.output_slots(), &[OperandSlot::RequestOutput(0)]);

        assert!(plan.next(&mut controller).unwrap().is_none());
    }

    #[test]
    fn test_fallback_before_next_is_misuse() {
        let graph = Arc::new(chain_graph(&[OperationType::Relu]));
        let registry = device_hal::DeviceRegistry::empty();
        let plan = partition(&graph, &registry, ExecutionPreference::FastSingleAnswer).unwrap();
        let request = ExecutionRequest::new(&graph, vec![float_buffer(&[0.0; 8])]).unwrap();
        let mut controller = plan.make_controller(&request).unwrap();
        assert!(matches!(
            plan.fallback(&mut controller),
            Err(PlannerError::ControllerMisuse(_))
        ));
    }

    #[test]
    fn test_request_size_validation() {
        let graph = Arc::new(chain_graph(&[OperationType::Relu]));
        // 8 floats expected, 2 supplied.
        assert!(matches!(
            ExecutionRequest::new(&graph, vec![float_buffer(&[0.0, 0.0])]),
            Err(PlannerError::RequestMismatch(_))
        ));
    }

    #[test]
    fn test_compound_wiring_and_scratch_flow() {
        let (graph, [_a, _b, _c, mid, _out]) =
            two_level_graph(OperationType::Add, OperationType::Mul);
        let registry = test_registry(vec![
            TestDriver::supporting("x", &[OperationType::Add], Capabilities::uniform(1.0)),
            TestDriver::supporting("y", &[OperationType::Mul], Capabilities::uniform(1.0)),
        ]);
        let plan = partition(&graph, &registry, ExecutionPreference::FastSingleAnswer).unwrap();

        let inputs = vec![
            float_buffer(&[1.0; 4]),
            float_buffer(&[2.0; 4]),
            float_buffer(&[3.0; 4]),
        ];
        let mut request = ExecutionRequest::new(&graph, inputs).unwrap();
        let mut controller = plan.make_controller(&request).unwrap();
        assert_eq!(controller.scratch_size(), 16);

        // Step 0: model inputs a, b in; the intermediate out to scratch.
        let step0 = plan.next(&mut controller).unwrap().unwrap();
        assert_eq!(step0.step_index(), Some(0));
        assert_eq!(
            step0.input_slots(),
            &[OperandSlot::RequestInput(0), OperandSlot::RequestInput(1)]
        );
        let OperandSlot::Scratch { offset, length } = step0.output_slots()[0] else {
            panic!("expected scratch output");
        };
        assert_eq!(length, 16);

        // Run the step as if the device filled the outputs.
        let mut io = step0.gather(&request, &controller).unwrap();
        io.outputs[0] = float_buffer(&[7.0; 4]);
        step0.scatter(io, &mut request, &mut controller).unwrap();
        assert_eq!(
            controller.scratch.read(offset, length).unwrap(),
            &float_buffer(&[7.0; 4])[..]
        );

        // Step 1 reads model input c and the scratch intermediate.
        let step1 = plan.next(&mut controller).unwrap().unwrap();
        assert_eq!(step1.step_index(), Some(1));
        assert_eq!(step1.input_slots()[0], OperandSlot::RequestInput(2));
        assert_eq!(
            step1.input_slots()[1],
            OperandSlot::Scratch { offset, length }
        );
        let io = step1.gather(&request, &controller).unwrap();
        assert_eq!(io.inputs[1], float_buffer(&[7.0; 4]));
        assert_eq!(step1.output_slots(), &[OperandSlot::RequestOutput(0)]);

        // Scratch offsets exist for exactly the crossing temporary.
        assert_eq!(controller.scratch_offsets.len(), 1);
        assert!(controller.scratch_offsets.contains_key(&mid));

        assert!(plan.next(&mut controller).unwrap().is_none());
    }

    #[test]
    fn test_fallback_reissues_previous_step_on_software() {
        let (graph, _) = two_level_graph(OperationType::Add, OperationType::Mul);
        let registry = test_registry(vec![
            TestDriver::supporting("x", &[OperationType::Add], Capabilities::uniform(1.0)),
            TestDriver::supporting("y", &[OperationType::Mul], Capabilities::uniform(1.0)),
        ]);
        let plan = partition(&graph, &registry, ExecutionPreference::FastSingleAnswer).unwrap();
        let request = ExecutionRequest::new(
            &graph,
            vec![
                float_buffer(&[0.0; 4]),
                float_buffer(&[0.0; 4]),
                float_buffer(&[0.0; 4]),
            ],
        )
        .unwrap();
        let mut controller = plan.make_controller(&request).unwrap();

        let step0 = plan.next(&mut controller).unwrap().unwrap();
        assert_eq!(step0.target(), Target::Accelerator(DeviceId::new(0)));
        assert!(step0.prepared().is_some());

        // The accelerator attempt failed; retry the same region in
        // software.
        let retry = plan.fallback(&mut controller).unwrap().unwrap();
        assert_eq!(retry.step_index(), Some(0));
        assert_eq!(retry.target(), Target::Cpu);
        assert!(retry.prepared().is_none());
        assert_eq!(retry.input_slots(), step0.input_slots());
        assert_eq!(retry.output_slots(), step0.output_slots());

        // The cursor resumes after the retried step.
        let step1 = plan.next(&mut controller).unwrap().unwrap();
        assert_eq!(step1.step_index(), Some(1));
    }

    #[test]
    fn test_model_output_read_back_from_request_buffer() {
        // x is both a graph output and the softmax input; the
        // conv-only device puts the two operations in separate steps.
        let mut b = graph_ir::GraphBuilder::new("output-feeds-op");
        let input = b.add_operand(graph_ir::OperandType::TensorFloat32, &[1, 4], 0.0, 0);
        let x = b.add_operand(graph_ir::OperandType::TensorFloat32, &[1, 4], 0.0, 0);
        let out2 = b.add_operand(graph_ir::OperandType::TensorFloat32, &[1, 4], 0.0, 0);
        b.add_operation(OperationType::Conv2d, &[input], &[x]).unwrap();
        b.add_operation(OperationType::Softmax, &[x], &[out2]).unwrap();
        b.identify_inputs_outputs(&[input], &[x, out2]).unwrap();
        let graph = Arc::new(b.finish().unwrap());

        let registry = test_registry(vec![TestDriver::supporting(
            "npu",
            &[OperationType::Conv2d],
            Capabilities::uniform(0.5),
        )]);
        let plan = partition(&graph, &registry, ExecutionPreference::FastSingleAnswer).unwrap();

        let mut request =
            ExecutionRequest::new(&graph, vec![float_buffer(&[1.0; 4])]).unwrap();
        let mut controller = plan.make_controller(&request).unwrap();
        // Nothing crosses through scratch; x travels via the request.
        assert_eq!(controller.scratch_size(), 0);

        let step0 = plan.next(&mut controller).unwrap().unwrap();
        assert_eq!(step0.output_slots(), &[OperandSlot::RequestOutput(0)]);
        let mut io = step0.gather(&request, &controller).unwrap();
        io.outputs[0] = float_buffer(&[5.0; 4]);
        step0.scatter(io, &mut request, &mut controller).unwrap();

        // Step 1 reads x straight from the request's output buffer.
        let step1 = plan.next(&mut controller).unwrap().unwrap();
        assert_eq!(step1.input_slots(), &[OperandSlot::RequestOutput(0)]);
        assert_eq!(step1.output_slots(), &[OperandSlot::RequestOutput(1)]);
        let io = step1.gather(&request, &controller).unwrap();
        assert_eq!(io.inputs[0], float_buffer(&[5.0; 4]));

        assert!(plan.next(&mut controller).unwrap().is_none());
    }
}
