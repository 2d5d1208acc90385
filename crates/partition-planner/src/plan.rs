// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The partitioning result: an [`ExecutionPlan`] and the [`partition`]
//! pass that produces one.
//!
//! A plan is tri-state. It starts EMPTY, and a single transition takes
//! it to SIMPLE (one target runs the whole graph, no sub-graphs built)
//! or COMPOUND (an ordered list of [`ExecutionStep`]s). There is no
//! path between SIMPLE and COMPOUND. `finish()` must succeed before a
//! plan can be executed; for a compound plan it resolves which
//! temporaries cross step boundaries, finishes every sub-graph, and
//! compiles accelerator steps.

use crate::{find_best_targets, ExecutionStep, OperandTracker, PlannerError};
use device_hal::{DeviceId, DeviceRegistry, ExecutionPreference, PreparedModel, Target};
use graph_ir::Graph;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

pub(crate) struct SimpleBody {
    pub(crate) target: Target,
    pub(crate) graph: Arc<Graph>,
    pub(crate) prepared: Option<Arc<dyn PreparedModel>>,
    pub(crate) successful: bool,
}

pub(crate) struct CompoundBody {
    pub(crate) main_graph: Arc<Graph>,
    pub(crate) steps: Vec<ExecutionStep>,
    /// main temporary operand index -> index of the step defining it.
    pub(crate) temp_to_defining_step: HashMap<usize, usize>,
    pub(crate) successful: bool,
}

pub(crate) enum Body {
    Empty { successful: bool },
    Simple(SimpleBody),
    Compound(CompoundBody),
}

/// The result of partitioning a graph across the registered devices.
pub struct ExecutionPlan {
    pub(crate) body: Body,
}

impl Default for ExecutionPlan {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExecutionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.body {
            Body::Empty { successful } => f
                .debug_struct("ExecutionPlan")
                .field("kind", &"empty")
                .field("successful", successful)
                .finish(),
            Body::Simple(simple) => f
                .debug_struct("ExecutionPlan")
                .field("kind", &"simple")
                .field("target", &simple.target)
                .field("graph", &simple.graph.name())
                .field("successful", &simple.successful)
                .finish(),
            Body::Compound(compound) => f
                .debug_struct("ExecutionPlan")
                .field("kind", &"compound")
                .field("steps", &compound.steps.len())
                .field("successful", &compound.successful)
                .finish(),
        }
    }
}

impl ExecutionPlan {
    /// An empty plan that has seen no graph yet.
    pub fn new() -> Self {
        Self {
            body: Body::Empty { successful: false },
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.body, Body::Empty { .. })
    }

    pub fn is_simple(&self) -> bool {
        matches!(self.body, Body::Simple(_))
    }

    pub fn is_compound(&self) -> bool {
        matches!(self.body, Body::Compound(_))
    }

    /// Whether `finish()` has run and succeeded.
    pub fn is_valid(&self) -> bool {
        match &self.body {
            Body::Empty { successful } => *successful,
            Body::Simple(simple) => simple.successful,
            Body::Compound(compound) => compound.successful,
        }
    }

    /// The plan's steps; empty unless the plan is compound.
    pub fn steps(&self) -> &[ExecutionStep] {
        match &self.body {
            Body::Compound(compound) => &compound.steps,
            _ => &[],
        }
    }

    /// The target of a simple plan.
    pub fn simple_target(&self) -> Option<Target> {
        match &self.body {
            Body::Simple(simple) => Some(simple.target),
            _ => None,
        }
    }

    /// Adopts the whole graph as a single step on one target.
    pub(crate) fn become_single_step(
        &mut self,
        target: Target,
        graph: &Arc<Graph>,
    ) -> Result<(), PlannerError> {
        let Body::Empty { .. } = self.body else {
            return Err(PlannerError::InvalidState(
                "plan already holds a graph",
            ));
        };
        self.body = Body::Simple(SimpleBody {
            target,
            graph: Arc::clone(graph),
            prepared: None,
            successful: false,
        });
        Ok(())
    }

    /// Opens a new step on the given target; subsequent
    /// [`ExecutionPlan::add_to_last_step`] calls fill it.
    pub(crate) fn create_new_step(
        &mut self,
        graph: &Arc<Graph>,
        target: Target,
    ) -> Result<(), PlannerError> {
        match &mut self.body {
            Body::Empty { .. } => {
                let step = ExecutionStep::new(0, target, graph);
                self.body = Body::Compound(CompoundBody {
                    main_graph: Arc::clone(graph),
                    steps: vec![step],
                    temp_to_defining_step: HashMap::new(),
                    successful: false,
                });
                Ok(())
            }
            Body::Compound(compound) => {
                let index = compound.steps.len();
                compound
                    .steps
                    .push(ExecutionStep::new(index, target, graph));
                Ok(())
            }
            Body::Simple(_) => Err(PlannerError::InvalidState(
                "cannot add steps to a simple plan",
            )),
        }
    }

    /// Translates one main-graph operation into the most recently
    /// opened step.
    pub(crate) fn add_to_last_step(&mut self, op_index: usize) -> Result<(), PlannerError> {
        let Body::Compound(CompoundBody {
            main_graph,
            steps,
            temp_to_defining_step,
            ..
        }) = &mut self.body
        else {
            return Err(PlannerError::InvalidState("plan has no open step"));
        };
        let step = steps
            .last_mut()
            .ok_or(PlannerError::InvalidState("plan has no open step"))?;
        step.add_operation(op_index, main_graph, temp_to_defining_step)
    }

    /// Seals the plan. One-shot; the plan is read-only afterwards.
    ///
    /// Cross-step temporaries are resolved here rather than during
    /// construction, since the step that consumes a temporary may be
    /// added after the step that defines it.
    pub(crate) fn finish(&mut self, registry: &DeviceRegistry) -> Result<(), PlannerError> {
        match &mut self.body {
            Body::Empty { successful } => {
                *successful = true;
                Ok(())
            }
            Body::Simple(simple) => {
                if let Target::Accelerator(id) = simple.target {
                    let driver = registry
                        .driver(id)
                        .ok_or(device_hal::DeviceError::UnknownDevice(id.index()))?;
                    tracing::debug!(
                        device = driver.name(),
                        graph = simple.graph.name(),
                        "compiling whole graph for simple plan"
                    );
                    simple.prepared = Some(driver.prepare(&simple.graph)?);
                }
                simple.successful = true;
                Ok(())
            }
            Body::Compound(compound) => {
                // A temporary becomes a sub-model output only when some
                // other step actually consumes it.
                let mut claims: Vec<(usize, usize)> = Vec::new();
                for step in &compound.steps {
                    for &(orig, _) in step.sub_model_inputs() {
                        let defining = *compound
                            .temp_to_defining_step
                            .get(&orig)
                            .ok_or(PlannerError::MissingDefiningStep { operand: orig })?;
                        claims.push((defining, orig));
                    }
                }
                for (defining, orig) in claims {
                    compound.steps[defining].record_sub_model_output(orig);
                }

                let main_graph = Arc::clone(&compound.main_graph);
                for step in &mut compound.steps {
                    step.finish_sub_model(&main_graph, registry)?;
                }
                if let Some(step) = compound
                    .steps
                    .iter()
                    .find(|s| s.has_unknown_output_size())
                {
                    tracing::error!(
                        step = step.index(),
                        "cross-step output of unknown size, plan rejected"
                    );
                    return Err(PlannerError::UnknownOutputSize { step: step.index() });
                }
                compound.successful = true;
                Ok(())
            }
        }
    }

    /// Human-readable listing of the plan for diagnostics.
    pub fn summary(&self, registry: &DeviceRegistry) -> String {
        match &self.body {
            Body::Empty { .. } => "plan: empty".to_string(),
            Body::Simple(simple) => format!(
                "plan: simple on {} | {}",
                registry.target_name(simple.target),
                simple.graph.summary()
            ),
            Body::Compound(compound) => {
                let mut out = format!("plan: compound, {} steps", compound.steps.len());
                for step in &compound.steps {
                    out.push_str("\n  ");
                    out.push_str(&step.summary(registry));
                }
                out
            }
        }
    }
}

/// Splits a graph into per-target steps and seals the resulting plan.
///
/// With no registered devices or no operations the whole graph runs on
/// the software path as a simple plan. When every operation picks the
/// same target, the plan is simple on that target and no sub-graphs
/// are built. Otherwise ready operations are drained into steps, one
/// queue per target, scanning the software queue first so accelerator
/// steps see as much ready input as possible and coalesce into larger
/// chunks.
pub fn partition(
    graph: &Arc<Graph>,
    registry: &DeviceRegistry,
    preference: ExecutionPreference,
) -> Result<ExecutionPlan, PlannerError> {
    let mut plan = ExecutionPlan::new();

    if registry.is_empty() || graph.operation_count() == 0 {
        tracing::debug!(graph = graph.name(), "no devices or no work, simple cpu plan");
        plan.become_single_step(Target::Cpu, graph)?;
        plan.finish(registry)?;
        return Ok(plan);
    }

    let targets = find_best_targets(graph, registry, preference);
    if let Some(&first) = targets.first() {
        if targets.iter().all(|&t| t == first) {
            tracing::debug!(
                graph = graph.name(),
                target = %registry.target_name(first),
                "all operations share one target, simple plan"
            );
            plan.become_single_step(first, graph)?;
            plan.finish(registry)?;
            return Ok(plan);
        }
    }

    // One queue per accelerator, plus the software queue at the end.
    let cpu_queue = registry.device_count();
    let queue_of = |target: Target| match target {
        Target::Accelerator(id) => id.index(),
        Target::Cpu => cpu_queue,
    };
    let mut queues: Vec<VecDeque<usize>> = vec![VecDeque::new(); cpu_queue + 1];

    let mut tracker = OperandTracker::new(graph, |op| {
        queues[queue_of(targets[op])].push_back(op);
    });

    loop {
        // Highest queue index first, so software-bound work runs before
        // the accelerators it feeds.
        let Some(qi) = (0..queues.len()).rev().find(|&q| !queues[q].is_empty()) else {
            break;
        };
        let target = if qi == cpu_queue {
            Target::Cpu
        } else {
            Target::Accelerator(DeviceId::new(qi))
        };
        plan.create_new_step(graph, target)?;
        while let Some(op) = queues[qi].pop_front() {
            plan.add_to_last_step(op)?;
            tracker.mark_processed(op, |ready| {
                queues[queue_of(targets[ready])].push_back(ready);
            });
        }
    }

    plan.finish(registry)?;
    tracing::debug!(
        graph = graph.name(),
        steps = plan.steps().len(),
        "partitioning finished"
    );
    Ok(plan)
}
