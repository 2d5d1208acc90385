// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The execution session with type-state–enforced pipeline.
//!
//! ```text
//! ExecutionSession<Idle>
//!     │  .compile()
//!     ▼
//! ExecutionSession<Compiled>
//!     │  .run()
//!     ▼
//!   ExecutionOutput
//! ```
//!
//! `compile()` partitions the graph across the registered devices and
//! seals the plan; `run()` drives the plan step by step, retrying a
//! failed device step once on the software path before giving up.

use crate::{software, ExecutionMetrics, RuntimeConfig, RuntimeError};
use device_hal::DeviceRegistry;
use graph_ir::Graph;
use partition_planner::{
    partition, Controller, ExecutionPlan, ExecutionRequest, StepExecutor,
};
use std::sync::Arc;
use std::time::Instant;

// ── Type-state markers ─────────────────────────────────────────

/// Session is created but the graph is not yet partitioned.
#[derive(Debug)]
pub struct Idle;

/// The plan is built and sealed; the session can run.
#[derive(Debug)]
pub struct Compiled;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Idle {}
    impl Sealed for super::Compiled {}
}

/// Sealed trait for session states.
pub trait SessionState: sealed::Sealed + std::fmt::Debug {}
impl SessionState for Idle {}
impl SessionState for Compiled {}

// ── Execution output ───────────────────────────────────────────

/// The result of one plan run.
#[derive(Debug)]
pub struct ExecutionOutput {
    /// Output bytes, one buffer per graph output.
    pub outputs: Vec<Vec<u8>>,
    /// Per-step and overall timing metrics.
    pub metrics: ExecutionMetrics,
}

// ── Session ────────────────────────────────────────────────────

/// One graph bound to one device registry, across many runs.
///
/// `S` is a type-state marker enforcing the pipeline at compile time:
/// you cannot call `.run()` before `.compile()`.
///
/// # Example
/// ```no_run
/// use runtime::{ExecutionSession, RuntimeConfig};
/// # async fn example(
/// #     registry: std::sync::Arc<device_hal::DeviceRegistry>,
/// #     graph: std::sync::Arc<graph_ir::Graph>,
/// #     inputs: Vec<Vec<u8>>,
/// # ) -> Result<(), runtime::RuntimeError> {
/// let session = ExecutionSession::new(RuntimeConfig::default(), registry, graph)
///     .compile()?;
/// let output = session.run(inputs).await?;
/// println!("{}", output.metrics.summary());
/// # Ok(())
/// # }
/// ```
pub struct ExecutionSession<S: SessionState = Idle> {
    config: RuntimeConfig,
    registry: Arc<DeviceRegistry>,
    graph: Arc<Graph>,
    plan: Option<ExecutionPlan>,
    _state: std::marker::PhantomData<S>,
}

// ── Idle → Compiled ────────────────────────────────────────────

impl ExecutionSession<Idle> {
    /// Creates a new session over a graph and device registry.
    pub fn new(
        config: RuntimeConfig,
        registry: Arc<DeviceRegistry>,
        graph: Arc<Graph>,
    ) -> Self {
        tracing::info!(
            graph = graph.name(),
            devices = registry.device_count(),
            preference = %config.preference,
            "session created"
        );
        Self {
            config,
            registry,
            graph,
            plan: None,
            _state: std::marker::PhantomData,
        }
    }

    /// Partitions the graph and seals the plan. Transitions to
    /// `Compiled`.
    pub fn compile(self) -> Result<ExecutionSession<Compiled>, RuntimeError> {
        let preference = self.config.parse_preference()?;

        let plan = if self.config.enable_partitioning {
            partition(&self.graph, &self.registry, preference)?
        } else {
            // Partitioning disabled: the whole graph takes the
            // software path as a simple plan.
            partition(&self.graph, &DeviceRegistry::empty(), preference)?
        };
        tracing::info!("{}", plan.summary(&self.registry));

        Ok(ExecutionSession {
            config: self.config,
            registry: self.registry,
            graph: self.graph,
            plan: Some(plan),
            _state: std::marker::PhantomData,
        })
    }
}

// ── Compiled: run the plan ─────────────────────────────────────

impl ExecutionSession<Compiled> {
    /// The sealed execution plan.
    pub fn plan(&self) -> &ExecutionPlan {
        self.plan.as_ref().expect("plan exists in Compiled state")
    }

    /// The graph this session executes.
    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    /// Runs the plan over the given input buffers.
    ///
    /// Steps execute strictly in plan order. A device-targeted step
    /// that fails at run time is retried exactly once on the software
    /// path; a second failure aborts the run.
    pub async fn run(&self, inputs: Vec<Vec<u8>>) -> Result<ExecutionOutput, RuntimeError> {
        let run_start = Instant::now();
        let plan = self.plan();
        let mut request = ExecutionRequest::new(&self.graph, inputs)?;
        let mut controller = plan.make_controller(&request)?;
        let mut metrics = ExecutionMetrics::new(plan.steps().len());
        let profiling = self.config.enable_profiling;

        while let Some(executor) = plan.next(&mut controller)? {
            let step_start = Instant::now();
            match self.run_step(&executor, &mut request, &mut controller) {
                Ok(()) => {
                    if profiling {
                        metrics.record_step(
                            executor.step_index(),
                            self.registry.target_name(executor.target()),
                            false,
                            step_start.elapsed(),
                        );
                    }
                }
                Err(err) if executor.prepared().is_some() => {
                    let step = executor.step_index().unwrap_or(0);
                    tracing::warn!(
                        step,
                        error = %err,
                        "device step failed, retrying in software"
                    );
                    let retry = plan
                        .fallback(&mut controller)?
                        .ok_or(RuntimeError::StepFailed {
                            step,
                            detail: "fallback yielded no executor".to_string(),
                        })?;
                    let retry_start = Instant::now();
                    self.run_step(&retry, &mut request, &mut controller)
                        .map_err(|e| RuntimeError::StepFailed {
                            step,
                            detail: e.to_string(),
                        })?;
                    if profiling {
                        metrics.record_step(
                            retry.step_index(),
                            self.registry.target_name(retry.target()),
                            true,
                            retry_start.elapsed(),
                        );
                    }
                }
                Err(err) => return Err(err),
            }
        }

        metrics.finalise(run_start.elapsed());
        tracing::info!("{}", metrics.summary());

        Ok(ExecutionOutput {
            outputs: request.into_outputs(),
            metrics,
        })
    }

    fn run_step(
        &self,
        executor: &StepExecutor,
        request: &mut ExecutionRequest,
        controller: &mut Controller,
    ) -> Result<(), RuntimeError> {
        let mut io = executor.gather(request, controller)?;
        match executor.prepared() {
            Some(prepared) => prepared.run(&mut io)?,
            None => software::run_reference(executor.graph(), &mut io)?,
        }
        executor.scatter(io, request, controller)?;
        Ok(())
    }
}

impl<S: SessionState> std::fmt::Debug for ExecutionSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionSession")
            .field("state", &std::any::type_name::<S>())
            .field("graph", &self.graph.name())
            .field("devices", &self.registry.device_count())
            .field("has_plan", &self.plan.is_some())
            .finish()
    }
}
