// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # partition-planner
//!
//! Splits a dataflow graph across a heterogeneous device set and
//! drives the resulting multi-step execution.
//!
//! The pipeline, leaf-first:
//!
//! - [`OperandTracker`] — readiness bookkeeping over the graph's data
//!   dependencies.
//! - [`find_best_targets`] — greedy per-operation device choice,
//!   scored against each device's declared performance.
//! - [`ExecutionStep`] — one per-target chunk of the graph, extracted
//!   into its own sub-graph with remapped operand indices.
//! - [`ExecutionPlan`] / [`partition`] — the tri-state plan (empty,
//!   simple, compound) and the pass that builds and seals it.
//! - [`Controller`] / [`StepExecutor`] — per-invocation cursor over a
//!   finished plan, with a scratch buffer carrying cross-step
//!   temporaries and a one-shot software fallback per step.
//!
//! ```text
//!   graph ──partition──▶ ExecutionPlan ──make_controller──▶ Controller
//!                                             │
//!                          next()/fallback()  ▼
//!                                        StepExecutor ──▶ device / software
//! ```

mod assignment;
mod controller;
mod error;
mod plan;
mod step;
mod tracker;

#[cfg(test)]
pub(crate) mod testutil;

pub use assignment::find_best_targets;
pub use controller::{
    Controller, ExecutionRequest, OperandSlot, StepExecutor, BAD_STEP_INDEX,
};
pub use error::PlannerError;
pub use plan::{partition, ExecutionPlan};
pub use step::ExecutionStep;
pub use tracker::OperandTracker;
