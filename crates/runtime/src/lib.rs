// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! The execution layer over partitioned plans.
//!
//! The runtime takes:
//! - An immutable `Graph` from `graph-ir`.
//! - A `DeviceRegistry` from `device-hal`.
//!
//! It partitions the graph with `partition-planner`, then drives the
//! resulting plan step by step: gather step inputs from the request
//! and scratch buffers, run on the assigned device (or the software
//! reference path), scatter the outputs back. A device step that fails
//! at run time is retried once in software before the run aborts.
//!
//! # Type-State Pipeline
//! ```text
//! ExecutionSession<Idle> → ExecutionSession<Compiled> → ExecutionOutput
//! ```
//! Transitions are compile-time checked.

mod config;
mod error;
mod metrics;
mod session;
mod software;

pub use config::RuntimeConfig;
pub use error::RuntimeError;
pub use metrics::{ExecutionMetrics, StepMetrics};
pub use session::{Compiled, ExecutionOutput, ExecutionSession, Idle, SessionState};
pub use software::run_reference;
