// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # device-hal
//!
//! The contracts between the execution planner and heterogeneous
//! compute devices.
//!
//! # Key Components
//!
//! - [`Capabilities`] / [`PerformanceInfo`] — per-device performance
//!   figures, split by computation class (float32 vs quantized8).
//! - [`ExecutionPreference`] — what the caller optimizes for, and how
//!   it scores a performance entry.
//! - [`DeviceDriver`] — the capability oracle and sub-graph compiler a
//!   backend implements.
//! - [`PreparedModel`] / [`StepIo`] — a compiled sub-graph and the
//!   buffers it runs over.
//! - [`DeviceRegistry`] / [`DeviceId`] / [`Target`] — immutable device
//!   identity. The software fallback is the explicit [`Target::Cpu`]
//!   variant, never a null sentinel.
//!
//! The planner treats everything here as an external collaborator: it
//! queries, compiles, and executes through these traits but never
//! reaches into a backend.

mod capabilities;
mod driver;
mod error;
mod registry;

pub use capabilities::{Capabilities, ExecutionPreference, PerformanceInfo};
pub use driver::{DeviceDriver, PreparedModel, StepIo};
pub use error::DeviceError;
pub use registry::{DeviceId, DeviceRegistry, Target};
