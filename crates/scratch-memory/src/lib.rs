// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # scratch-memory
//!
//! Scratch storage for temporaries that cross a partition boundary.
//!
//! The partition planner sizes one shared region per execution: every
//! cross-step temporary gets a slot assigned by simple bump allocation
//! with natural alignment, then a single buffer is allocated at the
//! final total. The contract is deliberately narrow — reserve N bytes,
//! get an offset; allocate the total; read/write by range.
//!
//! # Example
//! ```
//! use scratch_memory::{ScratchBuffer, ScratchLayout};
//!
//! let mut layout = ScratchLayout::new();
//! let a = layout.reserve(64, 4);
//! let b = layout.reserve(16, 4);
//! let mut buf = ScratchBuffer::from_layout(&layout);
//! buf.write(a, &[1u8; 64]).unwrap();
//! assert_eq!(buf.read(b, 16).unwrap(), &[0u8; 16]);
//! ```

mod buffer;
mod error;
mod layout;

pub use buffer::ScratchBuffer;
pub use error::MemoryError;
pub use layout::ScratchLayout;
