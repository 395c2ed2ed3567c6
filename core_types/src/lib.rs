//! # Core Types
//!
//! This crate defines the fundamental types shared by every Timeslice crate.
//!
//! ## Philosophy
//!
//! - **Indices, not pointers**: Tasks are addressed by their slot in the batch.
//! - **Inclusive byte ranges**: Addresses are reported the way the simulator
//!   hands them out, first and last byte both included.
//! - **Constants live in one place**: Every fixed limit of the simulation is
//!   declared in [`limits`].
//!
//! ## Key Types
//!
//! - [`TaskSlot`]: Position of a task in the batch
//! - [`ByteRange`]: Inclusive range of logical or physical bytes
//! - [`PageAddress`]: A byte address split into `page : offset`

pub mod ids;
pub mod limits;
pub mod memory;

pub use ids::TaskSlot;
pub use memory::{pages_for, ByteRange, PageAddress};
