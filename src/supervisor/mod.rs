// src/supervisor/mod.rs

//! Supervision of the external engine process.
//!
//! Each [`SupervisedProcess`] is backed by the actual child handle; state is
//! never inferred by searching the OS process table.

pub mod process;
pub mod state;

pub use process::{ProcessSupervisor, SupervisedProcess, DEFAULT_OUTPUT_CAPACITY};
pub use state::{OutputLine, OutputStream, ProcessState};
