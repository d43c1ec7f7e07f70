// src/splice/mod.rs

//! Splice command construction.
//!
//! - [`command`] holds the immutable `SpliceCommand` value.
//! - [`generator`] maps a policy (cue-out, cue-in, ...) onto command fields
//!   and enforces strictly increasing event ids.
//! - [`pts`] converts wall-clock time into 90 kHz ticks.
//! - [`render`] turns a command into the engine's textual description and
//!   writes it as a marker file.

pub mod command;
pub mod generator;
pub mod pts;
pub mod render;

pub use command::SpliceCommand;
pub use generator::{SpliceGenerator, CRASH_OUT_DURATION_SECS};
pub use pts::now_pts;
pub use render::{marker_file_name, render_xml, write_marker_file};
