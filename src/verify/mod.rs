// src/verify/mod.rs

//! Best-effort verification that markers reached the output.
//!
//! This reads the engine's own text output and looks for marker-like lines.
//! It does not decode SCTE-35 sections, so false positives and negatives
//! are expected.

pub mod classifier;
pub mod observe;

pub use classifier::{KeywordClassifier, MarkerClassifier, MARKER_KEYWORDS};
pub use observe::{MarkerObservation, MarkerVerifier, ObservationWindow, POLL_INTERVAL};
