#![allow(dead_code, unused_imports)]

pub use scte35_inject_test_utils::builders;
pub use scte35_inject_test_utils::engine;
pub use scte35_inject_test_utils::{init_tracing, with_timeout};
