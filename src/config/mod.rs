// src/config/mod.rs

//! Configuration record: load, default, validate, save.

pub mod loader;
pub mod model;
pub mod normalize;
pub mod validate;

pub use loader::{load, load_and_resolve, save, DEFAULT_CONFIG_FILE};
pub use model::{
    ConfigRecord, EngineSection, EngineSettings, InjectionPolicy, InjectionSection, InputSection,
    OutputSection, ResolvedConfig, ServiceDescriptor, ServiceSection, SignalSection,
    SignalSettings, SrtParams, StreamEndpoint,
};
pub use normalize::normalize;
