// src/services/mod.rs

pub mod lifecycle;
pub mod scoring;

pub use lifecycle::{SessionLifecycle, Submission};
