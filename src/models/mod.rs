// src/models/mod.rs

pub mod learning_session;
pub mod session_attempt;
pub mod subject;
