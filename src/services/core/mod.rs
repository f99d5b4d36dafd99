// src/services/core/mod.rs

pub mod analytics;
pub mod infrastructure;
