// src/services/mod.rs
pub mod estimator;
pub mod indicators;
pub mod predict;
pub mod quotes;
