pub mod alignment;
pub mod alphabet;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod estimator;
pub mod index;
pub mod ingest;
pub mod marginals;
pub mod output;
pub mod pipeline;
pub mod reweight;
pub mod sample_size;
