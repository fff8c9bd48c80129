//! Credit application assessment: derived financial metrics resolved through a
//! calculator dependency graph, and a weighted scorecard mapping categorical
//! answers to a risk band.

pub mod assessment;
pub mod config;
pub mod error;
pub mod telemetry;
