pub mod metrics;
pub mod sink;
