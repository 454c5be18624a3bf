pub mod batch;
pub mod classify;
pub mod config;
pub mod enrich;
pub mod loader;
pub mod metrics;
pub mod oracle;
pub mod records;
pub mod store;
