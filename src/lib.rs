pub mod api;
pub mod cities;
pub mod client;
pub mod config;
pub mod config_validation;
pub mod entities;
pub mod errors;
pub mod fake_data;
pub mod metrics;
pub mod observer;
pub mod orchestrator;
pub mod percentiles;
pub mod registry;
pub mod report;
pub mod scenario;
pub mod selection;
pub mod synth;
pub mod transport;
pub mod utils;
pub mod workflows;
pub mod yaml_config;
