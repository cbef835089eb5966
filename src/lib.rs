pub mod analysis;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod loader;
pub mod model;
pub mod output;
pub mod reshape;
pub mod timeslot;
