pub mod api;
pub mod config;
pub mod model;
pub mod observability;
pub mod persist;
pub mod reaper;
pub mod store;
