pub mod config;
pub mod error;
pub mod join_request;
pub mod policy;
pub mod state;
pub mod suppression;
pub mod summary;
