//! HTTP API handlers for gramd

pub mod health;
pub mod reports;
pub mod transcribe;

pub use health::health_routes;
pub use reports::report_routes;
pub use transcribe::transcribe_routes;
