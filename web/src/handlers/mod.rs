//! HTTP request handlers.

pub mod availability;
pub mod health;
pub mod requests;

pub use availability::get_availability;
pub use health::health_check;
