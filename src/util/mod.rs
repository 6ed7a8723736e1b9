//! Utility modules: timeouts and conversation identifiers.

pub mod request_id;
pub mod timeout;

pub use request_id::RequestIdGenerator;
