//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from specific business logic.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::{
    apply_dev_headers, build_304_response, build_400_response, build_403_response,
    build_404_response, build_500_response, build_501_response, build_redirect_response,
};
