//! specforge core library
//!
//! Loads API specification documents and renders template sets against them.

pub mod error;
pub mod openapi;
pub mod templates;
pub mod utils;

pub use error::Error;
