//! Core business logic for rentora.

pub mod services;

pub use services::*;
