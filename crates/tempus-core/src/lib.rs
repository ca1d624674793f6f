//! Shared configuration and error types for the tempus workspace.

pub mod config;
pub mod error;
