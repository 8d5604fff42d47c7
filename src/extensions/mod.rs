//! Implementations of various EWS convenience helpers.
pub mod folders;
