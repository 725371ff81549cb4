//! In-process implementation of the backend REST contract
//!
//! Gives integration tests and demos a real HTTP surface to exercise
//! the gateway against, including injected server faults.

pub mod api;
pub mod handlers;
pub mod server;
pub mod state;

pub use server::{HarnessHandle, HarnessServer};
pub use state::HarnessState;
