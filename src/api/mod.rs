//! API module for HQ interactions

mod client;

pub mod assignments;
pub mod interviews;
pub mod users;
pub mod workspaces;

pub use client::HqClient;
