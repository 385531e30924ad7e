//! hqbridge - client and normalization layer for Survey Solutions Headquarters
//!
//! HQ deployments vary in response shapes, field casing, auth scheme, and
//! endpoint availability, by build and by caller role. This crate turns
//! that variability into a stable internal representation:
//! - shape-tolerant list extraction and record normalization
//! - basic-auth by default with a one-way bearer-token upgrade
//! - a best-effort user-directory traversal that degrades into warnings
//!   instead of failing on partial endpoint access

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod warnings;

pub use api::HqClient;
pub use error::{HqError, Result};
