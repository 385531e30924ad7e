//! Auth module for HQ credential handling
//!
//! Resolves whether calls go out under HTTP Basic or Bearer authorization,
//! and models the outcome of the bearer-login probe.

mod credentials;

pub use credentials::{AuthMode, BearerLogin, Credentials};
