//! Normalized data models for HQ resources

mod survey;
mod user;
mod workspace;

pub use survey::{Assignment, Interview};
pub use user::{NewUser, Role, UnifiedUsers, User, UsersDebug};
pub use workspace::{Workspace, WorkspaceStatus};
