//! Role management: grants, removals, temporary roles and their expiry sweep.

pub mod duration;
pub mod error;
pub mod manager;
pub mod notice;
pub mod platform;
pub mod store;
pub mod sweeper;

pub use duration::TempRoleDuration;
pub use error::RoleError;
pub use manager::{BulkRemoval, RoleChange, RoleManager, RoleRequest, SweepReport};
pub use platform::{RoleInfo, RolePlatform};
pub use store::RoleStore;
