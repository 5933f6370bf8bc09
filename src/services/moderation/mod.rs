//! Moderation actions: precondition checks, enforcement, ledger and notifications.

pub mod duration;
pub mod error;
pub mod notice;
pub mod pipeline;
pub mod platform;
pub mod store;

pub use duration::{DurationUnit, TimeoutDuration};
pub use error::ModerationError;
pub use pipeline::{
    AuthorizedAction, ModerationAction, ModerationOutcome, ModerationPipeline, ModerationRequest,
    UserSummary,
};
pub use platform::{DiscordPlatform, ModerationPlatform, TargetMember};
pub use store::ModerationStore;
