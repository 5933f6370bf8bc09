use poise::serenity_prelude::User;

use crate::services::moderation::UserSummary;

pub mod moderation;
pub mod roles;
pub mod setup;

/// The parts of a user shown in embeds and audit-log reasons
fn user_summary(user: &User) -> UserSummary {
    UserSummary {
        id: user.id,
        tag: user.tag(),
        avatar_url: user.avatar_url(),
    }
}
