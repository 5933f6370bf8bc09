use chrono::{DateTime, Utc};
use serenity::all::{CreateEmbed, CreateEmbedFooter, Timestamp};

use crate::constants::embeds::{
    self, DM_FOOTER, ERROR_COLOR, FIELD_VALUE_LIMIT, KICK_COLOR, SUCCESS_COLOR, TIMEOUT_COLOR,
};
use crate::constants::timeouts::DEFAULT_REASON;
use crate::db::models::{ActionType, NewPunishment, PunishmentRecord};
use crate::services::moderation::duration::TimeoutDuration;
use crate::services::moderation::error::ModerationError;
use crate::services::moderation::pipeline::{ModerationOutcome, ModerationRequest, UserSummary};
use crate::utils::formatting::{
    discord_timestamp, mention_stored_user, mention_user, neutralize_mentions, truncate,
};

fn reason_value(reason: &str) -> String {
    truncate(&neutralize_mentions(reason), FIELD_VALUE_LIMIT)
}

fn user_value(user: &UserSummary) -> String {
    format!("{} (`{}`)\n{}", mention_user(user.id), user.id, user.tag)
}

fn id_value(punishment_id: &str) -> String {
    format!("`{}`", punishment_id)
}

fn action_colour(action_type: ActionType) -> serenity::all::Colour {
    match action_type {
        ActionType::Ban => ERROR_COLOR,
        ActionType::Kick => KICK_COLOR,
        ActionType::Timeout => TIMEOUT_COLOR,
        ActionType::Untimeout => SUCCESS_COLOR,
    }
}

/// Private message to the punished user, sent before enforcement
pub fn dm_embed(
    request: &ModerationRequest,
    punishment_id: &str,
    duration: Option<&TimeoutDuration>,
    expires_at: Option<DateTime<Utc>>,
) -> CreateEmbed {
    let action_type = request.action.action_type();
    let guild = &request.guild_name;
    let title = match action_type {
        ActionType::Ban => format!("You have been banned from {}", guild),
        ActionType::Kick => format!("You have been kicked from {}", guild),
        ActionType::Timeout => format!("You have been timed out in {}", guild),
        ActionType::Untimeout => format!("Your timeout in {} has been removed", guild),
    };

    let mut embed = CreateEmbed::new()
        .title(title)
        .color(action_colour(action_type))
        .timestamp(Timestamp::now());

    if let Some(duration) = duration {
        embed = embed.field("Duration", duration.label(), false);
    }
    embed = embed
        .field("Reason", reason_value(request.reason()), false)
        .field("Punishment ID", id_value(punishment_id), false);
    if let Some(at) = expires_at {
        embed = embed.field("Timeout Ends", discord_timestamp(at, 'F'), false);
    }

    embed.footer(CreateEmbedFooter::new(DM_FOOTER))
}

/// Entry posted to the guild's mod-log channel
pub fn mod_log_embed(
    request: &ModerationRequest,
    entry: &NewPunishment,
    expires_at: Option<DateTime<Utc>>,
) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(format!("🔨 {}", entry.action_type))
        .color(action_colour(entry.action_type))
        .timestamp(Timestamp::now())
        .field("User", user_value(&request.target), true)
        .field("Moderator", user_value(&request.moderator), true)
        .field("Punishment ID", id_value(&entry.punishment_id), true);

    if let Some(duration) = &entry.duration {
        embed = embed.field("Duration", duration, true);
    }
    if let Some(at) = expires_at {
        embed = embed.field("Timeout Ends", discord_timestamp(at, 'F'), true);
    }
    embed = embed.field("Reason", reason_value(&entry.reason), false);

    if let Some(avatar) = &request.target.avatar_url {
        embed = embed.thumbnail(avatar);
    }

    embed.footer(CreateEmbedFooter::new(format!("Guild ID: {}", request.guild_id)))
}

/// Reply to the invoking moderator after a successful action
pub fn confirmation_embed(request: &ModerationRequest, outcome: &ModerationOutcome) -> CreateEmbed {
    let entry = &outcome.punishment;
    let title = match entry.action_type {
        ActionType::Ban => "Member Banned",
        ActionType::Kick => "Member Kicked",
        ActionType::Timeout => "Member Timed Out",
        ActionType::Untimeout => "Timeout Removed",
    };

    let base = if outcome.warnings.is_empty() {
        embeds::success_embed()
    } else {
        embeds::warning_embed()
    };

    let mut embed = base
        .title(title)
        .timestamp(Timestamp::now())
        .field(
            "User",
            format!("{} (`{}`)", mention_user(request.target.id), request.target.id),
            true,
        )
        .field("Punishment ID", id_value(&entry.punishment_id), true);

    if entry.action_type == ActionType::Untimeout {
        embed = embed.field("Moderator", mention_user(request.moderator.id), true);
    }
    if let Some(duration) = &entry.duration {
        embed = embed.field("Duration", duration, true);
    }
    if let Some(at) = outcome.expires_at {
        embed = embed.field(
            "Timeout Ends",
            format!("{} ({})", discord_timestamp(at, 'F'), discord_timestamp(at, 'R')),
            false,
        );
    }
    embed = embed.field("Reason", reason_value(&entry.reason), false);

    if !outcome.warnings.is_empty() {
        let warnings: Vec<String> = outcome.warnings.iter().map(ToString::to_string).collect();
        embed = embed.field("⚠️ Warnings", embeds::bullet_list(&warnings), false);
    }

    let footer = if outcome.dm_delivered {
        "User was notified via DM"
    } else {
        "Could not notify user via DM"
    };
    embed.footer(CreateEmbedFooter::new(footer))
}

/// Reply when the action was refused or the platform rejected it
pub fn failure_embed(error: &ModerationError) -> CreateEmbed {
    embeds::error_embed()
        .title("Action Failed")
        .description(error.to_string())
}

/// One line of `/mod history`
pub fn history_line(record: &PunishmentRecord) -> String {
    let duration = record
        .duration
        .as_deref()
        .map(|d| format!(" ({})", d))
        .unwrap_or_default();

    format!(
        "**{}**{} {} by {} {} `{}`",
        record.action_type,
        duration,
        mention_stored_user(record.user_id),
        mention_stored_user(record.moderator_id),
        discord_timestamp(record.created_at, 'R'),
        record.punishment_id
    )
}

/// Full view of one ledger row for `/mod case`
pub fn record_embed(record: &PunishmentRecord) -> CreateEmbed {
    let mut embed = embeds::standard_embed()
        .title(format!("Case {}", record.action_type))
        .field("User", mention_stored_user(record.user_id), true)
        .field("Moderator", mention_stored_user(record.moderator_id), true)
        .field("Punishment ID", id_value(&record.punishment_id), true);

    if let Some(duration) = &record.duration {
        embed = embed.field("Duration", duration, true);
    }

    embed
        .field(
            "Reason",
            reason_value(record.reason.as_deref().unwrap_or(DEFAULT_REASON)),
            false,
        )
        .field("Issued", discord_timestamp(record.created_at, 'F'), false)
}

#[cfg(test)]
mod tests {
    use serenity::all::{GuildId, UserId};

    use super::*;
    use crate::services::moderation::pipeline::ModerationAction;

    fn request(action: ModerationAction, reason: Option<&str>) -> ModerationRequest {
        ModerationRequest {
            guild_id: GuildId::new(1),
            guild_name: "Test Guild".to_string(),
            moderator: UserSummary {
                id: UserId::new(2),
                tag: "mod#0001".to_string(),
                avatar_url: None,
            },
            target: UserSummary {
                id: UserId::new(3),
                tag: "target#0002".to_string(),
                avatar_url: Some("https://cdn.example/avatar.png".to_string()),
            },
            reason: reason.map(str::to_string),
            action,
        }
    }

    fn field<'a>(embed: &'a serde_json::Value, name: &str) -> Option<&'a str> {
        embed["fields"]
            .as_array()?
            .iter()
            .find(|f| f["name"] == name)
            .and_then(|f| f["value"].as_str())
    }

    #[test]
    fn test_dm_embed_for_ban() {
        let req = request(ModerationAction::Ban { delete_message_days: 0 }, Some("spam"));
        let embed = serde_json::to_value(dm_embed(&req, "abc", None, None)).unwrap();

        assert_eq!(embed["title"], "You have been banned from Test Guild");
        assert_eq!(field(&embed, "Reason"), Some("spam"));
        assert_eq!(field(&embed, "Punishment ID"), Some("`abc`"));
        assert_eq!(field(&embed, "Duration"), None);
        assert_eq!(embed["footer"]["text"], DM_FOOTER);
    }

    #[test]
    fn test_reason_cannot_ping() {
        let req = request(ModerationAction::Kick, Some("@everyone raid"));
        let embed = serde_json::to_value(dm_embed(&req, "abc", None, None)).unwrap();
        assert_eq!(field(&embed, "Reason"), Some("@\u{200B}everyone raid"));
    }

    #[test]
    fn test_mod_log_embed_for_timeout() {
        let req = request(
            ModerationAction::Timeout {
                amount: 2,
                unit: crate::services::moderation::duration::DurationUnit::Hours,
            },
            None,
        );
        let entry = NewPunishment {
            punishment_id: "abc".to_string(),
            guild_id: 1,
            user_id: 3,
            moderator_id: 2,
            action_type: ActionType::Timeout,
            reason: "No reason provided".to_string(),
            duration: Some("2 hours".to_string()),
        };
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let embed = serde_json::to_value(mod_log_embed(&req, &entry, Some(at))).unwrap();

        assert_eq!(embed["title"], "🔨 TIMEOUT");
        assert_eq!(field(&embed, "User"), Some("<@3> (`3`)\ntarget#0002"));
        assert_eq!(field(&embed, "Moderator"), Some("<@2> (`2`)\nmod#0001"));
        assert_eq!(field(&embed, "Duration"), Some("2 hours"));
        assert_eq!(field(&embed, "Timeout Ends"), Some("<t:1700000000:F>"));
        assert_eq!(embed["thumbnail"]["url"], "https://cdn.example/avatar.png");
        assert_eq!(embed["footer"]["text"], "Guild ID: 1");
    }

    #[test]
    fn test_failure_embed_uses_error_message() {
        let embed =
            serde_json::to_value(failure_embed(&ModerationError::HierarchyViolation("kick")))
                .unwrap();
        assert_eq!(
            embed["description"],
            "You cannot kick someone with a higher or equal role!"
        );
    }
}
