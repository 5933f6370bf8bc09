use serenity::all::{CreateEmbed, CreateEmbedFooter, Timestamp};

use crate::constants::embeds::{self, FIELD_VALUE_LIMIT, MAX_EMBED_FIELDS, TEMP_ROLE_COLOR};
use crate::constants::roles::SKIPPED_ROLES_SHOWN;
use crate::constants::timeouts::DEFAULT_REASON;
use crate::db::models::{RoleAction, RoleAssignmentRecord, TempRole};
use crate::services::moderation::UserSummary;
use crate::services::roles::error::RoleError;
use crate::services::roles::manager::{BulkRemoval, RoleChange, RoleRequest};
use crate::services::roles::platform::RoleInfo;
use crate::utils::formatting::{
    discord_timestamp, mention_role, mention_stored_role, mention_stored_user, mention_user,
    neutralize_mentions, truncate,
};

fn reason_value(reason: &str) -> String {
    truncate(&neutralize_mentions(reason), FIELD_VALUE_LIMIT)
}

fn warnings_value(warnings: &[RoleError]) -> String {
    let lines: Vec<String> = warnings.iter().map(ToString::to_string).collect();
    truncate(&embeds::bullet_list(&lines), FIELD_VALUE_LIMIT)
}

/// Reply after `/role add`, `/role temp` or `/role remove`
pub fn change_embed(request: &RoleRequest, change: &RoleChange) -> CreateEmbed {
    let title = match (change.action, change.duration.is_some()) {
        (RoleAction::Add, true) => "Temporary Role Added",
        (RoleAction::Add, false) => "Role Added",
        (RoleAction::Remove, _) => "Role Removed",
    };

    let base = if !change.warnings.is_empty() {
        embeds::warning_embed()
    } else if change.duration.is_some() {
        CreateEmbed::new().color(TEMP_ROLE_COLOR)
    } else {
        embeds::success_embed()
    };

    let mut embed = base
        .title(title)
        .timestamp(Timestamp::now())
        .field("Member", mention_user(request.target.id), true)
        .field("Role", mention_role(change.role.id), true)
        .field("Moderator", mention_user(request.moderator.id), true);

    if let Some(duration) = &change.duration {
        embed = embed.field("Duration", duration, true);
    }
    if let Some(at) = change.expires_at {
        embed = embed.field(
            "Expires",
            format!("{} ({})", discord_timestamp(at, 'F'), discord_timestamp(at, 'R')),
            false,
        );
    }
    embed = embed.field("Reason", reason_value(request.reason()), false);

    if !change.warnings.is_empty() {
        embed = embed.field("⚠️ Warnings", warnings_value(&change.warnings), false);
    }
    embed
}

/// Mentions of the first few skipped roles, then a count of the rest
pub fn skipped_roles_value(skipped: &[RoleInfo]) -> String {
    let shown: Vec<String> = skipped
        .iter()
        .take(SKIPPED_ROLES_SHOWN)
        .map(|role| mention_role(role.id))
        .collect();
    let mut value = shown.join(", ");
    if skipped.len() > SKIPPED_ROLES_SHOWN {
        value.push_str(&format!(" and {} more...", skipped.len() - SKIPPED_ROLES_SHOWN));
    }
    value
}

/// Reply after `/role removeall`
pub fn bulk_removal_embed(
    moderator: &UserSummary,
    target: &UserSummary,
    removal: &BulkRemoval,
    reason: &str,
) -> CreateEmbed {
    let base = if removal.warnings.is_empty() {
        embeds::success_embed()
    } else {
        embeds::warning_embed()
    };

    let mut embed = base
        .title("Roles Removed")
        .timestamp(Timestamp::now())
        .field("Member", mention_user(target.id), true)
        .field("Moderator", mention_user(moderator.id), true)
        .field("Roles Removed", removal.removed.len().to_string(), true)
        .field("Reason", reason_value(reason), false);

    if !removal.skipped.is_empty() {
        embed = embed.field("Could Not Remove", skipped_roles_value(&removal.skipped), false);
    }
    if !removal.warnings.is_empty() {
        embed = embed.field("⚠️ Warnings", warnings_value(&removal.warnings), false);
    }
    embed
}

/// Comma-separated role mentions, temporary ones marked with their expiry
pub fn role_list_value(roles: &[RoleInfo], temp_roles: &[TempRole]) -> String {
    let items: Vec<String> = roles
        .iter()
        .map(|role| {
            match temp_roles
                .iter()
                .find(|row| row.role_id == role.id.get() as i64)
            {
                Some(row) => format!(
                    "{} (expires {})",
                    mention_role(role.id),
                    discord_timestamp(row.expires_at, 'R')
                ),
                None => mention_role(role.id),
            }
        })
        .collect();

    truncate(&items.join(", "), FIELD_VALUE_LIMIT)
}

/// Reply to `/role list`
pub fn role_list_embed(member: &UserSummary, roles: &[RoleInfo], temp_roles: &[TempRole]) -> CreateEmbed {
    let mut embed = embeds::standard_embed()
        .title(format!("Roles for {}", member.tag))
        .timestamp(Timestamp::now());

    embed = if roles.is_empty() {
        embed.description(format!("{} has no roles.", mention_user(member.id)))
    } else {
        embed.field(
            format!("Roles ({})", roles.len()),
            role_list_value(roles, temp_roles),
            false,
        )
    };

    match &member.avatar_url {
        Some(avatar) => embed.thumbnail(avatar),
        None => embed,
    }
}

/// Reply to `/role templist`; rows whose role no longer exists are left out
pub fn temp_roles_embed(member: &UserSummary, rows: &[(TempRole, RoleInfo)]) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .color(TEMP_ROLE_COLOR)
        .title(format!("Temporary Roles for {}", member.tag))
        .timestamp(Timestamp::now());

    if rows.is_empty() {
        embed = embed.description(format!("{} has no temporary roles.", mention_user(member.id)));
    }

    for (idx, (row, role)) in rows.iter().take(MAX_EMBED_FIELDS).enumerate() {
        let reason = row.reason.as_deref().unwrap_or(DEFAULT_REASON);
        embed = embed.field(
            format!("{}. {}", idx + 1, role.name),
            format!(
                "**Expires:** {} ({})\n**Added by:** {}\n**Reason:** {}",
                discord_timestamp(row.expires_at, 'F'),
                discord_timestamp(row.expires_at, 'R'),
                mention_stored_user(row.added_by),
                reason_value(reason)
            ),
            false,
        );
    }

    match &member.avatar_url {
        Some(avatar) => embed.thumbnail(avatar),
        None => embed,
    }
}

/// One entry of `/role history`, as a field name and value
pub fn history_field(record: &RoleAssignmentRecord) -> (String, String) {
    let verb = match record.action {
        RoleAction::Add => "Added",
        RoleAction::Remove => "Removed",
    };
    let temporary = match (&record.duration, record.is_temporary) {
        (Some(duration), true) => format!(" ({})", duration),
        _ => String::new(),
    };

    let name = format!("{} {}{}", record.action.symbol(), verb, temporary);
    let value = format!(
        "**Role:** {}\n**Moderator:** {}\n**Date:** {}\n**Reason:** {}",
        mention_stored_role(record.role_id),
        mention_stored_user(record.moderator_id),
        discord_timestamp(record.created_at, 'F'),
        reason_value(record.reason.as_deref().unwrap_or(DEFAULT_REASON))
    );
    (name, value)
}

/// Reply to `/role history`
pub fn history_embed(member: &UserSummary, records: &[RoleAssignmentRecord]) -> CreateEmbed {
    let mut embed = embeds::standard_embed()
        .title(format!("Role History for {}", member.tag))
        .timestamp(Timestamp::now());

    if records.is_empty() {
        embed = embed.description(format!("No role history found for {}.", mention_user(member.id)));
    } else {
        for record in records.iter().take(MAX_EMBED_FIELDS) {
            let (name, value) = history_field(record);
            embed = embed.field(name, value, false);
        }
        embed = embed.footer(CreateEmbedFooter::new(format!(
            "Showing the {} most recent entries",
            records.len().min(MAX_EMBED_FIELDS)
        )));
    }

    match &member.avatar_url {
        Some(avatar) => embed.thumbnail(avatar),
        None => embed,
    }
}

/// Reply when a role change was refused or failed
pub fn failure_embed(error: &RoleError) -> CreateEmbed {
    embeds::error_embed()
        .title("Role Change Failed")
        .description(error.to_string())
}
