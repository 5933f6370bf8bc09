use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, GatewayIntents, GuildId};
use tracing::{error, info, warn};

use crate::bot::data::{Context, Data};
use crate::bot::error::Error;
use crate::bot::reply::send_private;
use crate::commands;
use crate::config::Settings;
use crate::constants::embeds;
use crate::db::Database;
use crate::handlers::event_handler::event_handler;
use crate::services::roles::sweeper::spawn_temp_role_sweeper;

/// Reply privately to the invoking user; failures here are only logged
async fn reply_ephemeral(ctx: Context<'_>, title: &str, message: String) {
    let embed = embeds::error_embed().title(title).description(message);
    if let Err(e) = send_private(ctx, embed).await {
        warn!("Failed to send error reply: {:?}", e);
    }
}

async fn on_error(error: poise::FrameworkError<'_, Arc<Data>, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(
                command = %ctx.command().qualified_name,
                "Command error: {:?}",
                error
            );
            reply_ephemeral(ctx, "Error", error.user_message()).await;
        }
        poise::FrameworkError::ArgumentParse { error, ctx, .. } => {
            reply_ephemeral(ctx, "Invalid argument", error.to_string()).await;
        }
        poise::FrameworkError::MissingBotPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            reply_ephemeral(
                ctx,
                "Missing Permissions",
                format!("I need the `{}` permission to do that.", missing_permissions),
            )
            .await;
        }
        poise::FrameworkError::MissingUserPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            let message = match missing_permissions {
                Some(permissions) => {
                    format!("You need the `{}` permission to use this command.", permissions)
                }
                None => "You do not have permission to use this command.".to_string(),
            };
            reply_ephemeral(ctx, "Missing Permissions", message).await;
        }
        poise::FrameworkError::GuildOnly { ctx, .. } => {
            reply_ephemeral(ctx, "Error", "This command can only be used in a server.".to_string())
                .await;
        }
        poise::FrameworkError::UnknownCommand { .. } => {
            // Prefix commands are disabled; mentions of the bot land here
        }
        err => {
            error!("Framework error: {:?}", err);
        }
    }
}

pub async fn run(settings: Settings, db: Database) -> Result<(), Error> {
    let data = Arc::new(Data::new(db, settings.clone()));

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::moderation::moderation(),
                commands::roles::roles(),
                commands::setup::setup(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: None,
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot connected as {}", ready.user.name);

                let commands = &framework.options().commands;
                match data.settings.guild_id {
                    Some(guild_id) => {
                        let guild_id = GuildId::new(guild_id);
                        poise::builtins::register_in_guild(ctx, commands, guild_id)
                            .await
                            .map_err(|e| {
                                error!("Failed to register guild commands: {:?}", e);
                                Error::Serenity(e)
                            })?;
                        info!(
                            "Registered {} commands in guild {}",
                            commands.len(),
                            guild_id
                        );
                    }
                    None => {
                        poise::builtins::register_globally(ctx, commands)
                            .await
                            .map_err(|e| {
                                error!("Failed to register commands globally: {:?}", e);
                                Error::Serenity(e)
                            })?;
                        info!("Registered {} commands globally", commands.len());
                        info!("Note: Global commands can take up to 1 hour to appear in all servers");
                    }
                }

                spawn_temp_role_sweeper(ctx.clone(), data.clone());

                Ok(data)
            })
        })
        .build();

    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MEMBERS;

    let mut client = serenity::ClientBuilder::new(&settings.discord_token, intents)
        .framework(framework)
        .await
        .map_err(Error::Serenity)?;

    info!("Starting Discord client...");
    client.start().await.map_err(Error::Serenity)
}
