use std::sync::atomic::Ordering;

use poise::serenity_prelude::CreateEmbed;

use crate::bot::data::Context;

/// Send an embed only the invoking user can see.
///
/// Discord fixes a reply's visibility when the interaction is deferred, so a
/// public deferral is deleted first and the embed goes out as an ephemeral
/// followup.
pub async fn send_private(ctx: Context<'_>, embed: CreateEmbed) -> Result<(), serenity::Error> {
    if let poise::Context::Application(app) = ctx {
        if app.has_sent_initial_response.load(Ordering::SeqCst) {
            app.interaction.delete_response(ctx.http()).await?;
        }
    }

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
