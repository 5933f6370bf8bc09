use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serenity::all::Context;
use tokio::time::interval;
use tracing::{error, info};

use crate::bot::data::Data;
use crate::constants::roles::TEMP_ROLE_SWEEP_SECONDS;
use crate::services::moderation::DiscordPlatform;
use crate::services::roles::manager::{RoleManager, SweepReport};

/// Start the background task that removes expired temporary roles
pub fn spawn_temp_role_sweeper(ctx: Context, data: Arc<Data>) {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(TEMP_ROLE_SWEEP_SECONDS));

        loop {
            ticker.tick().await;

            let platform = DiscordPlatform::new(&ctx);
            let manager = RoleManager::new(&platform, &data.db);

            match manager.expire_due(Utc::now()).await {
                Ok(report) if report == SweepReport::default() => {}
                Ok(report) => info!(
                    removed = report.removed,
                    discarded = report.discarded,
                    retained = report.retained,
                    "Temporary role sweep finished"
                ),
                Err(e) => error!("Error checking expired temporary roles: {:?}", e),
            }
        }
    });
}
