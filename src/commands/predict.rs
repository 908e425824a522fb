use std::sync::Arc;

use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::services::submit_service::{self, SubmitEvent};
use crate::surface::{DiscordSurface, HostBindings};
use crate::{AppSettings, PredictionApi};

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    tracing::info!("🔮 Predict command called with args: {:?}", args);

    if args.len() < 2 {
        let help_embed = serenity::builder::CreateEmbed::default()
            .title("🔮 Predict Command")
            .description("Chart the predicted price series for a ticker on a given date")
            .field("Usage", "`$predict <ticker> <date>`", false)
            .field("Examples", "`$predict AAPL 2024-05-20`\n`$predict msft 2024-05-21`", false)
            .field(
                "Notes",
                "• Tickers are case-insensitive\n\
                 • A new chart replaces the previous one in this channel",
                false,
            )
            .color(0x00ff00);

        msg.channel_id
            .send_message(ctx, serenity::builder::CreateMessage::default().embed(help_embed))
            .await
            .map_err(|e| e.to_string())?;
        return Ok(());
    }

    let (transport, chart_size) = {
        let data = ctx.data.read().await;
        let transport = data
            .get::<PredictionApi>()
            .ok_or("Prediction client not initialized".to_string())?
            .clone();
        let settings = data
            .get::<AppSettings>()
            .ok_or("Settings not initialized".to_string())?;
        (transport, (settings.chart_width, settings.chart_height))
    };

    if let Err(e) = msg.channel_id.broadcast_typing(ctx.http.as_ref()).await {
        tracing::warn!("Failed to broadcast typing: {}", e);
    }

    let surface = Arc::new(DiscordSurface::new(ctx.clone(), msg.channel_id, chart_size));
    let bindings = HostBindings {
        transport,
        chart: surface.clone(),
        errors: surface,
    };

    let mut event = SubmitEvent::new(args[0], args[1]);
    let run = submit_service::handle_submit(&mut event, bindings);

    let ticker = args[0].to_string();
    tokio::spawn(async move {
        match run.await {
            Ok(state) => tracing::debug!("Prediction for {} finished: {:?}", ticker, state),
            Err(e) => tracing::error!("Prediction task for {} aborted: {}", ticker, e),
        }
    });

    Ok(())
}
