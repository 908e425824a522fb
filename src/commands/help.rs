use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::Context;

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let embed = CreateEmbed::default()
        .title("📖 Ticker Forecast Help")
        .description("Charts the price series predicted by the forecasting backend.")
        .color(0x00b0f4)
        .field(
            "🎯 General",
            "`$help` - Show this help message",
            false,
        )
        .field(
            "📊 Predictions",
            "`$predict <ticker> <date>` - Chart predicted prices (date as YYYY-MM-DD)\n`$forecast <ticker> <date>` - Same as `$predict`",
            false,
        )
        .field(
            "ℹ️ Channel Output",
            "Each channel keeps one chart and one error message.\nA new chart replaces the old one; a successful chart clears the error.",
            false,
        );

    msg.channel_id
        .send_message(ctx, serenity::builder::CreateMessage::default().embed(embed))
        .await
        .map_err(|e| format!("Failed to send help message: {}", e))?;

    Ok(())
}
