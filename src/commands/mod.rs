pub mod help;
pub mod predict;

use serenity::model::channel::Message;
use serenity::prelude::Context;

pub async fn handle_message(ctx: &Context, msg: &Message) {
    if msg.author.bot {
        return;
    }

    // Parse command and arguments
    let parts: Vec<&str> = msg.content.split_whitespace().collect();
    if parts.is_empty() {
        return;
    }

    let command = parts[0];
    let args = &parts[1..];

    let result = match command {
        "$help" => help::execute(ctx, msg).await,
        "$predict" | "$forecast" => predict::execute(ctx, msg, args).await,
        _ => return,
    };

    if let Err(e) = result {
        tracing::error!("❌ Error executing command {}: {}", command, e);

        let embed = serenity::builder::CreateEmbed::default()
            .title("Command Error")
            .description(command_error_text(&e))
            .color(0xff0000);

        let _ = msg
            .channel_id
            .send_message(ctx, serenity::builder::CreateMessage::default().embed(embed))
            .await;
    }
}

fn command_error_text(e: &str) -> String {
    if e.trim().is_empty() {
        "❌ An error occurred while executing the command.".to_string()
    } else {
        format!("❌ {}", e)
    }
}
