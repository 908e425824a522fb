use std::sync::Arc;

use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use ticker_forecast::api::{PredictionClient, PredictionTransport};
use ticker_forecast::config::Settings;
use ticker_forecast::{commands, AppSettings, PredictionApi};

struct Handler;

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        commands::handle_message(&ctx, &msg).await;
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        debug!("Checking Discord rate limit status...");
        match ctx.http.get_current_user().await {
            Ok(_) => info!("No rate limit detected - Bot is fully ready!"),
            Err(e) => warn!("Failed to check rate limit status: {}", e),
        }
    }
}

fn init_tracing() {
    let mut filter = EnvFilter::from_default_env();
    for directive in ["ticker_forecast=debug", "serenity=warn"] {
        match directive.parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("Ignoring log directive {}: {}", directive, e),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    info!("📈 Starting ticker-forecast v{}...", env!("CARGO_PKG_VERSION"));

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };
    info!("Prediction backend: {}", settings.predict_api_url);

    let client: Arc<dyn PredictionTransport> =
        match PredictionClient::new(settings.predict_api_url.clone(), settings.request_timeout) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                error!("Failed to create prediction client: {}", e);
                return;
            }
        };

    let intents = GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGES;

    let mut discord = match Client::builder(&settings.discord_token, intents)
        .event_handler(Handler)
        .await
    {
        Ok(discord) => discord,
        Err(e) => {
            error!("Failed to create Discord client: {}", e);
            return;
        }
    };

    {
        let mut data = discord.data.write().await;
        data.insert::<PredictionApi>(client);
        data.insert::<AppSettings>(settings);
    }

    if let Err(e) = discord.start().await {
        error!("Client error: {}", e);
    }
}
