//! Discord channel host
//!
//! Each channel behaves like one page: a chart region (the last message
//! carrying a chart image) and an error region (an embed that exists only
//! while visible).

use std::collections::HashMap;

use lazy_static::lazy_static;
use serenity::all::{ChannelId, CreateAttachment, CreateEmbed, CreateMessage, EditMessage, MessageId};
use serenity::async_trait;
use serenity::prelude::Context;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{ChartTarget, ErrorRegion, PlotError, CHART_CONTAINER_ID};
use crate::models::{Layout, Trace};
use crate::services::plot_service;

lazy_static! {
    static ref CHANNEL_REGIONS: RegionRegistry = RegionRegistry::default();
}

#[derive(Debug, Default)]
struct ChannelRegions {
    chart_message: Option<MessageId>,
    error_message: Option<MessageId>,
    error_text: String,
}

/// Message ids of every channel's regions.
///
/// Each method locks, updates and returns; the lock is never held while a
/// message is sent, edited or deleted.
#[derive(Debug, Default)]
struct RegionRegistry {
    channels: Mutex<HashMap<ChannelId, ChannelRegions>>,
}

impl RegionRegistry {
    /// Record the newest chart message, returning the one it replaces
    async fn replace_chart(&self, channel_id: ChannelId, message_id: MessageId) -> Option<MessageId> {
        let mut channels = self.channels.lock().await;
        channels
            .entry(channel_id)
            .or_default()
            .chart_message
            .replace(message_id)
    }

    /// Store the error text, returning the shown embed that needs editing
    async fn set_error_text(&self, channel_id: ChannelId, text: &str) -> Option<MessageId> {
        let mut channels = self.channels.lock().await;
        let region = channels.entry(channel_id).or_default();
        region.error_text = text.to_string();
        region.error_message
    }

    /// The text to show, or `None` if an embed is already shown
    async fn hidden_error_text(&self, channel_id: ChannelId) -> Option<String> {
        let mut channels = self.channels.lock().await;
        let region = channels.entry(channel_id).or_default();
        match region.error_message {
            Some(_) => None,
            None => Some(region.error_text.clone()),
        }
    }

    /// Record a freshly sent error embed.
    ///
    /// Returns the embed it displaced, if any, and the current text, which
    /// may have changed while the embed was being sent.
    async fn store_error_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> (Option<MessageId>, String) {
        let mut channels = self.channels.lock().await;
        let region = channels.entry(channel_id).or_default();
        let displaced = region.error_message.replace(message_id);
        (displaced, region.error_text.clone())
    }

    /// Forget the shown error embed, returning it for deletion
    async fn take_error_message(&self, channel_id: ChannelId) -> Option<MessageId> {
        let mut channels = self.channels.lock().await;
        channels.entry(channel_id).or_default().error_message.take()
    }
}

fn error_embed(text: &str) -> CreateEmbed {
    CreateEmbed::default()
        .title("Prediction Error")
        .description(format!("❌ {}", text))
        .color(0xff0000)
}

/// Chart and error regions of one Discord channel
pub struct DiscordSurface {
    ctx: Context,
    channel_id: ChannelId,
    chart_size: (u32, u32),
}

impl DiscordSurface {
    pub fn new(ctx: Context, channel_id: ChannelId, chart_size: (u32, u32)) -> Self {
        Self {
            ctx,
            channel_id,
            chart_size,
        }
    }

    async fn delete(&self, message_id: MessageId, what: &str) {
        if let Err(e) = self.channel_id.delete_message(&self.ctx, message_id).await {
            warn!("Failed to remove {} {} in {}: {}", what, message_id, self.channel_id, e);
        }
    }

    async fn edit_error(&self, message_id: MessageId, text: &str) {
        let edit = EditMessage::new().embed(error_embed(text));
        if let Err(e) = self.channel_id.edit_message(&self.ctx, message_id, edit).await {
            warn!("Failed to update error message in {}: {}", self.channel_id, e);
        }
    }
}

#[async_trait]
impl ChartTarget for DiscordSurface {
    async fn new_plot(&self, target_id: &str, data: &[Trace], layout: &Layout) -> Result<(), PlotError> {
        if target_id != CHART_CONTAINER_ID {
            return Err(PlotError::UnknownTarget(target_id.to_string()));
        }

        let (width, height) = self.chart_size;
        let image = plot_service::render_png(data, layout, width, height)?;
        debug!("Chart image rendered: {} bytes", image.len());

        let attachment = CreateAttachment::bytes(image, "predicted_prices.png");
        let sent = self
            .channel_id
            .send_message(&self.ctx, CreateMessage::default().add_file(attachment))
            .await
            .map_err(|e| PlotError::Publish(e.to_string()))?;

        if let Some(previous) = CHANNEL_REGIONS.replace_chart(self.channel_id, sent.id).await {
            self.delete(previous, "previous chart").await;
        }

        Ok(())
    }
}

#[async_trait]
impl ErrorRegion for DiscordSurface {
    async fn set_text(&self, text: &str) {
        if let Some(message_id) = CHANNEL_REGIONS.set_error_text(self.channel_id, text).await {
            self.edit_error(message_id, text).await;
        }
    }

    async fn set_visible(&self, visible: bool) {
        if !visible {
            if let Some(message_id) = CHANNEL_REGIONS.take_error_message(self.channel_id).await {
                self.delete(message_id, "error message").await;
            }
            return;
        }

        let Some(text) = CHANNEL_REGIONS.hidden_error_text(self.channel_id).await else {
            return;
        };

        let message = CreateMessage::default().embed(error_embed(&text));
        let sent = match self.channel_id.send_message(&self.ctx, message).await {
            Ok(sent) => sent,
            Err(e) => {
                warn!("Failed to show error message in {}: {}", self.channel_id, e);
                return;
            }
        };

        let (displaced, current) = CHANNEL_REGIONS.store_error_message(self.channel_id, sent.id).await;
        if let Some(displaced) = displaced {
            self.delete(displaced, "error message").await;
        }
        if current != text {
            self.edit_error(sent.id, &current).await;
        }
    }
}
