use tracing::debug;

use crate::surface::ErrorRegion;

/// Write `message` into the error region and make it visible.
///
/// Repeating the call just overwrites the text.
pub async fn display_error(region: &dyn ErrorRegion, message: &str) {
    debug!("Displaying error: {}", message);
    region.set_text(message).await;
    region.set_visible(true).await;
}

/// Hide the error region; its last text is kept
pub async fn hide_error(region: &dyn ErrorRegion) {
    region.set_visible(false).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::page::ErrorRegionState;
    use crate::surface::Page;

    #[tokio::test]
    async fn test_display_error_shows_message() {
        let page = Page::new();
        display_error(&*page, "ticker not found").await;

        assert_eq!(
            page.error_region().await,
            ErrorRegionState {
                text: "ticker not found".to_string(),
                visible: true,
            }
        );
    }

    #[tokio::test]
    async fn test_display_error_overwrites_previous_message() {
        let page = Page::new();
        display_error(&*page, "first").await;
        display_error(&*page, "second").await;

        let region = page.error_region().await;
        assert_eq!(region.text, "second");
        assert!(region.visible);
    }

    #[tokio::test]
    async fn test_hide_error() {
        let page = Page::new();
        display_error(&*page, "model unavailable").await;
        hide_error(&*page).await;

        let region = page.error_region().await;
        assert!(!region.visible);
        assert_eq!(region.text, "model unavailable");
    }
}
