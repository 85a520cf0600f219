//! System clipboard access via `arboard`.

use anyhow::Context;
use imagecap_engine::traits::Clipboard;

#[derive(Debug, Default)]
pub struct SystemClipboard;

#[async_trait::async_trait]
impl Clipboard for SystemClipboard {
    async fn write_text(&self, text: &str) -> anyhow::Result<()> {
        let text = text.to_string();

        // arboard talks to the display server synchronously.
        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let mut clipboard = arboard::Clipboard::new().context("open system clipboard")?;
            clipboard.set_text(text).context("set clipboard text")?;
            Ok(())
        })
        .await
        .context("clipboard task failed")?
    }
}
