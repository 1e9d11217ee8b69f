//! JSON-lines surface: one `{"text"}` object per line in, one `{"text"}` or
//! `{"error"}` object per line out.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::debug;
use tutor_core::{InboundMessage, OutboundMessage};
use tutor_runtime::{DisplaySurface, SurfaceFactory};

pub struct StdioSurface<W> {
    out: Arc<Mutex<W>>,
}

#[async_trait]
impl<W> DisplaySurface for StdioSurface<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn post(&self, message: OutboundMessage) -> tutor_runtime::Result<()> {
        let line = encode_line(&message)?;
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }

    async fn reveal(&self) -> tutor_runtime::Result<()> {
        debug!("Reveal requested on stdio surface");
        Ok(())
    }
}

/// Surfaces created by this factory share one writer.
pub struct StdioFactory<W> {
    out: Arc<Mutex<W>>,
}

impl<W> StdioFactory<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
        }
    }
}

impl<W> SurfaceFactory for StdioFactory<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    fn create(&self) -> tutor_runtime::Result<Arc<dyn DisplaySurface>> {
        Ok(Arc::new(StdioSurface {
            out: self.out.clone(),
        }))
    }
}

/// Serialized message plus trailing newline.
pub fn encode_line(message: &OutboundMessage) -> std::io::Result<String> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

/// `Ok(None)` for blank lines.
pub fn decode_line(line: &str) -> serde_json::Result<Option<InboundMessage>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_line() {
        assert_eq!(
            decode_line(r#"{"text": "why does it crash?"}"#).unwrap(),
            Some(InboundMessage::new("why does it crash?"))
        );
        assert_eq!(decode_line("   ").unwrap(), None);
        assert!(decode_line("why does it crash?").is_err());
    }

    #[tokio::test]
    async fn test_posts_one_json_object_per_line() {
        let factory = StdioFactory::new(Vec::<u8>::new());
        let surface = factory.create().unwrap();

        surface.post(OutboundMessage::reply("What is 1/0?")).await.unwrap();
        surface.post(OutboundMessage::error("timed out")).await.unwrap();

        let written = factory.out.lock().await.clone();
        assert_eq!(
            String::from_utf8(written).unwrap(),
            "{\"text\":\"What is 1/0?\"}\n{\"error\":\"timed out\"}\n"
        );
    }
}
