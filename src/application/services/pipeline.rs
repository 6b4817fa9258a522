use std::sync::Arc;

use async_trait::async_trait;
use tracing::Instrument;

use crate::application::ports::{EventHandler, EventStore, EventStoreError};
use crate::domain::{Event, MediaRequest};

use super::download_stage::{DownloadError, DownloadStage};
use super::transcribe_stage::{TranscribeError, TranscribeStage};

/// Composes the download and transcribe stages into one logical unit of
/// work per inbound event. Any stage error aborts the whole unit: no
/// partial result event is ever published, even though transcripts already
/// persisted by a failed run are deliberately left in place (redelivery
/// overwrites them).
pub struct TranscriptionPipeline {
    download: DownloadStage,
    transcribe: TranscribeStage,
    event_store: Arc<dyn EventStore>,
    result_event_name: String,
}

impl TranscriptionPipeline {
    pub fn new(
        download: DownloadStage,
        transcribe: TranscribeStage,
        event_store: Arc<dyn EventStore>,
        result_event_name: String,
    ) -> Self {
        Self {
            download,
            transcribe,
            event_store,
            result_event_name,
        }
    }

    /// Run both stages for one request and build the outbound event,
    /// leaving it to the caller whether to publish.
    pub async fn run(&self, request: &MediaRequest) -> Result<Event, PipelineError> {
        let parts = self
            .download
            .run(request)
            .await
            .map_err(PipelineError::Download)?;
        tracing::info!(request_id = %request.id, parts = parts.len(), "Download stage completed");

        let records = self
            .transcribe
            .run(&parts)
            .await
            .map_err(PipelineError::Transcribe)?;
        tracing::info!(
            request_id = %request.id,
            transcripts = records.len(),
            "Transcribe stage completed"
        );

        let data = serde_json::json!({
            "request_id": request.id,
            "transcriptions": records,
        });
        Ok(Event::new(&self.result_event_name, data))
    }
}

#[async_trait]
impl EventHandler for TranscriptionPipeline {
    async fn handle(&self, event: Event) -> anyhow::Result<()> {
        let request = MediaRequest::from_event(&event).map_err(PipelineError::MalformedEvent)?;

        let span = tracing::info_span!("pipeline_run", request_id = %request.id);
        async {
            let outbound = self.run(&request).await?;
            let id = self
                .event_store
                .append(&outbound)
                .await
                .map_err(PipelineError::Publish)?;
            tracing::info!(event_id = %id, "Published transcription result");
            Ok::<_, PipelineError>(())
        }
        .instrument(span)
        .await?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("malformed media request payload: {0}")]
    MalformedEvent(serde_json::Error),
    #[error("download stage: {0}")]
    Download(DownloadError),
    #[error("transcribe stage: {0}")]
    Transcribe(TranscribeError),
    #[error("result publish: {0}")]
    Publish(EventStoreError),
}
