use std::sync::Arc;

use tokio::sync::watch;

use runavik::application::ports::{AudioProfile, EventStore, QualityProfile, Transcoder};
use runavik::application::services::{DownloadStage, TranscribeStage, TranscriptionPipeline};
use runavik::config::Settings;
use runavik::infrastructure::events::RedisEventStore;
use runavik::infrastructure::media::{FfmpegTranscoder, YtDlpExtractor};
use runavik::infrastructure::observability::{init_tracing, TracingConfig};
use runavik::infrastructure::storage::BlobStoreFactory;
use runavik::infrastructure::transcription::OpenAiWhisperEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;
    init_tracing(TracingConfig::default());

    let blob_store = BlobStoreFactory::create(&settings.storage)?;
    let extractor = Arc::new(YtDlpExtractor::new());
    let transcoder: Arc<dyn Transcoder> = Arc::new(FfmpegTranscoder::new());
    let engine = Arc::new(OpenAiWhisperEngine::new(
        settings.transcription.api_key.clone(),
        settings.transcription.base_url.clone(),
        Some(settings.transcription.model.clone()),
    ));

    let event_store = Arc::new(
        RedisEventStore::connect(
            &settings.events.redis_url,
            settings.events.block_timeout_ms,
            settings.events.claim_min_idle_ms,
            settings.events.batch_size,
        )
        .await?,
    );
    event_store
        .ensure_group(&settings.events.request_stream, &settings.events.group)
        .await?;

    let quality = QualityProfile {
        format_selector: settings.extraction.format_selector.clone(),
        container: settings.extraction.container.clone(),
    };
    let audio_profile = AudioProfile {
        bitrate_kbps: settings.transcription.bitrate_kbps,
        sample_rate: settings.transcription.sample_rate,
        ..AudioProfile::default()
    };

    let download = DownloadStage::new(
        extractor,
        Arc::clone(&transcoder),
        Arc::clone(&blob_store),
        quality,
        settings.extraction.max_part_bytes,
    );
    let transcribe = TranscribeStage::new(
        Arc::clone(&blob_store),
        transcoder,
        engine,
        audio_profile,
        settings.transcription.max_request_bytes,
    );
    let pipeline = Arc::new(TranscriptionPipeline::new(
        download,
        transcribe,
        Arc::clone(&event_store) as Arc<dyn EventStore>,
        settings.events.result_stream.clone(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    let consumer = settings.events.consumer_name();
    tracing::info!(
        stream = %settings.events.request_stream,
        group = %settings.events.group,
        consumer = %consumer,
        environment = %settings.environment,
        "Worker consuming"
    );

    event_store
        .consume(
            &settings.events.request_stream,
            &settings.events.group,
            &consumer,
            pipeline,
            shutdown_rx,
        )
        .await?;

    Ok(())
}
