use std::env;
use std::str::FromStr;

use super::Environment;

const DEFAULT_MAX_PART_BYTES: u64 = 24 * 1024 * 1024;
const DEFAULT_MAX_REQUEST_BYTES: u64 = 25 * 1024 * 1024;

/// Worker configuration, grouped by concern and loaded from environment
/// variables with defaults. Quality profile, byte ceilings, and bitrate
/// are configuration values, never code forks.
#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: Environment,
    pub events: EventSettings,
    pub storage: StorageSettings,
    pub extraction: ExtractionSettings,
    pub transcription: TranscriptionSettings,
}

#[derive(Debug, Clone)]
pub struct EventSettings {
    pub redis_url: String,
    pub request_stream: String,
    pub result_stream: String,
    pub group: String,
    pub block_timeout_ms: u64,
    pub claim_min_idle_ms: u64,
    pub batch_size: usize,
}

impl EventSettings {
    /// Consumer names only need to be unique within the group while the
    /// process lives; the pid suffix gives that.
    pub fn consumer_name(&self) -> String {
        format!("{}-{}", self.group, std::process::id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageProviderSetting {
    Local,
    S3,
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub provider: StorageProviderSetting,
    pub local_path: String,
    pub s3_endpoint: Option<String>,
    pub s3_region: String,
    pub s3_bucket: Option<String>,
    pub s3_access_key: Option<String>,
    pub s3_secret_key: Option<String>,
    pub s3_allow_http: bool,
}

#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    pub format_selector: String,
    pub container: String,
    pub max_part_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct TranscriptionSettings {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub max_request_bytes: u64,
    pub bitrate_kbps: u32,
    pub sample_rate: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let environment = Environment::try_from(
            env::var("APP_ENV").unwrap_or_else(|_| "local".to_string()),
        )
        .map_err(|reason| SettingsError::Invalid {
            var: "APP_ENV".to_string(),
            reason,
        })?;

        Ok(Self {
            environment,
            events: EventSettings {
                redis_url: env_or("REDIS_URL", "redis://127.0.0.1:6379"),
                request_stream: env_or("EVENT_REQUEST_STREAM", "media_requested"),
                result_stream: env_or("EVENT_RESULT_STREAM", "transcription_created"),
                group: env_or("EVENT_CONSUMER_GROUP", "transcriber"),
                block_timeout_ms: env_parse("EVENT_BLOCK_TIMEOUT_MS", 5_000)?,
                claim_min_idle_ms: env_parse("EVENT_CLAIM_MIN_IDLE_MS", 60_000)?,
                batch_size: env_parse("EVENT_BATCH_SIZE", 10)?,
            },
            storage: StorageSettings {
                provider: match env_or("STORAGE_PROVIDER", "local").to_lowercase().as_str() {
                    "local" => StorageProviderSetting::Local,
                    "s3" => StorageProviderSetting::S3,
                    other => {
                        return Err(SettingsError::Invalid {
                            var: "STORAGE_PROVIDER".to_string(),
                            reason: format!("unknown provider '{other}'"),
                        })
                    }
                },
                local_path: env_or("STORAGE_LOCAL_PATH", "./blobs"),
                s3_endpoint: env::var("STORAGE_S3_ENDPOINT").ok(),
                s3_region: env_or("STORAGE_S3_REGION", "us-east-1"),
                s3_bucket: env::var("STORAGE_S3_BUCKET").ok(),
                s3_access_key: env::var("STORAGE_S3_ACCESS_KEY").ok(),
                s3_secret_key: env::var("STORAGE_S3_SECRET_KEY").ok(),
                s3_allow_http: env_parse("STORAGE_S3_ALLOW_HTTP", false)?,
            },
            extraction: ExtractionSettings {
                format_selector: env_or("EXTRACTION_FORMAT", "worstaudio/worst"),
                container: env_or("EXTRACTION_CONTAINER", "mp4"),
                max_part_bytes: env_parse("EXTRACTION_MAX_PART_BYTES", DEFAULT_MAX_PART_BYTES)?,
            },
            transcription: TranscriptionSettings {
                api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
                base_url: env::var("TRANSCRIPTION_BASE_URL").ok(),
                model: env_or("TRANSCRIPTION_MODEL", "whisper-1"),
                max_request_bytes: env_parse(
                    "TRANSCRIPTION_MAX_REQUEST_BYTES",
                    DEFAULT_MAX_REQUEST_BYTES,
                )?,
                bitrate_kbps: env_parse("TRANSCRIPTION_BITRATE_KBPS", 32)?,
                sample_rate: env_parse("TRANSCRIPTION_SAMPLE_RATE", 16_000)?,
            },
        })
    }
}

fn env_or(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(var: &str, default: T) -> Result<T, SettingsError> {
    match env::var(var) {
        Ok(raw) => raw.parse().map_err(|_| SettingsError::Invalid {
            var: var.to_string(),
            reason: format!("unparseable value '{raw}'"),
        }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}
