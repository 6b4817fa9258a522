mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    EventSettings, ExtractionSettings, Settings, SettingsError, StorageProviderSetting,
    StorageSettings, TranscriptionSettings,
};
