pub mod board;
pub mod completions;
pub mod group;

use tix_core::config::EffectiveConfig;
use tix_core::prefs::{FileStore, KeyValueStore, MemoryStore, PreferenceStore};
use tracing::debug;

/// Preference store for this invocation: the configured file, or an
/// in-memory store when no config directory is available.
pub fn open_prefs(config: &EffectiveConfig) -> PreferenceStore<Box<dyn KeyValueStore>> {
    let backing: Box<dyn KeyValueStore> = match &config.prefs_path {
        Some(path) => {
            debug!(path = %path.display(), "using file preference store");
            Box::new(FileStore::new(path))
        }
        None => {
            debug!("no config directory, preferences last for this run only");
            Box::new(MemoryStore::default())
        }
    };
    PreferenceStore::new(backing)
}

/// Short description of where preferences are kept.
pub fn prefs_location(config: &EffectiveConfig) -> String {
    config
        .prefs_path
        .as_ref()
        .map_or_else(|| "memory".to_string(), |path| path.display().to_string())
}
