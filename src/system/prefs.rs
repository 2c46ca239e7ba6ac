//! Durable user preferences.
//!
//! Values live in a small key-value store (a TOML table on disk). Toggling the
//! launch-at-startup preference is two independent steps: persist the value,
//! then add or remove the autostart entry. The second step failing does not
//! roll back the first, so the stored preference and the autostart directory
//! can disagree; [`ToggleOutcome`] reports both results.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::autostart::AutostartService;
use crate::error::{Result, StarterError};

pub const LAUNCH_AT_STARTUP_KEY: &str = "launchStart";

const APP_DIR: &str = "desktop-starter";
const STORE_FILE: &str = "preferences.toml";

/// Asynchronous string key-value storage
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> BoxFuture<'_, Result<Option<String>>>;
    fn set_item(&self, key: &str, value: &str) -> BoxFuture<'_, Result<()>>;
}

/// Key-value pairs kept in a TOML file, rewritten atomically on every write
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// `$XDG_DATA_HOME/desktop-starter/preferences.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join(APP_DIR).join(STORE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scalars of any TOML type are read back as strings, so a hand-edited
    /// `launchStart = true` reads the same as `launchStart = "true"`.
    async fn read_table(&self) -> Result<BTreeMap<String, String>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        let table: toml::Table = toml::from_str(&content)?;
        Ok(table
            .into_iter()
            .filter_map(|(key, value)| match value {
                toml::Value::String(s) => Some((key, s)),
                toml::Value::Boolean(b) => Some((key, b.to_string())),
                toml::Value::Integer(i) => Some((key, i.to_string())),
                toml::Value::Float(f) => Some((key, f.to_string())),
                other => {
                    debug!("Skipping non-scalar preference {} ({})", key, other.type_str());
                    None
                }
            })
            .collect())
    }

    async fn write_table(&self, table: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = toml::to_string(table)?;
        let tmp = self.path.with_extension("toml.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> BoxFuture<'_, Result<Option<String>>> {
        let key = key.to_string();
        async move {
            let mut table = self.read_table().await?;
            Ok(table.remove(&key))
        }
        .boxed()
    }

    fn set_item(&self, key: &str, value: &str) -> BoxFuture<'_, Result<()>> {
        let (key, value) = (key.to_string(), value.to_string());
        async move {
            let _guard = self.write_lock.lock().await;
            let mut table = match self.read_table().await {
                Ok(table) => table,
                // Unparseable file: start from an empty table
                Err(StarterError::TomlParse(e)) => {
                    warn!("Preferences in {:?} are unreadable, rewriting: {}", self.path, e);
                    BTreeMap::new()
                }
                Err(e) => return Err(e),
            };
            table.insert(key, value);
            self.write_table(&table).await?;
            debug!("Stored preferences in {:?}", self.path);
            Ok(())
        }
        .boxed()
    }
}

/// In-memory store used for dry runs
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set_item` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> BoxFuture<'_, Result<Option<String>>> {
        let key = key.to_string();
        async move { Ok(self.items.lock().await.get(&key).cloned()) }.boxed()
    }

    fn set_item(&self, key: &str, value: &str) -> BoxFuture<'_, Result<()>> {
        let (key, value) = (key.to_string(), value.to_string());
        async move {
            self.items.lock().await.insert(key, value);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        .boxed()
    }
}

/// Result of toggling launch-at-startup; each step can fail on its own
#[derive(Debug)]
pub struct ToggleOutcome {
    pub enabled: bool,
    pub persisted: Result<()>,
    pub autostart: Result<()>,
}

impl ToggleOutcome {
    pub fn is_ok(&self) -> bool {
        self.persisted.is_ok() && self.autostart.is_ok()
    }

    /// First failure, formatted for the user
    pub fn error_message(&self) -> Option<String> {
        if let Err(ref e) = self.persisted {
            return Some(format!("Could not save preference: {e}"));
        }
        if let Err(ref e) = self.autostart {
            return Some(format!("Could not update autostart entry: {e}"));
        }
        None
    }
}

/// Typed view over the store for the settings the wizard keeps
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
    launch_at_startup: bool,
}

impl Preferences {
    /// Read stored preferences. A missing value is initialized to its default
    /// so later reads are deterministic; a failed read falls back to the default.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let launch_at_startup = match store.get_item(LAUNCH_AT_STARTUP_KEY).await {
            Ok(Some(value)) => parse_bool(&value),
            Ok(None) => {
                info!("No stored {} preference, initializing to false", LAUNCH_AT_STARTUP_KEY);
                if let Err(e) = store.set_item(LAUNCH_AT_STARTUP_KEY, "false").await {
                    warn!("Failed to initialize {}: {}", LAUNCH_AT_STARTUP_KEY, e);
                }
                false
            }
            Err(e) => {
                warn!("Failed to read {}: {}, using default", LAUNCH_AT_STARTUP_KEY, e);
                false
            }
        };

        Self {
            store,
            launch_at_startup,
        }
    }

    pub fn launch_at_startup(&self) -> bool {
        self.launch_at_startup
    }

    /// Persist the new value, then create or remove the autostart entry.
    ///
    /// The in-memory value follows the user's choice even if either step
    /// fails. Nothing is retried or rolled back.
    pub async fn set_launch_at_startup(
        &mut self,
        enabled: bool,
        autostart: &dyn AutostartService,
    ) -> ToggleOutcome {
        self.launch_at_startup = enabled;

        let persisted = self
            .store
            .set_item(LAUNCH_AT_STARTUP_KEY, if enabled { "true" } else { "false" })
            .await;
        if let Err(ref e) = persisted {
            warn!("Failed to persist {}={}: {}", LAUNCH_AT_STARTUP_KEY, enabled, e);
        }

        let autostart = if enabled {
            autostart.enable().await
        } else {
            autostart.disable().await
        };
        if let Err(ref e) = autostart {
            warn!(
                "Autostart update failed, stored preference ({}) may not match the system: {}",
                enabled, e
            );
        }

        ToggleOutcome {
            enabled,
            persisted,
            autostart,
        }
    }

    /// Log when the stored preference and the autostart entry disagree.
    /// The mismatch is reported only, never repaired.
    pub fn check_divergence(&self, autostart: &dyn AutostartService) -> bool {
        let installed = autostart.is_enabled();
        if installed != self.launch_at_startup {
            warn!(
                "Stored {}={} but autostart entry present={}",
                LAUNCH_AT_STARTUP_KEY, self.launch_at_startup, installed
            );
            return true;
        }
        false
    }
}

fn parse_bool(value: &str) -> bool {
    match value.trim() {
        "true" => true,
        "false" => false,
        other => {
            warn!("Unrecognized {} value {:?}, using false", LAUNCH_AT_STARTUP_KEY, other);
            false
        }
    }
}

/// Store at `path`, or the default per-user location. Dry runs keep everything in memory.
pub fn create_store(path: Option<&Path>, dryrun: bool) -> Result<Arc<dyn KeyValueStore>> {
    if dryrun {
        return Ok(Arc::new(MemoryStore::new()));
    }

    let path = match path {
        Some(p) => p.to_path_buf(),
        None => FileStore::default_path()
            .ok_or_else(|| StarterError::Storage("no data directory for this user".to_string()))?,
    };
    Ok(Arc::new(FileStore::new(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::autostart::DryrunAutostart;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get_item(&self, _key: &str) -> BoxFuture<'_, Result<Option<String>>> {
            async { Err(StarterError::Storage("disk on fire".to_string())) }.boxed()
        }

        fn set_item(&self, _key: &str, _value: &str) -> BoxFuture<'_, Result<()>> {
            async { Err(StarterError::Storage("disk on fire".to_string())) }.boxed()
        }
    }

    struct BrokenAutostart;

    impl AutostartService for BrokenAutostart {
        fn enable(&self) -> BoxFuture<'_, Result<()>> {
            async { Err(StarterError::Autostart("permission denied".to_string())) }.boxed()
        }

        fn disable(&self) -> BoxFuture<'_, Result<()>> {
            async { Err(StarterError::Autostart("permission denied".to_string())) }.boxed()
        }

        fn is_enabled(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn first_run_defaults_to_false_and_writes_it() {
        let store = Arc::new(MemoryStore::new());
        let prefs = Preferences::load(store.clone()).await;

        assert!(!prefs.launch_at_startup());
        assert_eq!(store.write_count(), 1);
        assert_eq!(
            store.get_item(LAUNCH_AT_STARTUP_KEY).await.unwrap().as_deref(),
            Some("false")
        );

        // Second start finds the value and does not write again
        Preferences::load(store.clone()).await;
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn preference_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.toml");
        let autostart = DryrunAutostart::new();

        let mut prefs = Preferences::load(Arc::new(FileStore::new(&path))).await;
        let outcome = prefs.set_launch_at_startup(true, &autostart).await;
        assert!(outcome.is_ok());

        let reloaded = Preferences::load(Arc::new(FileStore::new(&path))).await;
        assert!(reloaded.launch_at_startup());
    }

    #[tokio::test]
    async fn file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("preferences.toml"));

        store.set_item("theme", "dark").await.unwrap();
        store.set_item(LAUNCH_AT_STARTUP_KEY, "true").await.unwrap();

        assert_eq!(store.get_item("theme").await.unwrap().as_deref(), Some("dark"));
        assert_eq!(store.get_item("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        let prefs = Preferences::load(Arc::new(FileStore::new(&path))).await;
        assert!(!prefs.launch_at_startup());
    }

    #[tokio::test]
    async fn corrupt_file_is_rewritten_on_toggle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        let mut prefs = Preferences::load(Arc::new(FileStore::new(&path))).await;
        let outcome = prefs.set_launch_at_startup(true, &DryrunAutostart::new()).await;
        assert!(outcome.persisted.is_ok());

        let prefs = Preferences::load(Arc::new(FileStore::new(&path))).await;
        assert!(prefs.launch_at_startup());
    }

    #[tokio::test]
    async fn hand_written_boolean_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "launchStart = true\nretries = 3\n").unwrap();

        let store = Arc::new(FileStore::new(&path));
        let mut prefs = Preferences::load(store.clone()).await;
        assert!(prefs.launch_at_startup());
        assert_eq!(store.get_item("retries").await.unwrap().as_deref(), Some("3"));

        let outcome = prefs.set_launch_at_startup(false, &DryrunAutostart::new()).await;
        assert!(outcome.is_ok());

        let prefs = Preferences::load(Arc::new(FileStore::new(&path))).await;
        assert!(!prefs.launch_at_startup());
    }

    #[tokio::test]
    async fn read_failure_falls_back_to_default() {
        let prefs = Preferences::load(Arc::new(BrokenStore)).await;
        assert!(!prefs.launch_at_startup());
    }

    #[tokio::test]
    async fn unrecognized_value_reads_as_false() {
        let store = Arc::new(MemoryStore::new());
        store.set_item(LAUNCH_AT_STARTUP_KEY, "yes please").await.unwrap();
        assert!(!Preferences::load(store).await.launch_at_startup());
    }

    #[tokio::test]
    async fn autostart_failure_keeps_persisted_value() {
        let store = Arc::new(MemoryStore::new());
        let mut prefs = Preferences::load(store.clone()).await;

        let outcome = prefs.set_launch_at_startup(true, &BrokenAutostart).await;

        assert!(outcome.persisted.is_ok());
        assert!(outcome.autostart.is_err());
        assert!(outcome.error_message().unwrap().contains("autostart"));
        // Preference says on while no autostart entry exists
        assert!(prefs.launch_at_startup());
        assert!(Preferences::load(store).await.launch_at_startup());
        assert!(prefs.check_divergence(&BrokenAutostart));
    }

    #[tokio::test]
    async fn persist_failure_still_runs_autostart() {
        let autostart = DryrunAutostart::new();
        let mut prefs = Preferences::load(Arc::new(BrokenStore)).await;

        let outcome = prefs.set_launch_at_startup(true, &autostart).await;

        assert!(outcome.persisted.is_err());
        assert!(outcome.autostart.is_ok());
        assert!(autostart.is_enabled());
        assert!(outcome.error_message().unwrap().contains("save"));
    }

    #[tokio::test]
    async fn matching_state_is_not_divergent() {
        let autostart = DryrunAutostart::new();
        let mut prefs = Preferences::load(Arc::new(MemoryStore::new())).await;
        assert!(!prefs.check_divergence(&autostart));

        prefs.set_launch_at_startup(true, &autostart).await;
        assert!(!prefs.check_divergence(&autostart));
    }

    #[test]
    fn dryrun_store_is_in_memory() {
        assert!(create_store(None, true).is_ok());
    }
}
