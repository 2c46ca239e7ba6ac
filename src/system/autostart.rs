use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use ini::Ini;
use tracing::{debug, info};

use crate::error::{Result, StarterError};

pub const DEFAULT_DESKTOP_FILE: &str = "desktop-starter.desktop";
pub const DEFAULT_RESOURCE: &str = "/usr/share/desktop-starter/desktop-starter.desktop";

/// Registers or unregisters the wizard to run at login
pub trait AutostartService: Send + Sync {
    fn enable(&self) -> BoxFuture<'_, Result<()>>;
    fn disable(&self) -> BoxFuture<'_, Result<()>>;
    /// Whether the system currently has the autostart entry
    fn is_enabled(&self) -> bool;
}

/// Copies a desktop entry into the XDG autostart directory, or removes it
#[derive(Debug, Clone)]
pub struct DesktopAutostart {
    resource: PathBuf,
    target: PathBuf,
}

impl DesktopAutostart {
    pub fn new<P: Into<PathBuf>, Q: AsRef<Path>>(resource: P, autostart_dir: Q, file_name: &str) -> Self {
        Self {
            resource: resource.into(),
            target: autostart_dir.as_ref().join(file_name),
        }
    }

    /// `$XDG_CONFIG_HOME/autostart`
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("autostart"))
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    async fn install(&self) -> Result<()> {
        let content = tokio::fs::read_to_string(&self.resource).await.map_err(|e| {
            StarterError::Autostart(format!("cannot read {}: {}", self.resource.display(), e))
        })?;
        validate_desktop_entry(&content)?;

        if let Some(dir) = self.target.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                StarterError::Autostart(format!("cannot create {}: {}", dir.display(), e))
            })?;
        }

        tokio::fs::write(&self.target, content).await.map_err(|e| {
            StarterError::Autostart(format!("cannot write {}: {}", self.target.display(), e))
        })?;

        info!("Installed autostart entry {:?}", self.target);
        Ok(())
    }

    async fn uninstall(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.target).await {
            Ok(()) => {
                info!("Removed autostart entry {:?}", self.target);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Autostart entry {:?} already absent", self.target);
                Ok(())
            }
            Err(e) => Err(StarterError::Autostart(format!(
                "cannot remove {}: {}",
                self.target.display(),
                e
            ))),
        }
    }
}

impl AutostartService for DesktopAutostart {
    fn enable(&self) -> BoxFuture<'_, Result<()>> {
        self.install().boxed()
    }

    fn disable(&self) -> BoxFuture<'_, Result<()>> {
        self.uninstall().boxed()
    }

    fn is_enabled(&self) -> bool {
        self.target.exists()
    }
}

/// The descriptor must be a launchable desktop entry
fn validate_desktop_entry(content: &str) -> Result<()> {
    let ini = Ini::load_from_str(content)
        .map_err(|e| StarterError::Autostart(format!("invalid desktop entry: {e}")))?;
    let section = ini
        .section(Some("Desktop Entry"))
        .ok_or_else(|| StarterError::Autostart("missing [Desktop Entry] section".to_string()))?;

    match section.get("Exec") {
        Some(exec) if !exec.trim().is_empty() => Ok(()),
        _ => Err(StarterError::Autostart("desktop entry has no Exec key".to_string())),
    }
}

/// Dry-run autostart that only records the requested state
#[derive(Debug, Default)]
pub struct DryrunAutostart {
    enabled: AtomicBool,
}

impl DryrunAutostart {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AutostartService for DryrunAutostart {
    fn enable(&self) -> BoxFuture<'_, Result<()>> {
        async move {
            info!("dryrun: would install autostart entry");
            self.enabled.store(true, Ordering::SeqCst);
            Ok(())
        }
        .boxed()
    }

    fn disable(&self) -> BoxFuture<'_, Result<()>> {
        async move {
            info!("dryrun: would remove autostart entry");
            self.enabled.store(false, Ordering::SeqCst);
            Ok(())
        }
        .boxed()
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

/// Create the appropriate autostart service based on dryrun mode
pub fn create_autostart(
    resource: &Path,
    directory: Option<&Path>,
    file_name: &str,
    dryrun: bool,
) -> Result<Arc<dyn AutostartService>> {
    if dryrun {
        return Ok(Arc::new(DryrunAutostart::new()));
    }

    let dir = match directory {
        Some(d) => d.to_path_buf(),
        None => DesktopAutostart::default_dir()
            .ok_or_else(|| StarterError::Autostart("no config directory for this user".to_string()))?,
    };
    Ok(Arc::new(DesktopAutostart::new(resource, dir, file_name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY: &str = "[Desktop Entry]\nType=Application\nName=Desktop Starter\nExec=desktop-starter\n";

    fn setup(content: Option<&str>) -> (tempfile::TempDir, DesktopAutostart) {
        let dir = tempfile::tempdir().unwrap();
        let resource = dir.path().join("resources").join(DEFAULT_DESKTOP_FILE);
        if let Some(content) = content {
            std::fs::create_dir_all(resource.parent().unwrap()).unwrap();
            std::fs::write(&resource, content).unwrap();
        }
        let autostart = DesktopAutostart::new(resource, dir.path().join("autostart"), DEFAULT_DESKTOP_FILE);
        (dir, autostart)
    }

    #[tokio::test]
    async fn enable_copies_descriptor_and_disable_removes_it() {
        let (_dir, autostart) = setup(Some(ENTRY));

        autostart.enable().await.unwrap();
        assert!(autostart.is_enabled());
        assert_eq!(std::fs::read_to_string(autostart.target()).unwrap(), ENTRY);

        autostart.disable().await.unwrap();
        assert!(!autostart.is_enabled());
    }

    #[tokio::test]
    async fn disable_without_entry_succeeds() {
        let (_dir, autostart) = setup(Some(ENTRY));
        autostart.disable().await.unwrap();
        assert!(!autostart.is_enabled());
    }

    #[tokio::test]
    async fn missing_resource_is_reported() {
        let (_dir, autostart) = setup(None);
        let err = autostart.enable().await.unwrap_err();
        assert!(matches!(err, StarterError::Autostart(_)));
        assert!(!autostart.is_enabled());
    }

    #[tokio::test]
    async fn descriptor_without_exec_is_rejected() {
        let (_dir, autostart) = setup(Some("[Desktop Entry]\nName=Broken\n"));
        assert!(autostart.enable().await.is_err());
        assert!(!autostart.is_enabled());
    }

    #[test]
    fn bundled_descriptor_is_valid() {
        let content = include_str!("../../resources/desktop-starter.desktop");
        validate_desktop_entry(content).unwrap();
    }

    #[tokio::test]
    async fn dryrun_tracks_requested_state() {
        let autostart = DryrunAutostart::new();
        autostart.enable().await.unwrap();
        assert!(autostart.is_enabled());
        autostart.disable().await.unwrap();
        assert!(!autostart.is_enabled());
    }
}
