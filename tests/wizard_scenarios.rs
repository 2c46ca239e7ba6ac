use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use desktop_starter::packages::{
    Catalog, InstallStatus, Package, PackageCategory, PackageProbe, ProbeError, StatusResolver,
};
use desktop_starter::starter::{Wizard, STEP_COUNT};
use desktop_starter::system::{DesktopAutostart, FileStore, Preferences};
use futures::future::{BoxFuture, FutureExt};

/// Probe that answers per identifier after a delay; unknown identifiers hang
struct HostProbe {
    answers: HashMap<&'static str, bool>,
    calls: AtomicUsize,
}

impl PackageProbe for HostProbe {
    fn is_installed(&self, identifier: &str) -> BoxFuture<'static, Result<bool, ProbeError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = self.answers.get(identifier).copied();
        async move {
            match answer {
                Some(installed) => {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Ok(installed)
                }
                None => futures::future::pending().await,
            }
        }
        .boxed()
    }

    fn describe(&self, identifier: &str) -> String {
        format!("host-probe {identifier}")
    }
}

fn browsers() -> Catalog {
    let package = |id: &str, name: &str| Package {
        identifier: id.to_string(),
        display_name: name.to_string(),
        description: String::new(),
    };
    Catalog::new(vec![PackageCategory {
        name: "Browsers".to_string(),
        description: "Web browsers".to_string(),
        packages: vec![package("firefox", "Firefox"), package("chromium", "Chromium")],
    }])
    .unwrap()
}

#[tokio::test]
async fn browsers_resolve_once_and_timeouts_fail_open() {
    let probe = Arc::new(HostProbe {
        answers: HashMap::from([("firefox", true)]),
        calls: AtomicUsize::new(0),
    });
    let resolver = StatusResolver::with_timeout(probe.clone(), Duration::from_millis(100));
    let catalog = browsers();

    assert_eq!(catalog.status_of(&resolver, "firefox"), InstallStatus::Unknown);
    assert_eq!(catalog.status_of(&resolver, "chromium"), InstallStatus::Unknown);

    // Repeated renders while queries are in flight
    for _ in 0..10 {
        catalog.status_of(&resolver, "firefox");
        catalog.status_of(&resolver, "chromium");
    }

    assert_eq!(resolver.settled("firefox").await, InstallStatus::Installed);
    assert_eq!(resolver.settled("chromium").await, InstallStatus::NotInstalled);

    assert_eq!(catalog.status_of(&resolver, "firefox"), InstallStatus::Installed);
    assert_eq!(catalog.status_of(&resolver, "chromium"), InstallStatus::NotInstalled);
    assert_eq!(catalog.status_summary(&resolver), (1, 1, 0));

    assert_eq!(resolver.query_count(), 2);
    assert_eq!(probe.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn walking_past_the_last_step_then_reset() {
    let mut wizard = Wizard::default();
    assert_eq!(STEP_COUNT, 3);

    assert!(!wizard.prev());
    for _ in 0..STEP_COUNT {
        assert!(wizard.next());
    }
    assert!(wizard.is_finished());
    assert_eq!(wizard.active_step(), STEP_COUNT);

    assert!(!wizard.next());
    assert_eq!(wizard.active_step(), STEP_COUNT);

    wizard.reset();
    assert_eq!(wizard.active_step(), 0);
    assert!(wizard.is_first());
}

#[tokio::test]
async fn launch_preference_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("data").join("preferences.toml");
    let resource = dir.path().join("desktop-starter.desktop");
    std::fs::write(
        &resource,
        "[Desktop Entry]\nType=Application\nName=Desktop Starter\nExec=desktop-starter\n",
    )
    .unwrap();
    let autostart_dir = dir.path().join("autostart");
    let autostart = DesktopAutostart::new(&resource, &autostart_dir, "desktop-starter.desktop");

    // First run: absent value is initialized to false
    let mut prefs = Preferences::load(Arc::new(FileStore::new(&store_path))).await;
    assert!(!prefs.launch_at_startup());
    assert!(store_path.exists());

    let outcome = prefs.set_launch_at_startup(true, &autostart).await;
    assert!(outcome.is_ok());
    assert!(autostart_dir.join("desktop-starter.desktop").exists());

    // Second run reads the stored value
    let prefs = Preferences::load(Arc::new(FileStore::new(&store_path))).await;
    assert!(prefs.launch_at_startup());
    assert!(!prefs.check_divergence(&autostart));

    let mut prefs = prefs;
    let outcome = prefs.set_launch_at_startup(false, &autostart).await;
    assert!(outcome.is_ok());
    assert!(!autostart_dir.join("desktop-starter.desktop").exists());

    let prefs = Preferences::load(Arc::new(FileStore::new(&store_path))).await;
    assert!(!prefs.launch_at_startup());
}
