//! Per-package install status, resolved once and cached for the process lifetime.
//!
//! Every identifier maps to a single-assignment cell (a `watch` channel that is
//! written exactly once). The first request creates the cell and spawns the
//! probe; later requests share the same cell whether it is still pending or
//! already settled.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::probe::{PackageProbe, ProbeError};

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallStatus {
    /// Query not issued yet, or still running
    #[default]
    Unknown,
    Installed,
    NotInstalled,
}

impl InstallStatus {
    pub fn is_settled(&self) -> bool {
        !matches!(self, InstallStatus::Unknown)
    }

    pub fn label(&self) -> &'static str {
        match self {
            InstallStatus::Unknown => "checking",
            InstallStatus::Installed => "installed",
            InstallStatus::NotInstalled => "not installed",
        }
    }
}

/// Published once per identifier when its status settles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub identifier: String,
    pub status: InstallStatus,
}

struct ResolverInner {
    probe: Arc<dyn PackageProbe>,
    timeout: Duration,
    cache: Mutex<HashMap<String, watch::Receiver<InstallStatus>>>,
    queries: AtomicUsize,
    notifier: Option<mpsc::UnboundedSender<StatusUpdate>>,
}

/// Cheap to clone; all clones share one cache.
#[derive(Clone)]
pub struct StatusResolver {
    inner: Arc<ResolverInner>,
}

impl StatusResolver {
    pub fn new(probe: Arc<dyn PackageProbe>) -> Self {
        Self::build(probe, DEFAULT_QUERY_TIMEOUT, None)
    }

    pub fn with_timeout(probe: Arc<dyn PackageProbe>, timeout: Duration) -> Self {
        Self::build(probe, timeout, None)
    }

    /// Like [`StatusResolver::with_timeout`], also sending a [`StatusUpdate`]
    /// on `notifier` whenever a status settles.
    pub fn with_notifier(
        probe: Arc<dyn PackageProbe>,
        timeout: Duration,
        notifier: mpsc::UnboundedSender<StatusUpdate>,
    ) -> Self {
        Self::build(probe, timeout, Some(notifier))
    }

    fn build(
        probe: Arc<dyn PackageProbe>,
        timeout: Duration,
        notifier: Option<mpsc::UnboundedSender<StatusUpdate>>,
    ) -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                probe,
                timeout,
                cache: Mutex::new(HashMap::new()),
                queries: AtomicUsize::new(0),
                notifier,
            }),
        }
    }

    /// Current status of `identifier`, issuing its query on first request.
    ///
    /// Never blocks: returns `Unknown` while the query is in flight. Must be
    /// called from within a tokio runtime.
    pub fn resolve_status(&self, identifier: &str) -> InstallStatus {
        *self.cell(identifier).borrow()
    }

    /// Wait until `identifier` has settled, issuing its query if needed.
    pub async fn settled(&self, identifier: &str) -> InstallStatus {
        let mut rx = self.cell(identifier);
        let settled = rx.wait_for(InstallStatus::is_settled).await.map(|s| *s);
        // Err only if the resolution task went away without settling (runtime shutdown)
        settled.unwrap_or_else(|_| *rx.borrow())
    }

    /// Cached status without issuing a query; `None` if never requested.
    pub fn peek(&self, identifier: &str) -> Option<InstallStatus> {
        self.lock_cache().get(identifier).map(|rx| *rx.borrow())
    }

    /// Number of external queries issued so far
    pub fn query_count(&self) -> usize {
        self.inner.queries.load(Ordering::SeqCst)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, watch::Receiver<InstallStatus>>> {
        self.inner.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Existing cell for `identifier`, or a new one with its query spawned.
    /// Lookup and insertion happen under one lock, so the first caller wins.
    fn cell(&self, identifier: &str) -> watch::Receiver<InstallStatus> {
        let mut cache = self.lock_cache();
        if let Some(rx) = cache.get(identifier) {
            return rx.clone();
        }

        let (tx, rx) = watch::channel(InstallStatus::Unknown);
        cache.insert(identifier.to_string(), rx.clone());
        self.inner.queries.fetch_add(1, Ordering::SeqCst);
        drop(cache);

        let inner = Arc::clone(&self.inner);
        let identifier = identifier.to_string();
        tokio::spawn(async move {
            let status = run_query(&inner, &identifier).await;
            tx.send_replace(status);

            if let Some(ref notifier) = inner.notifier {
                let _ = notifier.send(StatusUpdate { identifier, status });
            }
        });

        rx
    }
}

/// Issue the query and map its outcome; failures fail open to `NotInstalled`.
async fn run_query(inner: &ResolverInner, identifier: &str) -> InstallStatus {
    debug!("Resolving status: {}", inner.probe.describe(identifier));

    let outcome = match tokio::time::timeout(inner.timeout, inner.probe.is_installed(identifier)).await {
        Ok(result) => result,
        Err(_) => Err(ProbeError::Timeout(inner.timeout)),
    };

    match outcome {
        Ok(true) => {
            info!("{} is installed", identifier);
            InstallStatus::Installed
        }
        Ok(false) => InstallStatus::NotInstalled,
        Err(ProbeError::Exit { code }) => {
            debug!("Status query for {} exited with {}", identifier, code);
            InstallStatus::NotInstalled
        }
        Err(e) => {
            warn!("Status query for {} failed: {}", identifier, e);
            InstallStatus::NotInstalled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::{BoxFuture, FutureExt, join_all};
    use std::collections::HashMap as Map;

    enum Answer {
        Installed,
        Missing,
        Fail,
        Hang,
        After(Duration, bool),
    }

    struct ScriptedProbe {
        answers: Map<&'static str, Answer>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedProbe {
        fn new(answers: Vec<(&'static str, Answer)>) -> Self {
            Self {
                answers: answers.into_iter().collect(),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl PackageProbe for ScriptedProbe {
        fn is_installed(&self, identifier: &str) -> BoxFuture<'static, Result<bool, ProbeError>> {
            self.calls.lock().unwrap().push(identifier.to_string());
            let (delay, result) = match self.answers.get(identifier) {
                Some(Answer::Installed) => (Duration::ZERO, Ok(true)),
                Some(Answer::Missing) | None => (Duration::ZERO, Ok(false)),
                Some(Answer::Fail) => (Duration::ZERO, Err(ProbeError::Exit { code: 2 })),
                Some(Answer::Hang) => (Duration::from_secs(3600), Ok(true)),
                Some(Answer::After(d, v)) => (*d, Ok(*v)),
            };
            async move {
                tokio::time::sleep(delay).await;
                result
            }
            .boxed()
        }

        fn describe(&self, identifier: &str) -> String {
            format!("scripted {identifier}")
        }
    }

    fn resolver(probe: ScriptedProbe) -> StatusResolver {
        StatusResolver::with_timeout(Arc::new(probe), Duration::from_millis(100))
    }

    #[tokio::test]
    async fn status_starts_unknown_and_settles() {
        let r = resolver(ScriptedProbe::new(vec![(
            "firefox",
            Answer::After(Duration::from_millis(20), true),
        )]));

        assert_eq!(r.peek("firefox"), None);
        assert_eq!(r.resolve_status("firefox"), InstallStatus::Unknown);
        assert_eq!(r.settled("firefox").await, InstallStatus::Installed);
        assert_eq!(r.resolve_status("firefox"), InstallStatus::Installed);
    }

    #[tokio::test]
    async fn concurrent_requests_issue_one_query() {
        let probe = ScriptedProbe::new(vec![(
            "firefox",
            Answer::After(Duration::from_millis(20), true),
        )]);
        let calls = Arc::clone(&probe.calls);
        let r = resolver(probe);

        let results = join_all((0..8).map(|_| r.settled("firefox"))).await;

        assert!(results.iter().all(|s| *s == InstallStatus::Installed));
        assert_eq!(r.query_count(), 1);
        assert_eq!(calls.lock().unwrap().as_slice(), ["firefox"]);
    }

    #[tokio::test]
    async fn requests_after_settling_reuse_the_result() {
        let probe = ScriptedProbe::new(vec![("vlc", Answer::Installed)]);
        let calls = Arc::clone(&probe.calls);
        let r = resolver(probe);

        assert_eq!(r.settled("vlc").await, InstallStatus::Installed);
        for _ in 0..5 {
            assert_eq!(r.resolve_status("vlc"), InstallStatus::Installed);
        }
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_query_fails_open() {
        let r = resolver(ScriptedProbe::new(vec![("gimp", Answer::Fail)]));
        assert_eq!(r.settled("gimp").await, InstallStatus::NotInstalled);
    }

    #[tokio::test]
    async fn timed_out_query_fails_open() {
        let r = resolver(ScriptedProbe::new(vec![("chromium", Answer::Hang)]));
        assert_eq!(r.settled("chromium").await, InstallStatus::NotInstalled);
        assert_eq!(r.query_count(), 1);
    }

    #[tokio::test]
    async fn slow_package_does_not_block_others() {
        let r = StatusResolver::with_timeout(
            Arc::new(ScriptedProbe::new(vec![
                ("slow", Answer::Hang),
                ("fast", Answer::Installed),
            ])),
            Duration::from_secs(30),
        );

        assert_eq!(r.resolve_status("slow"), InstallStatus::Unknown);
        assert_eq!(r.settled("fast").await, InstallStatus::Installed);
        assert_eq!(r.peek("slow"), Some(InstallStatus::Unknown));
    }

    #[tokio::test]
    async fn settled_status_is_published_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let r = StatusResolver::with_notifier(
            Arc::new(ScriptedProbe::new(vec![("git", Answer::Installed)])),
            Duration::from_millis(100),
            tx,
        );

        r.resolve_status("git");
        r.resolve_status("git");

        let update = rx.recv().await.unwrap();
        assert_eq!(
            update,
            StatusUpdate {
                identifier: "git".to_string(),
                status: InstallStatus::Installed,
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn clones_share_the_cache() {
        let r = resolver(ScriptedProbe::new(vec![("code", Answer::Missing)]));
        let other = r.clone();

        assert_eq!(r.settled("code").await, InstallStatus::NotInstalled);
        assert_eq!(other.peek("code"), Some(InstallStatus::NotInstalled));
        assert_eq!(other.query_count(), 1);
    }
}
