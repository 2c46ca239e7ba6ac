use std::collections::HashSet;
use std::process::Stdio;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Placeholder replaced by the package identifier in a probe command line
pub const PACKAGE_PLACEHOLDER: &str = "{package}";

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to spawn probe: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("probe exited with code {code}")]
    Exit { code: i32 },

    #[error("probe terminated by signal")]
    Signal,

    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid probe command: {0}")]
    InvalidCommand(String),
}

/// Answers "is this package installed on the host?" for one identifier.
///
/// `Ok(true)` means installed, `Ok(false)` means the probe positively reported
/// absence. Any `Err` is a failed query; the resolver decides what that means.
pub trait PackageProbe: Send + Sync {
    fn is_installed(&self, identifier: &str) -> BoxFuture<'static, Result<bool, ProbeError>>;

    /// Human readable description of the query, for logs
    fn describe(&self, identifier: &str) -> String;
}

/// Runs an external command per identifier; exit code 0 means installed.
#[derive(Debug, Clone)]
pub struct CommandProbe {
    program: String,
    args: Vec<String>,
}

impl CommandProbe {
    /// Parse a shell-style command line such as `pacman -Qq {package}`.
    /// Without a placeholder the identifier is appended as the last argument.
    pub fn new(command_line: &str) -> Result<Self, ProbeError> {
        let mut words = shell_words::split(command_line)
            .map_err(|e| ProbeError::InvalidCommand(e.to_string()))?;

        if words.is_empty() {
            return Err(ProbeError::InvalidCommand("empty command".to_string()));
        }

        let program = words.remove(0);
        if !words.iter().any(|w| w.contains(PACKAGE_PLACEHOLDER)) {
            words.push(PACKAGE_PLACEHOLDER.to_string());
        }

        Ok(Self { program, args: words })
    }

    fn args_for(&self, identifier: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.replace(PACKAGE_PLACEHOLDER, identifier))
            .collect()
    }
}

impl PackageProbe for CommandProbe {
    fn is_installed(&self, identifier: &str) -> BoxFuture<'static, Result<bool, ProbeError>> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args_for(identifier))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            // A timed out probe is dropped; take the child down with it
            .kill_on_drop(true);

        async move {
            let status = cmd.status().await?;
            if status.success() {
                Ok(true)
            } else {
                match status.code() {
                    Some(code) => Err(ProbeError::Exit { code }),
                    None => Err(ProbeError::Signal),
                }
            }
        }
        .boxed()
    }

    fn describe(&self, identifier: &str) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args_for(identifier));
        parts.join(" ")
    }
}

/// Simulated probe for dry runs: answers from a fixed set after a short delay
pub struct DryrunProbe {
    installed: HashSet<String>,
    delay: Duration,
}

impl DryrunProbe {
    pub fn new<I, S>(installed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            installed: installed.into_iter().map(Into::into).collect(),
            delay: Duration::from_millis(400),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl PackageProbe for DryrunProbe {
    fn is_installed(&self, identifier: &str) -> BoxFuture<'static, Result<bool, ProbeError>> {
        let installed = self.installed.contains(identifier);
        let delay = self.delay;
        let identifier = identifier.to_string();

        async move {
            tokio::time::sleep(delay).await;
            debug!("dryrun probe: {} installed={}", identifier, installed);
            Ok(installed)
        }
        .boxed()
    }

    fn describe(&self, identifier: &str) -> String {
        format!("dryrun {identifier}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_substitutes_placeholder() {
        let probe = CommandProbe::new("pacman -Qq {package}").unwrap();
        assert_eq!(probe.describe("firefox"), "pacman -Qq firefox");
    }

    #[test]
    fn command_line_appends_identifier_without_placeholder() {
        let probe = CommandProbe::new("rpm -q").unwrap();
        assert_eq!(probe.describe("vlc"), "rpm -q vlc");
    }

    #[test]
    fn quoted_arguments_are_kept_together() {
        let probe = CommandProbe::new("sh -c 'pacman -Q \"$1\"' probe {package}").unwrap();
        assert_eq!(
            probe.args_for("gimp"),
            vec!["-c", "pacman -Q \"$1\"", "probe", "gimp"]
        );
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(matches!(
            CommandProbe::new("   "),
            Err(ProbeError::InvalidCommand(_))
        ));
        assert!(matches!(
            CommandProbe::new("pacman 'unterminated"),
            Err(ProbeError::InvalidCommand(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_means_installed() {
        let probe = CommandProbe::new("true").unwrap();
        assert!(probe.is_installed("firefox").await.unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_a_failed_query() {
        let probe = CommandProbe::new("false").unwrap();
        let err = probe.is_installed("firefox").await.unwrap_err();
        assert!(matches!(err, ProbeError::Exit { code: 1 }));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let probe = CommandProbe::new("definitely-not-a-real-probe-binary").unwrap();
        let err = probe.is_installed("firefox").await.unwrap_err();
        assert!(matches!(err, ProbeError::Spawn(_)));
    }

    #[tokio::test]
    async fn dryrun_probe_answers_from_its_set() {
        let probe = DryrunProbe::new(["firefox"]).with_delay(Duration::ZERO);
        assert!(probe.is_installed("firefox").await.unwrap());
        assert!(!probe.is_installed("chromium").await.unwrap());
    }
}
