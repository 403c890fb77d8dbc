use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::codec::{Envelope, decode_envelope};
use crate::config::OracleConfig;
use crate::error::OracleError;
use crate::oracle::Oracle;

/// SubprocessOracle runs one short-lived process per image.
///
/// stdout and stderr are buffered in full and the call resolves once the
/// process exits. Dropping the returned future (for example on a timeout)
/// kills the child.
#[derive(Debug, Clone, Default)]
pub struct SubprocessOracle {
    config: OracleConfig,
}

impl SubprocessOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OracleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl Oracle for SubprocessOracle {
    async fn encode(&self, path: &Path) -> Result<Vec<f32>, OracleError> {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.config.current_dir {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|source| OracleError::Spawn {
            program: self.config.program.clone(),
            source,
        })?;
        let output = child.wait_with_output().await?;
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            return Err(OracleError::Exit {
                status: output.status,
                stderr,
            });
        }
        if !stderr.is_empty() {
            debug!("oracle stderr for {}: {}", path.display(), stderr);
        }

        let env: Envelope =
            serde_json::from_slice(&output.stdout).map_err(|e| OracleError::InvalidResponse {
                reason: e.to_string(),
                stderr,
            })?;
        decode_envelope(&env)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    /// Oracle backed by an inline shell script; the image path is `$1`.
    fn sh(script: &str) -> SubprocessOracle {
        SubprocessOracle::with_config(
            OracleConfig::default()
                .with_program("sh")
                .with_args(["-c", script, "sh"]),
        )
    }

    #[tokio::test]
    async fn encode_success_receives_path() {
        let oracle = sh(r#"case "$1" in
            */face.jpg) printf '{"success":true,"encoding":"AACAPw==","shape":[1]}' ;;
            *) exit 3 ;;
        esac"#);

        let v = oracle.encode(Path::new("/photos/face.jpg")).await.unwrap();
        assert_eq!(v, vec![1.0]);
    }

    #[tokio::test]
    async fn encode_nonzero_exit_captures_stderr() {
        let oracle = sh("echo boom >&2; exit 2");
        let err = oracle.encode(Path::new("a.jpg")).await.unwrap_err();
        match err {
            OracleError::Exit { status, stderr } => {
                assert_eq!(status.code(), Some(2));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn encode_unparsable_stdout() {
        let oracle = sh("echo hello; echo warn >&2");
        let err = oracle.encode(Path::new("a.jpg")).await.unwrap_err();
        let msg = err.to_string();
        match err {
            OracleError::InvalidResponse { stderr, .. } => {
                assert_eq!(stderr, "warn");
                assert!(msg.ends_with("stderr: warn"), "{msg}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn encode_reported_failure() {
        let oracle = sh(r#"echo '{"success": false, "error": "No face found"}'"#);
        let err = oracle.encode(Path::new("a.jpg")).await.unwrap_err();
        assert!(matches!(err, OracleError::Rejected(ref m) if m == "No face found"));
    }

    #[tokio::test]
    async fn encode_malformed_payload() {
        let oracle = sh(r#"echo '{"success": true, "encoding": "AQIDBAUG"}'"#);
        let err = oracle.encode(Path::new("a.jpg")).await.unwrap_err();
        assert!(matches!(err, OracleError::MalformedPayload { len: 6 }));
    }

    #[tokio::test]
    async fn encode_missing_program() {
        let oracle = SubprocessOracle::with_config(
            OracleConfig::default()
                .with_program("/nonexistent/facevault-oracle")
                .with_args(Vec::<String>::new()),
        );
        let err = oracle.encode(Path::new("a.jpg")).await.unwrap_err();
        assert!(matches!(err, OracleError::Spawn { .. }));
    }
}
