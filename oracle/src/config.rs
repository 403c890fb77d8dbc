use std::path::PathBuf;

/// Default interpreter used to run the extraction script.
pub const DEFAULT_PROGRAM: &str = "python3";
/// Default extraction script, relative to the working directory.
pub const DEFAULT_SCRIPT: &str = "scripts/face_encoder.py";

/// Builder-style configuration for [`SubprocessOracle`](crate::SubprocessOracle).
///
/// The image path is always appended after `args`.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            args: vec![DEFAULT_SCRIPT.to_string()],
            current_dir: None,
        }
    }
}

impl OracleConfig {
    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}
