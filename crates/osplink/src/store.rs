//! Persistent storage for the startup script.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use osplink_frame::Checksum;
use tracing::{debug, warn};

/// Name the startup script is known by in operator messages.
pub const SCRIPT_NAME: &str = "boot.cmd";

/// Largest stored script in bytes, trailing checksum byte included.
pub const MAX_SCRIPT_SIZE: usize = 2047;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("script store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("script too long ({len} bytes, max {max})")]
    TooLong { len: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Single-slot storage for the startup script.
pub trait ScriptStore {
    /// The stored script; `None` when there is none or it is unusable.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the stored script; an empty script clears the store.
    fn save(&mut self, script: &str) -> Result<()>;
}

fn check_size(script: &str) -> Result<()> {
    let len = script.len() + 1;
    if len > MAX_SCRIPT_SIZE {
        return Err(StoreError::TooLong {
            len,
            max: MAX_SCRIPT_SIZE,
        });
    }
    Ok(())
}

/// Script store that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryScriptStore {
    script: Option<String>,
}

impl MemoryScriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(script: impl Into<String>) -> Self {
        let script = script.into();
        Self {
            script: (!script.is_empty()).then_some(script),
        }
    }
}

impl ScriptStore for MemoryScriptStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.script.clone())
    }

    fn save(&mut self, script: &str) -> Result<()> {
        check_size(script)?;
        self.script = (!script.is_empty()).then(|| script.to_string());
        Ok(())
    }
}

/// Script store backed by one file.
///
/// The file holds the script followed by one additive checksum byte, so
/// a truncated or edited file is detected and treated as empty.
#[derive(Debug, Clone)]
pub struct FileScriptStore {
    path: PathBuf,
}

impl FileScriptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScriptStore for FileScriptStore {
    fn load(&self) -> Result<Option<String>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let Some((&stored, script)) = bytes.split_last() else {
            return Ok(None);
        };
        let expected = Checksum::Additive.compute(script);
        if stored != expected {
            warn!(
                path = ?self.path,
                stored,
                expected,
                "script store corrupt (checksum mismatch)"
            );
            return Ok(None);
        }
        if script.is_empty() {
            return Ok(None);
        }
        debug!(path = ?self.path, size = script.len(), "script loaded");
        Ok(Some(String::from_utf8_lossy(script).into_owned()))
    }

    fn save(&mut self, script: &str) -> Result<()> {
        check_size(script)?;
        let mut bytes = Vec::with_capacity(script.len() + 1);
        bytes.extend_from_slice(script.as_bytes());
        bytes.push(Checksum::Additive.compute(script.as_bytes()));
        std::fs::write(&self.path, bytes)?;
        debug!(path = ?self.path, size = script.len(), "script saved");
        Ok(())
    }
}
