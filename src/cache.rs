use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::{AuthError, TokenRecord};

/// The single on-disk token record.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the file does not exist. A file that exists but does
    /// not parse is an [`AuthError::Cache`].
    pub fn load(&self) -> Result<Option<TokenRecord>, AuthError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        serde_json::from_str(&data)
            .map(Some)
            .map_err(|err| self.cache_error(err))
    }

    /// Replaces the file with `record`, pretty-printed.
    ///
    /// The JSON goes to a sibling temp file first and is renamed over the
    /// target, so readers see either the old record or the new one.
    pub fn save(&self, record: &TokenRecord) -> Result<(), AuthError> {
        let data = serde_json::to_string_pretty(record).map_err(|err| self.cache_error(err))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                std::fs::create_dir_all(parent)?;
                parent.to_path_buf()
            }
            _ => PathBuf::from("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(data.as_bytes())?;
        tmp.as_file().sync_all()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(0o600))?;
        }

        tmp.persist(&self.path).map_err(|err| AuthError::Io(err.error))?;
        info!(path = %self.path.display(), "tokens saved");
        Ok(())
    }

    fn cache_error(&self, err: serde_json::Error) -> AuthError {
        AuthError::Cache {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}
