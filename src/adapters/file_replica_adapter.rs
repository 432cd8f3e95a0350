//! Remote replica kept as one JSON file per user in a directory, typically a
//! folder shared between machines by a file-sync service.

use crate::domain::error::AlphaTrackError;
use crate::ports::config_port::ConfigPort;
use crate::ports::remote_port::{RemoteDocument, RemoteReplicaPort};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

pub struct FileReplicaAdapter {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileReplicaAdapter {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, AlphaTrackError> {
        let dir = config
            .get_non_empty("sync", "dir")
            .ok_or_else(|| AlphaTrackError::ConfigMissing {
                section: "sync".into(),
                key: "dir".into(),
            })?;
        Ok(Self::new(PathBuf::from(dir)))
    }

    fn document_path(&self, uid: &str) -> Result<PathBuf, AlphaTrackError> {
        let valid = !uid.is_empty()
            && uid
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'))
            && !uid.starts_with('.');
        if !valid {
            return Err(AlphaTrackError::validation(
                "uid",
                format!("{uid:?} cannot be used as a document name"),
            ));
        }
        Ok(self.dir.join(format!("{uid}.json")))
    }

    fn read(&self, path: &Path) -> Result<Option<RemoteDocument>, AlphaTrackError> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AlphaTrackError::RemoteUnavailable {
                    reason: format!("failed to read {}: {}", path.display(), e),
                })
            }
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| AlphaTrackError::RemoteUnavailable {
                reason: format!("invalid document {}: {}", path.display(), e),
            })
    }
}

impl RemoteReplicaPort for FileReplicaAdapter {
    fn fetch(&self, uid: &str) -> Result<Option<RemoteDocument>, AlphaTrackError> {
        let path = self.document_path(uid)?;
        self.read(&path)
    }

    fn merge(&self, uid: &str, fields: RemoteDocument) -> Result<(), AlphaTrackError> {
        let path = self.document_path(uid)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        fs::create_dir_all(&self.dir).map_err(|e| AlphaTrackError::RemoteUnavailable {
            reason: format!("failed to create {}: {}", self.dir.display(), e),
        })?;

        let mut doc = self.read(&path)?.unwrap_or_default();
        doc.extend(fields);

        let content = serde_json::to_string_pretty(&doc).map_err(|e| {
            AlphaTrackError::RemoteUnavailable {
                reason: format!("failed to encode document: {e}"),
            }
        })?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .and_then(|()| fs::rename(&tmp, &path))
            .map_err(|e| AlphaTrackError::RemoteUnavailable {
                reason: format!("failed to write {}: {}", path.display(), e),
            })
    }
}
