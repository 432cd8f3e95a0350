//! Remote replica port: one JSON document per user identity.

use crate::domain::error::AlphaTrackError;

pub type RemoteDocument = serde_json::Map<String, serde_json::Value>;

pub trait RemoteReplicaPort {
    /// The document stored for `uid`, or `None` if there is none yet.
    fn fetch(&self, uid: &str) -> Result<Option<RemoteDocument>, AlphaTrackError>;

    /// Top-level merge: every key in `fields` replaces the remote value,
    /// remote keys absent from `fields` are kept. Creates the document if
    /// it does not exist.
    fn merge(&self, uid: &str, fields: RemoteDocument) -> Result<(), AlphaTrackError>;
}
