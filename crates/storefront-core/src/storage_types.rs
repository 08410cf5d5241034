use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Object store backend types
///
/// Defined in core because configuration selects the backend before the
/// storage crate builds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectStoreBackend {
    /// Third-party hosted upload endpoint (multipart POST, JSON reply)
    Hosted,
    S3,
    Local,
}

impl FromStr for ObjectStoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hosted" | "cloudinary" => Ok(ObjectStoreBackend::Hosted),
            "s3" => Ok(ObjectStoreBackend::S3),
            "local" => Ok(ObjectStoreBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid object store backend: {}", s)),
        }
    }
}

impl Display for ObjectStoreBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ObjectStoreBackend::Hosted => write!(f, "hosted"),
            ObjectStoreBackend::S3 => write!(f, "s3"),
            ObjectStoreBackend::Local => write!(f, "local"),
        }
    }
}
