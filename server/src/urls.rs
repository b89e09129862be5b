use url::Url;

use crate::audiofile::{AudioKind, Id};

/// Convenience wrapper for URL generation functions.
#[derive(Clone)]
pub struct Urls {
    /// Top-level URL, including trailing slash.
    base: Url,

    /// Path for all record actions.
    pub(crate) records_path: String,

    /// Prefix for all record actions.
    records_prefix: String,
}

impl Urls {
    /// Create a new instance. `records_prefix` should *not* include a trailing slash.
    pub fn new(base: impl AsRef<str>, records_prefix: impl Into<String>) -> Self {
        let base =
            Url::parse(base.as_ref()).unwrap_or_else(|_| panic!("parse {} as URL", base.as_ref()));
        let records_path = records_prefix.into();
        let records_prefix = format!("{}/", records_path);

        Urls {
            base,
            records_path,
            records_prefix,
        }
    }

    pub fn records(&self) -> Url {
        self.base
            .join(&self.records_prefix)
            .expect("get records URL")
    }

    /// The collection URL for one record kind.
    pub fn collection(&self, kind: AudioKind) -> Url {
        self.records()
            .join(&format!("{}/", kind))
            .unwrap_or_else(|_| panic!("get URL for {} collection", kind))
    }

    /// The URL of a single record.
    pub fn record(&self, kind: AudioKind, id: Id) -> Url {
        self.collection(kind)
            .join(&format!("{}/", id))
            .unwrap_or_else(|_| panic!("get URL for {} record {}", kind, id))
    }
}
