use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Maps a raw author name from command output to a canonical display name.
///
/// Resolution happens once per parsed record, before anything reaches an
/// aggregate, so two spellings of the same person collapse into one key.
pub trait AliasResolver: Sync {
    fn resolve(&self, raw: &str) -> String;
}

impl<F> AliasResolver for F
where
    F: Fn(&str) -> String + Sync,
{
    fn resolve(&self, raw: &str) -> String {
        self(raw)
    }
}

/// Map-backed resolver; unknown names pass through unchanged.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Aliases {
    map: HashMap<String, String>,
}

impl Aliases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load aliases from a JSON object of raw name -> display name.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn insert(&mut self, raw: impl Into<String>, canonical: impl Into<String>) {
        self.map.insert(raw.into(), canonical.into());
    }
}

impl AliasResolver for Aliases {
    fn resolve(&self, raw: &str) -> String {
        match self.map.get(raw) {
            Some(canonical) => canonical.clone(),
            None => raw.to_string(),
        }
    }
}
