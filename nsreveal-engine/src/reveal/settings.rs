//! Shared mapping and mode
//!
//!     The configuration layer may replace the mapping or the mode at any time. Both live in one
//!     immutable [`Snapshot`] held behind an [`ArcSwap`]. Readers load the current snapshot once
//!     per pass or callback and pass it down by reference, so a rewrite in progress always sees a
//!     single consistent (mapping, mode) pair. Updates build a new snapshot and swap it in; the
//!     old one stays alive for whoever still holds it.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::reveal::error::RevealError;
use crate::reveal::ids::{IdDigest, Sha256Digest};
use crate::reveal::mapping::Mapping;

/// Rewrite policy for resolved tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Replace the token with its display name.
    #[default]
    Translate,
    /// Keep the token and append the display name.
    Annotate,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Translate => "translate",
            Mode::Annotate => "annotate",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = RevealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "translate" => Ok(Mode::Translate),
            "annotate" => Ok(Mode::Annotate),
            other => Err(RevealError::UnknownMode(other.to_string())),
        }
    }
}

/// One consistent view of the mapping and mode.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub mapping: Arc<Mapping>,
    pub mode: Mode,
}

impl Snapshot {
    pub fn new(mapping: Mapping, mode: Mode) -> Self {
        Self {
            mapping: Arc::new(mapping),
            mode,
        }
    }
}

/// Partial update from the configuration layer. Absent fields leave the current value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsUpdate {
    pub namespaces: Option<Vec<String>>,
    pub mode: Option<Mode>,
}

impl SettingsUpdate {
    pub fn from_json(source: &str) -> Result<Self, RevealError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_none() && self.mode.is_none()
    }
}

/// Process-wide holder of the current [`Snapshot`].
pub struct Settings {
    current: ArcSwap<Snapshot>,
    digest: Box<dyn IdDigest>,
}

impl Settings {
    /// Start from a list of names and a mode, deriving tokens with SHA-256.
    pub fn new<I, S>(names: I, mode: Mode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_digest(names, mode, Sha256Digest)
    }

    pub fn with_digest<I, S, D>(names: I, mode: Mode, digest: D) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        D: IdDigest + 'static,
    {
        let mapping = Mapping::from_names(names, &digest);
        Self {
            current: ArcSwap::from_pointee(Snapshot::new(mapping, mode)),
            digest: Box::new(digest),
        }
    }

    /// Start from a prebuilt snapshot. Later name updates derive with SHA-256.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
            digest: Box::new(Sha256Digest),
        }
    }

    /// The snapshot in effect right now.
    pub fn load(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Apply a partial update, replacing the snapshot wholesale.
    pub fn apply(&self, update: SettingsUpdate) {
        if update.is_empty() {
            return;
        }
        let previous = self.load();
        let mapping = match update.namespaces {
            Some(names) => Arc::new(Mapping::from_names(&names, self.digest.as_ref())),
            None => Arc::clone(&previous.mapping),
        };
        let mode = update.mode.unwrap_or(previous.mode);
        debug!(entries = mapping.len(), %mode, "settings replaced");
        self.current.store(Arc::new(Snapshot { mapping, mode }));
    }

    pub fn set_mode(&self, mode: Mode) {
        self.apply(SettingsUpdate {
            mode: Some(mode),
            ..Default::default()
        });
    }

    pub fn set_namespaces<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apply(SettingsUpdate {
            namespaces: Some(names.into_iter().map(Into::into).collect()),
            ..Default::default()
        });
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("current", &self.load())
            .finish_non_exhaustive()
    }
}
