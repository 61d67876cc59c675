//! Token → display name table
//!
//! A [`Mapping`] is never edited in place. Whenever the list of names changes a new table is
//! derived from scratch and swapped in through [`Settings`](crate::reveal::settings::Settings).

use std::collections::HashMap;

use tracing::debug;

use crate::reveal::ids::{derive_with, IdDigest};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: HashMap<String, String>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a table from display names.
    ///
    /// Names are trimmed and blank ones dropped. When two names derive to the same token the
    /// later one wins.
    pub fn from_names<I, S>(names: I, digest: &dyn IdDigest) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = HashMap::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            let token = derive_with(name, digest);
            if let Some(previous) = entries.insert(token.clone(), name.to_string()) {
                if previous != name {
                    debug!(%token, %previous, current = name, "token collision");
                }
            }
        }
        Self { entries }
    }

    /// Build a table from explicit pairs, bypassing derivation.
    pub fn from_pairs<I, T, N>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, N)>,
        T: Into<String>,
        N: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(token, name)| (token.into(), name.into()))
                .collect(),
        }
    }

    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by display name, then token.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(token, name)| (token.as_str(), name.as_str()))
            .collect();
        entries.sort_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(b.0)));
        entries
    }
}
