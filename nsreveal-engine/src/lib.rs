//! # nsreveal
//!
//! Finds derived namespace tokens in the text of a live document tree and rewrites them into
//! their human readable names.
//!
//! Layout
//!
//!     src/reveal
//!       ├── ids        Token derivation from display names
//!       ├── mapping    Token → name table
//!       ├── settings   Shared (mapping, mode) snapshots
//!       ├── scanner    Lexical token matching
//!       ├── rewriter   Fragment construction
//!       ├── dom        Document host over rcdom, mutation records
//!       ├── policy     Editable-node exclusion
//!       ├── walker     Full subtree traversal
//!       ├── watcher    Incremental re-scan driven by mutation batches
//!       ├── engine     Driver tying the above together
//!       ├── html       Parsing and serialization
//!       ├── error      Errors for the fallible edges
//!       └── testing    Helpers for tests
//!
//! The pure pieces (ids, scanner, rewriter) know nothing about trees. Everything that touches
//! nodes goes through [`DocumentHost`](reveal::dom::DocumentHost) so the engine's own edits show
//! up as mutation records, exactly like edits made by anyone else.

pub mod reveal;

pub use reveal::engine::{Engine, EngineLimits};
pub use reveal::error::RevealError;
pub use reveal::mapping::Mapping;
pub use reveal::settings::{Mode, Settings, SettingsUpdate, Snapshot};
