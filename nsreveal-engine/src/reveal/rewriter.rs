//! Fragment construction
//!
//!     Given a text span and the tokens found in it, [`rewrite`] produces the sequence of
//!     fragments that replaces the span. Text outside the matches is carried over untouched;
//!     each match becomes one fragment shaped by the active [`Mode`]:
//!
//!         resolved, Translate   → [`Fragment::Translated`] (name shown, token kept as metadata)
//!         resolved, Annotate    → [`Fragment::Annotated`] (token shown, name appended)
//!         unresolved            → the token, verbatim, as plain text
//!
//!     Adjacent plain pieces are merged, so a span whose tokens are all unresolved comes back as
//!     a single [`Fragment::Plain`] equal to the input. Callers use [`is_passthrough`] to notice
//!     that and leave the original node alone.

use crate::reveal::scanner::MatchSpan;
use crate::reveal::settings::{Mode, Snapshot};

/// Sequence of fragments replacing one text leaf.
pub type Fragments = Vec<Fragment>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Untouched text.
    Plain(String),
    /// Resolved token rendered as its display name.
    Translated { token: String, name: String },
    /// Resolved token rendered as itself plus a namespace note.
    Annotated { token: String, name: String },
}

impl Fragment {
    pub fn is_plain(&self) -> bool {
        matches!(self, Fragment::Plain(_))
    }

    /// Text a reader sees for this fragment.
    pub fn visible_text(&self) -> String {
        match self {
            Fragment::Plain(text) => text.clone(),
            Fragment::Translated { name, .. } => name.clone(),
            Fragment::Annotated { token, name } => format!("{token}{}", annotation_note(name)),
        }
    }

    /// Text with every resolved fragment put back to its token.
    pub fn source_text(&self) -> &str {
        match self {
            Fragment::Plain(text) => text,
            Fragment::Translated { token, .. } | Fragment::Annotated { token, .. } => token,
        }
    }
}

/// The de-emphasized suffix appended in [`Mode::Annotate`].
pub fn annotation_note(name: &str) -> String {
    format!("  (namespace: {name})")
}

/// Build the fragments for `text` given its `matches` and the current snapshot.
pub fn rewrite(text: &str, matches: &[MatchSpan<'_>], snapshot: &Snapshot) -> Fragments {
    let mut builder = FragmentBuilder::default();
    let mut cursor = 0;

    for span in matches {
        builder.push_plain(&text[cursor..span.start()]);
        match snapshot.mapping.resolve(span.token) {
            Some(name) => builder.push_resolved(span.token, name, snapshot.mode),
            None => builder.push_plain(span.token),
        }
        cursor = span.end();
    }
    builder.push_plain(&text[cursor..]);

    builder.finish()
}

/// True when `fragments` carry no resolved token, i.e. rewriting would change nothing.
pub fn is_passthrough(fragments: &[Fragment]) -> bool {
    fragments.iter().all(Fragment::is_plain)
}

/// Concatenated [`Fragment::visible_text`].
pub fn render_text(fragments: &[Fragment]) -> String {
    fragments.iter().map(Fragment::visible_text).collect()
}

/// Concatenated [`Fragment::source_text`]; always equals the rewritten input.
pub fn source_text(fragments: &[Fragment]) -> String {
    fragments.iter().map(Fragment::source_text).collect()
}

#[derive(Default)]
struct FragmentBuilder {
    buffer: String,
    fragments: Fragments,
}

impl FragmentBuilder {
    fn push_plain(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn flush_buffer(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.buffer);
        self.fragments.push(Fragment::Plain(text));
    }

    fn push_resolved(&mut self, token: &str, name: &str, mode: Mode) {
        self.flush_buffer();
        let token = token.to_string();
        let name = name.to_string();
        self.fragments.push(match mode {
            Mode::Translate => Fragment::Translated { token, name },
            Mode::Annotate => Fragment::Annotated { token, name },
        });
    }

    fn finish(mut self) -> Fragments {
        self.flush_buffer();
        self.fragments
    }
}
