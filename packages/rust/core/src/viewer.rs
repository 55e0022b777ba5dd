//! Document viewer model for opened citations.
//!
//! Rendering is left to the front-ends. This module decides what to show:
//! which document a citation points at, and which text fragments get
//! highlighted. A fragment is highlighted when it contains any of the
//! citation's phrases verbatim (case-sensitive).

use std::path::{Path, PathBuf};

use serde::Serialize;

use lexi_shared::{Citation, LexiError, Result};

/// What the viewer overlay shows for one citation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentView {
    /// Citation display text.
    pub title: String,
    /// Document link, passed through untouched.
    pub link: String,
    /// Phrases to mark in the document.
    pub highlights: Vec<String>,
    /// Badge text, e.g. "Highlighted Para 7".
    pub note: Option<String>,
}

impl DocumentView {
    pub fn from_citation(citation: &Citation) -> Self {
        Self {
            title: citation.text.clone(),
            link: citation.link.clone(),
            highlights: citation.highlights.clone(),
            note: citation.note.clone(),
        }
    }

    /// Split `text` into per-line fragments marked against this view's phrases.
    pub fn mark<'a>(&self, text: &'a str) -> Vec<Fragment<'a>> {
        mark_fragments(text, &self.highlights)
    }
}

/// One renderable piece of document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    pub text: &'a str,
    pub highlighted: bool,
}

/// Whether `fragment` contains any of `phrases`.
pub fn is_highlighted(fragment: &str, phrases: &[String]) -> bool {
    phrases
        .iter()
        .any(|p| !p.is_empty() && fragment.contains(p.as_str()))
}

/// Mark each line of `text` as highlighted or plain.
pub fn mark_fragments<'a>(text: &'a str, phrases: &[String]) -> Vec<Fragment<'a>> {
    text.lines()
        .map(|line| Fragment {
            text: line,
            highlighted: is_highlighted(line, phrases),
        })
        .collect()
}

/// Map a citation link onto a local document root.
///
/// Site-absolute links (`/judgment.pdf`) are taken relative to `root`.
pub fn resolve_link(root: &Path, link: &str) -> PathBuf {
    root.join(link.trim_start_matches('/'))
}

/// Read a text document for display.
pub fn load_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| LexiError::io(path, e))
}
