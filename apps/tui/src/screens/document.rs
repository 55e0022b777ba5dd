//! Document overlay for an opened citation.
//!
//! Text documents under the configured root are shown with highlighted
//! fragments. Anything else (a PDF, a missing file) shows an unavailable
//! notice plus the phrases that would have been marked.

use std::path::PathBuf;

use crossterm::event::KeyCode;
use lexi_core::viewer::{self, DocumentView};
use lexi_core::Command;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use tracing::debug;

use crate::widgets::centered_rect;

/// Loaded body for the currently open link.
struct Loaded {
    link: String,
    body: Result<String, String>,
}

pub(crate) struct DocumentScreen {
    root: PathBuf,
    loaded: Option<Loaded>,
    scroll: u16,
}

impl DocumentScreen {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            loaded: None,
            scroll: 0,
        }
    }

    /// Load the document for `view` if it changed since the last call.
    pub(crate) fn sync(&mut self, view: Option<&DocumentView>) {
        let Some(view) = view else {
            self.loaded = None;
            return;
        };
        if self.loaded.as_ref().is_some_and(|l| l.link == view.link) {
            return;
        }

        let path = viewer::resolve_link(&self.root, &view.link);
        let body = viewer::load_document(&path).map_err(|e| {
            debug!(error = %e, "document unavailable");
            format!("Document unavailable at {}", path.display())
        });
        self.loaded = Some(Loaded {
            link: view.link.clone(),
            body,
        });
        self.scroll = 0;
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode) -> Option<Command> {
        match code {
            KeyCode::Esc | KeyCode::Char('q') => Some(Command::CloseDocument),
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1);
                None
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                None
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                None
            }
            _ => None,
        }
    }

    pub(crate) fn draw(&self, f: &mut Frame, view: &DocumentView) {
        let area = centered_rect(80, 80, f.area());

        let mut lines = vec![
            Line::from(view.title.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
        ];
        if let Some(note) = &view.note {
            lines.push(
                Line::from(format!("📌 {note}"))
                    .style(Style::default().fg(Color::Black).bg(Color::LightYellow)),
            );
        }
        lines.push(Line::from("─".repeat(area.width.saturating_sub(2) as usize)));

        match self.loaded.as_ref().map(|l| &l.body) {
            Some(Ok(text)) => {
                for fragment in view.mark(text) {
                    let style = if fragment.highlighted {
                        Style::default().fg(Color::Black).bg(Color::Yellow)
                    } else {
                        Style::default()
                    };
                    lines.push(Line::from(fragment.text.to_string()).style(style));
                }
            }
            Some(Err(notice)) => {
                lines.push(Line::from(notice.clone()).style(Style::default().fg(Color::Gray)));
                if !view.highlights.is_empty() {
                    lines.push(Line::from(""));
                    lines.push(Line::from("Highlighted phrases:"));
                    for phrase in &view.highlights {
                        lines.push(
                            Line::from(format!("  {phrase}"))
                                .style(Style::default().fg(Color::Black).bg(Color::Yellow)),
                        );
                    }
                }
            }
            None => lines.push(Line::from("Loading...")),
        }

        let doc = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Judgment: {} - Esc to close ", view.link)),
            )
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));

        f.render_widget(Clear, area);
        f.render_widget(doc, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(link: &str) -> DocumentView {
        DocumentView {
            title: "Para 4".into(),
            link: link.into(),
            highlights: vec!["age of the deceased".into()],
            note: None,
        }
    }

    #[test]
    fn loads_text_document_from_root() {
        let mut screen = DocumentScreen::new("../../fixtures/documents");
        screen.sync(Some(&view("/multiplier_note.txt")));
        let body = &screen.loaded.as_ref().expect("loaded").body;
        assert!(body.as_ref().is_ok_and(|t| t.contains("age of the deceased")));
    }

    #[test]
    fn missing_document_becomes_notice() {
        let mut screen = DocumentScreen::new("../../fixtures/documents");
        screen.sync(Some(&view("/Dani_Devi_v_Pritam_Singh.pdf")));
        let body = &screen.loaded.as_ref().expect("loaded").body;
        assert!(body.as_ref().is_err_and(|n| n.contains("unavailable")));

        screen.sync(None);
        assert!(screen.loaded.is_none());
    }

    #[test]
    fn escape_closes_and_arrows_scroll() {
        let mut screen = DocumentScreen::new(".");
        assert_eq!(screen.handle_key(KeyCode::Down), None);
        assert_eq!(screen.scroll, 1);
        assert_eq!(screen.handle_key(KeyCode::Esc), Some(Command::CloseDocument));
    }
}
