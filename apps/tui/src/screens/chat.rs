//! Chat screen: transcript, thinking indicator, and message input.

use crossterm::event::{KeyCode, KeyModifiers};
use lexi_core::{Command, Snapshot};
use lexi_shared::{MessageId, Role};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::widgets::wrap_text;

const USER_GREEN: Color = Color::Rgb(16, 163, 127);

/// Maximum rows the input box grows to before it scrolls.
const MAX_INPUT_ROWS: u16 = 5;

pub(crate) struct ChatScreen {
    /// Local echo of the draft; every edit is mirrored to the session.
    input: String,
    /// Index into the cited answers, `None` means the newest.
    selected: Option<usize>,
    /// Lines scrolled up from the bottom of the transcript.
    scroll: u16,
    /// Transcript length when we last submitted, until the answer shows up.
    in_flight: Option<usize>,
}

impl ChatScreen {
    pub(crate) fn new() -> Self {
        Self {
            input: String::new(),
            selected: None,
            scroll: 0,
            in_flight: None,
        }
    }

    /// Busy while the session is pending or our submit has not been reflected yet.
    pub(crate) fn is_busy(&self, snapshot: &Snapshot) -> bool {
        snapshot.pending
            || self
                .in_flight
                .is_some_and(|len| snapshot.transcript.len() < len + 2)
    }

    /// Map a key press to at most one session command.
    pub(crate) fn handle_key(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        snapshot: &Snapshot,
    ) -> Option<Command> {
        match code {
            KeyCode::Enter if modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) => {
                self.input.push('\n');
                Some(Command::UpdateDraft(self.input.clone()))
            }
            KeyCode::Enter => {
                if self.input.trim().is_empty() || self.is_busy(snapshot) {
                    return None;
                }
                self.in_flight = Some(snapshot.transcript.len());
                self.input.clear();
                self.scroll = 0;
                Some(Command::Submit)
            }
            KeyCode::Char('o') if modifiers.contains(KeyModifiers::CONTROL) => {
                let message = self.selected_citation(snapshot)?;
                Some(Command::OpenCitation { message, index: 0 })
            }
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
                Some(Command::UpdateDraft(self.input.clone()))
            }
            KeyCode::Backspace => {
                self.input.pop()?;
                Some(Command::UpdateDraft(self.input.clone()))
            }
            KeyCode::Tab => {
                self.cycle_citation(snapshot, true);
                None
            }
            KeyCode::BackTab => {
                self.cycle_citation(snapshot, false);
                None
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_add(5);
                None
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_sub(5);
                None
            }
            _ => None,
        }
    }

    /// Message id of the citation Ctrl-O would open.
    pub(crate) fn selected_citation(&self, snapshot: &Snapshot) -> Option<MessageId> {
        let cited = cited_messages(snapshot);
        match self.selected {
            Some(idx) => cited.get(idx).copied(),
            None => cited.last().copied(),
        }
    }

    fn cycle_citation(&mut self, snapshot: &Snapshot, forward: bool) {
        let count = cited_messages(snapshot).len();
        if count == 0 {
            self.selected = None;
            return;
        }
        let current = self.selected.unwrap_or(count - 1).min(count - 1);
        self.selected = Some(if forward {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        });
    }

    pub(crate) fn draw(
        &self,
        f: &mut Frame,
        area: Rect,
        snapshot: &Snapshot,
        name: &str,
        greeting: &str,
    ) {
        let input_rows = (self.input.split('\n').count() as u16).clamp(1, MAX_INPUT_ROWS);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),                 // Transcript
                Constraint::Length(1),              // Indicator / hints
                Constraint::Length(input_rows + 2), // Input
            ])
            .split(area);

        self.draw_transcript(f, chunks[0], snapshot, name, greeting);

        let indicator = if self.is_busy(snapshot) {
            Paragraph::new(format!("● ● ●  {name} is thinking..."))
                .style(Style::default().fg(Color::Gray))
        } else {
            Paragraph::new("Enter send · Shift/Alt-Enter newline · Tab select citation · Ctrl-O open")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
        };
        f.render_widget(indicator, chunks[1]);

        let input_style = if self.is_busy(snapshot) {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(USER_GREEN)
        };
        let lines: Vec<&str> = self.input.split('\n').collect();
        let hidden = lines.len().saturating_sub(MAX_INPUT_ROWS as usize);
        let input = Paragraph::new(lines[hidden..].join("\n")).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Message {name}... "))
                .border_style(input_style),
        );
        f.render_widget(input, chunks[2]);

        let last = lines.last().copied().unwrap_or_default();
        let cursor_x = chunks[2].x + 1 + (last.chars().count() as u16).min(chunks[2].width.saturating_sub(3));
        let cursor_y = chunks[2].y + 1 + (lines.len() - hidden - 1) as u16;
        f.set_cursor_position((cursor_x, cursor_y));
    }

    fn draw_transcript(
        &self,
        f: &mut Frame,
        area: Rect,
        snapshot: &Snapshot,
        name: &str,
        greeting: &str,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {name} Legal Assistant "));

        if snapshot.transcript.is_empty() {
            let text = vec![
                Line::from(""),
                Line::from(format!("{name} Legal Assistant"))
                    .style(Style::default().add_modifier(Modifier::BOLD)),
                Line::from(greeting.to_string()).style(Style::default().fg(Color::Gray)),
            ];
            let empty = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(empty, area);
            return;
        }

        let width = (area.width.saturating_sub(2) as usize * 4 / 5).max(10);
        let selected = self.selected_citation(snapshot);
        let mut lines: Vec<Line> = Vec::new();

        for message in &snapshot.transcript {
            let (align, style) = match message.role {
                Role::User => (Alignment::Right, Style::default().fg(USER_GREEN)),
                Role::Assistant => (Alignment::Left, Style::default().fg(Color::White)),
            };

            for line in wrap_text(&message.content, width) {
                lines.push(Line::from(line).style(style).alignment(align));
            }

            for citation in &message.citations {
                let is_selected = selected == Some(message.id);
                let mut cite_style = Style::default()
                    .fg(Color::LightBlue)
                    .add_modifier(Modifier::UNDERLINED);
                if is_selected {
                    cite_style = cite_style.add_modifier(Modifier::REVERSED);
                }

                lines.push(Line::from("Citation:").style(Style::default().fg(Color::Gray)));
                for line in wrap_text(&citation.text, width) {
                    lines.push(Line::from(line).style(cite_style));
                }
                if let Some(note) = &citation.note {
                    lines.push(
                        Line::from(format!("📌 {note}")).style(Style::default().fg(Color::Green)),
                    );
                }
            }
            lines.push(Line::from(""));
        }

        let visible = area.height.saturating_sub(2);
        let max_scroll = (lines.len() as u16).saturating_sub(visible);
        let offset = max_scroll.saturating_sub(self.scroll);

        let transcript = Paragraph::new(lines).block(block).scroll((offset, 0));
        f.render_widget(transcript, area);
    }
}

/// Ids of messages carrying a citation, oldest first.
fn cited_messages(snapshot: &Snapshot) -> Vec<MessageId> {
    snapshot
        .transcript
        .iter()
        .filter(|m| !m.citations.is_empty())
        .map(|m| m.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexi_shared::{Citation, Message};

    fn type_text(screen: &mut ChatScreen, snapshot: &Snapshot, text: &str) {
        for c in text.chars() {
            screen.handle_key(KeyCode::Char(c), KeyModifiers::NONE, snapshot);
        }
    }

    fn answered(n: usize) -> Snapshot {
        let mut transcript = Vec::new();
        for i in 0..n {
            transcript.push(Message::user(format!("section 166 #{i}")));
            transcript.push(Message::assistant(
                "answer",
                Some(Citation::new("Para 7", "/doc.pdf")),
            ));
        }
        Snapshot {
            transcript,
            ..Snapshot::default()
        }
    }

    #[test]
    fn typing_mirrors_draft() {
        let mut screen = ChatScreen::new();
        let snap = Snapshot::default();
        type_text(&mut screen, &snap, "hi");
        let cmd = screen.handle_key(KeyCode::Backspace, KeyModifiers::NONE, &snap);
        assert_eq!(cmd, Some(Command::UpdateDraft("h".into())));
    }

    #[test]
    fn shift_enter_inserts_newline() {
        let mut screen = ChatScreen::new();
        let snap = Snapshot::default();
        type_text(&mut screen, &snap, "a");
        let cmd = screen.handle_key(KeyCode::Enter, KeyModifiers::SHIFT, &snap);
        assert_eq!(cmd, Some(Command::UpdateDraft("a\n".into())));
    }

    #[test]
    fn enter_submits_and_clears_input() {
        let mut screen = ChatScreen::new();
        let snap = Snapshot::default();
        type_text(&mut screen, &snap, "motor accident");

        let cmd = screen.handle_key(KeyCode::Enter, KeyModifiers::NONE, &snap);
        assert_eq!(cmd, Some(Command::Submit));
        assert!(screen.input.is_empty());
        assert!(screen.is_busy(&snap));
    }

    #[test]
    fn blank_or_busy_enter_is_ignored() {
        let mut screen = ChatScreen::new();
        let snap = Snapshot::default();
        type_text(&mut screen, &snap, "   ");
        assert_eq!(screen.handle_key(KeyCode::Enter, KeyModifiers::NONE, &snap), None);

        let pending = Snapshot {
            pending: true,
            ..Snapshot::default()
        };
        type_text(&mut screen, &pending, "question");
        assert_eq!(screen.handle_key(KeyCode::Enter, KeyModifiers::NONE, &pending), None);
        assert_eq!(screen.input, "   question");
    }

    #[test]
    fn busy_clears_once_answer_arrives() {
        let mut screen = ChatScreen::new();
        let empty = Snapshot::default();
        type_text(&mut screen, &empty, "section 166");
        screen.handle_key(KeyCode::Enter, KeyModifiers::NONE, &empty);

        assert!(!screen.is_busy(&answered(1)));
    }

    #[test]
    fn ctrl_o_opens_newest_citation() {
        let mut screen = ChatScreen::new();
        assert_eq!(
            screen.handle_key(KeyCode::Char('o'), KeyModifiers::CONTROL, &Snapshot::default()),
            None
        );

        let snap = answered(2);
        let newest = snap.transcript[3].id;
        let cmd = screen.handle_key(KeyCode::Char('o'), KeyModifiers::CONTROL, &snap);
        assert_eq!(
            cmd,
            Some(Command::OpenCitation {
                message: newest,
                index: 0
            })
        );
        assert!(screen.input.is_empty());
    }

    #[test]
    fn tab_cycles_citations() {
        let mut screen = ChatScreen::new();
        let snap = answered(3);

        screen.handle_key(KeyCode::Tab, KeyModifiers::NONE, &snap);
        assert_eq!(screen.selected_citation(&snap), Some(snap.transcript[1].id));

        screen.handle_key(KeyCode::BackTab, KeyModifiers::SHIFT, &snap);
        assert_eq!(screen.selected_citation(&snap), Some(snap.transcript[5].id));
    }
}
