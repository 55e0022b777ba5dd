//! Conversation controller: transcript, draft, and the pending guard.
//!
//! The controller is a plain state machine with two states (idle and
//! awaiting-answer). Timing lives in [`crate::session`]; this type only
//! decides what gets appended and when a submission is accepted.

use serde::Serialize;
use tracing::{debug, warn};

use lexi_shared::{Message, MessageId, Role};

use crate::knowledge::KnowledgeStore;
use crate::viewer::DocumentView;

/// A submission accepted by [`Conversation::submit`], waiting for its answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    /// Draft text exactly as it was at submit time.
    pub query: String,
    /// The user message this query produced.
    pub message_id: MessageId,
}

/// Immutable copy of conversation state handed to renderers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    /// Incremented on every published change.
    pub revision: u64,
    /// Oldest-to-newest messages.
    pub transcript: Vec<Message>,
    /// True while an answer is being produced.
    pub pending: bool,
    /// Current unsent input.
    pub draft: String,
    /// Citation currently open in the document viewer.
    pub document: Option<DocumentView>,
}

impl Snapshot {
    /// Most recent assistant message, if any.
    pub fn last_answer(&self) -> Option<&Message> {
        self.transcript
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
    }
}

/// Owns the transcript for one session.
#[derive(Debug, Default)]
pub struct Conversation {
    transcript: Vec<Message>,
    pending: bool,
    draft: String,
    document: Option<DocumentView>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the draft. Allowed at any time, including while pending.
    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Accept the current draft as a user message.
    ///
    /// Returns `None` without touching state when the trimmed draft is empty
    /// or an answer is already pending.
    pub fn submit(&mut self) -> Option<PendingQuery> {
        if self.pending {
            debug!("submit ignored: answer pending");
            return None;
        }
        if self.draft.trim().is_empty() {
            debug!("submit ignored: blank draft");
            return None;
        }

        let query = std::mem::take(&mut self.draft);
        let message = Message::user(query.clone());
        let message_id = message.id;
        self.transcript.push(message);
        self.pending = true;

        Some(PendingQuery { query, message_id })
    }

    /// Append the assistant answer for `pending` and return to idle.
    ///
    /// Returns a copy of the appended message.
    pub fn resolve(
        &mut self,
        pending: PendingQuery,
        store: &KnowledgeStore,
        fallback: &str,
    ) -> Message {
        let answer = match store.find_match(&pending.query) {
            Some(record) => Message::assistant(record.answer.clone(), Some(record.citation.clone())),
            None => Message::assistant(fallback, None),
        };

        debug!(
            question = %pending.message_id,
            cited = !answer.citations.is_empty(),
            "answer appended"
        );
        self.transcript.push(answer.clone());
        self.pending = false;
        answer
    }

    /// Open citation `index` of `message` in the viewer.
    ///
    /// Unknown references are ignored and leave the viewer unchanged.
    pub fn open_citation(&mut self, message: MessageId, index: usize) -> Option<&DocumentView> {
        let citation = self
            .transcript
            .iter()
            .find(|m| m.id == message)
            .and_then(|m| m.citations.get(index));

        match citation {
            Some(citation) => {
                self.document = Some(DocumentView::from_citation(citation));
                self.document.as_ref()
            }
            None => {
                warn!(%message, index, "citation not found");
                None
            }
        }
    }

    pub fn close_document(&mut self) {
        self.document = None;
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn document(&self) -> Option<&DocumentView> {
        self.document.as_ref()
    }

    /// Copy the current state. `revision` is supplied by the publisher.
    pub fn snapshot(&self, revision: u64) -> Snapshot {
        Snapshot {
            revision,
            transcript: self.transcript.clone(),
            pending: self.pending,
            draft: self.draft.clone(),
            document: self.document.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexi_shared::AppConfig;

    const FALLBACK: &str = "nothing found";

    fn store() -> KnowledgeStore {
        KnowledgeStore::new(AppConfig::default().records).expect("store")
    }

    #[test]
    fn blank_draft_is_ignored() {
        let mut conv = Conversation::new();
        for draft in ["", "   ", "\n\t"] {
            conv.update_draft(draft);
            assert!(conv.submit().is_none());
        }
        assert!(conv.transcript().is_empty());
        assert!(!conv.is_pending());
    }

    #[test]
    fn repeated_empty_submits_never_toggle_pending() {
        let mut conv = Conversation::new();
        conv.update_draft("");
        for _ in 0..5 {
            assert!(conv.submit().is_none());
            assert!(!conv.is_pending());
        }
        assert!(conv.transcript().is_empty());
    }

    #[test]
    fn submit_appends_user_message_and_clears_draft() {
        let mut conv = Conversation::new();
        conv.update_draft("  Tell me about\nmotor accident compensation ");
        let pending = conv.submit().expect("accepted");

        assert_eq!(pending.query, "  Tell me about\nmotor accident compensation ");
        assert_eq!(conv.draft(), "");
        assert!(conv.is_pending());
        assert_eq!(conv.transcript().len(), 1);
        assert_eq!(conv.transcript()[0].role, Role::User);
        assert_eq!(conv.transcript()[0].content, pending.query);
        assert_eq!(conv.transcript()[0].id, pending.message_id);
    }

    #[test]
    fn second_submit_rejected_while_pending() {
        let mut conv = Conversation::new();
        conv.update_draft("section 166");
        let _pending = conv.submit().expect("accepted");

        conv.update_draft("another question");
        assert!(conv.submit().is_none());
        assert_eq!(conv.draft(), "another question");
        assert_eq!(conv.transcript().len(), 1);
    }

    #[test]
    fn matched_answer_carries_one_citation() {
        let store = store();
        let mut conv = Conversation::new();
        conv.update_draft("Is Section 166 relevant?");
        let pending = conv.submit().expect("accepted");

        let answer = conv.resolve(pending, &store, FALLBACK);
        assert_eq!(answer.role, Role::Assistant);
        assert_eq!(answer.citations.len(), 1);
        assert_eq!(answer.citations[0].text, store.records()[0].citation.text);
        assert!(!conv.is_pending());
        assert_eq!(conv.transcript().len(), 2);
        assert_eq!(conv.transcript().last(), Some(&answer));
    }

    #[test]
    fn unmatched_answer_uses_fallback() {
        let store = store();
        let mut conv = Conversation::new();
        conv.update_draft("what is the capital of France");
        let pending = conv.submit().expect("accepted");

        let answer = conv.resolve(pending, &store, FALLBACK);
        assert_eq!(answer.content, FALLBACK);
        assert!(answer.citations.is_empty());
    }

    #[test]
    fn open_and_close_citation() {
        let store = store();
        let mut conv = Conversation::new();
        conv.update_draft("motor accident");
        let pending = conv.submit().expect("accepted");
        let answer_id = conv.resolve(pending, &store, FALLBACK).id;

        let view = conv.open_citation(answer_id, 0).expect("opened");
        assert_eq!(view.link, "/Dani_Devi_v_Pritam_Singh.pdf");
        assert!(conv.snapshot(1).document.is_some());

        conv.close_document();
        assert!(conv.document().is_none());
    }

    #[test]
    fn unknown_citation_is_ignored() {
        let store = store();
        let mut conv = Conversation::new();
        conv.update_draft("capital of France");
        let pending = conv.submit().expect("accepted");
        let user_id = pending.message_id;
        let answer_id = conv.resolve(pending, &store, FALLBACK).id;

        assert!(conv.open_citation(answer_id, 0).is_none());
        assert!(conv.open_citation(user_id, 0).is_none());
        assert!(conv.open_citation(MessageId::new(), 0).is_none());
        assert!(conv.document().is_none());
    }

    #[test]
    fn snapshot_last_answer() {
        let store = store();
        let mut conv = Conversation::new();
        assert!(conv.snapshot(0).last_answer().is_none());

        conv.update_draft("self-employed claimant");
        let pending = conv.submit().expect("accepted");
        conv.resolve(pending, &store, FALLBACK);

        let snap = conv.snapshot(3);
        assert_eq!(snap.revision, 3);
        assert_eq!(snap.last_answer().map(|m| m.citations.len()), Some(1));
    }
}
