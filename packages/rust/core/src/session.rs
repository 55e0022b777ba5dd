//! Session event loop: UI commands in, snapshots out.
//!
//! One tokio task owns the [`Conversation`] and applies commands strictly one
//! at a time. An accepted submission schedules a separate timer task that
//! hands the query back after the pacing delay; the loop keeps serving
//! commands meanwhile. Further submissions are dropped by the pending guard.
//!
//! Every state change is published as a [`Snapshot`] on a `watch` channel.

use lexi_shared::{
    AppConfig, AssistantSettings, LexiError, Message, MessageId, Result,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use crate::conversation::{Conversation, PendingQuery, Snapshot};
use crate::knowledge::KnowledgeStore;

/// A discrete UI action consumed by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the unsent input.
    UpdateDraft(String),
    /// Submit the current draft.
    Submit,
    /// Open a message's citation in the document viewer.
    OpenCitation { message: MessageId, index: usize },
    /// Close the document viewer.
    CloseDocument,
}

/// The session task state. Construct with [`Session::spawn`].
pub struct Session {
    conversation: Conversation,
    store: KnowledgeStore,
    settings: AssistantSettings,
    commands: mpsc::UnboundedReceiver<Command>,
    answers_tx: mpsc::UnboundedSender<PendingQuery>,
    answers_rx: mpsc::UnboundedReceiver<PendingQuery>,
    snapshots: watch::Sender<Snapshot>,
    revision: u64,
}

impl Session {
    /// Start the session loop on the current tokio runtime.
    ///
    /// The task ends once every [`SessionHandle`] is dropped and any in-flight
    /// answer has been appended.
    pub fn spawn(
        store: KnowledgeStore,
        settings: AssistantSettings,
    ) -> (SessionHandle, JoinHandle<()>) {
        let conversation = Conversation::new();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (answers_tx, answers_rx) = mpsc::unbounded_channel();
        let (snap_tx, snap_rx) = watch::channel(conversation.snapshot(0));

        let session = Self {
            conversation,
            store,
            settings,
            commands: cmd_rx,
            answers_tx,
            answers_rx,
            snapshots: snap_tx,
            revision: 0,
        };

        let task = tokio::spawn(session.run());
        let handle = SessionHandle {
            commands: cmd_tx,
            snapshots: snap_rx,
        };
        (handle, task)
    }

    /// Build the knowledge store and settings from config, then spawn.
    pub fn from_config(config: &AppConfig) -> Result<(SessionHandle, JoinHandle<()>)> {
        let store = KnowledgeStore::new(config.records.clone())?;
        let settings = AssistantSettings::from(config);
        info!(
            records = store.len(),
            delay_ms = settings.pacing_delay.as_millis() as u64,
            "starting session"
        );
        Ok(Self::spawn(store, settings))
    }

    #[instrument(name = "session", skip_all)]
    async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(cmd) => self.apply(cmd),
                    None => break,
                },
                // `answers_tx` lives in `self`, so this channel never closes.
                Some(pending) = self.answers_rx.recv() => self.answer(pending),
            }
        }

        // Scheduled answers are never cancelled.
        if self.conversation.is_pending() {
            debug!("handles dropped, waiting for in-flight answer");
            if let Some(pending) = self.answers_rx.recv().await {
                self.answer(pending);
            }
        }
        debug!("session stopped");
    }

    fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::UpdateDraft(text) => {
                self.conversation.update_draft(text);
                self.publish();
            }
            Command::Submit => {
                let Some(pending) = self.conversation.submit() else {
                    return;
                };
                info!(question = %pending.message_id, "question submitted");
                self.schedule(pending);
                self.publish();
            }
            Command::OpenCitation { message, index } => {
                if self.conversation.open_citation(message, index).is_some() {
                    self.publish();
                }
            }
            Command::CloseDocument => {
                if self.conversation.document().is_some() {
                    self.conversation.close_document();
                    self.publish();
                }
            }
        }
    }

    /// Hand `pending` back to the loop after the pacing delay.
    fn schedule(&self, pending: PendingQuery) {
        let tx = self.answers_tx.clone();
        let delay = self.settings.pacing_delay;
        // Detached: the join handle is the cancellation handle, which is never used.
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(pending);
        });
    }

    fn answer(&mut self, pending: PendingQuery) {
        let message =
            self.conversation
                .resolve(pending, &self.store, &self.settings.fallback_answer);
        info!(cited = !message.citations.is_empty(), "answer ready");
        self.publish();
    }

    fn publish(&mut self) {
        self.revision += 1;
        self.snapshots
            .send_replace(self.conversation.snapshot(self.revision));
    }
}

/// Cloneable front-end handle: sends commands, reads snapshots.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Snapshot>,
}

impl SessionHandle {
    pub fn send(&self, cmd: Command) -> Result<()> {
        self.commands
            .send(cmd)
            .map_err(|_| LexiError::Session("session has stopped".into()))
    }

    pub fn update_draft(&self, text: impl Into<String>) -> Result<()> {
        self.send(Command::UpdateDraft(text.into()))
    }

    pub fn submit(&self) -> Result<()> {
        self.send(Command::Submit)
    }

    pub fn open_citation(&self, message: MessageId, index: usize) -> Result<()> {
        self.send(Command::OpenCitation { message, index })
    }

    pub fn close_document(&self) -> Result<()> {
        self.send(Command::CloseDocument)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that is notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Submit `query` and wait for its answer.
    ///
    /// Waits for any earlier answer first. Meant for a single driver such as
    /// the CLI; concurrent drivers may observe each other's answers.
    pub async fn ask(&self, query: &str) -> Result<Message> {
        if query.trim().is_empty() {
            return Err(LexiError::validation("query is empty"));
        }

        let mut rx = self.subscribe();
        let before = rx
            .wait_for(|s| !s.pending)
            .await
            .map_err(|_| LexiError::Session("session has stopped".into()))?
            .transcript
            .len();

        self.update_draft(query)?;
        self.submit()?;

        let snapshot = rx
            .wait_for(|s| !s.pending && s.transcript.len() >= before + 2)
            .await
            .map_err(|_| LexiError::Session("session stopped before answering".into()))?;

        snapshot
            .last_answer()
            .cloned()
            .ok_or_else(|| LexiError::Session("no answer in transcript".into()))
    }
}
