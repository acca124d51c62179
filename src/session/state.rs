use crate::gateway::{ChatMessage, DocumentHandle};

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No document loaded
    Idle,
    /// Document loaded, ready for a question
    Ready,
    /// Document loaded, one question outstanding
    Awaiting,
}

/// Everything the client knows about the current conversation.
///
/// Mutated only through the transition methods in `controller`; readers get
/// shared slices so transcript entries can't be edited in place.
#[derive(Debug, Default)]
pub struct SessionState {
    pub(super) document: Option<DocumentHandle>,
    pub(super) transcript: Vec<ChatMessage>,
    pub(super) awaiting_response: bool,
    /// Bumped whenever the conversation is replaced, so answers to questions
    /// from an earlier conversation can be recognized and dropped
    pub(super) epoch: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<&DocumentHandle> {
        self.document.as_ref()
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    pub fn phase(&self) -> SessionPhase {
        match (&self.document, self.awaiting_response) {
            (None, _) => SessionPhase::Idle,
            (Some(_), false) => SessionPhase::Ready,
            (Some(_), true) => SessionPhase::Awaiting,
        }
    }

    /// Conversation context sent along with a question
    pub fn history(&self) -> Vec<ChatMessage> {
        self.transcript.clone()
    }
}

/// A question that has been accepted and is waiting for the backend.
///
/// Carries everything the request needs, so the call can run away from the
/// session that produced it.
#[derive(Debug, Clone)]
pub struct PendingQuestion {
    pub epoch: u64,
    pub handle: DocumentHandle,
    pub question: String,
    pub history: Vec<ChatMessage>,
}
