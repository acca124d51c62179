use tracing::{debug, info, warn};

use super::state::{PendingQuestion, SessionState};
use crate::constants::FAILURE_PREFIX;
use crate::gateway::{Backend, ChatMessage, DocumentHandle, MessageRole};
use crate::utils::DocQaError;

/// How a submitted question ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionOutcome {
    /// The answer was appended to the transcript
    Answered(String),
    /// A failure message was appended to the transcript
    Failed(String),
    /// The session was reset before the answer arrived
    Discarded,
}

/// Synthetic assistant message shown after a successful upload
pub fn acknowledgement(handle: &DocumentHandle) -> String {
    format!(
        "✅ Successfully loaded \"{}\". You can now ask me questions about this document!",
        handle
    )
}

/// Assistant message recorded when a question fails
pub fn failure_message(err: &DocQaError) -> String {
    format!("{} {}. Please try again.", FAILURE_PREFIX, err)
}

pub fn is_failure_message(message: &ChatMessage) -> bool {
    message.role == MessageRole::Assistant && message.content.starts_with(FAILURE_PREFIX)
}

impl SessionState {
    /// Make `handle` the active document and start a fresh transcript
    pub fn complete_ingestion(&mut self, handle: DocumentHandle) {
        info!("Document ready: {}", handle);
        self.epoch += 1;
        self.awaiting_response = false;
        self.transcript.clear();
        self.transcript
            .push(ChatMessage::assistant(acknowledgement(&handle)));
        self.document = Some(handle);
    }

    /// Accept a question: validate, append it to the transcript and hand
    /// back what the backend call needs. Nothing changes on error.
    pub fn begin_question(&mut self, text: &str) -> Result<PendingQuestion, DocQaError> {
        let handle = self
            .document
            .clone()
            .ok_or(DocQaError::NoActiveDocument)?;
        if self.awaiting_response {
            return Err(DocQaError::QuestionInFlight);
        }
        let question = text.trim();
        if question.is_empty() {
            return Err(DocQaError::EmptyQuestion);
        }

        // Context is the conversation so far, not including this question
        let history = self.history();
        self.transcript.push(ChatMessage::user(question));
        self.awaiting_response = true;

        Ok(PendingQuestion {
            epoch: self.epoch,
            handle,
            question: question.to_string(),
            history,
        })
    }

    /// Record the backend's reply to the question issued in `epoch`.
    /// Replies that belong to a conversation that no longer exists are dropped.
    pub fn finish_question(
        &mut self,
        epoch: u64,
        outcome: Result<String, DocQaError>,
    ) -> QuestionOutcome {
        if epoch != self.epoch || !self.awaiting_response {
            debug!("Dropping reply for epoch {} (current {})", epoch, self.epoch);
            return QuestionOutcome::Discarded;
        }

        self.awaiting_response = false;
        match outcome {
            Ok(answer) => {
                self.transcript.push(ChatMessage::assistant(answer.clone()));
                QuestionOutcome::Answered(answer)
            }
            Err(err) => {
                warn!("Question failed: {}", err);
                let message = failure_message(&err);
                self.transcript.push(ChatMessage::assistant(message));
                QuestionOutcome::Failed(err.to_string())
            }
        }
    }

    /// Ask a question and wait for the reply in place
    pub async fn submit_question(
        &mut self,
        backend: &dyn Backend,
        text: &str,
    ) -> Result<QuestionOutcome, DocQaError> {
        let pending = self.begin_question(text)?;
        let outcome = backend
            .ask(&pending.handle, &pending.question, &pending.history)
            .await;
        Ok(self.finish_question(pending.epoch, outcome))
    }

    /// Forget the document and the conversation. Allowed at any time; a
    /// question still in flight will have its reply dropped.
    pub fn reset(&mut self) {
        if let Some(handle) = &self.document {
            info!("Closing document {}", handle);
        }
        self.document = None;
        self.transcript.clear();
        self.awaiting_response = false;
        self.epoch += 1;
    }
}
