//! History flattening: message records to their plain text

use std::iter::FusedIterator;
use std::slice;

use super::entity::{MessageBatch, StoredMessage};
use crate::domain::workflow::WorkflowError;

/// Lazy sequence of message texts, in batch order.
///
/// Borrowing the batch means the sequence can only be restarted by calling
/// [`flatten_history`] again on the same batch.
#[derive(Debug, Clone)]
pub struct HistoryTexts<'a> {
    inner: slice::Iter<'a, StoredMessage>,
}

/// Map every message in the batch to its text
pub fn flatten_history(batch: &MessageBatch) -> HistoryTexts<'_> {
    HistoryTexts {
        inner: batch.messages().iter(),
    }
}

impl<'a> Iterator for HistoryTexts<'a> {
    type Item = Result<&'a str, WorkflowError>;

    fn next(&mut self) -> Option<Self::Item> {
        let message = self.inner.next()?;

        Some(message.text.as_deref().ok_or_else(|| {
            WorkflowError::malformed_message(format!(
                "message at '{}' in conversation '{}' has no text",
                message.timestamp, message.conversation_id
            ))
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for HistoryTexts<'_> {}

impl FusedIterator for HistoryTexts<'_> {}
