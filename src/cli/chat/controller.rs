use std::path::Path;

use tracing::{debug, warn};

use super::conversation_state::{ConversationState, Turn};
use crate::appointment::{BookingDetector, CsvRecordStore, TextExtractor};
use crate::error::Result;
use crate::gemini_client::ChatOracle;

/// Owns the conversation and everything a user message touches.
pub struct ConversationController {
    conversation_state: ConversationState,
    oracle: Box<dyn ChatOracle>,
    extractor: Box<dyn TextExtractor>,
    detector: Box<dyn BookingDetector>,
    store: CsvRecordStore,
    bookings_saved: usize,
}

impl ConversationController {
    pub fn new(
        system_prompt: &str,
        oracle: Box<dyn ChatOracle>,
        extractor: Box<dyn TextExtractor>,
        detector: Box<dyn BookingDetector>,
        store: CsvRecordStore,
    ) -> Self {
        Self {
            conversation_state: ConversationState::new(system_prompt),
            oracle,
            extractor,
            detector,
            store,
            bookings_saved: 0,
        }
    }

    /// Relay one user message and return the exchange.
    ///
    /// Blank input is ignored. When the chat service fails, the user turn
    /// stays in the history without a reply. When saving a booking fails,
    /// both turns stay in the history and the error is returned.
    pub async fn handle_user_input(&mut self, text: &str) -> Result<Option<(Turn, Turn)>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let user_turn = self.conversation_state.add_user_message(text);
        let reply = self.oracle.send(text).await?;
        let assistant_turn = self.conversation_state.add_assistant_message(&reply);
        debug!("History holds {} turns", self.conversation_state.len());

        if self.detector.is_booking_confirmation(&reply) {
            debug!("Reply looks like a booking confirmation");
            let record = self.extractor.extract(&reply);
            if record.is_empty() {
                warn!("Booking confirmation carried no recognizable fields");
            }
            self.store.append(&record)?;
            self.bookings_saved += 1;
        }

        Ok(Some((user_turn, assistant_turn)))
    }

    pub fn history(&self) -> &ConversationState {
        &self.conversation_state
    }

    pub fn records(&self) -> &CsvRecordStore {
        &self.store
    }

    pub fn records_path(&self) -> &Path {
        self.store.path()
    }

    /// Records persisted since this controller was created.
    pub fn bookings_saved(&self) -> usize {
        self.bookings_saved
    }
}
