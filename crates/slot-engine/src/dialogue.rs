//! Booking conversation: from "I'd like an appointment" to a created event.
//!
//! Each client has its own [`Conversation`], owned by the caller and passed
//! into [`BookingDialogue::handle`] by `&mut`. The dialogue itself holds only
//! read-only configuration and the collaborators.
//!
//! ```text
//! Chat ──booking intent──▶ AwaitingRange ──range with slots──▶ AwaitingChoice
//!   ▲                                                              │ number
//!   └──────────── booked / booking failed ◀── AwaitingEmail ◀──────┘
//! ```

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::error::DialogueError;
use crate::format::{format_local, format_slots, split_message, MAX_MESSAGE_CHARS};
use crate::interval::Slot;
use crate::policy::WorkingHoursPolicy;
use crate::request::parse_date_range;
use crate::source::{find_slots, AppointmentBook, AppointmentDetails, BusySource};
use crate::LookupError;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+").expect("email pattern is valid"));

pub const START_COMMAND: &str = "/start";

const GREETING: &str = "Hi! I'm the studio assistant. How can I help you?";
const RANGE_PROMPT: &str = "Great! Let's find a convenient date. Tell me which dates you'd like \
                            to see free slots for, in this format: from 15.07 to 20.07";
const RANGE_RETRY: &str = "Please enter the range again in the format: from 15.07 to 20.07";
const NO_SLOTS: &str =
    "Unfortunately there are no free slots in that period. Please try another range.";
const CHOICE_NOT_NUMBER: &str = "Please enter the number of a date from the list.";
const CHOICE_OUT_OF_RANGE: &str = "That number is not one of the options. Please try again.";
const EMAIL_PROMPT: &str = "Thank you! Now please enter your email to confirm the booking \
                            and receive the invitation.";
const EMAIL_INVALID: &str = "Please enter a valid email.";
const BOOKING_FAILED: &str = "Something went wrong while booking. Please try again later.";

/// Decides whether a free-text message asks for a booking.
pub trait IntentClassifier {
    fn is_booking_request(&self, text: &str) -> bool;
}

impl<F> IntentClassifier for F
where
    F: Fn(&str) -> bool,
{
    fn is_booking_request(&self, text: &str) -> bool {
        self(text)
    }
}

/// Answers messages that are not about booking.
pub trait Answerer {
    type Error: std::error::Error + Send + Sync + 'static;

    fn answer(&self, text: &str) -> Result<String, Self::Error>;
}

/// Classifies by case-insensitive substring match against a keyword list.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

impl KeywordClassifier {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(["book", "appointment", "запис", "записатися"])
    }
}

impl IntentClassifier for KeywordClassifier {
    fn is_booking_request(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

/// Where a conversation currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Chat,
    AwaitingRange,
    AwaitingChoice {
        slots: Vec<Slot>,
    },
    AwaitingEmail {
        slot: Slot,
    },
}

/// Per-client conversation state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Conversation {
    client_id: String,
    stage: Stage,
}

impl Conversation {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            stage: Stage::Chat,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn reset(&mut self) {
        self.stage = Stage::Chat;
    }
}

/// Fixed settings of a booking dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueSettings {
    pub resource_id: String,
    pub duration_minutes: i64,
    pub summary: String,
    pub max_message_chars: usize,
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self {
            resource_id: "laserepilation".to_string(),
            duration_minutes: 40,
            summary: "Laser hair removal appointment".to_string(),
            max_message_chars: MAX_MESSAGE_CHARS,
        }
    }
}

/// Drives conversations against one resource's calendar.
///
/// The calendar both reports busy time and takes bookings, as a hosted
/// calendar does.
pub struct BookingDialogue<'p, K, C, A> {
    policy: &'p WorkingHoursPolicy,
    settings: DialogueSettings,
    calendar: K,
    classifier: C,
    answerer: A,
}

impl<'p, K, C, A> BookingDialogue<'p, K, C, A>
where
    K: BusySource + AppointmentBook,
    C: IntentClassifier,
    A: Answerer,
{
    pub fn new(
        policy: &'p WorkingHoursPolicy,
        settings: DialogueSettings,
        calendar: K,
        classifier: C,
        answerer: A,
    ) -> Self {
        Self {
            policy,
            settings,
            calendar,
            classifier,
            answerer,
        }
    }

    pub fn calendar(&self) -> &K {
        &self.calendar
    }

    pub fn into_calendar(self) -> K {
        self.calendar
    }

    /// Handle one incoming message and return the replies to send, in order.
    ///
    /// `today` supplies the year for date ranges that omit it.
    ///
    /// # Errors
    /// Busy-source and answerer failures are returned, not turned into replies;
    /// the conversation stays in the stage it was in. A failed booking is
    /// reported to the client and resets the conversation instead.
    pub fn handle(
        &mut self,
        conversation: &mut Conversation,
        text: &str,
        today: NaiveDate,
    ) -> Result<Vec<String>, DialogueError> {
        let text = text.trim();
        if text == START_COMMAND {
            conversation.reset();
            return Ok(vec![GREETING.to_string()]);
        }

        match std::mem::take(&mut conversation.stage) {
            Stage::Chat => self.on_chat(conversation, text),
            Stage::AwaitingRange => self.on_range(conversation, text, today.year()),
            Stage::AwaitingChoice { slots } => Ok(self.on_choice(conversation, text, slots)),
            Stage::AwaitingEmail { slot } => Ok(self.on_email(conversation, text, slot)),
        }
    }

    fn on_chat(
        &self,
        conversation: &mut Conversation,
        text: &str,
    ) -> Result<Vec<String>, DialogueError> {
        if self.classifier.is_booking_request(text) {
            tracing::info!(client = %conversation.client_id, "booking requested");
            conversation.stage = Stage::AwaitingRange;
            return Ok(vec![RANGE_PROMPT.to_string()]);
        }

        let reply = self
            .answerer
            .answer(text)
            .map_err(|e| DialogueError::Answer(Box::new(e)))?;
        Ok(vec![reply])
    }

    fn on_range(
        &self,
        conversation: &mut Conversation,
        text: &str,
        year: i32,
    ) -> Result<Vec<String>, DialogueError> {
        // Until slots are found the client stays here, including on errors.
        conversation.stage = Stage::AwaitingRange;

        let Some(range) = parse_date_range(text, year) else {
            return Ok(vec![RANGE_RETRY.to_string()]);
        };

        let request = range.to_request(self.policy.timezone(), self.settings.duration_minutes)?;
        let slots = find_slots(&self.calendar, &self.settings.resource_id, &request, self.policy)
            .map_err(|e| match e {
                LookupError::Slot(e) => DialogueError::Slot(e),
                LookupError::Source(e) => DialogueError::Source(Box::new(e)),
            })?;

        if slots.is_empty() {
            return Ok(vec![NO_SLOTS.to_string()]);
        }

        let listing = format_slots(&slots, self.policy.timezone());
        tracing::info!(
            client = %conversation.client_id,
            slots = slots.len(),
            "offering slots"
        );
        conversation.stage = Stage::AwaitingChoice { slots };
        Ok(split_message(&listing, self.settings.max_message_chars))
    }

    fn on_choice(
        &self,
        conversation: &mut Conversation,
        text: &str,
        slots: Vec<Slot>,
    ) -> Vec<String> {
        let choice = match text.parse::<usize>() {
            Ok(choice) => choice,
            Err(_) => {
                let mut replies = vec![CHOICE_NOT_NUMBER.to_string()];
                replies.extend(split_message(
                    &format_slots(&slots, self.policy.timezone()),
                    self.settings.max_message_chars,
                ));
                conversation.stage = Stage::AwaitingChoice { slots };
                return replies;
            }
        };

        match choice.checked_sub(1).and_then(|i| slots.get(i)) {
            Some(&slot) => {
                conversation.stage = Stage::AwaitingEmail { slot };
                vec![EMAIL_PROMPT.to_string()]
            }
            None => {
                conversation.stage = Stage::AwaitingChoice { slots };
                vec![CHOICE_OUT_OF_RANGE.to_string()]
            }
        }
    }

    fn on_email(&mut self, conversation: &mut Conversation, text: &str, slot: Slot) -> Vec<String> {
        if !EMAIL_PATTERN.is_match(text) {
            conversation.stage = Stage::AwaitingEmail { slot };
            return vec![EMAIL_INVALID.to_string()];
        }

        let details = AppointmentDetails {
            summary: self.settings.summary.clone(),
            description: format!("Client id: {}", conversation.client_id),
            attendee_email: Some(text.to_string()),
        };

        // Back to chat whether or not the booking went through.
        conversation.stage = Stage::Chat;

        match self
            .calendar
            .create_appointment(&self.settings.resource_id, &slot, &details)
        {
            Ok(confirmation) => {
                tracing::info!(
                    client = %conversation.client_id,
                    %confirmation,
                    start = %slot.start,
                    "appointment booked"
                );
                vec![format!(
                    "Booking confirmed ✅ See you on {}",
                    format_local(slot.start, self.policy.timezone())
                )]
            }
            Err(e) => {
                tracing::warn!(client = %conversation.client_id, error = %e, "booking failed");
                vec![BOOKING_FAILED.to_string()]
            }
        }
    }
}
