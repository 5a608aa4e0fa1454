//! Chat-facing text for slot lists, plus splitting for length-limited transports.

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;

use crate::interval::Slot;

/// Longest message the chat transport accepts, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;

const LOCAL_FORMAT: &str = "%d.%m.%Y at %H:%M";

/// `DD.MM.YYYY at HH:MM` in the policy timezone.
pub fn format_local(instant: DateTime<FixedOffset>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(LOCAL_FORMAT).to_string()
}

/// Numbered list of slot start times, 1-based, as offered to a client.
pub fn format_slots(slots: &[Slot], tz: Tz) -> String {
    let mut msg = String::from("Here are the available dates and times:\n");
    for (i, slot) in slots.iter().enumerate() {
        msg.push_str(&format!("{}. {}\n", i + 1, format_local(slot.start, tz)));
    }
    msg.push_str("\nReply with the number of the slot you would like to book.");
    msg
}

/// Split `text` into pieces of at most `max_chars` characters.
///
/// Splits on character boundaries only, so multi-byte text is never cut
/// mid-character. Empty input yields no pieces.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        if count == max_chars {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
