//! Tests for the booking conversation, driven with in-memory collaborators.

use std::convert::Infallible;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use slot_engine::dialogue::{Answerer, KeywordClassifier};
use slot_engine::{
    AppointmentBook, AppointmentDetails, BookingDialogue, BusySource, Conversation,
    DayHours, DialogueError, DialogueSettings, Slot, Stage, TimeInterval, WorkingHoursPolicy,
};

// ── Collaborators ───────────────────────────────────────────────────────────

fn at(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

fn studio_policy() -> WorkingHoursPolicy {
    let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
    let hours = DayHours::new(t(9), t(18), t(13), t(14)).unwrap();
    WorkingHoursPolicy::new(chrono_tz::Europe::Kyiv, hours)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
}

#[derive(Default)]
struct Calendar {
    busy: Vec<TimeInterval>,
    offline: bool,
    booked: Vec<(String, Slot, AppointmentDetails)>,
    reject_bookings: bool,
}

impl BusySource for Calendar {
    type Error = std::io::Error;

    fn fetch_busy(
        &self,
        _resource_id: &str,
        _window_start: DateTime<FixedOffset>,
        _window_end: DateTime<FixedOffset>,
    ) -> Result<Vec<TimeInterval>, Self::Error> {
        if self.offline {
            return Err(std::io::Error::other("calendar offline"));
        }
        Ok(self.busy.clone())
    }
}

impl AppointmentBook for Calendar {
    type Error = std::io::Error;

    fn create_appointment(
        &mut self,
        resource_id: &str,
        slot: &Slot,
        details: &AppointmentDetails,
    ) -> Result<String, Self::Error> {
        if self.reject_bookings {
            return Err(std::io::Error::other("slot already taken"));
        }
        self.booked
            .push((resource_id.to_string(), *slot, details.clone()));
        Ok(format!("evt-{}", self.booked.len()))
    }
}

struct Echo;

impl Answerer for Echo {
    type Error = Infallible;

    fn answer(&self, text: &str) -> Result<String, Self::Error> {
        Ok(format!("echo: {text}"))
    }
}

struct Broken;

impl Answerer for Broken {
    type Error = std::io::Error;

    fn answer(&self, _text: &str) -> Result<String, Self::Error> {
        Err(std::io::Error::other("model unavailable"))
    }
}

type Dialogue<'p> = BookingDialogue<'p, Calendar, KeywordClassifier, Echo>;

fn dialogue(policy: &WorkingHoursPolicy, calendar: Calendar) -> Dialogue<'_> {
    BookingDialogue::new(
        policy,
        DialogueSettings::default(),
        calendar,
        KeywordClassifier::default(),
        Echo,
    )
}

fn free_calendar() -> Calendar {
    Calendar::default()
}

/// Walk a fresh conversation up to the slot list for 15.07.
fn to_choice(dialogue: &mut Dialogue<'_>, conversation: &mut Conversation) -> Vec<String> {
    dialogue
        .handle(conversation, "I'd like to book an appointment", today())
        .unwrap();
    dialogue
        .handle(conversation, "from 15.07 to 16.07", today())
        .unwrap()
}

// ── Chat stage ──────────────────────────────────────────────────────────────

#[test]
fn start_command_greets_and_resets() {
    let policy = studio_policy();
    let mut dialogue = dialogue(&policy, free_calendar());
    let mut conversation = Conversation::new("42");

    to_choice(&mut dialogue, &mut conversation);
    assert!(matches!(conversation.stage(), Stage::AwaitingChoice { .. }));

    let replies = dialogue.handle(&mut conversation, "/start", today()).unwrap();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].starts_with("Hi!"));
    assert_eq!(conversation.stage(), &Stage::Chat);
}

#[test]
fn small_talk_goes_to_answerer() {
    let policy = studio_policy();
    let mut dialogue = dialogue(&policy, free_calendar());
    let mut conversation = Conversation::new("42");

    let replies = dialogue
        .handle(&mut conversation, "How much does it cost?", today())
        .unwrap();

    assert_eq!(replies, vec!["echo: How much does it cost?"]);
    assert_eq!(conversation.stage(), &Stage::Chat);
}

#[test]
fn answerer_failure_is_an_error() {
    let policy = studio_policy();
    let mut dialogue = BookingDialogue::new(
        &policy,
        DialogueSettings::default(),
        free_calendar(),
        KeywordClassifier::default(),
        Broken,
    );
    let mut conversation = Conversation::new("42");

    let err = dialogue
        .handle(&mut conversation, "hello", today())
        .unwrap_err();

    assert!(matches!(err, DialogueError::Answer(_)));
    assert_eq!(conversation.stage(), &Stage::Chat);
}

#[test]
fn closure_can_classify_intent() {
    let policy = studio_policy();
    let mut dialogue = BookingDialogue::new(
        &policy,
        DialogueSettings::default(),
        free_calendar(),
        |text: &str| text == "yes",
        Echo,
    );
    let mut conversation = Conversation::new("42");

    dialogue.handle(&mut conversation, "yes", today()).unwrap();
    assert_eq!(conversation.stage(), &Stage::AwaitingRange);
}

// ── Range stage ─────────────────────────────────────────────────────────────

#[test]
fn full_booking_flow() {
    let policy = studio_policy();
    let mut dialogue = dialogue(&policy, free_calendar());
    let mut conversation = Conversation::new("42");

    let replies = dialogue
        .handle(&mut conversation, "Can I book a session?", today())
        .unwrap();
    assert!(replies[0].contains("from 15.07 to 20.07"));
    assert_eq!(conversation.stage(), &Stage::AwaitingRange);

    // 40-minute slots carved from midnight land on 09:20, 10:00, ... 12:00,
    // then 14:00 ... 17:20 around the break.
    let replies = dialogue
        .handle(&mut conversation, "з 15.07 по 16.07", today())
        .unwrap();
    let listing = replies.join("");
    assert!(listing.contains("1. 15.07.2026 at 09:20"));
    assert!(listing.contains("2. 15.07.2026 at 10:00"));
    assert!(listing.contains("11. 15.07.2026 at 17:20"));
    match conversation.stage() {
        Stage::AwaitingChoice { slots } => assert_eq!(slots.len(), 11),
        other => panic!("expected slot choice, got {other:?}"),
    }

    let replies = dialogue.handle(&mut conversation, "2", today()).unwrap();
    assert!(replies[0].contains("email"));
    match conversation.stage() {
        Stage::AwaitingEmail { slot } => {
            assert_eq!(slot.start, at("2026-07-15T10:00:00+03:00"));
        }
        other => panic!("expected email stage, got {other:?}"),
    }

    let replies = dialogue
        .handle(&mut conversation, "client@example.com", today())
        .unwrap();
    assert_eq!(
        replies,
        vec!["Booking confirmed ✅ See you on 15.07.2026 at 10:00"]
    );
    assert_eq!(conversation.stage(), &Stage::Chat);

    let booked = &dialogue.calendar().booked;
    assert_eq!(booked.len(), 1);
    let (resource, slot, details) = &booked[0];
    assert_eq!(resource, "laserepilation");
    assert_eq!(slot.end, at("2026-07-15T10:40:00+03:00"));
    assert_eq!(details.attendee_email.as_deref(), Some("client@example.com"));
    assert!(details.description.contains("42"));
}

#[test]
fn unparsable_range_asks_again() {
    let policy = studio_policy();
    let mut dialogue = dialogue(&policy, free_calendar());
    let mut conversation = Conversation::new("42");
    dialogue.handle(&mut conversation, "book", today()).unwrap();

    for text in ["next week please", "from 20.07 to 15.07", "from 31.02 to 02.03"] {
        let replies = dialogue.handle(&mut conversation, text, today()).unwrap();
        assert!(replies[0].contains("again"), "no retry prompt for {text:?}");
        assert_eq!(conversation.stage(), &Stage::AwaitingRange);
    }
}

#[test]
fn fully_booked_range_stays_in_range_stage() {
    let policy = studio_policy();
    let calendar = Calendar {
        busy: vec![TimeInterval::new(
            at("2026-07-15T00:00:00+03:00"),
            at("2026-07-16T00:00:00+03:00"),
        )
        .unwrap()],
        ..Calendar::default()
    };
    let mut dialogue = dialogue(&policy, calendar);
    let mut conversation = Conversation::new("42");
    dialogue.handle(&mut conversation, "book", today()).unwrap();

    let replies = dialogue
        .handle(&mut conversation, "from 15.07 to 16.07", today())
        .unwrap();

    assert!(replies[0].contains("no free slots"));
    assert_eq!(conversation.stage(), &Stage::AwaitingRange);
}

#[test]
fn calendar_failure_propagates() {
    let policy = studio_policy();
    let calendar = Calendar {
        offline: true,
        ..Calendar::default()
    };
    let mut dialogue = dialogue(&policy, calendar);
    let mut conversation = Conversation::new("42");
    dialogue.handle(&mut conversation, "book", today()).unwrap();

    let err = dialogue
        .handle(&mut conversation, "from 15.07 to 16.07", today())
        .unwrap_err();

    match err {
        DialogueError::Source(source) => assert_eq!(source.to_string(), "calendar offline"),
        other => panic!("expected source error, got {other:?}"),
    }
    assert_eq!(conversation.stage(), &Stage::AwaitingRange);
}

#[test]
fn long_listing_is_split_into_messages() {
    let policy = studio_policy();
    let settings = DialogueSettings {
        max_message_chars: 100,
        ..DialogueSettings::default()
    };
    let mut dialogue = BookingDialogue::new(
        &policy,
        settings,
        free_calendar(),
        KeywordClassifier::default(),
        Echo,
    );
    let mut conversation = Conversation::new("42");

    let replies = to_choice(&mut dialogue, &mut conversation);

    assert!(replies.len() > 1);
    assert!(replies.iter().all(|r| r.chars().count() <= 100));
}

// ── Choice stage ────────────────────────────────────────────────────────────

#[test]
fn non_number_repeats_the_list() {
    let policy = studio_policy();
    let mut dialogue = dialogue(&policy, free_calendar());
    let mut conversation = Conversation::new("42");
    to_choice(&mut dialogue, &mut conversation);

    let replies = dialogue
        .handle(&mut conversation, "the second one", today())
        .unwrap();

    assert!(replies[0].contains("number"));
    assert!(replies[1].contains("1. 15.07.2026 at 09:20"));
    assert!(matches!(conversation.stage(), Stage::AwaitingChoice { .. }));
}

#[test]
fn out_of_range_choice_is_rejected() {
    let policy = studio_policy();
    let mut dialogue = dialogue(&policy, free_calendar());
    let mut conversation = Conversation::new("42");
    to_choice(&mut dialogue, &mut conversation);

    for text in ["0", "12", "99"] {
        let replies = dialogue.handle(&mut conversation, text, today()).unwrap();
        assert!(replies[0].contains("not one of the options"));
        assert!(matches!(conversation.stage(), Stage::AwaitingChoice { .. }));
    }
}

// ── Email stage ─────────────────────────────────────────────────────────────

#[test]
fn invalid_email_asks_again() {
    let policy = studio_policy();
    let mut dialogue = dialogue(&policy, free_calendar());
    let mut conversation = Conversation::new("42");
    to_choice(&mut dialogue, &mut conversation);
    dialogue.handle(&mut conversation, "1", today()).unwrap();

    for text in ["client", "client@example", "@example.com"] {
        let replies = dialogue.handle(&mut conversation, text, today()).unwrap();
        assert!(replies[0].contains("valid email"), "accepted {text:?}");
        assert!(matches!(conversation.stage(), Stage::AwaitingEmail { .. }));
    }
    assert!(dialogue.calendar().booked.is_empty());
}

#[test]
fn rejected_booking_returns_to_chat() {
    let policy = studio_policy();
    let calendar = Calendar {
        reject_bookings: true,
        ..Calendar::default()
    };
    let mut dialogue = dialogue(&policy, calendar);
    let mut conversation = Conversation::new("42");
    to_choice(&mut dialogue, &mut conversation);
    dialogue.handle(&mut conversation, "1", today()).unwrap();

    let replies = dialogue
        .handle(&mut conversation, "client@example.com", today())
        .unwrap();

    assert!(replies[0].contains("went wrong"));
    assert_eq!(conversation.stage(), &Stage::Chat);
}

#[test]
fn conversations_are_independent() {
    let policy = studio_policy();
    let mut dialogue = dialogue(&policy, free_calendar());
    let mut alice = Conversation::new("alice");
    let mut bob = Conversation::new("bob");

    to_choice(&mut dialogue, &mut alice);
    dialogue.handle(&mut bob, "hello", today()).unwrap();

    assert!(matches!(alice.stage(), Stage::AwaitingChoice { .. }));
    assert_eq!(bob.stage(), &Stage::Chat);
    assert_eq!(alice.client_id(), "alice");
}
