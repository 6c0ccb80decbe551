use crate::domain::models::{booking::Booking, therapist::Therapist};
use icalendar::{Calendar, Component, Event as IcalEvent, EventLike};

/// Generates an iCalendar (.ics) string for a confirmed booking.
pub fn generate_ics(therapist: &Therapist, booking: &Booking) -> String {
    let mut calendar = Calendar::new();

    let summary = format!("Therapy session with {}", therapist.name);
    let mut description = format!("Booking reference: {}", booking.reference);
    if let Some(link) = &booking.meeting_link {
        description.push_str(&format!("\nJoin: {}", link));
    }

    let ical_event = IcalEvent::new()
        .summary(&summary)
        .description(&description)
        .starts(booking.start_at)
        .ends(booking.end_at)
        .uid(&booking.id)
        .done();

    calendar.push(ical_event);
    calendar.to_string()
}
