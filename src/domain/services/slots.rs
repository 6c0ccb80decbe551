use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use crate::domain::models::availability_rule::AvailabilityRule;
use crate::domain::models::blocked_interval::BlockedInterval;
use crate::domain::models::booking::Booking;
use crate::domain::models::therapist::Therapist;

/// One candidate bookable interval. `start`/`end` are the canonical UTC
/// instants; display conversion happens at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available: bool,
}

/// Everything the generator needs, preloaded. `now` is injected so horizon
/// and notice checks are deterministic under test.
pub struct SlotQuery<'a> {
    pub therapist: &'a Therapist,
    pub rules: &'a [AvailabilityRule],
    pub blocked: &'a [BlockedInterval],
    pub bookings: &'a [Booking],
    /// Calendar day in `request_tz`.
    pub date: NaiveDate,
    pub duration_min: i32,
    pub request_tz: Tz,
    pub now: DateTime<Utc>,
}

/// Half-open interval intersection: [a_start, a_end) and [b_start, b_end)
/// overlap iff a_start < b_end && b_start < a_end. Touching boundaries do
/// not overlap.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// 0 = Sunday .. 6 = Saturday, matching `availability_rules.day_of_week`.
pub fn weekday_index(weekday: Weekday) -> i32 {
    weekday.num_days_from_sunday() as i32
}

pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.parse::<Tz>().ok()
}

/// UTC bounds [start of `date`, start of the next day) in `tz`. If midnight
/// falls into a DST gap the first representable instant after it is used.
pub fn local_day_bounds(tz: Tz, date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = day_start_utc(tz, date)?;
    let end = day_start_utc(tz, date.succ_opt()?)?;
    Some((start, end))
}

fn day_start_utc(tz: Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    let naive = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// All generated candidates for the request day, ascending by start and
/// de-duplicated by start instant. "No slots" is an empty vector, never an
/// error.
pub fn generate_slots(q: &SlotQuery) -> Vec<Slot> {
    let mut slots = Vec::new();
    visit_candidates(q, &mut |slot| {
        slots.push(slot);
        true
    });
    slots.sort_by_key(|s| s.start);
    slots.dedup_by_key(|s| s.start);
    slots
}

/// Short-circuits at the first available candidate. Used by the date-range
/// query so "has slots" days do not pay for a full day expansion.
pub fn first_available(q: &SlotQuery) -> Option<Slot> {
    let mut found = None;
    visit_candidates(q, &mut |slot| {
        if slot.available {
            found = Some(slot);
            false
        } else {
            true
        }
    });
    found
}

/// Walks every candidate the rules produce for the request-timezone day.
/// The visitor returns false to stop early.
fn visit_candidates(q: &SlotQuery, visit: &mut dyn FnMut(Slot) -> bool) {
    if q.duration_min <= 0 {
        return;
    }

    let therapist_tz = parse_timezone(&q.therapist.timezone).unwrap_or(chrono_tz::UTC);

    // The requested calendar day as a UTC range. Candidates must start
    // inside it, whichever therapist-local day they come from.
    let Some((range_start, range_end)) = local_day_bounds(q.request_tz, q.date) else {
        return;
    };

    let duration = Duration::minutes(q.duration_min as i64);
    let step_min = q.duration_min + q.therapist.buffer_min.max(0);

    let notice_cutoff = q.now + Duration::hours(q.therapist.min_booking_notice_hours as i64);
    let horizon_end = q.now + Duration::days(q.therapist.advance_booking_days as i64);

    // A request-timezone day can straddle up to two therapist-local days.
    let first_local = range_start.with_timezone(&therapist_tz).date_naive();
    let last_local = (range_end - Duration::seconds(1)).with_timezone(&therapist_tz).date_naive();

    let mut local_date = first_local;
    while local_date <= last_local {
        let day = weekday_index(local_date.weekday());

        for rule in q.rules.iter().filter(|r| r.is_active && r.day_of_week == day) {
            let start_min = (rule.start_time.hour() * 60 + rule.start_time.minute()) as i32;
            let mut end_min = (rule.end_time.hour() * 60 + rule.end_time.minute()) as i32;
            // 23:59 means end of day
            if end_min == 1439 {
                end_min = 1440;
            }

            let mut cursor = start_min;
            while cursor + q.duration_min <= end_min {
                let local_time = NaiveTime::from_hms_opt((cursor / 60) as u32, (cursor % 60) as u32, 0);

                // Wall-clock times skipped or duplicated by DST produce no
                // candidate, same as a window the duration does not fit.
                if let Some(nt) = local_time
                    && let Some(slot_local) = therapist_tz.from_local_datetime(&local_date.and_time(nt)).single()
                {
                    let start = slot_local.with_timezone(&Utc);
                    let end = start + duration;

                    if start >= range_start && start < range_end {
                        let available = start > q.now
                            && start >= notice_cutoff
                            && start <= horizon_end
                            && !q.blocked.iter().any(|b| overlaps(start, end, b.start_at, b.end_at))
                            && !q
                                .bookings
                                .iter()
                                .filter(|b| b.status.occupies_slot())
                                .any(|b| overlaps(start, end, b.start_at, b.end_at));

                        if !visit(Slot { start, end, available }) {
                            return;
                        }
                    }
                }

                cursor += step_min;
            }
        }

        let Some(next) = local_date.succ_opt() else { return };
        local_date = next;
    }
}
