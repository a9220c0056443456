use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use ulid::Ulid;

/// Half-open time-of-day range `[start, end)`.
///
/// Bounds are compared as strings, so `HH:MM` values must be zero-padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange<'a> {
    pub start: &'a str,
    pub end: &'a str,
}

impl<'a> TimeRange<'a> {
    pub fn new(start: &'a str, end: &'a str) -> Self {
        Self { start, end }
    }

    /// Touching endpoints (`self.end == other.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeRange<'_>) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A stored reservation of a room for a time range on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Assigned by the store. Stored records with a missing or non-ULID id get a fresh one on load.
    #[serde(default = "Ulid::new", deserialize_with = "ulid_or_fresh")]
    pub id: Ulid,
    pub office: String,
    pub room: String,
    /// `YYYY-MM-DD`, compared lexicographically.
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

fn ulid_or_fresh<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Ulid, D::Error> {
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(raw
        .as_str()
        .and_then(|s| Ulid::from_string(s).ok())
        .unwrap_or_else(Ulid::new))
}

impl Booking {
    pub fn from_new(id: Ulid, new: NewBooking) -> Self {
        Self {
            id,
            office: new.office,
            room: new.room,
            date: new.date,
            start_time: new.start_time,
            end_time: new.end_time,
        }
    }

    pub fn time_range(&self) -> TimeRange<'_> {
        TimeRange::new(&self.start_time, &self.end_time)
    }

    /// Same office, room and date as the candidate.
    pub fn same_slot_day(&self, candidate: &NewBooking) -> bool {
        self.office == candidate.office && self.room == candidate.room && self.date == candidate.date
    }
}

/// Request body for creating a booking. Unknown fields, including `id`, are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub office: String,
    pub room: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

impl NewBooking {
    pub fn time_range(&self) -> TimeRange<'_> {
        TimeRange::new(&self.start_time, &self.end_time)
    }
}

/// Which of the two booking sequences an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Upcoming bookings, persisted as `bookings`.
    Active,
    /// Archived bookings, persisted as `past`.
    Archived,
}

impl Collection {
    pub fn label(self) -> &'static str {
        match self {
            Collection::Active => "bookings",
            Collection::Archived => "past",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The persisted document: two disjoint ordered sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub bookings: Vec<Booking>,
    #[serde(default)]
    pub past: Vec<Booking>,
}

impl StoreDocument {
    pub fn collection(&self, collection: Collection) -> &Vec<Booking> {
        match collection {
            Collection::Active => &self.bookings,
            Collection::Archived => &self.past,
        }
    }

    pub fn collection_mut(&mut self, collection: Collection) -> &mut Vec<Booking> {
        match collection {
            Collection::Active => &mut self.bookings,
            Collection::Archived => &mut self.past,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_booking(start: &str, end: &str) -> NewBooking {
        NewBooking {
            office: "A".into(),
            room: "1".into(),
            date: "2024-01-10".into(),
            start_time: start.into(),
            end_time: end.into(),
        }
    }

    #[test]
    fn range_overlap() {
        let a = TimeRange::new("09:00", "10:00");
        let b = TimeRange::new("09:30", "10:30");
        let c = TimeRange::new("10:00", "11:00");
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c)); // adjacent, not overlapping
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn range_containment_overlaps() {
        let outer = TimeRange::new("08:00", "12:00");
        let inner = TimeRange::new("09:00", "09:15");
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
        assert!(outer.overlaps(&outer));
    }

    #[test]
    fn range_disjoint() {
        let morning = TimeRange::new("08:00", "09:00");
        let evening = TimeRange::new("18:00", "19:00");
        assert!(!morning.overlaps(&evening));
        assert!(!evening.overlaps(&morning));
    }

    #[test]
    fn same_slot_day_requires_all_three() {
        let stored = Booking::from_new(Ulid::new(), new_booking("09:00", "10:00"));
        let mut candidate = new_booking("11:00", "12:00");
        assert!(stored.same_slot_day(&candidate));

        candidate.room = "2".into();
        assert!(!stored.same_slot_day(&candidate));

        let mut candidate = new_booking("09:00", "10:00");
        candidate.date = "2024-01-11".into();
        assert!(!stored.same_slot_day(&candidate));

        let mut candidate = new_booking("09:00", "10:00");
        candidate.office = "B".into();
        assert!(!stored.same_slot_day(&candidate));
    }

    #[test]
    fn booking_uses_camel_case_fields() {
        let b = Booking::from_new(Ulid::new(), new_booking("09:00", "10:00"));
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["startTime"], "09:00");
        assert_eq!(json["endTime"], "10:00");
        assert_eq!(json["id"], b.id.to_string());
        assert!(json.get("start_time").is_none());
    }

    #[test]
    fn legacy_booking_without_id_gets_one() {
        let raw = r#"{"office":"A","room":"1","date":"2024-01-10","startTime":"09:00","endTime":"10:00"}"#;
        let a: Booking = serde_json::from_str(raw).unwrap();
        let b: Booking = serde_json::from_str(raw).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.office, "A");
    }

    #[test]
    fn stored_non_ulid_id_is_replaced() {
        let kept = Ulid::new();
        let raw = format!(
            r#"[{{"id":"r42","office":"A","room":"1","date":"2024-01-10","startTime":"09:00","endTime":"10:00"}},
                {{"id":7,"office":"A","room":"1","date":"2024-01-10","startTime":"10:00","endTime":"11:00"}},
                {{"id":null,"office":"A","room":"1","date":"2024-01-10","startTime":"11:00","endTime":"12:00"}},
                {{"id":"{kept}","office":"A","room":"1","date":"2024-01-10","startTime":"12:00","endTime":"13:00"}}]"#
        );
        let loaded: Vec<Booking> = serde_json::from_str(&raw).unwrap();
        assert_eq!(loaded.len(), 4);
        assert_eq!(loaded[1].start_time, "10:00");
        assert_eq!(loaded[3].id, kept);
    }

    #[test]
    fn new_booking_ignores_client_id() {
        let raw = r#"{"id":"bogus","office":"A","room":"1","date":"2024-01-10","startTime":"09:00","endTime":"10:00","note":"x"}"#;
        let nb: NewBooking = serde_json::from_str(raw).unwrap();
        assert_eq!(nb, new_booking("09:00", "10:00"));
    }

    #[test]
    fn new_booking_missing_field_is_rejected() {
        let raw = r#"{"office":"A","room":"1","date":"2024-01-10","startTime":"09:00"}"#;
        assert!(serde_json::from_str::<NewBooking>(raw).is_err());
    }

    #[test]
    fn document_missing_keys_default_to_empty() {
        let doc: StoreDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(doc, StoreDocument::default());

        let doc: StoreDocument = serde_json::from_str(r#"{"bookings":[]}"#).unwrap();
        assert!(doc.past.is_empty());
    }

    #[test]
    fn document_collection_accessors() {
        let mut doc = StoreDocument::default();
        doc.collection_mut(Collection::Archived)
            .push(Booking::from_new(Ulid::new(), new_booking("09:00", "10:00")));
        assert!(doc.collection(Collection::Active).is_empty());
        assert_eq!(doc.collection(Collection::Archived).len(), 1);
        assert_eq!(Collection::Archived.to_string(), "past");
    }
}
