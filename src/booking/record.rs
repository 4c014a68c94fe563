//! Class records as stored in the bookings document.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// A single gym class with its capacity and roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    /// Class name, matched case-insensitively.
    pub class_name: String,
    /// Day of the week the class runs on.
    pub day: String,
    /// Start time, usually `HH:MM`.
    pub time: String,
    /// Total capacity.
    pub slots: u32,
    /// Users holding a slot, in booking order.
    pub booked_by: Vec<String>,
}

impl ClassRecord {
    /// Create a class with an empty roster.
    pub fn new(class_name: &str, day: &str, time: &str, slots: u32) -> Self {
        Self {
            class_name: class_name.to_string(),
            day: day.to_string(),
            time: time.to_string(),
            slots,
            booked_by: Vec::new(),
        }
    }

    /// Add users to the roster.
    pub fn with_bookings<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.booked_by.extend(users.into_iter().map(Into::into));
        self
    }

    /// Remaining capacity.
    pub fn slots_left(&self) -> u32 {
        let booked = u32::try_from(self.booked_by.len()).unwrap_or(u32::MAX);
        self.slots.saturating_sub(booked)
    }

    /// Whether this record answers to the given name.
    pub fn matches(&self, class_name: &str) -> bool {
        self.class_name.to_lowercase() == class_name.to_lowercase()
    }

    pub fn is_booked_by(&self, user_name: &str) -> bool {
        self.booked_by.iter().any(|u| u == user_name)
    }

    pub fn is_full(&self) -> bool {
        self.slots_left() == 0
    }
}

/// One element of the bookings document.
///
/// Elements that don't parse as a [`ClassRecord`] are kept verbatim so
/// that rewriting the document never drops them.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredEntry {
    Class(ClassRecord),
    Invalid { raw: Value, reason: String },
}

impl StoredEntry {
    /// Classify a raw JSON element.
    pub fn from_value(value: Value) -> Self {
        match ClassRecord::deserialize(&value) {
            Ok(record) => StoredEntry::Class(record),
            Err(e) => StoredEntry::Invalid {
                raw: value,
                reason: e.to_string(),
            },
        }
    }

    pub fn as_class(&self) -> Option<&ClassRecord> {
        match self {
            StoredEntry::Class(record) => Some(record),
            StoredEntry::Invalid { .. } => None,
        }
    }

    pub fn as_class_mut(&mut self) -> Option<&mut ClassRecord> {
        match self {
            StoredEntry::Class(record) => Some(record),
            StoredEntry::Invalid { .. } => None,
        }
    }
}

impl From<ClassRecord> for StoredEntry {
    fn from(record: ClassRecord) -> Self {
        StoredEntry::Class(record)
    }
}

impl Serialize for StoredEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StoredEntry::Class(record) => record.serialize(serializer),
            StoredEntry::Invalid { raw, .. } => raw.serialize(serializer),
        }
    }
}

/// Starter schedule written by `gymbot init --seed`.
pub fn sample_classes() -> Vec<ClassRecord> {
    vec![
        ClassRecord::new("Yoga", "Monday", "10:00", 10),
        ClassRecord::new("Pilates", "Tuesday", "11:00", 8),
        ClassRecord::new("Spinning", "Wednesday", "18:00", 15),
        ClassRecord::new("CrossFit", "Thursday", "19:00", 12),
        ClassRecord::new("Zumba", "Friday", "17:30", 20),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slots_left_saturates() {
        let record = ClassRecord::new("Yoga", "Monday", "10:00", 1).with_bookings(["a", "b"]);
        assert_eq!(record.slots_left(), 0);
        assert!(record.is_full());
    }

    #[test]
    fn test_matches_ignores_case() {
        let record = ClassRecord::new("Yoga", "Monday", "10:00", 2);
        assert!(record.matches("yoga"));
        assert!(record.matches("YOGA"));
        assert!(!record.matches("Pilates"));
    }

    #[test]
    fn test_invalid_entry_keeps_raw_value() {
        let raw = json!({"class_name": "Yoga", "slots": 2});
        let entry = StoredEntry::from_value(raw.clone());
        match &entry {
            StoredEntry::Invalid { reason, .. } => assert!(reason.contains("day")),
            _ => panic!("Expected invalid entry"),
        }
        assert_eq!(serde_json::to_value(&entry).unwrap(), raw);
    }

    #[test]
    fn test_valid_entry_round_trips() {
        let raw = json!({
            "class_name": "Pilates",
            "day": "Tuesday",
            "time": "11:00",
            "slots": 1,
            "booked_by": ["Alice"]
        });
        let entry = StoredEntry::from_value(raw.clone());
        assert!(entry.as_class().is_some());
        assert_eq!(serde_json::to_value(&entry).unwrap(), raw);
    }
}
