//! JSON-backed booking store.

use super::outcome::{
    validate_pair, validate_user, BookingOutcome, CancelOutcome, UserBookings,
};
use super::record::{ClassRecord, StoredEntry};
use crate::config::Settings;
use crate::error::{GymError, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, warn};

/// Class schedule with an explicit load/save boundary.
///
/// A file-backed store re-reads its document at the start of every
/// operation and rewrites it after a mutation, all under one lock, so
/// callers sharing an instance never lose each other's updates.
pub struct BookingStore {
    path: Option<PathBuf>,
    entries: Mutex<Vec<StoredEntry>>,
}

impl BookingStore {
    /// Open a store backed by the JSON document at `path`.
    ///
    /// The file does not need to exist yet; a missing file is an empty schedule.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Open the store configured in settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::open(settings.bookings_path())
    }

    /// Create a store that lives only in memory.
    pub fn in_memory(classes: Vec<ClassRecord>) -> Self {
        Self {
            path: None,
            entries: Mutex::new(classes.into_iter().map(StoredEntry::from).collect()),
        }
    }

    /// Path of the backing document, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Snapshot of all well-formed class records.
    pub fn classes(&self) -> Vec<ClassRecord> {
        self.read(|entries| {
            entries
                .iter()
                .filter_map(StoredEntry::as_class)
                .cloned()
                .collect()
        })
    }

    /// Replace the whole schedule.
    pub fn replace_all(&self, classes: Vec<ClassRecord>) -> Result<()> {
        self.transact(|entries| {
            *entries = classes.into_iter().map(StoredEntry::from).collect();
            ((), true)
        })
    }

    /// Human-readable listing of every class with its remaining capacity.
    pub fn list_classes(&self) -> String {
        self.read(|entries| {
            if entries.is_empty() {
                return "No classes available.".to_string();
            }

            let mut output = String::from("Available Classes:\n");
            for entry in entries {
                match entry {
                    StoredEntry::Class(c) => output.push_str(&format!(
                        "- {} ({} {}): {} slots left\n",
                        c.class_name,
                        c.day,
                        c.time,
                        c.slots_left()
                    )),
                    StoredEntry::Invalid { reason, .. } => {
                        output.push_str(&format!("- [Invalid class data: {}]\n", reason))
                    }
                }
            }
            output
        })
    }

    /// Book `user_name` into the first class matching `class_name`.
    pub fn book_class(&self, class_name: &str, user_name: &str) -> BookingOutcome {
        let (class_name, user_name) = match validate_pair(class_name, user_name) {
            Ok(pair) => pair,
            Err(e) => return BookingOutcome::Rejected(e),
        };

        let result = self.transact(|entries| {
            let Some(class) = find_class(entries, class_name) else {
                return (
                    BookingOutcome::NotFound {
                        query: class_name.to_string(),
                    },
                    false,
                );
            };

            if class.is_booked_by(user_name) {
                return (
                    BookingOutcome::AlreadyBooked {
                        class_name: class.class_name.clone(),
                        user_name: user_name.to_string(),
                    },
                    false,
                );
            }

            if class.is_full() {
                return (
                    BookingOutcome::Full {
                        class_name: class.class_name.clone(),
                    },
                    false,
                );
            }

            class.booked_by.push(user_name.to_string());
            (
                BookingOutcome::Booked {
                    class_name: class.class_name.clone(),
                    user_name: user_name.to_string(),
                },
                true,
            )
        });

        result.unwrap_or_else(|e| BookingOutcome::SaveFailed(e.to_string()))
    }

    /// Remove `user_name` from the first class matching `class_name`.
    pub fn cancel_booking(&self, class_name: &str, user_name: &str) -> CancelOutcome {
        let (class_name, user_name) = match validate_pair(class_name, user_name) {
            Ok(pair) => pair,
            Err(e) => return CancelOutcome::Rejected(e),
        };

        let result = self.transact(|entries| {
            let Some(class) = find_class(entries, class_name) else {
                return (
                    CancelOutcome::NotFound {
                        query: class_name.to_string(),
                    },
                    false,
                );
            };

            match class.booked_by.iter().position(|u| u == user_name) {
                Some(index) => {
                    class.booked_by.remove(index);
                    (
                        CancelOutcome::Cancelled {
                            class_name: class.class_name.clone(),
                            user_name: user_name.to_string(),
                        },
                        true,
                    )
                }
                None => (
                    CancelOutcome::NotBooked {
                        class_name: class.class_name.clone(),
                        user_name: user_name.to_string(),
                    },
                    false,
                ),
            }
        });

        result.unwrap_or_else(|e| CancelOutcome::SaveFailed(e.to_string()))
    }

    /// Every class `user_name` is booked into.
    pub fn get_my_bookings(&self, user_name: &str) -> UserBookings {
        let user_name = match validate_user(user_name) {
            Ok(user) => user,
            Err(e) => return UserBookings::Rejected(e),
        };

        let classes: Vec<ClassRecord> = self.read(|entries| {
            entries
                .iter()
                .filter_map(StoredEntry::as_class)
                .filter(|c| c.is_booked_by(user_name))
                .cloned()
                .collect()
        });

        if classes.is_empty() {
            UserBookings::Empty {
                user_name: user_name.to_string(),
            }
        } else {
            UserBookings::Found {
                user_name: user_name.to_string(),
                classes,
            }
        }
    }

    /// Run a read-only view over freshly loaded entries.
    fn read<T>(&self, f: impl FnOnce(&[StoredEntry]) -> T) -> T {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(path) = &self.path {
            *entries = load_entries(path);
        }
        f(&entries)
    }

    /// Load, apply `f`, and save if `f` reports a change.
    fn transact<T>(&self, f: impl FnOnce(&mut Vec<StoredEntry>) -> (T, bool)) -> Result<T> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(path) = &self.path {
            *entries = load_entries(path);
        }

        let (value, changed) = f(&mut entries);

        if changed {
            if let Some(path) = &self.path {
                if let Err(e) = save_entries(path, &entries) {
                    error!("Error saving bookings to {}: {}", path.display(), e);
                    return Err(e);
                }
                debug!("Saved {} entries to {}", entries.len(), path.display());
            }
        }

        Ok(value)
    }
}

fn find_class<'a>(entries: &'a mut [StoredEntry], class_name: &str) -> Option<&'a mut ClassRecord> {
    entries
        .iter_mut()
        .filter_map(StoredEntry::as_class_mut)
        .find(|c| c.matches(class_name))
}

/// Read the bookings document, degrading to an empty schedule on any failure.
pub(crate) fn load_entries(path: &Path) -> Vec<StoredEntry> {
    if !path.exists() {
        return Vec::new();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Error loading bookings from {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Array(items)) => items.into_iter().map(StoredEntry::from_value).collect(),
        Ok(_) => {
            warn!(
                "Invalid data format in {}, expected a JSON array; treating as empty",
                path.display()
            );
            Vec::new()
        }
        Err(e) => {
            warn!("JSON decode error in {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Atomically replace the bookings document.
pub(crate) fn save_entries(path: &Path, entries: &[StoredEntry]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut file = tempfile::NamedTempFile::new_in(&dir)?;
    {
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut file, formatter);
        entries.serialize(&mut serializer)?;
    }
    file.write_all(b"\n")?;
    file.persist(path)
        .map_err(|e| GymError::Store(format!("failed to replace {}: {}", path.display(), e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seed() -> Vec<ClassRecord> {
        vec![
            ClassRecord::new("Yoga", "Monday", "10:00", 2),
            ClassRecord::new("Pilates", "Tuesday", "11:00", 1).with_bookings(["Alice"]),
        ]
    }

    fn file_store(dir: &tempfile::TempDir) -> BookingStore {
        let path = dir.path().join("bookings.json");
        let store = BookingStore::open(&path);
        store.replace_all(seed()).unwrap();
        store
    }

    #[test]
    fn test_list_classes_reports_remaining_slots() {
        let store = BookingStore::in_memory(seed());
        let listing = store.list_classes();
        assert!(listing.starts_with("Available Classes:\n"));
        assert!(listing.contains("- Yoga (Monday 10:00): 2 slots left"));
        assert!(listing.contains("- Pilates (Tuesday 11:00): 1 slots left"));
    }

    #[test]
    fn test_list_classes_empty() {
        let store = BookingStore::in_memory(Vec::new());
        assert_eq!(store.list_classes(), "No classes available.");
    }

    #[test]
    fn test_book_until_full() {
        let store = BookingStore::in_memory(vec![ClassRecord::new("Spin", "Friday", "18:00", 3)]);
        for user in ["a", "b", "c"] {
            assert!(store.book_class("Spin", user).is_booked());
        }
        assert_eq!(
            store.book_class("Spin", "d"),
            BookingOutcome::Full {
                class_name: "Spin".to_string()
            }
        );
        assert_eq!(store.classes()[0].booked_by, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_book_full_class_from_seed() {
        let store = BookingStore::in_memory(seed());
        let message = store.book_class("Pilates", "Bob").to_string();
        assert_eq!(message, "Sorry, Pilates is full.");
    }

    #[test]
    fn test_double_booking_is_noop() {
        let store = BookingStore::in_memory(seed());
        assert!(store.book_class("Yoga", "Bob").is_booked());
        let before = store.classes();

        let outcome = store.book_class("Yoga", "Bob");
        assert_eq!(outcome.to_string(), "Bob is already booked for Yoga.");
        assert_eq!(store.classes(), before);
    }

    #[test]
    fn test_class_match_is_case_insensitive() {
        let store = BookingStore::in_memory(vec![ClassRecord::new("Yoga", "Monday", "10:00", 5)]);
        assert_eq!(
            store.book_class("yoga", "u1").to_string(),
            "Successfully booked Yoga for u1."
        );
        assert!(store.book_class("Yoga", "u2").is_booked());
        assert!(store.book_class("YOGA", "u3").is_booked());
        assert_eq!(store.classes()[0].booked_by.len(), 3);
    }

    #[test]
    fn test_inputs_are_trimmed() {
        let store = BookingStore::in_memory(seed());
        assert!(store.book_class("  Yoga  ", "  Bob ").is_booked());
        assert!(store.classes()[0].is_booked_by("Bob"));
    }

    #[test]
    fn test_unknown_class_not_found() {
        let store = BookingStore::in_memory(seed());
        assert_eq!(
            store.book_class("Boxing", "Bob").to_string(),
            "Class 'Boxing' not found."
        );
        assert_eq!(
            store.cancel_booking("Boxing", "Bob").to_string(),
            "Class 'Boxing' not found."
        );
    }

    #[test]
    fn test_empty_inputs_rejected_without_store_access() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookings.json");
        std::fs::write(&path, "not json").unwrap();
        let store = BookingStore::open(&path);

        assert_eq!(
            store.book_class("", "Bob").to_string(),
            "Error: Class name cannot be empty."
        );
        assert_eq!(
            store.book_class("Yoga", "   ").to_string(),
            "Error: User name cannot be empty."
        );
        assert_eq!(
            store.cancel_booking(" ", "Bob").to_string(),
            "Error: Class name cannot be empty."
        );
        assert_eq!(
            store.cancel_booking("Yoga", "").to_string(),
            "Error: User name cannot be empty."
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json");
    }

    #[test]
    fn test_cancel_booking() {
        let store = BookingStore::in_memory(seed());
        assert_eq!(
            store.cancel_booking("pilates", "Alice").to_string(),
            "Booking cancelled for Alice in Pilates."
        );
        assert!(store.classes()[1].booked_by.is_empty());
    }

    #[test]
    fn test_cancel_without_booking_does_not_mutate() {
        let store = BookingStore::in_memory(seed());
        let before = store.classes();
        let outcome = store.cancel_booking("Yoga", "Nobody");
        assert_eq!(outcome.to_string(), "Nobody does not have a booking for Yoga.");
        assert!(!outcome.is_cancelled());
        assert_eq!(store.classes(), before);
    }

    #[test]
    fn test_get_my_bookings() {
        let store = BookingStore::in_memory(seed());
        let found = store.get_my_bookings("Alice").to_string();
        assert!(found.contains("Pilates"));
        assert!(!found.contains("Yoga"));

        assert_eq!(
            store.get_my_bookings("NewUser").to_string(),
            "NewUser has no bookings."
        );
        assert_eq!(
            store.get_my_bookings(" ").to_string(),
            "Error: User name cannot be empty."
        );
    }

    #[test]
    fn test_file_store_persists_between_instances() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(&dir);
        assert!(store.book_class("Yoga", "Bob").is_booked());

        let reopened = BookingStore::open(dir.path().join("bookings.json"));
        assert!(reopened.classes()[0].is_booked_by("Bob"));
        assert!(reopened.list_classes().contains("Yoga (Monday 10:00): 1 slots left"));
    }

    #[test]
    fn test_file_store_picks_up_external_edits() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(&dir);
        let path = dir.path().join("bookings.json");

        std::fs::write(
            &path,
            json!([{"class_name": "Boxing", "day": "Sunday", "time": "09:00", "slots": 4, "booked_by": []}])
                .to_string(),
        )
        .unwrap();

        assert!(store.book_class("boxing", "Eve").is_booked());
        assert_eq!(store.classes().len(), 1);
    }

    #[test]
    fn test_saved_document_format() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(&dir);
        let content = std::fs::read_to_string(dir.path().join("bookings.json")).unwrap();
        assert!(content.starts_with("[\n    {\n        \"class_name\": \"Yoga\""));

        let value: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value[1]["booked_by"], json!(["Alice"]));
        drop(store);
    }

    #[test]
    fn test_non_ascii_names_kept_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(&dir);
        assert!(store.book_class("Yoga", "José").is_booked());
        let content = std::fs::read_to_string(dir.path().join("bookings.json")).unwrap();
        assert!(content.contains("José"));
    }

    #[test]
    fn test_malformed_record_listed_and_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookings.json");
        let document = json!([
            {"class_name": "Broken", "slots": 3},
            {"class_name": "Yoga", "day": "Monday", "time": "10:00", "slots": 2, "booked_by": []}
        ]);
        std::fs::write(&path, document.to_string()).unwrap();

        let store = BookingStore::open(&path);
        let listing = store.list_classes();
        assert!(listing.contains("- [Invalid class data: missing field `day`"));
        assert!(listing.contains("- Yoga (Monday 10:00): 2 slots left"));

        assert!(store.book_class("Yoga", "Bob").is_booked());
        let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved[0], json!({"class_name": "Broken", "slots": 3}));
        assert_eq!(saved[1]["booked_by"], json!(["Bob"]));
    }

    #[test]
    fn test_corrupt_document_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookings.json");
        std::fs::write(&path, "{ not valid").unwrap();
        let store = BookingStore::open(&path);
        assert_eq!(store.list_classes(), "No classes available.");

        std::fs::write(&path, r#"{"class_name": "Yoga"}"#).unwrap();
        assert_eq!(store.list_classes(), "No classes available.");
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = BookingStore::open(dir.path().join("missing.json"));
        assert!(store.classes().is_empty());
        assert_eq!(
            store.book_class("Yoga", "Bob").to_string(),
            "Class 'Yoga' not found."
        );
        assert!(!dir.path().join("missing.json").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_save_reports_error_and_keeps_document() {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = file_store(&dir);
        let path = dir.path().join("bookings.json");
        let before = std::fs::read_to_string(&path).unwrap();

        std::fs::set_permissions(dir.path(), Permissions::from_mode(0o555)).unwrap();
        // Privileged users ignore directory permissions; the save cannot fail then.
        if tempfile::NamedTempFile::new_in(dir.path()).is_ok() {
            std::fs::set_permissions(dir.path(), Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let booked = store.book_class("Yoga", "Bob");
        let cancelled = store.cancel_booking("Pilates", "Alice");
        let after = std::fs::read_to_string(&path).unwrap();
        let classes = store.classes();
        std::fs::set_permissions(dir.path(), Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(booked, BookingOutcome::SaveFailed(_)));
        assert!(booked
            .to_string()
            .starts_with("Error: could not save bookings: "));
        assert!(matches!(cancelled, CancelOutcome::SaveFailed(_)));
        assert!(cancelled
            .to_string()
            .starts_with("Error: could not save bookings: "));

        assert_eq!(after, before);
        assert_eq!(classes, seed());
    }

    #[test]
    fn test_replace_all_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let store = BookingStore::open(blocker.join("bookings.json"));
        assert!(store.replace_all(seed()).is_err());
        assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "x");
    }

    #[test]
    fn test_concurrent_bookings_respect_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookings.json");
        let store = std::sync::Arc::new(BookingStore::open(&path));
        store
            .replace_all(vec![ClassRecord::new("Spin", "Friday", "18:00", 5)])
            .unwrap();

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || store.book_class("Spin", &format!("user{}", i)))
            })
            .collect();

        let booked = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(BookingOutcome::is_booked)
            .count();

        assert_eq!(booked, 5);
        let reopened = BookingStore::open(&path);
        assert_eq!(reopened.classes()[0].booked_by.len(), 5);
    }
}
