//! Gym class schedule and booking rules.
//!
//! The schedule is a single JSON document holding an ordered list of
//! class records. Every operation loads the whole document, changes at
//! most one record and writes the whole document back.

mod outcome;
mod record;
mod store;

pub use outcome::{BookingOutcome, CancelOutcome, InputError, UserBookings};
pub use record::{sample_classes, ClassRecord, StoredEntry};
pub use store::BookingStore;
