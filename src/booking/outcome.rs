//! Results of booking operations.
//!
//! Every variant renders as the message shown to the user.

use super::record::ClassRecord;
use std::fmt;
use thiserror::Error;

/// Rejected arguments, caught before the store is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Error: Class name cannot be empty.")]
    EmptyClassName,

    #[error("Error: User name cannot be empty.")]
    EmptyUserName,
}

/// Trim and validate a class/user pair.
pub(crate) fn validate_pair<'a>(
    class_name: &'a str,
    user_name: &'a str,
) -> Result<(&'a str, &'a str), InputError> {
    let class_name = class_name.trim();
    if class_name.is_empty() {
        return Err(InputError::EmptyClassName);
    }
    Ok((class_name, validate_user(user_name)?))
}

pub(crate) fn validate_user(user_name: &str) -> Result<&str, InputError> {
    let user_name = user_name.trim();
    if user_name.is_empty() {
        return Err(InputError::EmptyUserName);
    }
    Ok(user_name)
}

/// Result of `book_class`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Rejected(InputError),
    Booked { class_name: String, user_name: String },
    AlreadyBooked { class_name: String, user_name: String },
    Full { class_name: String },
    NotFound { query: String },
    SaveFailed(String),
}

impl BookingOutcome {
    /// Whether the roster changed.
    pub fn is_booked(&self) -> bool {
        matches!(self, BookingOutcome::Booked { .. })
    }
}

impl fmt::Display for BookingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingOutcome::Rejected(e) => write!(f, "{}", e),
            BookingOutcome::Booked {
                class_name,
                user_name,
            } => write!(f, "Successfully booked {} for {}.", class_name, user_name),
            BookingOutcome::AlreadyBooked {
                class_name,
                user_name,
            } => write!(f, "{} is already booked for {}.", user_name, class_name),
            BookingOutcome::Full { class_name } => write!(f, "Sorry, {} is full.", class_name),
            BookingOutcome::NotFound { query } => write!(f, "Class '{}' not found.", query),
            BookingOutcome::SaveFailed(e) => write!(f, "Error: could not save bookings: {}", e),
        }
    }
}

/// Result of `cancel_booking`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    Rejected(InputError),
    Cancelled { class_name: String, user_name: String },
    NotBooked { class_name: String, user_name: String },
    NotFound { query: String },
    SaveFailed(String),
}

impl CancelOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CancelOutcome::Cancelled { .. })
    }
}

impl fmt::Display for CancelOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelOutcome::Rejected(e) => write!(f, "{}", e),
            CancelOutcome::Cancelled {
                class_name,
                user_name,
            } => write!(f, "Booking cancelled for {} in {}.", user_name, class_name),
            CancelOutcome::NotBooked {
                class_name,
                user_name,
            } => write!(f, "{} does not have a booking for {}.", user_name, class_name),
            CancelOutcome::NotFound { query } => write!(f, "Class '{}' not found.", query),
            CancelOutcome::SaveFailed(e) => write!(f, "Error: could not save bookings: {}", e),
        }
    }
}

/// Result of `get_my_bookings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserBookings {
    Rejected(InputError),
    Empty { user_name: String },
    Found {
        user_name: String,
        classes: Vec<ClassRecord>,
    },
}

impl fmt::Display for UserBookings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserBookings::Rejected(e) => write!(f, "{}", e),
            UserBookings::Empty { user_name } => write!(f, "{} has no bookings.", user_name),
            UserBookings::Found { user_name, classes } => {
                write!(f, "Bookings for {}:", user_name)?;
                for class in classes {
                    write!(f, "\n- {} ({} {})", class.class_name, class.day, class.time)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_pair_trims() {
        assert_eq!(validate_pair("  Yoga ", " Bob"), Ok(("Yoga", "Bob")));
    }

    #[test]
    fn test_validate_pair_checks_class_first() {
        assert_eq!(validate_pair(" ", ""), Err(InputError::EmptyClassName));
        assert_eq!(validate_pair("Yoga", "\t"), Err(InputError::EmptyUserName));
    }

    #[test]
    fn test_found_bookings_display() {
        let outcome = UserBookings::Found {
            user_name: "Alice".to_string(),
            classes: vec![
                ClassRecord::new("Yoga", "Monday", "10:00", 2),
                ClassRecord::new("Pilates", "Tuesday", "11:00", 1),
            ],
        };
        assert_eq!(
            outcome.to_string(),
            "Bookings for Alice:\n- Yoga (Monday 10:00)\n- Pilates (Tuesday 11:00)"
        );
    }
}
