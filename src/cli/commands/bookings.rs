//! Direct booking commands.

use crate::booking::{BookingStore, UserBookings};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// List every class with its free slots.
pub fn run_classes(settings: &Settings) -> Result<()> {
    let store = BookingStore::from_settings(settings);
    Output::header("Classes");
    println!("{}", store.list_classes());
    Ok(())
}

/// Book `class` for `user`.
pub fn run_book(class: &str, user: &str, settings: &Settings) -> Result<()> {
    let store = BookingStore::from_settings(settings);
    let outcome = store.book_class(class, user);
    if outcome.is_booked() {
        Output::success(&outcome.to_string());
    } else {
        Output::error(&outcome.to_string());
    }
    Ok(())
}

/// Cancel `user`'s booking for `class`.
pub fn run_cancel(class: &str, user: &str, settings: &Settings) -> Result<()> {
    let store = BookingStore::from_settings(settings);
    let outcome = store.cancel_booking(class, user);
    if outcome.is_cancelled() {
        Output::success(&outcome.to_string());
    } else {
        Output::error(&outcome.to_string());
    }
    Ok(())
}

/// Show the classes `user` is booked into.
pub fn run_bookings(user: &str, settings: &Settings) -> Result<()> {
    let store = BookingStore::from_settings(settings);
    let bookings = store.get_my_bookings(user);
    match &bookings {
        UserBookings::Rejected(_) => Output::error(&bookings.to_string()),
        _ => println!("{}", bookings),
    }
    Ok(())
}
