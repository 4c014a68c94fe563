//! gymbot - Gym Class Booking Assistant
//!
//! A conversational assistant that books, lists and cancels gym-class
//! reservations, and manages events on the user's calendar.
//!
//! # Overview
//!
//! gymbot allows you to:
//! - Keep a JSON-backed schedule of classes with per-class capacity
//! - Book and cancel classes from a chat session, an MCP client, or HTTP
//! - Create, list and delete Google Calendar events by weekday name
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `booking` - The class schedule and its booking rules
//! - `calendar` - Calendar provider abstraction and the Google implementation
//! - `tools` - Named tools with static schemas and a dispatcher
//! - `agent` - Chat completion loop with tool calling
//! - `mcp` - MCP server over stdio
//!
//! # Example
//!
//! ```rust,no_run
//! use gymbot::booking::BookingStore;
//!
//! let store = BookingStore::open("bookings.json");
//! println!("{}", store.list_classes());
//! println!("{}", store.book_class("Yoga", "Alice"));
//! ```

pub mod agent;
pub mod booking;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod error;
pub mod mcp;
pub mod openai;
pub mod tools;

pub use error::{GymError, Result};
