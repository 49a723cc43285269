//! # helpdesk-core
//!
//! Core library for helpdesk - a customer-support ticket inbox.
//!
//! This library provides:
//! - Domain types for tickets, messages, customers and team members
//! - A ticket store that persists the whole list into a durable key-value slot
//! - Pure query functions for the inbox, customer and team views
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Persistence
//!
//! The ticket list lives in a single slot, serialized as JSON. Reads fall back
//! to the bundled seed data when the slot is missing or unreadable; failed
//! writes are recorded on the store and never lose the in-memory change.
//!
//! ## Example
//!
//! ```rust,no_run
//! use helpdesk_core::{Config, Database, Directory, TicketStore};
//! use helpdesk_core::query::{filter_tickets, TicketQuery};
//!
//! let config = Config::load().expect("failed to load config");
//!
//! let db = Database::open(&config.resolved_database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let store = TicketStore::open_with_key(&db, config.storage.tickets_key.as_str());
//! let directory = Directory::seeded();
//! let open = filter_tickets(store.tickets(), &TicketQuery::new(), &directory);
//! println!("{} tickets", open.len());
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::{Database, MemorySlots, SlotStore};
pub use directory::Directory;
pub use error::{Error, PersistenceError, Result};
pub use store::{TicketSource, TicketStore, TICKETS_KEY};
pub use types::*;

// Public modules
pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod format;
pub mod logging;
pub mod query;
pub mod seed;
pub mod stats;
pub mod store;
pub mod types;
