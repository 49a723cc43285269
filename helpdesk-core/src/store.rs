//! Ticket store
//!
//! [`TicketStore`] owns the session's ticket list and mirrors it to a durable
//! slot after every mutation. Every mutation is a read-modify-write of the
//! whole list:
//!
//! 1. read the list from the slot, or fall back to the in-memory list
//! 2. locate the ticket and apply the change to a copy
//! 3. swap the copy in and write the full list back
//!
//! Persistence is best effort. Slot failures are logged and kept as a typed
//! [`PersistenceError`] (see [`TicketStore::persistence_error`]) but never
//! fail the operation that triggered them.
//!
//! Two processes sharing one slot race with last-writer-wins semantics.

use crate::db::SlotStore;
use crate::directory::Directory;
use crate::error::{Error, PersistenceError, Result};
use crate::seed;
use crate::types::{
    CustomerId, DraftCustomer, Message, MessageKind, Ticket, TicketDraft, TicketId, TicketStatus,
    UserId,
};
use chrono::{DateTime, Utc};

/// Default slot key for the ticket list
pub const TICKETS_KEY: &str = "tickets";

/// Lowest id handed out to a created ticket
pub const FIRST_TICKET_ID: TicketId = 1000;

/// Source of the current time
pub type Clock = fn() -> DateTime<Utc>;

/// Where the in-memory list came from on the last load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketSource {
    /// The durable slot
    Durable,
    /// Bundled seed data (slot missing, empty or unreadable)
    Seed,
}

/// The single source of truth for the session's tickets.
pub struct TicketStore<S: SlotStore> {
    slots: S,
    key: String,
    tickets: Vec<Ticket>,
    source: TicketSource,
    persistence_error: Option<PersistenceError>,
    clock: Clock,
}

impl<S: SlotStore> TicketStore<S> {
    /// Open a store over the default `tickets` slot and load it.
    pub fn open(slots: S) -> Self {
        Self::open_with_key(slots, TICKETS_KEY)
    }

    /// Open a store over a custom slot key and load it.
    pub fn open_with_key(slots: S, key: impl Into<String>) -> Self {
        let mut store = Self {
            slots,
            key: key.into(),
            tickets: Vec::new(),
            source: TicketSource::Seed,
            persistence_error: None,
            clock: Utc::now,
        };
        store.load();
        store
    }

    /// Replace the clock used for `created_at`/`updated_at`.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    // ============================================
    // Accessors
    // ============================================

    /// Tickets in display order (most recently created first)
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    /// Look up a ticket for the detail view
    pub fn get(&self, id: TicketId) -> Result<&Ticket> {
        self.tickets
            .iter()
            .find(|t| t.id == id)
            .ok_or(Error::TicketNotFound(id))
    }

    pub fn source(&self) -> TicketSource {
        self.source
    }

    /// Slot failure from the most recent operation, if any
    pub fn persistence_error(&self) -> Option<&PersistenceError> {
        self.persistence_error.as_ref()
    }

    // ============================================
    // Load / save
    // ============================================

    /// Reload from the slot.
    ///
    /// Uses the slot's tickets when the slot exists, decodes and is
    /// non-empty; otherwise falls back to the seed tickets. Never fails.
    pub fn load(&mut self) -> &[Ticket] {
        self.persistence_error = None;

        match self.read_saved() {
            Some(tickets) => {
                tracing::debug!(count = tickets.len(), key = %self.key, "Loaded tickets from slot");
                self.tickets = tickets;
                self.source = TicketSource::Durable;
            }
            None => {
                self.tickets = seed::tickets();
                self.source = TicketSource::Seed;
                tracing::debug!(count = self.tickets.len(), "Loaded seed tickets");
            }
        }

        &self.tickets
    }

    /// Write the full in-memory list to the slot.
    ///
    /// Failures are logged and recorded, not returned.
    pub fn save(&mut self) {
        self.persistence_error = None;
        self.write_all();
    }

    /// Drop the slot and go back to seed data.
    pub fn reset(&mut self) {
        self.persistence_error = None;
        if let Err(e) = self.slots.remove(&self.key) {
            self.record(e);
        }
        self.tickets = seed::tickets();
        self.source = TicketSource::Seed;
        tracing::info!(key = %self.key, "Ticket slot reset to seed data");
    }

    // ============================================
    // Mutations
    // ============================================

    /// Open a new ticket.
    ///
    /// The subject and first message must be non-blank, and a new customer
    /// needs a name and email. Nothing changes when validation fails.
    pub fn create(&mut self, draft: TicketDraft, directory: &mut Directory) -> Result<Ticket> {
        self.persistence_error = None;

        let subject = draft.subject.trim();
        let content = draft.content.trim();
        if subject.is_empty() || content.is_empty() {
            return Err(Error::validation("subject and message are required"));
        }

        let mut tickets = self.current_list();
        let now = (self.clock)();
        let customer_id = match &draft.customer {
            DraftCustomer::Existing(id) => directory
                .customer(*id)
                .map(|c| c.id)
                .ok_or(Error::CustomerNotFound(*id))?,
            // Saved tickets may reference customers registered by an earlier session
            DraftCustomer::New(customer) => {
                directory.register_customer(customer, highest_customer_ref(&tickets), now)?
            }
        };

        let id = tickets
            .iter()
            .map(|t| t.id)
            .max()
            .map_or(FIRST_TICKET_ID, |max| (max + 1).max(FIRST_TICKET_ID));

        let ticket = Ticket {
            id,
            subject: subject.to_string(),
            status: TicketStatus::Open,
            priority: draft.priority,
            customer_id,
            assigned_to: draft.assigned_to,
            created_at: now,
            updated_at: now,
            tags: draft.tags().to_vec(),
            conversation: vec![Message {
                id: 1,
                kind: MessageKind::Customer,
                from: customer_id,
                content: content.to_string(),
                created_at: now,
            }],
        };

        tickets.insert(0, ticket.clone());
        self.tickets = tickets;
        self.write_all();

        tracing::info!(ticket_id = id, customer_id, "Created ticket");
        Ok(ticket)
    }

    /// Append an agent reply.
    ///
    /// An `open` ticket moves to `in_progress`; other statuses are kept.
    pub fn append_reply(&mut self, id: TicketId, body: &str, author: UserId) -> Result<Ticket> {
        self.persistence_error = None;

        let body = body.trim();
        if body.is_empty() {
            return Err(Error::validation("message cannot be empty"));
        }

        let ticket = self.modify(id, |ticket, now| {
            ticket.conversation.push(Message {
                id: ticket.next_message_id(),
                kind: MessageKind::Agent,
                from: author,
                content: body.to_string(),
                created_at: now,
            });
            if ticket.status == TicketStatus::Open {
                ticket.status = TicketStatus::InProgress;
            }
        })?;

        tracing::info!(
            ticket_id = id,
            author,
            messages = ticket.conversation.len(),
            status = %ticket.status,
            "Appended reply"
        );
        Ok(ticket)
    }

    /// Set the status directly. Any status may follow any other.
    pub fn set_status(&mut self, id: TicketId, status: TicketStatus) -> Result<Ticket> {
        let ticket = self.modify(id, |ticket, _| ticket.status = status)?;
        tracing::info!(ticket_id = id, status = %status, "Updated ticket status");
        Ok(ticket)
    }

    /// Assign to a user, or unassign with `None`.
    pub fn set_assignee(&mut self, id: TicketId, assignee: Option<UserId>) -> Result<Ticket> {
        let ticket = self.modify(id, |ticket, _| ticket.assigned_to = assignee)?;
        tracing::info!(ticket_id = id, assignee = ?assignee, "Updated ticket assignee");
        Ok(ticket)
    }

    // ============================================
    // Internals
    // ============================================

    /// Read-modify-write a single ticket. `updated_at` is refreshed.
    fn modify<F>(&mut self, id: TicketId, change: F) -> Result<Ticket>
    where
        F: FnOnce(&mut Ticket, DateTime<Utc>),
    {
        self.persistence_error = None;

        let mut tickets = self.current_list();
        let index = tickets
            .iter()
            .position(|t| t.id == id)
            .ok_or(Error::TicketNotFound(id))?;

        let mut updated = tickets[index].clone();
        // updated_at never moves backwards, and nothing lands before created_at
        let now = (self.clock)().max(updated.updated_at);
        change(&mut updated, now);
        updated.updated_at = now;

        tickets[index] = updated.clone();
        self.tickets = tickets;
        self.write_all();

        Ok(updated)
    }

    /// The list a mutation starts from: the slot when it holds tickets,
    /// otherwise the in-memory list.
    fn current_list(&mut self) -> Vec<Ticket> {
        match self.read_saved() {
            Some(tickets) => tickets,
            None => self.tickets.clone(),
        }
    }

    /// Decode the slot. `None` when missing, empty or unreadable.
    fn read_saved(&mut self) -> Option<Vec<Ticket>> {
        let raw = match self.slots.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                self.record(e);
                return None;
            }
        };

        match serde_json::from_str::<Vec<Ticket>>(&raw) {
            Ok(tickets) if tickets.is_empty() => None,
            Ok(tickets) => Some(tickets),
            Err(e) => {
                self.record(PersistenceError::Corrupt {
                    key: self.key.clone(),
                    message: e.to_string(),
                });
                None
            }
        }
    }

    fn write_all(&mut self) {
        let json = match serde_json::to_string(&self.tickets) {
            Ok(json) => json,
            Err(e) => {
                self.record(PersistenceError::Serialize {
                    key: self.key.clone(),
                    message: e.to_string(),
                });
                return;
            }
        };

        match self.slots.write(&self.key, &json) {
            Ok(()) => {
                self.source = TicketSource::Durable;
                tracing::debug!(count = self.tickets.len(), key = %self.key, "Saved tickets");
            }
            Err(e) => self.record(e),
        }
    }

    fn record(&mut self, error: PersistenceError) {
        tracing::warn!(
            key = error.key(),
            error = %error,
            "Ticket persistence failed; continuing in memory"
        );
        self.persistence_error = Some(error);
    }
}

/// Highest customer id any ticket or customer message points at
fn highest_customer_ref(tickets: &[Ticket]) -> CustomerId {
    tickets
        .iter()
        .flat_map(|ticket| {
            let senders = ticket
                .conversation
                .iter()
                .filter(|m| m.kind == MessageKind::Customer)
                .map(|m| m.from);
            std::iter::once(ticket.customer_id).chain(senders)
        })
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemorySlots;
    use crate::query::{filter_tickets, TicketQuery};
    use crate::types::{NewCustomer, Priority};
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 6, 12, 0, 0).unwrap()
    }

    fn long_ago() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    fn draft(subject: &str, content: &str) -> TicketDraft {
        TicketDraft::new(DraftCustomer::Existing(101), subject, content)
    }

    #[test]
    fn test_missing_slot_loads_seed() {
        let store = TicketStore::open(MemorySlots::new());
        assert_eq!(store.source(), TicketSource::Seed);
        assert_eq!(store.tickets(), seed::tickets().as_slice());
        assert!(store.persistence_error().is_none());
    }

    #[test]
    fn test_empty_slot_loads_seed() {
        let store = TicketStore::open(MemorySlots::with_slot(TICKETS_KEY, "[]"));
        assert_eq!(store.source(), TicketSource::Seed);
        assert_eq!(store.tickets().len(), 5);
        assert!(store.persistence_error().is_none());
    }

    #[test]
    fn test_corrupt_slot_loads_seed_and_records_error() {
        let store = TicketStore::open(MemorySlots::with_slot(TICKETS_KEY, "{not json"));
        assert_eq!(store.source(), TicketSource::Seed);
        assert_eq!(store.tickets(), seed::tickets().as_slice());
        assert!(matches!(
            store.persistence_error(),
            Some(PersistenceError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_create_builds_open_ticket_with_one_message() {
        let slots = MemorySlots::new();
        let mut directory = Directory::seeded();
        let mut store = TicketStore::open(&slots).with_clock(fixed_now);

        let ticket = store
            .create(
                draft("  Cannot export CSV ", " Export button does nothing ")
                    .with_priority(Priority::High)
                    .with_tags(["Export", "export", "csv"]),
                &mut directory,
            )
            .unwrap();

        assert_eq!(ticket.id, 1006);
        assert_eq!(ticket.subject, "Cannot export CSV");
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.priority, Priority::High);
        assert_eq!(ticket.created_at, ticket.updated_at);
        assert_eq!(ticket.tags, vec!["export", "csv"]);
        assert_eq!(ticket.conversation.len(), 1);
        assert_eq!(ticket.conversation[0].id, 1);
        assert_eq!(ticket.conversation[0].kind, MessageKind::Customer);
        assert_eq!(ticket.conversation[0].from, 101);
        assert_eq!(ticket.conversation[0].content, "Export button does nothing");

        // Prepended and persisted
        assert_eq!(store.tickets()[0].id, 1006);
        assert_eq!(store.tickets().len(), 6);
        let saved: Vec<Ticket> = serde_json::from_str(&slots.peek(TICKETS_KEY).unwrap()).unwrap();
        assert_eq!(saved, store.tickets());
    }

    #[test]
    fn test_create_rejects_empty_subject() {
        let slots = MemorySlots::new();
        let mut directory = Directory::seeded();
        let mut store = TicketStore::open(&slots);
        let before = store.tickets().to_vec();

        let result = store.create(draft("", "x"), &mut directory);
        assert!(matches!(result, Err(Error::Validation(_))));
        let result = store.create(draft("Subject", "   "), &mut directory);
        assert!(matches!(result, Err(Error::Validation(_))));

        assert_eq!(store.tickets(), before.as_slice());
        assert!(slots.peek(TICKETS_KEY).is_none());
    }

    #[test]
    fn test_create_with_new_customer() {
        let mut directory = Directory::seeded();
        let mut store = TicketStore::open(MemorySlots::new());

        let customer = NewCustomer {
            name: "Priya Patel".to_string(),
            email: "priya@example.com".to_string(),
            ..Default::default()
        };
        let ticket = store
            .create(
                TicketDraft::new(DraftCustomer::New(customer), "Hello", "First contact"),
                &mut directory,
            )
            .unwrap();

        let customer = directory.customer(ticket.customer_id).unwrap();
        assert_eq!(customer.email, "priya@example.com");
        assert_eq!(ticket.conversation[0].from, customer.id);
    }

    #[test]
    fn test_new_customers_from_separate_sessions_get_distinct_ids() {
        let slots = MemorySlots::new();
        let new_customer = |name: &str, email: &str| NewCustomer {
            name: name.to_string(),
            email: email.to_string(),
            ..Default::default()
        };

        let mut first_directory = Directory::seeded();
        let first = TicketStore::open(&slots)
            .create(
                TicketDraft::new(
                    DraftCustomer::New(new_customer("Priya Patel", "priya@example.com")),
                    "Hello",
                    "First contact",
                ),
                &mut first_directory,
            )
            .unwrap();

        // A later session starts from the bundled directory again
        let mut second_directory = Directory::seeded();
        let mut second_store = TicketStore::open(&slots);
        let second = second_store
            .create(
                TicketDraft::new(
                    DraftCustomer::New(new_customer("Tom Okafor", "tom@example.com")),
                    "Billing question",
                    "Where is my invoice?",
                ),
                &mut second_directory,
            )
            .unwrap();

        assert_eq!(first.customer_id, 104);
        assert_eq!(second.customer_id, 105);

        let found = filter_tickets(
            second_store.tickets(),
            &TicketQuery::new().search("tom@example.com"),
            &second_directory,
        );
        let ids: Vec<TicketId> = found.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![second.id]);
    }

    #[test]
    fn test_new_customer_id_skips_customer_message_senders() {
        let mut saved = seed::tickets();
        saved[0].conversation[0].from = 250;
        let slots = MemorySlots::with_slot(TICKETS_KEY, &serde_json::to_string(&saved).unwrap());
        let mut directory = Directory::seeded();
        let mut store = TicketStore::open(&slots);

        let ticket = store
            .create(
                TicketDraft::new(
                    DraftCustomer::New(NewCustomer {
                        name: "Priya Patel".to_string(),
                        email: "priya@example.com".to_string(),
                        ..Default::default()
                    }),
                    "Hello",
                    "First contact",
                ),
                &mut directory,
            )
            .unwrap();
        assert_eq!(ticket.customer_id, 251);
    }

    #[test]
    fn test_loads_list_saved_with_string_ids() {
        let raw = r#"[{
            "id": 1006,
            "subject": "Refund request",
            "status": "open",
            "priority": "medium",
            "customer_id": "101",
            "assigned_to": null,
            "created_at": "2025-01-06T10:00:00Z",
            "updated_at": "2025-01-06T10:00:00Z",
            "tags": [],
            "conversation": [{
                "id": 1,
                "type": "customer",
                "from": "101",
                "content": "I was charged twice.",
                "created_at": "2025-01-06T10:00:00Z"
            }]
        }]"#;
        let slots = MemorySlots::with_slot(TICKETS_KEY, raw);
        let mut store = TicketStore::open(&slots);

        assert_eq!(store.source(), TicketSource::Durable);
        assert!(store.persistence_error().is_none());
        let ticket = store.get(1006).unwrap();
        assert_eq!(ticket.customer_id, 101);
        assert_eq!(ticket.conversation[0].from, 101);

        // Rewritten with numeric ids on the next mutation
        store.append_reply(1006, "Refund issued.", 1).unwrap();
        let saved: serde_json::Value = serde_json::from_str(&slots.peek(TICKETS_KEY).unwrap()).unwrap();
        assert_eq!(saved[0]["customer_id"], 101);
        assert_eq!(saved[0]["conversation"][0]["from"], 101);
    }

    #[test]
    fn test_create_with_incomplete_new_customer_changes_nothing() {
        let mut directory = Directory::seeded();
        let mut store = TicketStore::open(MemorySlots::new());

        let customer = NewCustomer {
            name: "Priya Patel".to_string(),
            ..Default::default()
        };
        let result = store.create(
            TicketDraft::new(DraftCustomer::New(customer), "Hello", "First contact"),
            &mut directory,
        );

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(directory.customers().len(), 3);
        assert_eq!(store.tickets().len(), 5);
    }

    #[test]
    fn test_create_with_unknown_customer() {
        let mut directory = Directory::seeded();
        let mut store = TicketStore::open(MemorySlots::new());

        let result = store.create(
            TicketDraft::new(DraftCustomer::Existing(999), "Hello", "Body"),
            &mut directory,
        );
        assert!(matches!(result, Err(Error::CustomerNotFound(999))));
    }

    #[test]
    fn test_reply_escalates_open_ticket() {
        let mut store = TicketStore::open(MemorySlots::new()).with_clock(fixed_now);

        let ticket = store.append_reply(1004, "Looking into it", 1).unwrap();
        assert_eq!(ticket.status, TicketStatus::InProgress);
        assert_eq!(ticket.conversation.len(), 2);

        let reply = ticket.last_message().unwrap();
        assert_eq!(reply.id, 2);
        assert_eq!(reply.kind, MessageKind::Agent);
        assert_eq!(reply.from, 1);
        assert_eq!(reply.created_at, fixed_now());
        assert_eq!(ticket.updated_at, fixed_now());
    }

    #[test]
    fn test_reply_keeps_other_statuses() {
        let mut store = TicketStore::open(MemorySlots::new());

        for status in [
            TicketStatus::InProgress,
            TicketStatus::Resolved,
            TicketStatus::Closed,
        ] {
            store.set_status(1003, status).unwrap();
            let ticket = store.append_reply(1003, "Following up", 3).unwrap();
            assert_eq!(ticket.status, status);
        }
    }

    #[test]
    fn test_replies_get_sequential_ids() {
        let mut store = TicketStore::open(MemorySlots::new());

        for i in 0..4 {
            store
                .append_reply(1005, &format!("reply {}", i), 2)
                .unwrap();
        }

        let ticket = store.get(1005).unwrap();
        let ids: Vec<u32> = ticket.conversation.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_reply_rejected() {
        let slots = MemorySlots::new();
        let mut store = TicketStore::open(&slots);

        let result = store.append_reply(1004, "  \n ", 1);
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(store.get(1004).unwrap().conversation.len(), 1);
        assert!(slots.peek(TICKETS_KEY).is_none());
    }

    #[test]
    fn test_rejected_reply_clears_previous_persistence_error() {
        let slots = MemorySlots::new();
        let mut store = TicketStore::open(&slots);

        slots.fail_writes(true);
        store.set_status(1004, TicketStatus::Resolved).unwrap();
        assert!(store.persistence_error().is_some());

        slots.fail_writes(false);
        let result = store.append_reply(1004, "   ", 1);
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(store.persistence_error().is_none());
    }

    #[test]
    fn test_unknown_ticket_is_not_found() {
        let mut store = TicketStore::open(MemorySlots::new());

        assert!(matches!(store.get(42), Err(Error::TicketNotFound(42))));
        assert!(matches!(
            store.append_reply(42, "hello", 1),
            Err(Error::TicketNotFound(42))
        ));
        assert!(matches!(
            store.set_status(42, TicketStatus::Closed),
            Err(Error::TicketNotFound(42))
        ));
        assert!(matches!(
            store.set_assignee(42, None),
            Err(Error::TicketNotFound(42))
        ));
    }

    #[test]
    fn test_status_and_assignee_never_move_updated_at_backwards() {
        let mut store = TicketStore::open(MemorySlots::new()).with_clock(long_ago);
        let before = store.get(1001).unwrap().updated_at;

        let ticket = store.set_status(1001, TicketStatus::Closed).unwrap();
        assert_eq!(ticket.status, TicketStatus::Closed);
        assert!(ticket.updated_at >= before);

        let ticket = store.set_assignee(1001, None).unwrap();
        assert!(ticket.assigned_to.is_none());
        assert!(ticket.updated_at >= before);

        let ticket = store.set_assignee(1001, Some(3)).unwrap();
        assert_eq!(ticket.assigned_to, Some(3));
    }

    #[test]
    fn test_reply_with_lagging_clock_stays_after_creation() {
        let mut store = TicketStore::open(MemorySlots::new()).with_clock(long_ago);
        let before = store.get(1002).unwrap().clone();

        let ticket = store.append_reply(1002, "Checking the export job", 3).unwrap();
        let reply = ticket.last_message().unwrap();
        assert!(reply.created_at >= ticket.created_at);
        assert!(reply.created_at >= before.updated_at);
        assert!(ticket.updated_at >= before.updated_at);
        assert_eq!(ticket.updated_at, reply.created_at);
    }

    #[test]
    fn test_any_status_reachable_from_any_other() {
        let mut store = TicketStore::open(MemorySlots::new());
        for from in TicketStatus::ALL {
            for to in TicketStatus::ALL {
                store.set_status(1002, from).unwrap();
                assert_eq!(store.set_status(1002, to).unwrap().status, to);
            }
        }
    }

    #[test]
    fn test_mutation_reads_slot_before_writing() {
        let slots = MemorySlots::new();
        let mut first = TicketStore::open(&slots);
        let mut second = TicketStore::open(&slots);

        // Another view changes the slot behind `first`'s back
        second.set_status(1002, TicketStatus::Resolved).unwrap();

        first.set_assignee(1005, Some(2)).unwrap();
        assert_eq!(first.get(1002).unwrap().status, TicketStatus::Resolved);
        assert_eq!(first.get(1005).unwrap().assigned_to, Some(2));
    }

    #[test]
    fn test_write_failure_keeps_in_memory_change() {
        let slots = MemorySlots::new();
        let mut store = TicketStore::open(&slots);

        slots.fail_writes(true);
        let ticket = store.set_status(1004, TicketStatus::Closed).unwrap();
        assert_eq!(ticket.status, TicketStatus::Closed);
        assert_eq!(store.get(1004).unwrap().status, TicketStatus::Closed);
        assert!(matches!(
            store.persistence_error(),
            Some(PersistenceError::Write { .. })
        ));
        assert!(slots.peek(TICKETS_KEY).is_none());

        // Next successful save clears it and catches the slot up
        slots.fail_writes(false);
        store.save();
        assert!(store.persistence_error().is_none());
        let saved: Vec<Ticket> = serde_json::from_str(&slots.peek(TICKETS_KEY).unwrap()).unwrap();
        assert_eq!(saved, store.tickets());
    }

    #[test]
    fn test_read_failure_falls_back_to_memory() {
        let slots = MemorySlots::new();
        let mut store = TicketStore::open(&slots);
        store.set_status(1004, TicketStatus::Resolved).unwrap();

        slots.fail_reads(true);
        let ticket = store.append_reply(1004, "Closing the loop", 1).unwrap();
        assert_eq!(ticket.status, TicketStatus::Resolved);
        assert!(matches!(
            store.persistence_error(),
            Some(PersistenceError::Read { .. })
        ));

        slots.fail_reads(false);
        let reloaded = TicketStore::open(&slots);
        assert_eq!(reloaded.get(1004).unwrap().conversation.len(), 2);
    }

    #[test]
    fn test_reset_drops_slot() {
        let slots = MemorySlots::new();
        let mut store = TicketStore::open(&slots);
        store.set_status(1001, TicketStatus::Closed).unwrap();
        assert_eq!(store.source(), TicketSource::Durable);

        store.reset();
        assert!(slots.peek(TICKETS_KEY).is_none());
        assert_eq!(store.source(), TicketSource::Seed);
        assert_eq!(store.get(1001).unwrap().status, TicketStatus::Open);
    }
}
