//! Bundled sample records
//!
//! Used when the durable slot is empty, missing or unreadable, and as the
//! static customer and team directories.

use crate::types::{Customer, Ticket, User};

const SEED_TICKETS: &str = include_str!("../data/tickets.json");
const SEED_CUSTOMERS: &str = include_str!("../data/customers.json");
const SEED_USERS: &str = include_str!("../data/users.json");

/// Sample tickets, newest activity first as shipped.
pub fn tickets() -> Vec<Ticket> {
    serde_json::from_str(SEED_TICKETS).expect("bundled seed tickets are valid JSON")
}

/// Sample customers.
pub fn customers() -> Vec<Customer> {
    serde_json::from_str(SEED_CUSTOMERS).expect("bundled seed customers are valid JSON")
}

/// Sample team members.
pub fn users() -> Vec<User> {
    serde_json::from_str(SEED_USERS).expect("bundled seed users are valid JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MessageKind, TicketStatus};

    #[test]
    fn test_seed_parses() {
        assert_eq!(tickets().len(), 5);
        assert_eq!(customers().len(), 3);
        assert_eq!(users().len(), 3);
    }

    #[test]
    fn test_seed_tickets_hold_invariants() {
        for ticket in tickets() {
            assert!(!ticket.subject.is_empty());
            assert!(ticket.updated_at >= ticket.created_at);
            assert_eq!(ticket.conversation[0].kind, MessageKind::Customer);
            for (i, message) in ticket.conversation.iter().enumerate() {
                assert_eq!(message.id as usize, i + 1);
                assert!(message.created_at >= ticket.created_at);
            }
        }
    }

    #[test]
    fn test_seed_ticket_1004_is_open_and_unassigned() {
        let tickets = tickets();
        let ticket = tickets.iter().find(|t| t.id == 1004).unwrap();
        assert_eq!(ticket.status, TicketStatus::Open);
        assert!(ticket.assigned_to.is_none());
    }
}
