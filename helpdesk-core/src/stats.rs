//! Counters for the inbox tabs, dashboard and directory pages.
//!
//! Everything is recomputed from the lists passed in; nothing is cached.

use crate::types::{
    Customer, MessageKind, Presence, Role, Ticket, TicketId, TicketStatus, User,
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Ticket totals per status, as shown on the inbox tabs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TicketCounts {
    pub all: usize,
    pub open: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
    pub unassigned: usize,
}

impl TicketCounts {
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        let mut counts = TicketCounts {
            all: tickets.len(),
            ..Default::default()
        };
        for ticket in tickets {
            match ticket.status {
                TicketStatus::Open => counts.open += 1,
                TicketStatus::InProgress => counts.in_progress += 1,
                TicketStatus::Resolved => counts.resolved += 1,
                TicketStatus::Closed => counts.closed += 1,
            }
            if ticket.is_unassigned() {
                counts.unassigned += 1;
            }
        }
        counts
    }

    pub fn for_status(&self, status: TicketStatus) -> usize {
        match status {
            TicketStatus::Open => self.open,
            TicketStatus::InProgress => self.in_progress,
            TicketStatus::Resolved => self.resolved,
            TicketStatus::Closed => self.closed,
        }
    }
}

/// A team member with the tickets currently assigned to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserWorkload<'a> {
    pub user: &'a User,
    pub assigned: usize,
    pub open: usize,
    pub in_progress: usize,
    pub resolved: usize,
}

/// Per-user assignment counts, in directory order.
pub fn user_workloads<'a>(users: &'a [User], tickets: &[Ticket]) -> Vec<UserWorkload<'a>> {
    users
        .iter()
        .map(|user| {
            let mut workload = UserWorkload {
                user,
                assigned: 0,
                open: 0,
                in_progress: 0,
                resolved: 0,
            };
            for ticket in tickets.iter().filter(|t| t.assigned_to == Some(user.id)) {
                workload.assigned += 1;
                match ticket.status {
                    TicketStatus::Open => workload.open += 1,
                    TicketStatus::InProgress => workload.in_progress += 1,
                    TicketStatus::Resolved => workload.resolved += 1,
                    TicketStatus::Closed => {}
                }
            }
            workload
        })
        .collect()
}

/// Customer page cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CustomerStats {
    pub total: usize,
    /// Customers whose counter is above zero
    pub with_tickets: usize,
    /// Mean of the denormalized `total_tickets` counters
    pub average_tickets: f64,
}

impl CustomerStats {
    pub fn from_customers(customers: &[Customer]) -> Self {
        let total = customers.len();
        let with_tickets = customers.iter().filter(|c| c.total_tickets > 0).count();
        let sum: u64 = customers.iter().map(|c| c.total_tickets as u64).sum();
        let average_tickets = if total == 0 {
            0.0
        } else {
            sum as f64 / total as f64
        };
        Self {
            total,
            with_tickets,
            average_tickets,
        }
    }
}

/// Team page cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeamStats {
    pub total: usize,
    pub online: usize,
    pub admins: usize,
    pub agents: usize,
}

impl TeamStats {
    pub fn from_users(users: &[User]) -> Self {
        Self {
            total: users.len(),
            online: users.iter().filter(|u| u.presence == Presence::Online).count(),
            admins: users.iter().filter(|u| u.role == Role::Admin).count(),
            agents: users.iter().filter(|u| u.role == Role::Agent).count(),
        }
    }
}

/// Unassigned tickets, newest first, at most `limit`.
pub fn needs_assignment(tickets: &[Ticket], limit: usize) -> Vec<&Ticket> {
    let mut unassigned: Vec<&Ticket> = tickets.iter().filter(|t| t.is_unassigned()).collect();
    unassigned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    unassigned.truncate(limit);
    unassigned
}

/// Time from the opening message to the first agent reply.
pub fn first_response_time(ticket: &Ticket) -> Option<Duration> {
    let opened = ticket.conversation.first()?.created_at;
    ticket
        .conversation
        .iter()
        .find(|m| m.kind == MessageKind::Agent)
        .map(|reply| reply.created_at.signed_duration_since(opened))
}

/// Dashboard headline numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub counts: TicketCounts,
    /// Tickets created in the last 24 hours
    pub created_today: usize,
    /// Tickets created in the last 7 days
    pub created_this_week: usize,
    /// Mean first response over tickets that have one
    pub avg_first_response_secs: Option<i64>,
    /// Newest unassigned tickets
    pub needs_assignment: Vec<TicketId>,
}

impl DashboardStats {
    /// How many unassigned tickets the dashboard lists
    pub const NEEDS_ASSIGNMENT_LIMIT: usize = 3;

    pub fn compute(tickets: &[Ticket], now: DateTime<Utc>) -> Self {
        let created_since = |window: Duration| {
            tickets
                .iter()
                .filter(|t| t.created_at > now - window && t.created_at <= now)
                .count()
        };

        let responses: Vec<i64> = tickets
            .iter()
            .filter_map(first_response_time)
            .map(|d| d.num_seconds())
            .collect();
        let avg_first_response_secs = if responses.is_empty() {
            None
        } else {
            Some(responses.iter().sum::<i64>() / responses.len() as i64)
        };

        Self {
            counts: TicketCounts::from_tickets(tickets),
            created_today: created_since(Duration::hours(24)),
            created_this_week: created_since(Duration::days(7)),
            avg_first_response_secs,
            needs_assignment: needs_assignment(tickets, Self::NEEDS_ASSIGNMENT_LIMIT)
                .iter()
                .map(|t| t.id)
                .collect(),
        }
    }
}
