//! Plain-text rendering for the inbox, detail and directory views.

use chrono::{DateTime, Utc};
use helpdesk_core::format::{format_relative_time_at, truncate};
use helpdesk_core::stats::{TicketCounts, UserWorkload};
use helpdesk_core::{Customer, Directory, Message, MessageKind, Ticket, TicketStatus};
use std::fmt::Write;

/// A denormalized ticket row for table display.
#[derive(Debug, Clone)]
pub struct TicketRow {
    pub id: u64,
    pub status: &'static str,
    pub priority: &'static str,
    pub subject: String,
    /// Customer name, or `#id` when the customer is not in the directory
    pub customer: String,
    /// Assignee name, or "unassigned"
    pub assignee: String,
    pub message_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl TicketRow {
    pub fn new(ticket: &Ticket, directory: &Directory) -> Self {
        Self {
            id: ticket.id,
            status: ticket.status.as_str(),
            priority: ticket.priority.as_str(),
            subject: ticket.subject.clone(),
            customer: customer_name(ticket.customer_id, directory),
            assignee: assignee_name(ticket.assigned_to, directory),
            message_count: ticket.message_count(),
            updated_at: ticket.updated_at,
        }
    }

    /// One table line, with the update time relative to `now`.
    pub fn line(&self, now: DateTime<Utc>) -> String {
        format!(
            "{:<6} {:<11} {:<6} {:<36} {:<18} {:<16} {:>4} {}",
            self.id,
            self.status,
            self.priority,
            truncate(&self.subject, 36),
            truncate(&self.customer, 18),
            truncate(&self.assignee, 16),
            self.message_count,
            format_relative_time_at(self.updated_at, now),
        )
    }
}

pub fn header() -> String {
    format!(
        "{:<6} {:<11} {:<6} {:<36} {:<18} {:<16} {:>4} {}",
        "ID", "STATUS", "PRIO", "SUBJECT", "CUSTOMER", "ASSIGNEE", "MSGS", "UPDATED"
    )
}

fn customer_name(id: u64, directory: &Directory) -> String {
    directory
        .customer(id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| format!("#{}", id))
}

fn assignee_name(id: Option<u64>, directory: &Directory) -> String {
    match id {
        None => "unassigned".to_string(),
        Some(id) => directory
            .user(id)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| format!("#{}", id)),
    }
}

/// Tab strip with per-status counts.
pub fn status_tabs(counts: &TicketCounts) -> String {
    let mut tabs = vec![format!("all {}", counts.all)];
    for status in TicketStatus::ALL {
        tabs.push(format!("{} {}", status.label(), counts.for_status(status)));
    }
    tabs.push(format!("unassigned {}", counts.unassigned));
    tabs.join(" | ")
}

/// Author label for a conversation entry.
pub fn author_label(message: &Message, directory: &Directory) -> String {
    match message.kind {
        MessageKind::Customer => format!("[customer] {}", customer_name(message.from, directory)),
        MessageKind::Agent => format!(
            "[agent] {}",
            directory
                .user(message.from)
                .map(|u| u.name.clone())
                .unwrap_or_else(|| format!("#{}", message.from))
        ),
    }
}

/// Full ticket view: header fields, then the conversation oldest first.
pub fn ticket_detail(ticket: &Ticket, directory: &Directory) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {}", ticket.id, ticket.subject);
    let _ = writeln!(
        out,
        "Status: {}  Priority: {}  Assignee: {}",
        ticket.status.label(),
        ticket.priority,
        assignee_name(ticket.assigned_to, directory)
    );

    match directory.customer(ticket.customer_id) {
        Some(customer) => {
            let _ = writeln!(out, "Customer: {}", customer_line(customer));
        }
        None => {
            let _ = writeln!(out, "Customer: #{}", ticket.customer_id);
        }
    }

    if !ticket.tags.is_empty() {
        let _ = writeln!(out, "Tags: {}", ticket.tags.join(", "));
    }
    let _ = writeln!(
        out,
        "Created: {}  Updated: {}",
        ticket.created_at.format("%Y-%m-%d %H:%M"),
        ticket.updated_at.format("%Y-%m-%d %H:%M")
    );

    for message in &ticket.conversation {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} - {}",
            author_label(message, directory),
            message.created_at.format("%Y-%m-%d %H:%M")
        );
        for line in message.content.lines() {
            let _ = writeln!(out, "  {}", line);
        }
    }
    out
}

/// "Name <email> (Company)"
pub fn customer_line(customer: &Customer) -> String {
    match &customer.company {
        Some(company) => format!("{} <{}> ({})", customer.name, customer.email, company),
        None => format!("{} <{}>", customer.name, customer.email),
    }
}

pub fn workload_line(workload: &UserWorkload<'_>) -> String {
    format!(
        "{:<4} {:<16} {:<28} {:<6} {:<8} {:>3} assigned ({} open, {} in progress, {} resolved)",
        workload.user.id,
        truncate(&workload.user.name, 16),
        truncate(&workload.user.email, 28),
        workload.user.role.as_str(),
        workload.user.presence.as_str(),
        workload.assigned,
        workload.open,
        workload.in_progress,
        workload.resolved,
    )
}
