//! Inbox queries over tickets

use super::{contains_ci, search_needle, Filter, SortDirection};
use crate::directory::Directory;
use crate::error::{Error, Result};
use crate::types::{Priority, Ticket, TicketStatus, UserId};
use std::cmp::Ordering;

/// Assignee criterion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssigneeFilter {
    #[default]
    All,
    /// Only tickets with no assignee
    Unassigned,
    /// Only tickets assigned to this user
    User(UserId),
}

impl AssigneeFilter {
    pub fn matches(&self, assigned_to: Option<UserId>) -> bool {
        match self {
            AssigneeFilter::All => true,
            AssigneeFilter::Unassigned => assigned_to.is_none(),
            AssigneeFilter::User(id) => assigned_to == Some(*id),
        }
    }
}

impl std::str::FromStr for AssigneeFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(AssigneeFilter::All),
            "unassigned" => Ok(AssigneeFilter::Unassigned),
            other => other
                .parse::<UserId>()
                .map(AssigneeFilter::User)
                .map_err(|_| Error::validation(format!("unknown assignee: {}", other))),
        }
    }
}

/// Fields the inbox can be sorted by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TicketSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Priority,
    Status,
    Subject,
    Id,
}

impl TicketSortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketSortField::CreatedAt => "created_at",
            TicketSortField::UpdatedAt => "updated_at",
            TicketSortField::Priority => "priority",
            TicketSortField::Status => "status",
            TicketSortField::Subject => "subject",
            TicketSortField::Id => "id",
        }
    }

    /// Ascending comparison of two tickets on this field
    pub fn compare(&self, a: &Ticket, b: &Ticket) -> Ordering {
        match self {
            TicketSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            TicketSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            TicketSortField::Priority => a.priority.cmp(&b.priority),
            TicketSortField::Status => a.status.cmp(&b.status),
            TicketSortField::Subject => a.subject.cmp(&b.subject),
            TicketSortField::Id => a.id.cmp(&b.id),
        }
    }
}

impl std::str::FromStr for TicketSortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "created_at" => Ok(TicketSortField::CreatedAt),
            "updated_at" => Ok(TicketSortField::UpdatedAt),
            "priority" => Ok(TicketSortField::Priority),
            "status" => Ok(TicketSortField::Status),
            "subject" => Ok(TicketSortField::Subject),
            "id" => Ok(TicketSortField::Id),
            _ => Err(Error::Config(format!("unknown ticket sort field: {}", s))),
        }
    }
}

/// Sort criterion. Defaults to newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TicketSort {
    pub field: TicketSortField,
    pub direction: SortDirection,
}

impl TicketSort {
    pub fn new(field: TicketSortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Parse a field and direction name pair
    pub fn parse(field: &str, direction: &str) -> Result<Self> {
        Ok(Self::new(field.parse()?, direction.parse()?))
    }
}

/// Inbox criteria. All set criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketQuery {
    /// Case-insensitive substring of subject, customer name or customer email
    pub search: Option<String>,
    pub status: Filter<TicketStatus>,
    pub priority: Filter<Priority>,
    pub assignee: AssigneeFilter,
    /// `None` keeps list order
    pub sort: Option<TicketSort>,
}

impl TicketQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn status(mut self, status: TicketStatus) -> Self {
        self.status = Filter::Only(status);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Filter::Only(priority);
        self
    }

    pub fn assignee(mut self, assignee: AssigneeFilter) -> Self {
        self.assignee = assignee;
        self
    }

    pub fn sorted(mut self, sort: TicketSort) -> Self {
        self.sort = Some(sort);
        self
    }

    fn matches(&self, ticket: &Ticket, needle: Option<&str>, directory: &Directory) -> bool {
        if let Some(needle) = needle {
            let customer = directory.customer(ticket.customer_id);
            let hit = contains_ci(&ticket.subject, needle)
                || customer.is_some_and(|c| {
                    contains_ci(&c.name, needle) || contains_ci(&c.email, needle)
                });
            if !hit {
                return false;
            }
        }

        self.status.matches(&ticket.status)
            && self.priority.matches(&ticket.priority)
            && self.assignee.matches(ticket.assigned_to)
    }
}

/// Filter, then sort when the query asks for it.
pub fn filter_tickets<'a>(
    tickets: &'a [Ticket],
    query: &TicketQuery,
    directory: &Directory,
) -> Vec<&'a Ticket> {
    let needle = search_needle(query.search.as_deref());
    let mut matched: Vec<&Ticket> = tickets
        .iter()
        .filter(|t| query.matches(t, needle.as_deref(), directory))
        .collect();

    if let Some(sort) = query.sort {
        sort_tickets(&mut matched, sort);
    }
    matched
}

/// Stable sort: tickets with equal keys keep their relative order in either
/// direction.
pub fn sort_tickets(tickets: &mut [&Ticket], sort: TicketSort) {
    tickets.sort_by(|a, b| sort.direction.apply(sort.field.compare(a, b)));
}
