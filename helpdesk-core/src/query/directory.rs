//! Customer and team listings

use super::{contains_ci, search_needle, Filter};
use crate::error::{Error, Result};
use crate::types::{Customer, Presence, Role, User};
use std::cmp::Ordering;

/// Customer list orderings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CustomerSortField {
    /// A to Z
    #[default]
    Name,
    /// A to Z
    Email,
    /// A to Z, customers without a company first
    Company,
    /// Most tickets first
    Tickets,
    /// Newest first
    Created,
}

impl CustomerSortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerSortField::Name => "name",
            CustomerSortField::Email => "email",
            CustomerSortField::Company => "company",
            CustomerSortField::Tickets => "tickets",
            CustomerSortField::Created => "created",
        }
    }

    fn compare(&self, a: &Customer, b: &Customer) -> Ordering {
        match self {
            CustomerSortField::Name => compare_text(&a.name, &b.name),
            CustomerSortField::Email => compare_text(&a.email, &b.email),
            CustomerSortField::Company => compare_text(
                a.company.as_deref().unwrap_or(""),
                b.company.as_deref().unwrap_or(""),
            ),
            CustomerSortField::Tickets => b.total_tickets.cmp(&a.total_tickets),
            CustomerSortField::Created => b.created_at.cmp(&a.created_at),
        }
    }
}

impl std::str::FromStr for CustomerSortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(CustomerSortField::Name),
            "email" => Ok(CustomerSortField::Email),
            "company" => Ok(CustomerSortField::Company),
            "tickets" => Ok(CustomerSortField::Tickets),
            "created" => Ok(CustomerSortField::Created),
            _ => Err(Error::Config(format!("unknown customer sort field: {}", s))),
        }
    }
}

/// Case-insensitive ordering, falling back to byte order for ties
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Customer list criteria
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerQuery {
    /// Matches name, email or company
    pub search: Option<String>,
    pub sort: CustomerSortField,
}

/// Search and sort customers.
pub fn query_customers<'a>(customers: &'a [Customer], query: &CustomerQuery) -> Vec<&'a Customer> {
    let needle = search_needle(query.search.as_deref());
    let mut matched: Vec<&Customer> = customers
        .iter()
        .filter(|c| match needle.as_deref() {
            None => true,
            Some(needle) => {
                contains_ci(&c.name, needle)
                    || contains_ci(&c.email, needle)
                    || c.company.as_deref().is_some_and(|co| contains_ci(co, needle))
            }
        })
        .collect();

    matched.sort_by(|a, b| query.sort.compare(a, b));
    matched
}

/// Team list criteria
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    /// Matches name or email
    pub search: Option<String>,
    pub role: Filter<Role>,
    pub presence: Filter<Presence>,
}

/// Filter team members. Directory order is kept.
pub fn query_users<'a>(users: &'a [User], query: &UserQuery) -> Vec<&'a User> {
    let needle = search_needle(query.search.as_deref());
    users
        .iter()
        .filter(|u| {
            needle
                .as_deref()
                .map_or(true, |n| contains_ci(&u.name, n) || contains_ci(&u.email, n))
        })
        .filter(|u| query.role.matches(&u.role))
        .filter(|u| query.presence.matches(&u.presence))
        .collect()
}
