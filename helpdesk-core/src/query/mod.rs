//! Query engine
//!
//! Pure filter and sort functions over in-memory lists. Nothing here touches
//! storage; results borrow from the input slice.
//!
//! - [`tickets`]: the inbox view (search, status/priority/assignee filters, stable sort)
//! - [`directory`]: customer and team listings

pub mod directory;
pub mod tickets;

pub use directory::{query_customers, query_users, CustomerQuery, CustomerSortField, UserQuery};
pub use tickets::{
    filter_tickets, sort_tickets, AssigneeFilter, TicketQuery, TicketSort, TicketSortField,
};

use crate::error::{Error, Result};
use std::cmp::Ordering;

/// An exact-match filter that can be switched off with `"all"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter<T> {
    All,
    Only(T),
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Filter::All
    }
}

impl<T: PartialEq> Filter<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(expected) => expected == value,
        }
    }
}

impl<T> std::str::FromStr for Filter<T>
where
    T: std::str::FromStr<Err = Error>,
{
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Filter::All),
            other => other.parse().map(Filter::Only),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// Apply the direction to an ascending comparison.
    ///
    /// Flipping the comparison instead of reversing the output keeps ties in
    /// their original order in both directions.
    pub fn apply(&self, ascending: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ascending,
            SortDirection::Desc => ascending.reverse(),
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(Error::Config(format!("unknown sort direction: {}", s))),
        }
    }
}

/// Lowercased search needle, or `None` when the search is empty.
pub(crate) fn search_needle(search: Option<&str>) -> Option<String> {
    search.filter(|s| !s.is_empty()).map(str::to_lowercase)
}

/// Case-insensitive substring test against a lowercased needle.
pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
