//! Core domain types for the helpdesk
//!
//! These types are also the durable wire format: the `tickets` slot holds a
//! JSON array of [`Ticket`] records exactly as serialized here.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Ticket** | A customer support request with a status, priority and conversation |
//! | **Message** | One turn in a ticket's conversation, from a customer or an agent |
//! | **Customer** | The person who opened a ticket |
//! | **User** | A member of the support team (admin or agent) |
//! | **Seed data** | Bundled sample records used when nothing has been saved yet |

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type TicketId = u64;
pub type CustomerId = u64;
pub type UserId = u64;

/// Accept an id written either as a JSON number or as a numeric string.
///
/// Lists saved by the browser front end store the customer picked in the
/// new-ticket form as the select's string value (`"customer_id": "101"`).
fn id_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid id: {:?}", text))),
    }
}

// ============================================
// Ticket status and priority
// ============================================

/// Where a ticket is in its lifecycle.
///
/// Declaration order is the sort order used by the query engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }

    /// Human-friendly label ("in progress")
    pub fn label(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "open" => Ok(TicketStatus::Open),
            "in_progress" => Ok(TicketStatus::InProgress),
            "resolved" => Ok(TicketStatus::Resolved),
            "closed" => Ok(TicketStatus::Closed),
            _ => Err(Error::validation(format!("unknown ticket status: {}", s))),
        }
    }
}

/// Ticket urgency. Ordered `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(Error::validation(format!("unknown priority: {}", s))),
        }
    }
}

// ============================================
// Conversation
// ============================================

/// Who wrote a conversation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Customer,
    Agent,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Customer => "customer",
            MessageKind::Agent => "agent",
        }
    }
}

/// One entry in a ticket's conversation.
///
/// Entries are never edited after they are appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Position in the conversation, starting at 1
    pub id: u32,
    /// Customer or agent
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Customer id for customer messages, user id for agent messages
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub from: u64,
    /// Message body
    pub content: String,
    /// When the message was written
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// First line of the content, truncated to `max_chars` characters.
    pub fn preview(&self, max_chars: usize) -> String {
        let first_line = self.content.lines().next().unwrap_or("");
        if first_line.chars().count() <= max_chars {
            return first_line.to_string();
        }
        let truncated: String = first_line.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

// ============================================
// Tickets
// ============================================

/// A customer support request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub subject: String,
    pub status: TicketStatus,
    pub priority: Priority,
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub customer_id: CustomerId,
    /// `None` means unassigned
    pub assigned_to: Option<UserId>,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation, never earlier than `created_at`
    pub updated_at: DateTime<Utc>,
    /// Lowercase, unique, in insertion order
    #[serde(default)]
    pub tags: Vec<String>,
    /// Append-only, never empty
    pub conversation: Vec<Message>,
}

impl Ticket {
    pub fn is_unassigned(&self) -> bool {
        self.assigned_to.is_none()
    }

    pub fn message_count(&self) -> usize {
        self.conversation.len()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.conversation.last()
    }

    /// Id the next appended message will get
    pub fn next_message_id(&self) -> u32 {
        self.conversation.len() as u32 + 1
    }
}

/// Lowercase and trim a tag. Returns `None` for blank input.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let tag = tag.trim().to_lowercase();
    if tag.is_empty() {
        None
    } else {
        Some(tag)
    }
}

/// Normalize a list of tags, dropping blanks and duplicates while keeping the
/// first occurrence's position.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        if let Some(tag) = normalize_tag(tag.as_ref()) {
            if !out.contains(&tag) {
                out.push(tag);
            }
        }
    }
    out
}

/// The customer a new ticket is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftCustomer {
    /// A customer already in the directory
    Existing(CustomerId),
    /// A customer to register alongside the ticket
    New(NewCustomer),
}

/// Contact details for a customer created from the new-ticket form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
}

/// Everything needed to open a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
    pub subject: String,
    /// Body of the initiating customer message
    pub content: String,
    pub priority: Priority,
    pub customer: DraftCustomer,
    pub assigned_to: Option<UserId>,
    tags: Vec<String>,
}

impl TicketDraft {
    pub fn new(
        customer: DraftCustomer,
        subject: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            content: content.into(),
            priority: Priority::default(),
            customer,
            assigned_to: None,
            tags: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn assigned_to(mut self, user_id: UserId) -> Self {
        self.assigned_to = Some(user_id);
        self
    }

    /// Add a tag. Blank tags and tags already present are ignored.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        match normalize_tag(tag) {
            Some(tag) if !self.tags.contains(&tag) => {
                self.tags.push(tag);
                true
            }
            _ => false,
        }
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let added = tags.into_iter().map(|t| t.as_ref().to_string());
        self.tags = normalize_tags(std::mem::take(&mut self.tags).into_iter().chain(added));
        self
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

// ============================================
// Directory entities
// ============================================

/// A person who contacts support.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar: String,
    /// Denormalized; not recomputed from the ticket list
    #[serde(default)]
    pub total_tickets: u32,
    pub created_at: DateTime<Utc>,
}

/// Team role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Agent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Agent => "agent",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "admin" => Ok(Role::Admin),
            "agent" => Ok(Role::Agent),
            _ => Err(Error::validation(format!("unknown role: {}", s))),
        }
    }
}

/// Agent availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Online,
    Away,
    Offline,
}

impl Presence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Presence::Online => "online",
            Presence::Away => "away",
            Presence::Offline => "offline",
        }
    }
}

impl std::str::FromStr for Presence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "online" => Ok(Presence::Online),
            "away" => Ok(Presence::Away),
            "offline" => Ok(Presence::Offline),
            _ => Err(Error::validation(format!("unknown presence status: {}", s))),
        }
    }
}

/// A member of the support team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Presence, serialized as `status`
    #[serde(rename = "status")]
    pub presence: Presence,
    #[serde(default)]
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}
