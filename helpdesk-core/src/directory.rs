//! Customer and team directories
//!
//! Both lists come from seed data. Customers created from the new-ticket form
//! are added for the lifetime of the session only.

use crate::error::{Error, Result};
use crate::seed;
use crate::types::{Customer, CustomerId, NewCustomer, User, UserId};
use chrono::{DateTime, Utc};

/// Customers and team members known to the session.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    customers: Vec<Customer>,
    users: Vec<User>,
}

impl Directory {
    pub fn new(customers: Vec<Customer>, users: Vec<User>) -> Self {
        Self { customers, users }
    }

    /// Directory populated from the bundled sample data
    pub fn seeded() -> Self {
        Self::new(seed::customers(), seed::users())
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn customer(&self, id: CustomerId) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Register a customer entered on the new-ticket form.
    ///
    /// Name and email are required. The new record starts with one ticket on
    /// its denormalized counter since it is only ever created with one.
    ///
    /// The id is above every directory id and above `taken`, the highest id
    /// already referenced by saved tickets.
    pub fn register_customer(
        &mut self,
        customer: &NewCustomer,
        taken: CustomerId,
        now: DateTime<Utc>,
    ) -> Result<CustomerId> {
        let name = customer.name.trim();
        let email = customer.email.trim();
        if name.is_empty() || email.is_empty() {
            return Err(Error::validation("customer name and email are required"));
        }

        let id = self
            .customers
            .iter()
            .map(|c| c.id)
            .fold(taken.max(100), CustomerId::max)
            + 1;
        self.customers.push(Customer {
            id,
            name: name.to_string(),
            email: email.to_string(),
            company: non_blank(customer.company.as_deref()),
            phone: non_blank(customer.phone.as_deref()),
            avatar: String::new(),
            total_tickets: 1,
            created_at: now,
        });

        tracing::info!(customer_id = id, "Registered customer");
        Ok(id)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
