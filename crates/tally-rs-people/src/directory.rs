//! Directory lookups for users and clients.
//!
//! The [`UserDirectory`] and [`ClientDirectory`] traits are the storage
//! seam of this crate: form builders take them as trait objects so tests
//! and embedders can swap the backing store. [`MemoryDirectory`] is the
//! in-memory reference implementation.

use std::sync::RwLock;

use async_trait::async_trait;

use tally_rs_core::TallyResult;

use crate::models::{Client, User};

/// Read access to user records.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetches a user by primary key.
    async fn user(&self, pk: i64) -> TallyResult<Option<User>>;

    /// Lists all users, ordered by primary key.
    async fn users(&self) -> TallyResult<Vec<User>>;
}

/// Read access to client records, always scoped by organization.
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    /// Fetches a client by primary key.
    async fn client(&self, pk: i64) -> TallyResult<Option<Client>>;

    /// Lists the clients belonging to an organization.
    async fn clients_for_organization(&self, organization: i64) -> TallyResult<Vec<Client>>;

    /// Case-insensitive substring search on client names within an
    /// organization.
    async fn search_clients(&self, organization: i64, term: &str) -> TallyResult<Vec<Client>>;
}

/// In-memory implementation of both directory traits.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    users: RwLock<Vec<User>>,
    clients: RwLock<Vec<Client>>,
}

impl MemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a user, assigning the next primary key, and returns it.
    pub fn add_user(&self, mut user: User) -> User {
        let mut users = self.users.write().expect("user directory lock poisoned");
        let pk = users.last().and_then(|u| u.pk).unwrap_or(0) + 1;
        user.pk = Some(pk);
        users.push(user.clone());
        user
    }

    /// Stores a client, assigning the next primary key, and returns it.
    pub fn add_client(&self, mut client: Client) -> Client {
        let mut clients = self.clients.write().expect("client directory lock poisoned");
        let pk = clients.last().and_then(|c| c.pk).unwrap_or(0) + 1;
        client.pk = Some(pk);
        clients.push(client.clone());
        client
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn user(&self, pk: i64) -> TallyResult<Option<User>> {
        let users = self.users.read().expect("user directory lock poisoned");
        Ok(users.iter().find(|u| u.pk == Some(pk)).cloned())
    }

    async fn users(&self) -> TallyResult<Vec<User>> {
        let users = self.users.read().expect("user directory lock poisoned");
        Ok(users.clone())
    }
}

#[async_trait]
impl ClientDirectory for MemoryDirectory {
    async fn client(&self, pk: i64) -> TallyResult<Option<Client>> {
        let clients = self.clients.read().expect("client directory lock poisoned");
        Ok(clients.iter().find(|c| c.pk == Some(pk)).cloned())
    }

    async fn clients_for_organization(&self, organization: i64) -> TallyResult<Vec<Client>> {
        let clients = self.clients.read().expect("client directory lock poisoned");
        Ok(clients
            .iter()
            .filter(|c| c.organization == organization)
            .cloned()
            .collect())
    }

    async fn search_clients(&self, organization: i64, term: &str) -> TallyResult<Vec<Client>> {
        let needle = term.to_lowercase();
        let clients = self.clients.read().expect("client directory lock poisoned");
        Ok(clients
            .iter()
            .filter(|c| c.organization == organization)
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}
