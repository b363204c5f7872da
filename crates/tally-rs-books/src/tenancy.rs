//! Tenant resolution.
//!
//! A request works inside one selected organization, remembered in the
//! session. [`OrganizationResolver`] is the seam for that decision;
//! [`SessionOrganizationResolver`] implements it by reading the configured
//! session key and looking the organization up in the store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tally_rs_core::settings::{TenancySettings, SETTINGS};
use tally_rs_core::TallyResult;
use tracing::{debug, warn};

use crate::models::Organization;
use crate::store::BooksStore;

/// A framework-agnostic view of an incoming request: its session values
/// and query-string parameters.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    session: HashMap<String, String>,
    query: HashMap<String, String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a session value.
    #[must_use]
    pub fn with_session_value(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.session.insert(key.into(), value.into());
        self
    }

    /// Adds a query-string parameter.
    #[must_use]
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn session_value(&self, key: &str) -> Option<&str> {
        self.session.get(key).map(String::as_str)
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

/// Decides which organization a request is working in.
#[async_trait]
pub trait OrganizationResolver: Send + Sync {
    /// Returns the request's selected organization, or `None` when the
    /// request carries no resolvable selection.
    async fn selected_organization(
        &self,
        request: &RequestContext,
    ) -> TallyResult<Option<Organization>>;
}

/// Resolves the selected organization from the session.
///
/// The session key comes from `Settings::tenancy` when the global settings
/// are configured, and falls back to the default (`selected_organization`)
/// otherwise.
pub struct SessionOrganizationResolver {
    store: Arc<dyn BooksStore>,
    session_key: String,
}

impl SessionOrganizationResolver {
    /// Creates a resolver over the given store.
    pub fn new(store: Arc<dyn BooksStore>) -> Self {
        let session_key = if SETTINGS.is_configured() {
            SETTINGS.get().tenancy.session_key.clone()
        } else {
            TenancySettings::default().session_key
        };
        Self { store, session_key }
    }

    /// Overrides the session key.
    #[must_use]
    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }
}

#[async_trait]
impl OrganizationResolver for SessionOrganizationResolver {
    async fn selected_organization(
        &self,
        request: &RequestContext,
    ) -> TallyResult<Option<Organization>> {
        let Some(raw) = request.session_value(&self.session_key) else {
            debug!(session_key = %self.session_key, "no organization selected");
            return Ok(None);
        };
        let Ok(pk) = raw.parse::<i64>() else {
            warn!(value = raw, "selected organization is not a primary key");
            return Ok(None);
        };
        let organization = self.store.organization(pk).await?;
        if organization.is_none() {
            warn!(pk, "selected organization does not exist");
        }
        Ok(organization)
    }
}
