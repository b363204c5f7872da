//! Tenant-scoped client selection.
//!
//! [`ClientChoices`] backs the `client` field of the document forms. It
//! resolves the request's selected organization and offers only that
//! organization's clients, serving both as the form field's choice source
//! and as the data source behind the autocomplete widget.

use std::sync::Arc;

use tally_rs_core::settings::SETTINGS;
use tally_rs_core::TallyResult;
use tally_rs_forms::fields::{coerce_int, FormFieldDef, FormFieldType};
use tally_rs_forms::widgets::{WidgetType, DEFAULT_AUTOCOMPLETE_PAGE_SIZE};
use tally_rs_people::directory::ClientDirectory;
use tally_rs_people::models::Client;
use tracing::debug;

use crate::tenancy::{OrganizationResolver, RequestContext};

/// The query parameter carrying the autocomplete search term.
pub const SEARCH_PARAM: &str = "term";

/// A client choice source scoped to the request's organization.
///
/// The request is stashed in a transient slot: fetching results consumes
/// it, so one request never leaks into a later lookup through the same
/// instance. A lookup with no stashed request, or whose request resolves
/// to no organization, yields no clients.
pub struct ClientChoices {
    directory: Arc<dyn ClientDirectory>,
    resolver: Arc<dyn OrganizationResolver>,
    request: Option<RequestContext>,
}

impl ClientChoices {
    pub fn new(
        directory: Arc<dyn ClientDirectory>,
        resolver: Arc<dyn OrganizationResolver>,
    ) -> Self {
        Self {
            directory,
            resolver,
            request: None,
        }
    }

    /// Stashes the request the next lookup runs against.
    pub fn set_request(&mut self, request: RequestContext) {
        self.request = Some(request);
    }

    /// Takes the stashed request and resolves its organization.
    async fn consume_request(&mut self) -> TallyResult<Option<(i64, RequestContext)>> {
        let Some(request) = self.request.take() else {
            debug!("client lookup without a stashed request");
            return Ok(None);
        };
        let Some(organization) = self.resolver.selected_organization(&request).await? else {
            debug!("client lookup without a resolvable organization");
            return Ok(None);
        };
        Ok(organization.pk.map(|pk| (pk, request)))
    }

    /// Returns one page of clients matching the stashed request's search
    /// term, scoped to the request's organization.
    pub async fn results(&mut self) -> TallyResult<Vec<Client>> {
        let Some((organization, request)) = self.consume_request().await? else {
            return Ok(Vec::new());
        };
        let term = request.query_param(SEARCH_PARAM).unwrap_or_default();
        let mut clients = self.directory.search_clients(organization, term).await?;
        clients.truncate(page_size());
        Ok(clients)
    }

    /// Builds the `client` form field offering the stashed request's
    /// selectable clients.
    ///
    /// The full organization-scoped client list becomes the choice set, so
    /// validation accepts exactly the clients the organization owns. The
    /// widget itself pages through [`ClientChoices::results`].
    pub async fn as_field(&mut self) -> TallyResult<FormFieldDef> {
        let choices = match self.consume_request().await? {
            Some((organization, _)) => {
                let clients = self.directory.clients_for_organization(organization).await?;
                clients
                    .iter()
                    .filter_map(|c| c.pk.map(|pk| (pk.to_string(), c.name.clone())))
                    .collect()
            }
            None => Vec::new(),
        };
        Ok(FormFieldDef::new(
            "client",
            FormFieldType::TypedChoice {
                choices,
                coerce: coerce_int,
            },
        )
        .widget(WidgetType::AutocompleteSelect))
    }
}

fn page_size() -> usize {
    if SETTINGS.is_configured() {
        SETTINGS.get().forms.autocomplete_page_size
    } else {
        DEFAULT_AUTOCOMPLETE_PAGE_SIZE
    }
}
