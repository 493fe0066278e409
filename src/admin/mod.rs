//! Realm-scoped admin operations: client and group resolution, idempotent
//! role creation, and role-to-group mapping.

use reqwest::{Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::AuthSession;
use crate::error::{KeyforgeError, Result};

/// Client entry as returned by the admin clients listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRepresentation {
    /// Internal id used in admin paths.
    pub id: String,
    /// Human-readable client identifier.
    #[serde(rename = "clientId")]
    pub client_id: String,
}

/// Client role representation.
///
/// `get_role` returns this in full and `map_role_to_group` posts it back;
/// fields the server omitted are skipped on serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite: Option<bool>,
    #[serde(rename = "clientRole", skip_serializing_if = "Option::is_none")]
    pub client_role: Option<bool>,
    #[serde(rename = "containerId", skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
}

/// Group entry as returned by the admin groups listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRepresentation {
    pub id: String,
    pub name: String,
}

/// Outcome of an idempotent create. Both variants are success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created,
    AlreadyExists,
}

/// Thin wrapper over [`AuthSession`] for one target realm.
///
/// Lookups fetch the full collection and filter client-side by exact name;
/// no server-side filtering is assumed.
pub struct AdminClient {
    session: AuthSession,
    target_realm: String,
}

impl AdminClient {
    pub fn new(session: AuthSession, target_realm: impl Into<String>) -> Self {
        Self {
            session,
            target_realm: target_realm.into(),
        }
    }

    /// Resolve the internal id of a client by its human identifier.
    pub async fn resolve_client_id(&mut self, client_identifier: &str) -> Result<String> {
        let url = self.admin_url("clients");
        let resp = self.session.send(Method::GET, &url, None).await?;
        let resp = check_status(resp).await?;
        let clients: Vec<ClientRepresentation> = resp.json().await?;
        match clients.into_iter().find(|c| c.client_id == client_identifier) {
            Some(client) => {
                tracing::info!(client = client_identifier, internal_id = %client.id, "Resolved client");
                Ok(client.id)
            }
            None => Err(KeyforgeError::NotFound {
                resource: "Client",
                name: client_identifier.to_string(),
                realm: self.target_realm.clone(),
            }),
        }
    }

    /// Create a client role, treating an existing role as success.
    pub async fn ensure_role(
        &mut self,
        client_internal_id: &str,
        role_name: &str,
    ) -> Result<EnsureOutcome> {
        let url = self.admin_url(&format!("clients/{client_internal_id}/roles"));
        let body = json!({ "name": role_name });
        let resp = self.session.send(Method::POST, &url, Some(&body)).await?;
        match resp.status() {
            StatusCode::CREATED => {
                tracing::info!(role = role_name, "Role created");
                Ok(EnsureOutcome::Created)
            }
            StatusCode::CONFLICT => {
                tracing::debug!(role = role_name, "Role already exists");
                Ok(EnsureOutcome::AlreadyExists)
            }
            status => Err(request_failed(status, resp).await),
        }
    }

    /// Fetch the full representation of a client role.
    pub async fn get_role(
        &mut self,
        client_internal_id: &str,
        role_name: &str,
    ) -> Result<RoleRepresentation> {
        let url = self.admin_url(&format!("clients/{client_internal_id}/roles/{role_name}"));
        let resp = self.session.send(Method::GET, &url, None).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(KeyforgeError::NotFound {
                resource: "Role",
                name: role_name.to_string(),
                realm: self.target_realm.clone(),
            });
        }
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    /// Resolve the internal id of a group by name.
    pub async fn resolve_group_id(&mut self, group_name: &str) -> Result<String> {
        let url = self.admin_url("groups");
        let resp = self.session.send(Method::GET, &url, None).await?;
        let resp = check_status(resp).await?;
        let groups: Vec<GroupRepresentation> = resp.json().await?;
        match groups.into_iter().find(|g| g.name == group_name) {
            Some(group) => {
                tracing::info!(group = group_name, internal_id = %group.id, "Resolved group");
                Ok(group.id)
            }
            None => Err(KeyforgeError::NotFound {
                resource: "Group",
                name: group_name.to_string(),
                realm: self.target_realm.clone(),
            }),
        }
    }

    /// Map a client role onto a group, treating an existing mapping as
    /// success. The body is a single-element list containing the role.
    pub async fn map_role_to_group(
        &mut self,
        group_id: &str,
        client_internal_id: &str,
        role: &RoleRepresentation,
    ) -> Result<EnsureOutcome> {
        let url = self.admin_url(&format!(
            "groups/{group_id}/role-mappings/clients/{client_internal_id}"
        ));
        let body = json!([role]);
        let resp = self.session.send(Method::POST, &url, Some(&body)).await?;
        match resp.status() {
            StatusCode::NO_CONTENT => {
                tracing::info!(role = %role.name, group = group_id, "Role mapped to group");
                Ok(EnsureOutcome::Created)
            }
            StatusCode::CONFLICT => {
                tracing::debug!(role = %role.name, group = group_id, "Mapping already exists");
                Ok(EnsureOutcome::AlreadyExists)
            }
            status => Err(request_failed(status, resp).await),
        }
    }

    fn admin_url(&self, path: &str) -> String {
        format!(
            "{}/admin/realms/{}/{}",
            self.session.base_url(),
            self.target_realm,
            path
        )
    }
}

async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    Err(request_failed(status, resp).await)
}

async fn request_failed(status: StatusCode, resp: Response) -> KeyforgeError {
    let message = resp.text().await.unwrap_or_default();
    KeyforgeError::RequestFailed {
        status: status.as_u16(),
        message,
    }
}
