//! Roles and sign-up requests.
//!
//! Requests are reviewed by a super-admin outside this crate; here they
//! are only validated and recorded. At most one pending request may exist
//! per email. Like the active-spell rule this is checked read-then-write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::store::{MonitorStore, WriteBatch, WriteOp};
use crate::validate::required_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    SuperAdmin,
    CityUser,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super-admin",
            Role::CityUser => "city-user",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super-admin" => Ok(Role::SuperAdmin),
            "city-user" => Ok(Role::CityUser),
            "viewer" => Ok(Role::Viewer),
            other => anyhow::bail!("unknown role: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            other => anyhow::bail!("unknown request status: {other}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequest {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub assigned_city: Option<String>,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccessRequestInput {
    pub email: String,
    pub role: Role,
    pub assigned_city: Option<String>,
}

pub struct AccessRequests<'a, S: MonitorStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: MonitorStore + ?Sized> AccessRequests<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Record a pending sign-up request.
    pub fn request_access(&self, input: &AccessRequestInput, now: DateTime<Utc>) -> Result<AccessRequest> {
        let email = required_text("email", "Email", &input.email)?.to_lowercase();
        if !looks_like_email(&email) {
            return Err(Error::validation("email", "Invalid email address."));
        }
        if input.role == Role::SuperAdmin {
            return Err(Error::validation(
                "role",
                "Only city-user or viewer access can be requested.",
            ));
        }
        let assigned_city = input
            .assigned_city
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        if input.role == Role::CityUser && assigned_city.is_none() {
            return Err(Error::validation(
                "assigned_city",
                "Assigned city is required for city users.",
            ));
        }

        if self.store.find_pending_request(&email)?.is_some() {
            log::warn!("Duplicate pending request for {}", email);
            return Err(Error::DuplicateRequest { email });
        }

        let request = AccessRequest {
            id: crate::new_id(),
            email,
            role: input.role,
            assigned_city,
            status: RequestStatus::Pending,
            requested_at: now,
        };
        self.store
            .commit(WriteBatch::single(WriteOp::InsertAccessRequest(request.clone())))?;
        log::info!(
            "{} requested {} access",
            request.email,
            request.role
        );
        Ok(request)
    }

    pub fn pending(&self) -> Result<Vec<AccessRequest>> {
        Ok(self.store.pending_requests()?)
    }
}

/// `local@domain.tld` with no whitespace.
fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
                    .unwrap_or(false)
        }
        None => false,
    }
}
