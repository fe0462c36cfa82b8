//! Records of the Azure CLI profile document (`azureProfile.json`).
//!
//! Field names follow the Azure CLI's camelCase schema. Anything the CLI
//! writes that is not modelled here is kept in `extra` so a load/store
//! round-trip does not drop it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    #[serde(rename = "installationId", default)]
    pub installation_id: Uuid,
    /// Custom-name overrides, keyed by tenant ID.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tenants: Vec<Tenant>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Tenant {
    #[serde(rename = "tenantId")]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(
        rename = "customName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Subscription {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub user: User,
    #[serde(rename = "isDefault", default)]
    pub is_default: bool,
    #[serde(rename = "tenantId", default)]
    pub tenant_id: Uuid,
    #[serde(
        rename = "homeTenantId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub home_tenant_id: Option<Uuid>,
    #[serde(rename = "environmentName", default)]
    pub environment_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Identity lookup ──────────────────────────────────────────────────────────

pub trait HasId {
    fn id(&self) -> Uuid;
}

impl HasId for Tenant {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl HasId for Subscription {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// First item carrying `id`. A nil `id` never matches.
pub fn find_by_id<T: HasId>(items: &[T], id: Uuid) -> Option<&T> {
    if id.is_nil() {
        return None;
    }
    items.iter().find(|item| item.id() == id)
}

pub fn position_by_id<T: HasId>(items: &[T], id: Uuid) -> Option<usize> {
    if id.is_nil() {
        return None;
    }
    items.iter().position(|item| item.id() == id)
}

// ── Behaviour ────────────────────────────────────────────────────────────────

impl Tenant {
    /// Custom name wins over the derived one when set.
    pub fn display_name(&self) -> &str {
        match self.custom_name.as_deref() {
            Some(custom) if !custom.is_empty() => custom,
            _ => &self.name,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.is_nil() {
            return Err(Error::InvalidTenant {
                id: self.id,
                reason: "nil tenant ID",
            });
        }
        if self.name.is_empty() && self.custom_name.as_deref().unwrap_or("").is_empty() {
            return Err(Error::InvalidTenant {
                id: self.id,
                reason: "no name or custom name",
            });
        }
        Ok(())
    }
}

impl Subscription {
    pub fn validate(&self) -> Result<()> {
        let reason = if self.id.is_nil() {
            "nil subscription ID"
        } else if self.name.is_empty() {
            "empty display name"
        } else if self.tenant_id.is_nil() {
            "nil tenant ID"
        } else if self.state.is_empty() {
            "empty state"
        } else if self.user.name.is_empty() || self.user.kind.is_empty() {
            "incomplete user"
        } else {
            return Ok(());
        };
        Err(Error::InvalidSubscription {
            id: self.id,
            reason,
        })
    }
}

impl Configuration {
    pub fn validate(&self) -> Result<()> {
        if self.installation_id.is_nil() {
            return Err(Error::EmptyConfiguration);
        }
        self.tenants.iter().try_for_each(Tenant::validate)?;
        self.subscriptions.iter().try_for_each(Subscription::validate)?;
        Ok(())
    }

    pub fn default_subscription(&self) -> Option<&Subscription> {
        self.subscriptions.iter().find(|s| s.is_default)
    }

    /// Resolve a user-typed identifier: a UUID matches by ID, anything else
    /// by exact display name and then case-insensitively.
    pub fn find_subscription(&self, query: &str) -> Result<&Subscription> {
        let query = query.trim();
        let found = match Uuid::parse_str(query) {
            Ok(id) => find_by_id(&self.subscriptions, id),
            Err(_) => self
                .subscriptions
                .iter()
                .find(|s| s.name == query)
                .or_else(|| {
                    self.subscriptions
                        .iter()
                        .find(|s| s.name.eq_ignore_ascii_case(query))
                }),
        };
        found.ok_or_else(|| Error::SubscriptionNotFound(query.to_string()))
    }
}

/// Strict validation of an optionally-present configuration.
pub fn validate_configuration(config: Option<&Configuration>) -> Result<()> {
    config.ok_or(Error::EmptyConfiguration)?.validate()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn uuid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    pub fn subscription(
        id: u128,
        name: &str,
        tenant: u128,
        user: &str,
        is_default: bool,
    ) -> Subscription {
        Subscription {
            id: uuid(id),
            name: name.to_string(),
            state: "Enabled".into(),
            user: User {
                name: user.to_string(),
                kind: "user".into(),
            },
            is_default,
            tenant_id: uuid(tenant),
            home_tenant_id: Some(uuid(tenant)),
            environment_name: "AzureCloud".into(),
            extra: Map::new(),
        }
    }

    pub fn configuration(subscriptions: Vec<Subscription>) -> Configuration {
        Configuration {
            installation_id: uuid(0xfeed),
            tenants: Vec::new(),
            subscriptions,
            extra: Map::new(),
        }
    }
}
