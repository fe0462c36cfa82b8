//! Switching the active subscription.
//!
//! Every operation loads the profile once, resolves a target, and then
//! commits: the previous default goes to the last-context store, exactly
//! one subscription is flagged default, and the profile is written back.
//! Nothing is written unless the target has been found.

use std::{
    fmt,
    time::{Duration, Instant},
};

use tracing::debug;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    picker::Picker,
    profile::ProfileStore,
    resolve,
    state::{LastContext, LastContextStore},
    tenants,
    types::{position_by_id, Configuration},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Resolving,
    Committing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Resolving => write!(f, "resolving"),
            Phase::Committing => write!(f, "committing"),
        }
    }
}

/// Bounds the resolution phase of a switch. Once committing has started
/// the operation runs to completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline {
    expires_at: Option<Instant>,
}

impl Deadline {
    pub fn none() -> Self {
        Self::default()
    }

    /// A timeout too large to represent never expires.
    pub fn after(timeout: Duration) -> Self {
        Self {
            expires_at: Instant::now().checked_add(timeout),
        }
    }

    pub fn check(&self, phase: Phase) -> Result<()> {
        if self.expires_at.is_some_and(|at| Instant::now() >= at) {
            return Err(Error::DeadlineExceeded { phase });
        }
        Ok(())
    }
}

/// Result of a completed switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Switched {
    pub id: Uuid,
    pub name: String,
    /// Default before the switch, as recorded in the last-context store.
    pub previous: Option<LastContext>,
}

pub struct ContextSwitcher<'a, P, S> {
    profile: &'a P,
    state: &'a S,
    deadline: Deadline,
}

impl<'a, P: ProfileStore, S: LastContextStore> ContextSwitcher<'a, P, S> {
    pub fn new(profile: &'a P, state: &'a S) -> Self {
        Self {
            profile,
            state,
            deadline: Deadline::none(),
        }
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn load(&self) -> Result<Configuration> {
        self.profile.read()
    }

    pub fn switch_to(&self, id: Uuid) -> Result<Switched> {
        let config = self.load()?;
        self.commit(config, id)
    }

    /// Switch by UUID or display name.
    pub fn switch_to_query(&self, query: &str) -> Result<Switched> {
        let config = self.load()?;
        let id = config.find_subscription(query)?.id;
        self.commit(config, id)
    }

    pub fn select_and_switch(&self, picker: &mut dyn Picker) -> Result<Switched> {
        let config = self.load()?;
        self.deadline.check(Phase::Resolving)?;
        debug!(
            phase = %Phase::Resolving,
            count = config.subscriptions.len(),
            "selecting subscription"
        );
        let id = resolve::resolve_selection(&config.subscriptions, picker)?.id;
        self.commit(config, id)
    }

    /// Pick a tenant, then one of its subscriptions.
    pub fn select_by_tenant_and_switch(&self, picker: &mut dyn Picker) -> Result<Switched> {
        let config = self.load()?;
        self.deadline.check(Phase::Resolving)?;
        let tenants = tenants::derive_tenants(&config)?;
        debug!(phase = %Phase::Resolving, count = tenants.len(), "selecting tenant");
        let tenant_id = resolve::resolve_tenant(&tenants, picker)?.id;
        self.deadline.check(Phase::Resolving)?;
        let id =
            resolve::resolve_selection_in_tenant(&config.subscriptions, tenant_id, picker)?.id;
        self.commit(config, id)
    }

    pub fn restore_previous(&self) -> Result<Switched> {
        let last = self.state.get_last_context()?;
        if last.is_empty() {
            return Err(Error::NoPreviousContext);
        }
        let id = Uuid::parse_str(last.id.trim())
            .map_err(|_| Error::InvalidStoredIdentifier(last.id.clone()))?;
        debug!(%id, name = %last.display_name, "restoring previous context");
        self.switch_to(id)
    }

    pub fn save_tenant_custom_name(&self, id: Uuid, name: &str) -> Result<()> {
        if id.is_nil() {
            return Err(Error::InvalidTenantId);
        }
        if name.trim().is_empty() {
            return Err(Error::EmptyName);
        }
        let mut config = self.load()?;
        tenants::set_custom_name(&mut config, id, name)?;
        self.profile.write(&config)?;
        debug!(tenant = %id, name, "saved tenant custom name");
        Ok(())
    }

    fn commit(&self, mut config: Configuration, id: Uuid) -> Result<Switched> {
        let target = position_by_id(&config.subscriptions, id)
            .ok_or_else(|| Error::SubscriptionNotFound(id.to_string()))?;

        self.deadline.check(Phase::Resolving)?;
        debug!(phase = %Phase::Committing, %id, "committing switch");

        let previous = config.default_subscription().map(|current| LastContext {
            id: current.id.to_string(),
            display_name: current.name.clone(),
        });
        if let Some(prev) = &previous {
            self.state.set_last_context(&prev.id, &prev.display_name)?;
        }

        for (i, sub) in config.subscriptions.iter_mut().enumerate() {
            if sub.is_default && i != target {
                debug!(name = %sub.name, "clearing default");
            }
            sub.is_default = i == target;
        }

        self.profile.write(&config)?;

        let sub = &config.subscriptions[target];
        debug!(phase = %Phase::Idle, name = %sub.name, id = %sub.id, "switched context");
        Ok(Switched {
            id: sub.id,
            name: sub.name.clone(),
            previous,
        })
    }
}
