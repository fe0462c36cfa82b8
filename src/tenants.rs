use uuid::Uuid;

use crate::{
    error::{Error, Result},
    types::{find_by_id, position_by_id, Configuration, Tenant},
};

/// Distinct tenants implied by the subscriptions, in order of first
/// appearance. The system name comes from the first subscription seen for
/// a tenant; stored custom names are overlaid afterwards.
pub fn derive_tenants(config: &Configuration) -> Result<Vec<Tenant>> {
    let mut tenants: Vec<Tenant> = Vec::new();

    for sub in &config.subscriptions {
        if sub.tenant_id.is_nil() || find_by_id(&tenants, sub.tenant_id).is_some() {
            continue;
        }
        tenants.push(Tenant {
            id: sub.tenant_id,
            name: sub.user.name.clone(),
            custom_name: None,
        });
    }

    if tenants.is_empty() {
        return Err(Error::NoTenants);
    }

    for tenant in &mut tenants {
        tenant.custom_name = find_by_id(&config.tenants, tenant.id)
            .and_then(|o| o.custom_name.clone())
            .filter(|name| !name.is_empty());
    }

    Ok(tenants)
}

/// Upsert a custom display name for a tenant present in `config`.
pub fn set_custom_name(config: &mut Configuration, id: Uuid, name: &str) -> Result<()> {
    if id.is_nil() {
        return Err(Error::InvalidTenantId);
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    let tenants = derive_tenants(config)?;
    let derived = find_by_id(&tenants, id).ok_or(Error::TenantNotFound(id))?;

    match position_by_id(&config.tenants, id) {
        Some(i) => config.tenants[i].custom_name = Some(name.to_string()),
        None => config.tenants.push(Tenant {
            id,
            name: derived.name.clone(),
            custom_name: Some(name.to_string()),
        }),
    }
    Ok(())
}

/// Label shown for a tenant in pickers and listings.
pub fn label(tenant: &Tenant) -> String {
    format!("{} ({})", tenant.display_name(), tenant.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::*;

    #[test]
    fn one_tenant_per_distinct_id() {
        let config = configuration(vec![
            subscription(1, "a", 10, "alice", false),
            subscription(2, "b", 11, "bob", false),
            subscription(3, "c", 12, "carol", false),
        ]);
        let tenants = derive_tenants(&config).unwrap();
        assert_eq!(tenants.len(), 3);
        let ids: Vec<_> = tenants.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![uuid(10), uuid(11), uuid(12)]);
    }

    #[test]
    fn first_subscription_names_the_tenant() {
        let config = configuration(vec![
            subscription(1, "a", 10, "alice", false),
            subscription(2, "b", 10, "bob", false),
        ]);
        let tenants = derive_tenants(&config).unwrap();
        assert_eq!(tenants.len(), 1);
        assert_eq!(tenants[0].name, "alice");
    }

    #[test]
    fn custom_name_takes_precedence() {
        let mut config = configuration(vec![
            subscription(1, "a", 10, "alice", false),
            subscription(2, "b", 10, "bob", false),
        ]);
        config.tenants.push(Tenant {
            id: uuid(10),
            name: String::new(),
            custom_name: Some("Prod".into()),
        });

        let tenants = derive_tenants(&config).unwrap();
        assert_eq!(tenants[0].display_name(), "Prod");
        assert_eq!(label(&tenants[0]), format!("Prod ({})", uuid(10)));
    }

    #[test]
    fn nil_tenants_are_skipped() {
        let mut sub = subscription(1, "a", 10, "alice", false);
        sub.tenant_id = Uuid::nil();
        let config = configuration(vec![sub]);
        assert!(matches!(derive_tenants(&config), Err(Error::NoTenants)));
    }

    #[test]
    fn overrides_for_unknown_tenants_are_ignored() {
        let mut config = configuration(vec![subscription(1, "a", 10, "alice", false)]);
        config.tenants.push(Tenant {
            id: uuid(99),
            name: String::new(),
            custom_name: Some("Ghost".into()),
        });
        let tenants = derive_tenants(&config).unwrap();
        assert_eq!(tenants.len(), 1);
        assert_eq!(tenants[0].display_name(), "alice");
    }

    #[test]
    fn set_custom_name_validates_input() {
        let mut config = configuration(vec![subscription(1, "a", 10, "alice", false)]);
        assert!(matches!(
            set_custom_name(&mut config, Uuid::nil(), "Prod"),
            Err(Error::InvalidTenantId)
        ));
        assert!(matches!(
            set_custom_name(&mut config, uuid(10), "  "),
            Err(Error::EmptyName)
        ));
        assert!(matches!(
            set_custom_name(&mut config, uuid(42), "Prod"),
            Err(Error::TenantNotFound(id)) if id == uuid(42)
        ));
        assert!(config.tenants.is_empty());
    }

    #[test]
    fn set_custom_name_upserts() {
        let mut config = configuration(vec![
            subscription(1, "a", 10, "alice", false),
            subscription(2, "b", 11, "bob", false),
        ]);

        set_custom_name(&mut config, uuid(10), "Prod").unwrap();
        set_custom_name(&mut config, uuid(11), "Dev").unwrap();
        set_custom_name(&mut config, uuid(10), "Production").unwrap();

        assert_eq!(config.tenants.len(), 2);
        assert_eq!(config.tenants[0].custom_name.as_deref(), Some("Production"));
        assert_eq!(config.tenants[0].name, "alice");
        assert_eq!(config.tenants[1].custom_name.as_deref(), Some("Dev"));
    }
}
