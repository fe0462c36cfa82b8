use uuid::Uuid;

use crate::{
    error::{Error, Result},
    picker::{Pick, Picker},
    tenants,
    types::{Subscription, Tenant},
};

/// Let `picker` choose one item; fails before asking when there is nothing
/// to choose from.
pub fn resolve_with<'a, T>(
    items: &[&'a T],
    prompt: &str,
    label: impl Fn(&T) -> String,
    picker: &mut dyn Picker,
) -> Result<&'a T> {
    if items.is_empty() {
        return Err(Error::NoCandidates);
    }
    match picker.pick(prompt, items.len(), &|i: usize| label(items[i]))? {
        Pick::Aborted => Err(Error::Aborted),
        Pick::Index(index) => items
            .get(index)
            .copied()
            .ok_or(Error::SelectionOutOfRange {
                index,
                len: items.len(),
            }),
    }
}

pub fn resolve_selection<'a>(
    subscriptions: &'a [Subscription],
    picker: &mut dyn Picker,
) -> Result<&'a Subscription> {
    let candidates: Vec<&Subscription> = subscriptions.iter().collect();
    let width = label_width(&candidates);
    resolve_with(
        &candidates,
        "Select subscription",
        |s| subscription_label(s, width),
        picker,
    )
}

/// Same as [`resolve_selection`], restricted to one tenant's subscriptions.
pub fn resolve_selection_in_tenant<'a>(
    subscriptions: &'a [Subscription],
    tenant_id: Uuid,
    picker: &mut dyn Picker,
) -> Result<&'a Subscription> {
    let candidates: Vec<&Subscription> = subscriptions
        .iter()
        .filter(|s| s.tenant_id == tenant_id)
        .collect();
    let width = label_width(&candidates);
    resolve_with(
        &candidates,
        "Select subscription",
        |s| subscription_label(s, width),
        picker,
    )
}

pub fn resolve_tenant<'a>(derived: &'a [Tenant], picker: &mut dyn Picker) -> Result<&'a Tenant> {
    let candidates: Vec<&Tenant> = derived.iter().collect();
    resolve_with(&candidates, "Select tenant", tenants::label, picker)
}

pub fn subscription_label(sub: &Subscription, width: usize) -> String {
    let marker = if sub.is_default { "*" } else { " " };
    format!("{marker} {:<width$}  {}", sub.name, sub.id)
}

fn label_width(subs: &[&Subscription]) -> usize {
    subs.iter().map(|s| s.name.chars().count()).max().unwrap_or(0)
}
