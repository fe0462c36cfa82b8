use anyhow::{Context, Result};
use colored::Colorize;
use uuid::Uuid;

use crate::{
    config::Settings,
    error::Error,
    profile::{FileProfileStore, ProfileStore},
    resolve::subscription_label,
    state::{FileStateStore, LastContextStore},
    switch::{ContextSwitcher, Deadline, Switched},
    tenants,
    tui::FuzzyPicker,
};

struct Stores {
    profile: FileProfileStore,
    state: FileStateStore,
    deadline: Deadline,
}

impl Stores {
    fn open(settings: &Settings) -> Self {
        Stores {
            profile: FileProfileStore::new(&settings.profile_path),
            state: FileStateStore::new(&settings.state_path),
            deadline: settings.timeout.map(Deadline::after).unwrap_or_default(),
        }
    }

    fn switcher(&self) -> ContextSwitcher<'_, FileProfileStore, FileStateStore> {
        ContextSwitcher::new(&self.profile, &self.state).with_deadline(self.deadline)
    }
}

// ── Switching ─────────────────────────────────────────────────────────────────

pub fn interactive(settings: &Settings, by_tenant: bool) -> Result<()> {
    let stores = Stores::open(settings);
    let mut picker = FuzzyPicker;

    let switched = if by_tenant {
        stores.switcher().select_by_tenant_and_switch(&mut picker)?
    } else {
        stores.switcher().select_and_switch(&mut picker)?
    };
    report(&switched);
    Ok(())
}

pub fn switch_to(settings: &Settings, query: &str) -> Result<()> {
    let stores = Stores::open(settings);
    let switched = stores.switcher().switch_to_query(query)?;
    report(&switched);
    Ok(())
}

pub fn previous(settings: &Settings) -> Result<()> {
    let stores = Stores::open(settings);
    let switched = stores
        .switcher()
        .restore_previous()
        .with_context(|| {
            format!(
                "Cannot restore previous context from {}",
                settings.state_path.display()
            )
        })?;
    report(&switched);
    Ok(())
}

fn report(switched: &Switched) {
    if let Some(prev) = &switched.previous {
        println!(
            "\n  {} {}  {}  {}",
            "→".cyan().bold(),
            prev.display_name.dimmed(),
            "→".dimmed(),
            switched.name.cyan().bold()
        );
    }
    success(&format!(
        "Switched context to: {} ({})",
        switched.name, switched.id
    ));
}

// ── Listing ───────────────────────────────────────────────────────────────────

pub fn list(settings: &Settings) -> Result<()> {
    let config = FileProfileStore::new(&settings.profile_path).read()?;

    if config.subscriptions.is_empty() {
        println!("\n  {}\n", "No subscriptions in profile.".dimmed());
        println!("  Run {} to sign in.\n", "az login".cyan().bold());
        return Ok(());
    }

    let width = config
        .subscriptions
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0);

    println!("\n  {}", "Subscriptions".bold());
    println!("  {}", "─".repeat(width + 40).dimmed());

    for sub in &config.subscriptions {
        let line = subscription_label(sub, width);
        if sub.is_default {
            println!("  {}  {}", line.green().bold(), "(active)".green().dimmed());
        } else {
            println!("  {}", line);
        }
    }

    println!("  {}\n", "─".repeat(width + 40).dimmed());
    Ok(())
}

pub fn current(settings: &Settings) -> Result<()> {
    let config = FileProfileStore::new(&settings.profile_path).read()?;

    match config.default_subscription() {
        Some(sub) => println!(
            "\n  {} {} {}\n",
            "▶".green().bold(),
            sub.name.bold(),
            format!("({})", sub.id).dimmed()
        ),
        None => warn("No default subscription set."),
    }

    let last = FileStateStore::new(&settings.state_path).get_last_context()?;
    if !last.is_empty() {
        println!(
            "  {} {} {}\n",
            "previous:".dimmed(),
            last.display_name,
            format!("({})", last.id).dimmed()
        );
    }
    Ok(())
}

// ── Tenants ───────────────────────────────────────────────────────────────────

pub fn tenant_list(settings: &Settings) -> Result<()> {
    let config = FileProfileStore::new(&settings.profile_path).read()?;
    let tenants = tenants::derive_tenants(&config)?;

    println!("\n  {}", "Tenants".bold());
    println!("  {}", "─".repeat(60).dimmed());
    for tenant in &tenants {
        let count = config
            .subscriptions
            .iter()
            .filter(|s| s.tenant_id == tenant.id)
            .count();
        let name = if tenant.custom_name.is_some() {
            tenant.display_name().cyan().bold()
        } else {
            tenant.display_name().normal()
        };
        println!(
            "  {}  {}  {}",
            name,
            tenant.id.to_string().dimmed(),
            format!("{count} subscription(s)").dimmed()
        );
    }
    println!("  {}\n", "─".repeat(60).dimmed());
    Ok(())
}

pub fn tenant_rename(settings: &Settings, tenant_id: &str, name: &str) -> Result<()> {
    let id = Uuid::parse_str(tenant_id.trim()).map_err(|_| Error::InvalidTenantId)?;
    let stores = Stores::open(settings);
    stores.switcher().save_tenant_custom_name(id, name)?;
    success(&format!("Saved custom name '{}' for tenant {}", name.trim(), id));
    Ok(())
}

// ── Notifications ─────────────────────────────────────────────────────────────

fn success(msg: &str) {
    println!("  {} {}\n", "✓".green().bold(), msg);
}

fn warn(msg: &str) {
    println!("\n  {} {}\n", "!".yellow().bold(), msg);
}
