//! One audit-and-prune pass over the firewall allow-list.
//!
//! ```text
//! ufw status ──► allow rules ──► lsof per rule ──► used | unused
//!                                                      │
//!                               whitelist (exclusion) ◄┘
//!                                                      │
//!                        confirm ──► ufw delete allow … per rule
//! ```
//!
//! Everything up to the confirmation is computed by [`plan`] without touching
//! firewall state, so it can be repeated on the same snapshot.

use tracing::{error, info, warn};

use crate::firewall::{list_allowed_rules, FirewallStateSource};
use crate::probe::{is_in_use, ProbeMatch, SocketUsageSource};
use crate::prompt::{is_affirmative, Confirmer};
use crate::rule::Rule;
use crate::whitelist::Whitelist;

/// Allow rules split by whether anything uses their port.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub used: Vec<Rule>,
    pub unused: Vec<Rule>,
}

/// Result of the pure part of a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Rules with a live listener; never touched.
    pub used: Vec<Rule>,
    /// Unused rules kept because a whitelist entry protects them.
    pub whitelisted: Vec<Rule>,
    /// Unused, unprotected rules.
    pub to_delete: Vec<Rule>,
}

/// How a pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The deletion set was empty; the operator was not asked.
    NothingToDelete,
    /// The operator did not confirm; firewall untouched.
    Declined,
    /// Deletions were attempted.
    Applied { deleted: Vec<Rule>, failed: Vec<Rule> },
}

/// Probe every rule, one at a time, and split by usage.
pub fn partition_by_usage(
    rules: &[Rule],
    probe: &dyn SocketUsageSource,
    mode: ProbeMatch,
) -> Partition {
    let mut partition = Partition::default();
    for rule in rules {
        if is_in_use(probe, &rule.canonical(), mode) {
            info!("{} is used", rule);
            partition.used.push(*rule);
        } else {
            info!("port {} is not used", rule);
            partition.unused.push(*rule);
        }
    }
    partition
}

/// Split unused candidates into `(to_delete, whitelisted)`.
///
/// Builds both vectors by exclusion; the input is never mutated, so every
/// candidate is checked against the whole whitelist.
pub fn filter_whitelisted(unused: &[Rule], whitelist: &Whitelist) -> (Vec<Rule>, Vec<Rule>) {
    let mut to_delete = Vec::with_capacity(unused.len());
    let mut whitelisted = Vec::new();
    for rule in unused {
        match whitelist.find_match(rule) {
            Some(entry) => {
                info!("{} is whitelisted ({}) and will not be deleted", rule, entry);
                whitelisted.push(*rule);
            }
            None => {
                if let Some(entry) = whitelist.partial_match(rule) {
                    warn!(
                        "{} is a rule for both protocols; deleting it also removes whitelisted {}",
                        rule.port, entry
                    );
                }
                to_delete.push(*rule);
            }
        }
    }
    (to_delete, whitelisted)
}

/// Compute the deletion set for an inventory snapshot.
pub fn plan(
    inventory: &[Rule],
    probe: &dyn SocketUsageSource,
    whitelist: &Whitelist,
    mode: ProbeMatch,
) -> Plan {
    let Partition { used, unused } = partition_by_usage(inventory, probe, mode);
    let (to_delete, whitelisted) = filter_whitelisted(&unused, whitelist);
    Plan {
        used,
        whitelisted,
        to_delete,
    }
}

/// Drives a full reconciliation pass against the external collaborators.
pub struct Reconciler<'a> {
    firewall: &'a dyn FirewallStateSource,
    probe: &'a dyn SocketUsageSource,
    confirmer: &'a dyn Confirmer,
    whitelist: &'a Whitelist,
    probe_match: ProbeMatch,
    confirm_token: String,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        firewall: &'a dyn FirewallStateSource,
        probe: &'a dyn SocketUsageSource,
        confirmer: &'a dyn Confirmer,
        whitelist: &'a Whitelist,
    ) -> Self {
        Self {
            firewall,
            probe,
            confirmer,
            whitelist,
            probe_match: ProbeMatch::default(),
            confirm_token: "Y".to_string(),
        }
    }

    pub fn with_probe_match(mut self, mode: ProbeMatch) -> Self {
        self.probe_match = mode;
        self
    }

    pub fn with_confirm_token(mut self, token: impl Into<String>) -> Self {
        self.confirm_token = token.into();
        self
    }

    /// Read the allow-list and compute what would be deleted.
    pub fn plan(&self) -> Plan {
        let inventory = list_allowed_rules(self.firewall);
        info!("Checking {} allow rule(s)", inventory.len());
        plan(&inventory, self.probe, self.whitelist, self.probe_match)
    }

    /// Plan, confirm and delete.
    pub fn run(&self) -> Outcome {
        let plan = self.plan();
        self.apply(&plan)
    }

    /// Ask for confirmation and delete `plan.to_delete`.
    pub fn apply(&self, plan: &Plan) -> Outcome {
        if plan.to_delete.is_empty() {
            info!("No unused ports to delete");
            return Outcome::NothingToDelete;
        }

        let listing: Vec<String> = plan.to_delete.iter().map(Rule::canonical).collect();
        info!("Ports to delete: {}", listing.join(", "));

        // Shown regardless of log level
        println!();
        println!("Rules to delete ({}):", listing.len());
        for spec in &listing {
            println!("  {}", spec);
        }
        println!();

        let prompt = format!(
            "Delete these {} rule(s) from the firewall? Type '{}' to confirm",
            plan.to_delete.len(),
            self.confirm_token
        );
        let answer = self.confirmer.ask(&prompt).unwrap_or_else(|e| {
            warn!("Could not read confirmation, treating as no: {:#}", e);
            String::new()
        });

        if !is_affirmative(&answer, &self.confirm_token) {
            info!("no ports deleted");
            self.show_status();
            return Outcome::Declined;
        }

        let mut deleted = Vec::new();
        let mut failed = Vec::new();
        for rule in &plan.to_delete {
            match self.firewall.delete_rule(rule) {
                Ok(()) => {
                    info!("{} deleted from firewall", rule);
                    deleted.push(*rule);
                }
                Err(e) => {
                    error!("Could not delete {}: {:#}", rule, e);
                    failed.push(*rule);
                }
            }
        }

        if !failed.is_empty() {
            warn!(
                "{} of {} deletion(s) failed",
                failed.len(),
                plan.to_delete.len()
            );
        }
        Outcome::Applied { deleted, failed }
    }

    fn show_status(&self) {
        match self.firewall.status() {
            Ok(status) => print!("{}", status),
            Err(e) => warn!("Could not read firewall status: {:#}", e),
        }
    }
}
