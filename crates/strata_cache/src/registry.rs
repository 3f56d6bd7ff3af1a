//! Lifecycle tracking of class and tag tokens.
//!
//! Class tokens move `Pending -> Generated` when the compiler accepts them, or
//! `Pending -> Rejected` when it does not. Tag tokens start out `Available`
//! (drawn from the static HTML tag universe), become `Pending` once seen in a
//! source, and `Generated` once their preflight has been produced.
//!
//! Invariants, maintained by every operation:
//! - the class sets `Pending`, `Generated` and `Rejected` are pairwise disjoint;
//! - the tag sets `Available`, `Pending` and `Generated` are pairwise disjoint.

use std::collections::{BTreeMap, BTreeSet};

use strata_common::{kebab_case, HTML_TAGS};
use strata_config::ResolvedConfig;

/// The configuration-derived rules the registry filters tokens through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryPolicy {
    /// Class tokens that never become pending.
    pub blocklist: BTreeSet<String>,
    /// Class tokens queued on every reset.
    pub safelist: BTreeSet<String>,
    /// Tags that never become pending.
    pub tag_blocklist: BTreeSet<String>,
    /// Tags queued on every reset.
    pub tag_safelist: BTreeSet<String>,
    /// Kebab-cased component name to the tag it renders as.
    pub tag_aliases: BTreeMap<String, String>,
}

impl RegistryPolicy {
    /// Derives the policy from a resolved configuration.
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            blocklist: config.blocklist.clone(),
            safelist: config.safelist.clone(),
            tag_blocklist: config.preflight.blocklist.clone(),
            tag_safelist: config.preflight.safelist.clone(),
            tag_aliases: config.preflight.alias.clone(),
        }
    }

    fn alias_of(&self, tag: &str) -> Option<&str> {
        self.tag_aliases.get(&kebab_case(tag)).map(String::as_str)
    }

    /// Safelisted tags resolved through the alias table, keeping only known
    /// tags that are not blocklisted.
    fn safelisted_tags(&self) -> BTreeSet<String> {
        self.tag_safelist
            .iter()
            .filter_map(|tag| {
                let tag = if HTML_TAGS.contains(&tag.as_str()) {
                    tag.as_str()
                } else {
                    self.alias_of(tag)?
                };
                (HTML_TAGS.contains(&tag) && !self.tag_blocklist.contains(tag))
                    .then(|| tag.to_string())
            })
            .collect()
    }
}

/// The sets of class and tag tokens in each lifecycle state.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    policy: RegistryPolicy,
    classes_pending: BTreeSet<String>,
    classes_generated: BTreeSet<String>,
    classes_rejected: BTreeSet<String>,
    tags_available: BTreeSet<String>,
    tags_pending: BTreeSet<String>,
    tags_generated: BTreeSet<String>,
}

impl TokenRegistry {
    /// Creates an empty registry. No tag is available until the first
    /// non-full [`reset`](Self::reset).
    pub fn new(policy: RegistryPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Replaces the filtering policy. Takes effect for subsequent additions
    /// and resets; already-tracked tokens are not re-filtered until a reset.
    pub fn set_policy(&mut self, policy: RegistryPolicy) {
        self.policy = policy;
    }

    /// Returns the current filtering policy.
    pub fn policy(&self) -> &RegistryPolicy {
        &self.policy
    }

    /// Queues new class tokens for compilation.
    ///
    /// Empty, blocklisted, and already-known tokens (pending, generated or
    /// rejected) are skipped. Returns `true` if at least one token was queued.
    pub fn add_classes<I, S>(&mut self, tokens: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut changed = false;
        for token in tokens {
            let token = token.as_ref();
            if token.is_empty()
                || self.classes_generated.contains(token)
                || self.classes_pending.contains(token)
                || self.classes_rejected.contains(token)
                || self.policy.blocklist.contains(token)
            {
                continue;
            }
            self.classes_pending.insert(token.to_string());
            changed = true;
        }
        changed
    }

    /// Requests preflight for observed tags.
    ///
    /// A tag that is not itself available is looked up in the alias table by
    /// its kebab-cased name. Blocklisted tags are skipped. Returns `true` if at
    /// least one tag moved from available to pending.
    pub fn add_tags<I, S>(&mut self, tags: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut changed = false;
        for tag in tags {
            let mut tag = tag.as_ref();
            if !self.tags_available.contains(tag) {
                match self.policy.alias_of(tag) {
                    Some(target) => tag = target,
                    None => continue,
                }
            }
            if self.policy.tag_blocklist.contains(tag) {
                continue;
            }
            if !self.tags_pending.contains(tag) && self.tags_available.remove(tag) {
                self.tags_pending.insert(tag.to_string());
                changed = true;
            }
        }
        changed
    }

    /// Resets token state after a (re)configuration.
    ///
    /// A full reset forgets everything. Otherwise every generated or rejected
    /// class and every generated tag is queued again (usage survives the
    /// reconfiguration, compiled output does not), and the available tags are
    /// rebuilt from the HTML tag universe. In both modes the configured
    /// safelists are queued.
    pub fn reset(&mut self, full: bool) {
        if full {
            self.classes_pending.clear();
            self.tags_pending.clear();
            self.tags_available.clear();
        } else {
            let requeued: Vec<String> = self
                .classes_generated
                .iter()
                .chain(self.classes_rejected.iter())
                .cloned()
                .collect();
            self.classes_pending.extend(requeued);
            let tags = std::mem::take(&mut self.tags_generated);
            self.tags_pending.extend(tags);

            let blocklist = &self.policy.blocklist;
            self.classes_pending.retain(|t| !blocklist.contains(t));
            let tag_blocklist = &self.policy.tag_blocklist;
            self.tags_pending.retain(|t| !tag_blocklist.contains(t));
        }
        self.classes_generated.clear();
        self.classes_rejected.clear();
        self.tags_generated.clear();

        let safelist: Vec<String> = self
            .policy
            .safelist
            .difference(&self.policy.blocklist)
            .cloned()
            .collect();
        self.classes_pending.extend(safelist);
        self.tags_pending.extend(self.policy.safelisted_tags());

        if !full {
            self.tags_available = HTML_TAGS
                .iter()
                .copied()
                .filter(|t| {
                    !self.policy.tag_blocklist.contains(*t) && !self.tags_pending.contains(*t)
                })
                .map(str::to_string)
                .collect();
        }
        tracing::debug!(
            full,
            pending_classes = self.classes_pending.len(),
            pending_tags = self.tags_pending.len(),
            available_tags = self.tags_available.len(),
            "token registry reset"
        );
    }

    /// Records the outcome of compiling `submitted` class tokens.
    ///
    /// Submitted tokens leave `Pending`: the ones in `succeeded` become
    /// generated, the rest rejected. Tokens queued after the submission are
    /// left pending.
    pub fn complete_classes(&mut self, submitted: &[String], succeeded: &[String]) {
        let succeeded: BTreeSet<&str> = succeeded.iter().map(String::as_str).collect();
        for token in submitted {
            if !self.classes_pending.remove(token) {
                continue;
            }
            if succeeded.contains(token.as_str()) {
                self.classes_generated.insert(token.clone());
            } else {
                self.classes_rejected.insert(token.clone());
            }
        }
    }

    /// Records that preflight was produced for `handled` tags.
    pub fn complete_tags(&mut self, handled: &[String]) {
        for tag in handled {
            if self.tags_pending.remove(tag) {
                self.tags_generated.insert(tag.clone());
            }
        }
    }

    /// Returns `true` if any class or tag awaits compilation.
    pub fn has_pending(&self) -> bool {
        !self.classes_pending.is_empty() || !self.tags_pending.is_empty()
    }

    /// Class tokens queued for compilation.
    pub fn pending_classes(&self) -> &BTreeSet<String> {
        &self.classes_pending
    }

    /// Class tokens already compiled.
    pub fn generated_classes(&self) -> &BTreeSet<String> {
        &self.classes_generated
    }

    /// Class tokens the compiler did not accept since the last reset.
    pub fn rejected_classes(&self) -> &BTreeSet<String> {
        &self.classes_rejected
    }

    /// Tags that may still be requested.
    pub fn available_tags(&self) -> &BTreeSet<String> {
        &self.tags_available
    }

    /// Tags awaiting preflight generation.
    pub fn pending_tags(&self) -> &BTreeSet<String> {
        &self.tags_pending
    }

    /// Tags whose preflight has been produced.
    pub fn generated_tags(&self) -> &BTreeSet<String> {
        &self.tags_generated
    }

    /// The union of every tag set.
    pub fn tag_universe(&self) -> BTreeSet<String> {
        self.tags_available
            .iter()
            .chain(&self.tags_pending)
            .chain(&self.tags_generated)
            .cloned()
            .collect()
    }
}
