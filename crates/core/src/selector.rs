//! Bounded random selection of upgrade candidates.
//!
//! Selection draws uniformly at random, without replacement, from the
//! eligible items of one instance. The draw size is capped three ways:
//! by the eligible count, by the instance cap, and by what is left of
//! the global run budget.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::client::CatalogItem;

/// Per-instance upgrade cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceCap {
    Unlimited,
    Limit(usize),
}

impl InstanceCap {
    /// Interpret a configured integer: negative means unlimited.
    pub fn from_configured(raw: i64) -> Self {
        if raw < 0 {
            InstanceCap::Unlimited
        } else {
            InstanceCap::Limit(raw as usize)
        }
    }

    fn bound(&self, n: usize) -> usize {
        match self {
            InstanceCap::Unlimited => n,
            InstanceCap::Limit(limit) => n.min(*limit),
        }
    }
}

impl fmt::Display for InstanceCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceCap::Unlimited => write!(f, "unlimited"),
            InstanceCap::Limit(limit) => write!(f, "{limit}"),
        }
    }
}

/// How many upgrades the whole run may still trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunBudget {
    remaining: Option<usize>,
}

impl RunBudget {
    /// Interpret the configured global cap: negative means unlimited.
    pub fn new(configured: i64) -> Self {
        let remaining = if configured < 0 {
            None
        } else {
            Some(configured as usize)
        };
        Self { remaining }
    }

    pub fn unlimited() -> Self {
        Self { remaining: None }
    }

    /// Remaining slots, `None` when unbounded.
    pub fn remaining(&self) -> Option<usize> {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Consume `n` slots. An unbounded budget is unaffected; a bounded
    /// one never goes below zero.
    pub fn consume(&mut self, n: usize) {
        if let Some(remaining) = &mut self.remaining {
            *remaining = remaining.saturating_sub(n);
        }
    }

    fn bound(&self, n: usize) -> usize {
        match self.remaining {
            None => n,
            Some(remaining) => n.min(remaining),
        }
    }
}

/// Draw the allowed number of items uniformly at random, without
/// replacement. Returns an empty selection when any bound is zero.
pub fn select_upgrades<R: Rng + ?Sized>(
    eligible: &[CatalogItem],
    cap: InstanceCap,
    budget: &RunBudget,
    rng: &mut R,
) -> Vec<CatalogItem> {
    let quota = budget.bound(cap.bound(eligible.len()));
    if quota == 0 {
        return Vec::new();
    }
    eligible.choose_multiple(rng, quota).cloned().collect()
}
