use std::{fmt, str::FromStr};

use crate::{CommentId, DiffTotals};

/// Minimum amount of added lines that makes a pull request "big".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Threshold(u64);

impl Threshold {
    pub const DEFAULT: Threshold = Threshold(1000);

    pub fn new(value: u64) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn is_reached_by(&self, totals: &DiffTotals) -> bool {
        totals.additions >= self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Threshold {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u64 = s
            .trim()
            .parse()
            .map_err(|_| "threshold is not a non-negative integer")?;
        Self::new(value).ok_or("threshold must be greater than zero")
    }
}

/// What has to happen with the marker comment to match the current diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    Nothing,
    Create,
    Update(CommentId),
    Delete(CommentId),
}

pub fn reconcile(
    totals: &DiffTotals,
    threshold: Threshold,
    existing: Option<CommentId>,
) -> Reconciliation {
    match (existing, threshold.is_reached_by(totals)) {
        (None, false) => Reconciliation::Nothing,
        (None, true) => Reconciliation::Create,
        (Some(id), true) => Reconciliation::Update(id),
        (Some(id), false) => Reconciliation::Delete(id),
    }
}
