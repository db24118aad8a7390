use serde::Deserialize;

/// Line statistics of a single file touched by a pull request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct FileChange {
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

impl FileChange {
    pub fn new(additions: u64, deletions: u64) -> Self {
        Self {
            additions,
            deletions,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffTotals {
    pub additions: u64,
    pub deletions: u64,
}

impl DiffTotals {
    pub fn sum<'a>(files: impl IntoIterator<Item = &'a FileChange>) -> Self {
        files
            .into_iter()
            .fold(Self::default(), |totals, file| Self {
                additions: totals.additions.saturating_add(file.additions),
                deletions: totals.deletions.saturating_add(file.deletions),
            })
    }
}
