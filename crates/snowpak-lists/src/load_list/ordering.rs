//! Dependency ordering rules.
//!
//! The rules below are inferred from the lists shipped with the game. Files
//! that break them may still load, so violations are reported as warnings.

use std::fmt;

use tracing::warn;

use super::{EntryKind, LoadList};

/// A dependency pattern that differs from the shipped lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum OrderingIssue {
    StartHasDependencies,
    UnsortedDependencies,
    AssetWithoutDependencies,
    AssetWithMultipleDependencies,
    /// A stage after several entries does not depend on exactly those entries.
    StageRangeMismatch,
    StageWithoutDependencies,
    /// A stage right after another depends on more than that stage.
    StageWithMultipleDependencies,
}

impl fmt::Display for OrderingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StartHasDependencies => "start entry has dependencies",
            Self::UnsortedDependencies => "dependencies list is not sorted",
            Self::AssetWithoutDependencies => "asset has no dependencies",
            Self::AssetWithMultipleDependencies => "asset has more than one dependency",
            Self::StageRangeMismatch => "stage doesn't depend on previous assets exactly",
            Self::StageWithoutDependencies => "stage has no dependencies",
            Self::StageWithMultipleDependencies => {
                "stage depends on more than immediately preceding stage"
            }
        })
    }
}

/// An ordering anomaly at a specific entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OrderingWarning {
    pub index: usize,
    pub issue: OrderingIssue,
}

impl fmt::Display for OrderingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.index, self.issue)
    }
}

impl LoadList {
    /// Check the dependencies against the patterns seen in shipped lists.
    ///
    /// Every anomaly is returned and logged at `warn` level; none of them
    /// makes the list invalid.
    pub fn validate_ordering(&self) -> Vec<OrderingWarning> {
        let mut warnings = Vec::new();
        let mut report = |index: usize, issue: OrderingIssue| {
            warn!(index, %issue, "load list ordering");
            warnings.push(OrderingWarning { index, issue });
        };

        let mut last_group = 0usize;
        for (index, entry) in self.entries().iter().enumerate() {
            let deps = &entry.depends_on;
            if index == 0 {
                if !deps.is_empty() {
                    report(index, OrderingIssue::StartHasDependencies);
                }
                continue;
            }

            let mut sorted = deps.clone();
            sorted.sort_unstable();
            if sorted != *deps {
                report(index, OrderingIssue::UnsortedDependencies);
            }

            match &entry.kind {
                EntryKind::Asset(_) => {
                    if deps.is_empty() {
                        report(index, OrderingIssue::AssetWithoutDependencies);
                    }
                    if deps.len() > 1 {
                        report(index, OrderingIssue::AssetWithMultipleDependencies);
                    }
                }
                EntryKind::Stage { .. } | EntryKind::End => {
                    if index - last_group > 1 {
                        if !sorted.iter().map(|&d| d as usize).eq(last_group + 1..index) {
                            report(index, OrderingIssue::StageRangeMismatch);
                        }
                    } else {
                        if deps.is_empty() {
                            report(index, OrderingIssue::StageWithoutDependencies);
                        }
                        if deps.len() > 1 {
                            report(index, OrderingIssue::StageWithMultipleDependencies);
                        }
                    }
                    last_group = index;
                }
                EntryKind::Start => {}
            }
        }
        warnings
    }

    /// Replace every entry's dependencies with the conventional defaults.
    ///
    /// Start depends on nothing; assets and the end entry depend on the entry
    /// right before them; a stage depends on every entry since the previous
    /// stage, or on the previous stage alone when nothing lies in between.
    pub fn set_default_dependencies(&mut self) {
        let mut last_group = 0usize;
        for (index, entry) in self.entries_mut().iter_mut().enumerate() {
            entry.depends_on = match entry.kind {
                EntryKind::Start => {
                    last_group = index;
                    Vec::new()
                }
                EntryKind::Asset(_) | EntryKind::End => vec![index.saturating_sub(1) as u32],
                EntryKind::Stage { .. } => {
                    let deps = if index - last_group > 1 {
                        (last_group + 1..index).map(|d| d as u32).collect()
                    } else {
                        vec![index.saturating_sub(1) as u32]
                    };
                    last_group = index;
                    deps
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_list::{AssetEntry, LoadListEntry};

    fn asset(name: &str) -> LoadListEntry {
        LoadListEntry::asset(AssetEntry::new(name, "loader", "p.pak"))
    }

    #[test]
    fn test_minimal_list_has_no_warnings() {
        let mut list = LoadList::new(vec![
            LoadListEntry::start(),
            LoadListEntry::stage("A"),
            asset("<g>\\x"),
            LoadListEntry::end(),
        ]);
        list.set_default_dependencies();

        let deps: Vec<_> = list.entries().iter().map(|e| e.depends_on.clone()).collect();
        assert_eq!(deps, vec![vec![], vec![0], vec![1], vec![2]]);
        assert!(list.validate_ordering().is_empty());
    }

    #[test]
    fn test_stage_depends_on_range() {
        let mut list = LoadList::new(vec![
            LoadListEntry::start(),
            LoadListEntry::stage("A"),
            asset("<g>\\x"),
            asset("<g>\\y"),
            LoadListEntry::stage("B"),
            LoadListEntry::stage("C"),
            LoadListEntry::end(),
        ]);
        list.set_default_dependencies();

        assert_eq!(list.entries()[4].depends_on, vec![2, 3]);
        assert_eq!(list.entries()[5].depends_on, vec![4]);
        assert_eq!(list.entries()[6].depends_on, vec![5]);
        assert!(list.validate_ordering().is_empty());
    }

    #[test]
    fn test_anomalies_are_reported() {
        let mut list = LoadList::new(vec![
            LoadListEntry::start(),
            LoadListEntry::stage("A"),
            asset("<g>\\x"),
            asset("<g>\\y"),
            LoadListEntry::stage("B"),
            LoadListEntry::end(),
        ]);
        list.set_default_dependencies();
        list.entries_mut()[0].depends_on = vec![1];
        list.entries_mut()[2].depends_on = vec![];
        list.entries_mut()[3].depends_on = vec![2, 1];
        list.entries_mut()[4].depends_on = vec![2];
        list.entries_mut()[5].depends_on = vec![3, 4];

        let warnings = list.validate_ordering();
        let found: Vec<_> = warnings.iter().map(|w| (w.index, w.issue)).collect();
        assert_eq!(
            found,
            vec![
                (0, OrderingIssue::StartHasDependencies),
                (2, OrderingIssue::AssetWithoutDependencies),
                (3, OrderingIssue::UnsortedDependencies),
                (3, OrderingIssue::AssetWithMultipleDependencies),
                (4, OrderingIssue::StageRangeMismatch),
                (5, OrderingIssue::StageWithMultipleDependencies),
            ]
        );
        assert_eq!(
            warnings[0].to_string(),
            "[0] start entry has dependencies"
        );
    }
}
