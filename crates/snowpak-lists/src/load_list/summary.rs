//! Aggregate views of a load list used by the listing command.

use super::{EntryKind, LoadList};

/// Asset counts for one resource group inside a pak.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GroupSummary<'a> {
    /// Group name, empty for assets without a group.
    pub group: &'a str,
    pub assets: usize,
    pub loaders: Vec<(&'a str, usize)>,
}

/// Asset counts for one pak.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PakSummary<'a> {
    pub pak_name: &'a str,
    pub assets: usize,
    pub groups: Vec<GroupSummary<'a>>,
}

/// Stages, loaders and paks of a load list, in order of first appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LoadListSummary<'a> {
    /// Entry index and text of every stage.
    pub stages: Vec<(usize, &'a str)>,
    pub loaders: Vec<(&'a str, usize)>,
    pub paks: Vec<PakSummary<'a>>,
}

/// Increment the counter for `key`, appending it on first sight.
fn bump<'a>(counts: &mut Vec<(&'a str, usize)>, key: &'a str) {
    match counts.iter_mut().find(|(k, _)| *k == key) {
        Some((_, n)) => *n += 1,
        None => counts.push((key, 1)),
    }
}

impl LoadList {
    /// Summarize the list.
    pub fn summary(&self) -> LoadListSummary<'_> {
        let mut stages = Vec::new();
        let mut loaders = Vec::new();
        let mut paks: Vec<PakSummary<'_>> = Vec::new();

        for (index, entry) in self.entries().iter().enumerate() {
            match &entry.kind {
                EntryKind::Stage { text } => stages.push((index, text.as_str())),
                EntryKind::Asset(asset) => {
                    bump(&mut loaders, &asset.loader);

                    let pak = match paks.iter().position(|p| p.pak_name == asset.pak_name) {
                        Some(i) => &mut paks[i],
                        None => {
                            paks.push(PakSummary {
                                pak_name: &asset.pak_name,
                                assets: 0,
                                groups: Vec::new(),
                            });
                            let last = paks.len() - 1;
                            &mut paks[last]
                        }
                    };
                    pak.assets += 1;

                    let group_name = asset.group().unwrap_or("");
                    let group = match pak.groups.iter().position(|g| g.group == group_name) {
                        Some(i) => &mut pak.groups[i],
                        None => {
                            pak.groups.push(GroupSummary {
                                group: group_name,
                                assets: 0,
                                loaders: Vec::new(),
                            });
                            let last = pak.groups.len() - 1;
                            &mut pak.groups[last]
                        }
                    };
                    group.assets += 1;
                    bump(&mut group.loaders, &asset.loader);
                }
                EntryKind::Start | EntryKind::End => {}
            }
        }

        LoadListSummary {
            stages,
            loaders,
            paks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_list::{AssetEntry, LoadListEntry};

    #[test]
    fn test_summary_groups_in_first_seen_order() {
        let asset = |name: &str, loader: &str, pak: &str| {
            LoadListEntry::asset(AssetEntry::new(name, loader, pak))
        };
        let mut list = LoadList::new(vec![
            LoadListEntry::start(),
            LoadListEntry::stage("S1"),
            asset("<media>\\a.xml", "cls_loader", "initial.pak"),
            asset("<ssl_cache>\\b.spdb", "spdb", "initial.pak"),
            asset("<media>\\c.xml", "tpl_loader", "initial.pak"),
            LoadListEntry::stage("S2"),
            asset("x.sound_list", "sound_loader", "shared_sound.pak"),
            LoadListEntry::end(),
        ]);
        list.set_default_dependencies();

        let summary = list.summary();
        assert_eq!(summary.stages, vec![(1, "S1"), (5, "S2")]);
        assert_eq!(
            summary.loaders,
            vec![("cls_loader", 1), ("spdb", 1), ("tpl_loader", 1), ("sound_loader", 1)]
        );
        assert_eq!(summary.paks.len(), 2);

        let initial = &summary.paks[0];
        assert_eq!((initial.pak_name, initial.assets), ("initial.pak", 3));
        assert_eq!(initial.groups[0].group, "media");
        assert_eq!(initial.groups[0].assets, 2);
        assert_eq!(
            initial.groups[0].loaders,
            vec![("cls_loader", 1), ("tpl_loader", 1)]
        );
        assert_eq!(initial.groups[1].group, "ssl_cache");
        assert_eq!(summary.paks[1].groups[0].group, "");
    }
}
