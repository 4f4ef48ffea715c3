//! Canonical load list for `initial.pak`.

use snowpak_common::NameStyle;
use tracing::debug;

use super::{AssetEntry, LoadList, LoadListEntry};
use crate::Result;

const INITIAL_PAK: &str = "initial.pak";
const SHARED_PAK: &str = "shared.pak";
const SHARED_SOUND_PAK: &str = "shared_sound.pak";

/// Selects external names from one pak's file list.
struct AssetFilter {
    pak_name: &'static str,
    /// Required name prefix; `None` selects names without a directory.
    directory: Option<&'static str>,
    /// Required suffix; `None` selects names without an extension.
    extension: Option<&'static str>,
    loader: &'static str,
    exclude: fn(&str) -> bool,
}

impl AssetFilter {
    fn matches(&self, name: &str) -> bool {
        let directory_ok = match self.directory {
            Some(prefix) => starts_with_ignore_case(name, prefix),
            None => !name.contains(['\\', '/']),
        };
        let extension_ok = match self.extension {
            Some(suffix) => ends_with_ignore_case(name, suffix),
            None => !has_extension(name),
        };
        directory_ok && extension_ok && !(self.exclude)(name)
    }

    fn select(&self, names: &[String]) -> Result<Vec<LoadListEntry>> {
        let mut selected: Vec<&str> = names
            .iter()
            .map(String::as_str)
            .filter(|name| self.matches(name))
            .collect();
        selected.sort_unstable();

        let entries = selected
            .into_iter()
            .map(|name| {
                let internal = NameStyle::LoadList.to_internal(name)?;
                Ok(LoadListEntry::asset(AssetEntry::new(
                    internal,
                    self.loader,
                    self.pak_name,
                )))
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(
            loader = self.loader,
            pak = self.pak_name,
            assets = entries.len(),
            "selected load list assets"
        );
        Ok(entries)
    }
}

fn keep_all(_: &str) -> bool {
    false
}

/// Meshes that the shipped list leaves out.
fn exclude_mesh(name: &str) -> bool {
    const EXCLUDED: [&str; 3] = ["[meshes]\\grass_", "[meshes]\\plants_", "[meshes]\\overlays_"];
    if EXCLUDED.iter().any(|p| starts_with_ignore_case(name, p)) {
        return true;
    }
    if starts_with_ignore_case(name, "[meshes]\\models_cargo_unit_") {
        return false;
    }
    starts_with_ignore_case(name, "[meshes]\\models_")
}

fn starts_with_ignore_case(name: &str, prefix: &str) -> bool {
    name.len() >= prefix.len()
        && name.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn ends_with_ignore_case(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name.as_bytes()[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix.as_bytes())
}

fn has_extension(name: &str) -> bool {
    let file = name.rsplit(['\\', '/']).next().unwrap_or(name);
    matches!(file.rfind('.'), Some(dot) if dot + 1 < file.len())
}

impl LoadList {
    /// Build the load list for `initial.pak` from the external file names of
    /// the initial, shared and shared sound paks.
    ///
    /// Dependencies are set with [`LoadList::set_default_dependencies`].
    pub fn create_initial(
        initial: &[String],
        shared: &[String],
        shared_sound: &[String],
    ) -> Result<Self> {
        let filter = |pak_name, directory, extension, loader| AssetFilter {
            pak_name,
            directory,
            extension,
            loader,
            exclude: keep_all,
        };

        let mut entries = vec![
            LoadListEntry::start(),
            LoadListEntry::stage("RES3_INIT load"),
            LoadListEntry::stage("SSL_SOURCES_PARSE load"),
        ];

        entries.extend(
            filter(INITIAL_PAK, Some("[ssl_cache]\\"), Some(".spdb"), "spdb").select(initial)?,
        );
        entries.extend(
            filter(INITIAL_PAK, Some("[ssl_cache]\\"), Some(".sslbundle"), "sslbundle")
                .select(initial)?,
        );
        entries.push(LoadListEntry::stage("SSL_INITIAL load"));

        entries.extend(
            filter(INITIAL_PAK, Some("[media]\\_templates\\"), Some(".xml"), "tpl_loader")
                .select(initial)?,
        );
        entries.push(LoadListEntry::stage("TEMPLATES load"));

        entries.extend(
            filter(INITIAL_PAK, Some("[media]\\classes\\"), Some(".xml"), "cls_loader")
                .select(initial)?,
        );
        entries.push(LoadListEntry::stage("CLASSES load"));

        entries.push(LoadListEntry::stage("TEXTURE_PREPARE load"));
        entries.push(LoadListEntry::stage("TEXTURE load"));

        let meshes = AssetFilter {
            exclude: exclude_mesh,
            ..filter(SHARED_PAK, Some("[meshes]\\"), None, "mesh_loader")
        };
        entries.extend(meshes.select(shared)?);
        entries.push(LoadListEntry::stage("MESH load"));

        entries.extend(
            filter(SHARED_SOUND_PAK, None, Some(".sound_list"), "sound_loader")
                .select(shared_sound)?,
        );
        entries.push(LoadListEntry::stage("SOUND load"));

        for stage in [
            "RES3_PROJECT load",
            "PROJECT load",
            "DEFAULT load",
            "DESC_BLOCK load",
        ] {
            entries.push(LoadListEntry::stage(stage));
        }
        entries.push(LoadListEntry::end());

        let mut list = LoadList::new(entries);
        list.set_default_dependencies();
        debug!(entries = list.len(), "created initial load list");
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_list::EntryKind;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_mesh_exclusions() {
        assert!(exclude_mesh("[meshes]\\grass_a.mesh"));
        assert!(exclude_mesh("[MESHES]\\Plants_b"));
        assert!(exclude_mesh("[meshes]\\models_truck"));
        assert!(!exclude_mesh("[meshes]\\models_cargo_unit_1"));
        assert!(!exclude_mesh("[meshes]\\trucks_a"));
    }

    #[test]
    fn test_extension_detection() {
        assert!(has_extension("[g]\\a.xml"));
        assert!(!has_extension("[g]\\dir.d\\file"));
        assert!(!has_extension("file."));
    }

    #[test]
    fn test_empty_sources_give_stage_skeleton() {
        let list = LoadList::create_initial(&[], &[], &[]).unwrap();
        let stages: Vec<_> = list
            .entries()
            .iter()
            .filter_map(|e| match &e.kind {
                EntryKind::Stage { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(stages.len(), 13);
        assert_eq!(stages[0], "RES3_INIT load");
        assert_eq!(stages[12], "DESC_BLOCK load");
        assert_eq!(list.len(), 15);
        assert!(list.validate_ordering().is_empty());
    }

    #[test]
    fn test_assets_are_filtered_and_sorted() {
        let initial = names(&[
            "[media]\\classes\\trucks\\b.xml",
            "[media]\\classes\\trucks\\a.xml",
            "[media]\\classes\\readme.txt",
            "[ssl_cache]\\x.SPDB",
            "[media]\\_templates\\t.xml",
            "[ssl_cache]\\y.sslbundle",
        ]);
        let shared = names(&[
            "[meshes]\\trucks\\a",
            "[meshes]\\grass_01",
            "[meshes]\\models_cargo_unit_1",
            "[meshes]\\models_x",
            "[meshes]\\m.mesh",
        ]);
        let shared_sound = names(&["a.sound_list", "[sounds]\\b.sound_list"]);

        let list = LoadList::create_initial(&initial, &shared, &shared_sound).unwrap();
        let assets: Vec<_> = list
            .entries()
            .iter()
            .filter_map(|e| match &e.kind {
                EntryKind::Asset(a) => Some((a.internal_name.as_str(), a.loader.as_str())),
                _ => None,
            })
            .collect();

        assert_eq!(
            assets,
            vec![
                ("<ssl_cache>\\x.SPDB", "spdb"),
                ("<ssl_cache>\\y.sslbundle", "sslbundle"),
                ("<media>\\_templates\\t.xml", "tpl_loader"),
                ("<media>\\classes\\trucks\\a.xml", "cls_loader"),
                ("<media>\\classes\\trucks\\b.xml", "cls_loader"),
                ("<meshes>\\models_cargo_unit_1", "mesh_loader"),
                ("<meshes>\\trucks\\a", "mesh_loader"),
                ("a.sound_list", "sound_loader"),
            ]
        );
        assert!(list.validate_ordering().is_empty());
    }
}
