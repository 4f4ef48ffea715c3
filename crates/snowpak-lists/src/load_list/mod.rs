//! `pak.load_list` reader and writer.
//!
//! A load list describes the order assets are loaded in. Each entry is either
//! an asset located in one of the paks, or a loading stage used to group the
//! assets before it. The first entry is always a start marker and the last an
//! end marker. Entries name the entries they depend on by index.
//!
//! ```text
//! header        i32(1) u8(1) i32 count i32(3) u8(1)
//! types         count x u8
//! u8(1)
//! dependencies  count x (i32 n, u8(1), n x i32)
//! u8(1)
//! strings       count x (i32 n, i32(2), n x u8(1), 2 x u8(1), n x string)
//! ```

mod initial;
mod ordering;
mod summary;

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use snowpak_common::fs::create_new_file;
use snowpak_common::{ByteReader, ByteWriter, NameStyle};
use tracing::{debug, trace};

use crate::{Error, Result};

pub use ordering::{OrderingIssue, OrderingWarning};
pub use summary::{GroupSummary, LoadListSummary, PakSummary};

/// Conventional file name of a load list inside a pak.
pub const LOAD_LIST_NAME: &str = "pak.load_list";

const HEADER_COUNT: u32 = 1;
const HEADER_TAG: u32 = 3;
const SEPARATOR: u8 = 1;
const MAGIC_A_VALUE: u8 = 1;
const MAGIC_B_VALUE: u8 = 1;
const MAGIC_B_LEN: u32 = 2;

/// Entry type tag as stored in the type array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum EntryType {
    Start = 0,
    Stage = 1,
    Asset = 2,
    End = 3,
}

impl EntryType {
    /// Decode a type byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Start),
            1 => Some(Self::Stage),
            2 => Some(Self::Asset),
            3 => Some(Self::End),
            _ => None,
        }
    }

    /// Whether an entry of this type may carry `count` strings.
    pub fn accepts_string_count(self, count: usize) -> bool {
        match self {
            Self::Start | Self::End => count == 0,
            Self::Stage => count == 1,
            Self::Asset => count == 3 || count == 4,
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("Start"),
            Self::Stage => f.write_str("Stage"),
            Self::Asset => f.write_str("Asset"),
            Self::End => f.write_str("End"),
        }
    }
}

/// An asset to load from a pak.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AssetEntry {
    /// Name in game notation, e.g. `<media>\classes\a.xml`.
    pub internal_name: String,
    /// Loader id, e.g. `cls_loader`.
    pub loader: String,
    /// Pak the asset is stored in.
    pub pak_name: String,
    /// Optional auxiliary JSON payload.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub json: Option<String>,
}

impl AssetEntry {
    pub fn new(
        internal_name: impl Into<String>,
        loader: impl Into<String>,
        pak_name: impl Into<String>,
    ) -> Self {
        Self {
            internal_name: internal_name.into(),
            loader: loader.into(),
            pak_name: pak_name.into(),
            json: None,
        }
    }

    /// The filesystem form of the internal name.
    pub fn external_name(&self) -> Result<String> {
        Ok(NameStyle::LoadList.to_external(&self.internal_name)?)
    }

    /// Resource group of the internal name, if it has one.
    pub fn group(&self) -> Option<&str> {
        NameStyle::LoadList
            .parse_internal(&self.internal_name)
            .ok()
            .and_then(|parts| parts.group)
    }
}

/// Type-specific payload of a load list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub enum EntryKind {
    Start,
    Stage { text: String },
    Asset(AssetEntry),
    End,
}

impl EntryKind {
    pub fn entry_type(&self) -> EntryType {
        match self {
            Self::Start => EntryType::Start,
            Self::Stage { .. } => EntryType::Stage,
            Self::Asset(_) => EntryType::Asset,
            Self::End => EntryType::End,
        }
    }

    /// Whether this entry opens or closes a group of assets.
    pub fn is_group_boundary(&self) -> bool {
        !matches!(self, Self::Asset(_))
    }

    /// Strings in stored order.
    pub fn strings(&self) -> Vec<&str> {
        match self {
            Self::Start | Self::End => Vec::new(),
            Self::Stage { text } => vec![text.as_str()],
            Self::Asset(asset) => {
                let mut strings = vec![
                    asset.internal_name.as_str(),
                    asset.loader.as_str(),
                    asset.pak_name.as_str(),
                ];
                if let Some(json) = &asset.json {
                    strings.push(json.as_str());
                }
                strings
            }
        }
    }

    fn string_count(&self) -> usize {
        match self {
            Self::Start | Self::End => 0,
            Self::Stage { .. } => 1,
            Self::Asset(asset) => 3 + usize::from(asset.json.is_some()),
        }
    }
}

/// One entry of a load list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LoadListEntry {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: EntryKind,
    /// Indices of the entries this one depends on.
    pub depends_on: Vec<u32>,
    /// One byte per string, each 1.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub magic_a: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub magic_b: [u8; 2],
    /// Stream offset of the dependency record, when read from a file.
    pub dependency_offset: Option<u64>,
    /// Stream offset of the strings record, when read from a file.
    pub strings_offset: Option<u64>,
}

impl LoadListEntry {
    /// Create an entry with no dependencies and default magic arrays.
    pub fn new(kind: EntryKind) -> Self {
        let magic_a = vec![MAGIC_A_VALUE; kind.string_count()];
        Self {
            kind,
            depends_on: Vec::new(),
            magic_a,
            magic_b: [MAGIC_B_VALUE; 2],
            dependency_offset: None,
            strings_offset: None,
        }
    }

    pub fn start() -> Self {
        Self::new(EntryKind::Start)
    }

    pub fn stage(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Stage { text: text.into() })
    }

    pub fn asset(asset: AssetEntry) -> Self {
        Self::new(EntryKind::Asset(asset))
    }

    pub fn end() -> Self {
        Self::new(EntryKind::End)
    }

    #[inline]
    pub fn entry_type(&self) -> EntryType {
        self.kind.entry_type()
    }

    /// Compare everything that is persisted, ignoring read offsets.
    pub fn same_content(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.depends_on == other.depends_on
            && self.magic_a == other.magic_a
            && self.magic_b == other.magic_b
    }
}

/// A parsed load list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LoadList {
    entries: Vec<LoadListEntry>,
}

impl LoadList {
    pub fn new(entries: Vec<LoadListEntry>) -> Self {
        Self { entries }
    }

    #[inline]
    pub fn entries(&self) -> &[LoadListEntry] {
        &self.entries
    }

    #[inline]
    pub fn entries_mut(&mut self) -> &mut Vec<LoadListEntry> {
        &mut self.entries
    }

    pub fn into_entries(self) -> Vec<LoadListEntry> {
        self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read a load list file.
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::read(BufReader::new(file))
    }

    /// Read a load list from a stream. The stream must end with the list.
    pub fn read<R: Read>(inner: R) -> Result<Self> {
        let mut reader = ByteReader::new(inner);

        reader.read_magic_u32(HEADER_COUNT)?;
        reader.read_magic_u8(SEPARATOR)?;
        let count = reader.read_length_i32()?;
        if count < 2 {
            return Err(Error::TooFewEntries { count });
        }
        reader.read_magic_u32(HEADER_TAG)?;
        reader.read_magic_u8(SEPARATOR)?;

        let types_offset = reader.position();
        let types = reader.read_bytes(count)?;
        let mut entry_types = Vec::with_capacity(count);
        for (index, &value) in types.iter().enumerate() {
            let offset = types_offset + index as u64;
            let entry_type = EntryType::from_u8(value).ok_or(Error::InvalidEntryType {
                index,
                value,
                offset,
            })?;
            check_position(index, count, entry_type, offset)?;
            entry_types.push(entry_type);
        }
        reader.read_magic_u8(SEPARATOR)?;

        let mut dependencies = Vec::with_capacity(count);
        for index in 0..count {
            let offset = reader.position();
            let n = reader.read_length_i32()?;
            reader.read_magic_u8(SEPARATOR)?;
            let mut depends_on = Vec::with_capacity(n.min(count));
            for _ in 0..n {
                let dependency = reader.read_i32()?;
                match u32::try_from(dependency) {
                    Ok(d) if (d as usize) < count => depends_on.push(d),
                    _ => {
                        return Err(Error::InvalidDependency {
                            index,
                            dependency: dependency as i64,
                            offset,
                        })
                    }
                }
            }
            dependencies.push((offset, depends_on));
        }
        reader.read_magic_u8(SEPARATOR)?;

        let mut entries = Vec::with_capacity(count);
        for (index, (entry_type, (dependency_offset, depends_on))) in
            entry_types.into_iter().zip(dependencies).enumerate()
        {
            let strings_offset = reader.position();
            let n = reader.read_length_i32()?;
            reader.read_magic_u32(MAGIC_B_LEN)?;
            if !entry_type.accepts_string_count(n) {
                return Err(Error::InvalidStringCount {
                    index,
                    entry_type,
                    count: n,
                    offset: strings_offset,
                });
            }
            for _ in 0..n {
                reader.read_magic_u8(MAGIC_A_VALUE)?;
            }
            for _ in 0..MAGIC_B_LEN {
                reader.read_magic_u8(MAGIC_B_VALUE)?;
            }
            let strings = (0..n)
                .map(|_| reader.read_length_prefixed_string())
                .collect::<snowpak_common::Result<Vec<_>>>()?;

            let kind = kind_from_strings(entry_type, strings);
            trace!(index, %entry_type, dependencies = depends_on.len(), "load list entry");
            entries.push(LoadListEntry {
                kind,
                depends_on,
                magic_a: vec![MAGIC_A_VALUE; n],
                magic_b: [MAGIC_B_VALUE; 2],
                dependency_offset: Some(dependency_offset),
                strings_offset: Some(strings_offset),
            });
        }

        reader.ensure_exhausted()?;
        debug!(entries = entries.len(), "read load list");
        Ok(Self { entries })
    }

    /// Write the list to a new file. Fails if `path` exists.
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = create_new_file(path)?;
        let result = self.write(BufWriter::new(file));
        if result.is_err() {
            let _ = fs::remove_file(path);
        }
        result
    }

    /// Write the list to a stream.
    pub fn write<W: Write>(&self, inner: W) -> Result<()> {
        let count = self.entries.len();
        if count < 2 {
            return Err(Error::TooFewEntries { count });
        }
        for (index, entry) in self.entries.iter().enumerate() {
            check_position(index, count, entry.entry_type(), 0)?;
            let expected = entry.kind.string_count();
            if entry.magic_a.len() != expected {
                return Err(Error::InvalidMagicArray {
                    index,
                    expected,
                    actual: entry.magic_a.len(),
                });
            }
        }
        let count_i32 = fit_i32("load list entry count", count)?;

        let mut writer = ByteWriter::new(inner);
        writer.write_u32(HEADER_COUNT)?;
        writer.write_u8(SEPARATOR)?;
        writer.write_i32(count_i32)?;
        writer.write_u32(HEADER_TAG)?;
        writer.write_u8(SEPARATOR)?;

        for entry in &self.entries {
            writer.write_u8(entry.entry_type() as u8)?;
        }
        writer.write_u8(SEPARATOR)?;

        for entry in &self.entries {
            writer.write_i32(fit_i32("dependency count", entry.depends_on.len())?)?;
            writer.write_u8(SEPARATOR)?;
            for &dependency in &entry.depends_on {
                writer.write_i32(fit_i32("dependency index", dependency as usize)?)?;
            }
        }
        writer.write_u8(SEPARATOR)?;

        for entry in &self.entries {
            let strings = entry.kind.strings();
            writer.write_i32(strings.len() as i32)?;
            writer.write_u32(entry.magic_b.len() as u32)?;
            writer.write_bytes(&entry.magic_a)?;
            writer.write_bytes(&entry.magic_b)?;
            for s in strings {
                writer.write_length_prefixed_string(s)?;
            }
        }

        writer.flush()?;
        debug!(entries = count, bytes = writer.position(), "wrote load list");
        Ok(())
    }
}

fn kind_from_strings(entry_type: EntryType, strings: Vec<String>) -> EntryKind {
    let mut strings = strings.into_iter();
    match entry_type {
        EntryType::Start => EntryKind::Start,
        EntryType::End => EntryKind::End,
        EntryType::Stage => EntryKind::Stage {
            text: strings.next().unwrap_or_default(),
        },
        EntryType::Asset => {
            let mut asset = AssetEntry::new(
                strings.next().unwrap_or_default(),
                strings.next().unwrap_or_default(),
                strings.next().unwrap_or_default(),
            );
            asset.json = strings.next();
            EntryKind::Asset(asset)
        }
    }
}

/// Start first, end last, stages and assets in between.
fn check_position(index: usize, count: usize, entry_type: EntryType, offset: u64) -> Result<()> {
    let allowed = match index {
        0 => entry_type == EntryType::Start,
        i if i == count - 1 => entry_type == EntryType::End,
        _ => matches!(entry_type, EntryType::Stage | EntryType::Asset),
    };
    if !allowed {
        return Err(Error::UnexpectedEntryType {
            index,
            found: entry_type,
            offset,
        });
    }
    Ok(())
}

fn fit_i32(what: &'static str, value: usize) -> Result<i32> {
    i32::try_from(value).map_err(|_| {
        snowpak_common::Error::SizeOverflow {
            what,
            value: value as u64,
            limit: i32::MAX as u64,
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use snowpak_common::MagicKind;

    use super::*;

    fn sample() -> LoadList {
        let mut list = LoadList::new(vec![
            LoadListEntry::start(),
            LoadListEntry::stage("A"),
            LoadListEntry::asset(AssetEntry::new("<g>\\x.xml", "cls_loader", "initial.pak")),
            LoadListEntry::end(),
        ]);
        list.set_default_dependencies();
        list
    }

    fn to_bytes(list: &LoadList) -> Vec<u8> {
        let mut out = Vec::new();
        list.write(&mut out).unwrap();
        out
    }

    #[test]
    fn test_write_layout() {
        let bytes = to_bytes(&sample());
        assert_eq!(&bytes[..14], &[1, 0, 0, 0, 1, 4, 0, 0, 0, 3, 0, 0, 0, 1]);
        assert_eq!(&bytes[14..19], &[0, 1, 2, 3, 1]);
        // Start: no dependencies
        assert_eq!(&bytes[19..24], &[0, 0, 0, 0, 1]);
        // Stage: [0]
        assert_eq!(&bytes[24..33], &[1, 0, 0, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_read_back_is_identical() {
        let list = sample();
        let read = LoadList::read(Cursor::new(to_bytes(&list))).unwrap();
        assert_eq!(read.len(), list.len());
        for (a, b) in read.entries().iter().zip(list.entries()) {
            assert!(a.same_content(b), "{a:?} != {b:?}");
        }
        assert_eq!(read.entries()[1].dependency_offset, Some(24));
        assert_eq!(to_bytes(&read), to_bytes(&list));
    }

    #[test]
    fn test_asset_with_json() {
        let mut asset = AssetEntry::new("<g>\\x.xml", "l", "p.pak");
        asset.json = Some("{\"k\":1}".to_string());
        let mut list = LoadList::new(vec![
            LoadListEntry::start(),
            LoadListEntry::asset(asset.clone()),
            LoadListEntry::end(),
        ]);
        list.set_default_dependencies();

        let read = LoadList::read(Cursor::new(to_bytes(&list))).unwrap();
        assert_eq!(read.entries()[1].kind, EntryKind::Asset(asset));
        assert_eq!(read.entries()[1].magic_a, vec![1; 4]);
    }

    #[test]
    fn test_header_magic_offsets() {
        let pristine = to_bytes(&sample());
        let magics = [
            (0usize, MagicKind::Dword),
            (4, MagicKind::Byte),
            (9, MagicKind::Dword),
            (13, MagicKind::Byte),
            (18, MagicKind::Byte),
        ];
        for (offset, kind) in magics {
            let mut data = pristine.clone();
            data[offset] ^= 0x20;
            match LoadList::read(Cursor::new(data)).unwrap_err() {
                Error::Common(snowpak_common::Error::BadMagic { offset: at, kind: k, .. }) => {
                    assert_eq!((at, k), (offset as u64, kind));
                }
                other => panic!("unexpected error at {offset}: {other}"),
            }
        }
    }

    #[test]
    fn test_type_array_checks() {
        let mut data = to_bytes(&sample());
        data[14] = 1;
        assert!(matches!(
            LoadList::read(Cursor::new(data.clone())),
            Err(Error::UnexpectedEntryType { index: 0, found: EntryType::Stage, offset: 14 })
        ));
        data[14] = 0;
        data[16] = 9;
        assert!(matches!(
            LoadList::read(Cursor::new(data)),
            Err(Error::InvalidEntryType { index: 2, value: 9, offset: 16 })
        ));
    }

    #[test]
    fn test_too_few_entries() {
        let data = [1, 0, 0, 0, 1, 1, 0, 0, 0, 3, 0, 0, 0, 1, 0];
        assert!(matches!(
            LoadList::read(Cursor::new(data)),
            Err(Error::TooFewEntries { count: 1 })
        ));
    }

    #[test]
    fn test_out_of_range_dependency() {
        let mut list = sample();
        list.entries_mut()[3].depends_on = vec![4];
        let data = to_bytes(&list);
        assert!(matches!(
            LoadList::read(Cursor::new(data)),
            Err(Error::InvalidDependency { index: 3, dependency: 4, .. })
        ));
    }

    #[test]
    fn test_trailing_data() {
        let mut data = to_bytes(&sample());
        data.push(0);
        assert!(matches!(
            LoadList::read(Cursor::new(data)),
            Err(Error::Common(snowpak_common::Error::TrailingData { .. }))
        ));
    }

    #[test]
    fn test_write_rejects_misplaced_entries() {
        let list = LoadList::new(vec![LoadListEntry::stage("x"), LoadListEntry::end()]);
        assert!(matches!(
            list.write(Vec::new()),
            Err(Error::UnexpectedEntryType { index: 0, .. })
        ));

        let mut list = sample();
        list.entries_mut()[1].magic_a.clear();
        assert!(matches!(
            list.write(Vec::new()),
            Err(Error::InvalidMagicArray { index: 1, expected: 1, actual: 0 })
        ));
    }
}
