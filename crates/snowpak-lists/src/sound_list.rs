//! `.sound_list` reader and writer.
//!
//! ```text
//! i64 count
//! count x (i64 length, length bytes of code page 437)
//! ```
//!
//! Names are stored in internal notation, following the load list variant.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use snowpak_common::fs::create_new_file;
use snowpak_common::{text, ByteReader, ByteWriter, NameStyle};
use tracing::debug;

use crate::Result;

const MAX_NAME_LENGTH: u64 = i32::MAX as u64;

/// Read the names of a sound list.
///
/// Unless `keep_internal` is set, every name is converted to its external form.
pub fn read_sound_list<R: Read>(inner: R, keep_internal: bool) -> Result<Vec<String>> {
    let mut reader = ByteReader::new(inner);
    let count_offset = reader.position();
    let count = read_length_i64(&mut reader, count_offset, u64::MAX)?;

    let mut names = Vec::with_capacity(count.min(1 << 16) as usize);
    for _ in 0..count {
        let offset = reader.position();
        let length = read_length_i64(&mut reader, offset, MAX_NAME_LENGTH)?;
        let name = reader.read_string(length as usize)?;
        names.push(if keep_internal {
            name
        } else {
            NameStyle::LoadList.to_external(&name)?
        });
    }
    debug!(names = names.len(), "read sound list");
    Ok(names)
}

fn read_length_i64<R: Read>(reader: &mut ByteReader<R>, offset: u64, limit: u64) -> Result<u64> {
    let length = reader.read_i64()?;
    let length = u64::try_from(length)
        .map_err(|_| snowpak_common::Error::InvalidLength { offset, length })?;
    if length > limit {
        return Err(snowpak_common::Error::SizeOverflow {
            what: "sound list name length",
            value: length,
            limit,
        }
        .into());
    }
    Ok(length)
}

/// Write a sound list.
///
/// Names starting with `<` are taken as internal; all others are converted
/// from external notation.
pub fn write_sound_list<W: Write, S: AsRef<str>>(inner: W, names: &[S]) -> Result<()> {
    let mut writer = ByteWriter::new(inner);
    writer.write_i64(names.len() as i64)?;

    let mut bytes = Vec::new();
    for name in names {
        let name = name.as_ref();
        let internal = if name.starts_with('<') {
            name.to_string()
        } else {
            NameStyle::LoadList.to_internal(name)?
        };
        bytes.clear();
        text::encode_into(&internal, &mut bytes)?;
        writer.write_i64(bytes.len() as i64)?;
        writer.write_bytes(&bytes)?;
    }
    writer.flush()?;
    debug!(names = names.len(), "wrote sound list");
    Ok(())
}

/// Read a sound list file.
pub fn read_sound_list_file<P: AsRef<Path>>(path: P, keep_internal: bool) -> Result<Vec<String>> {
    let file = File::open(path.as_ref())?;
    read_sound_list(BufReader::new(file), keep_internal)
}

/// Write a sound list to a new file. Fails if `path` exists.
pub fn write_sound_list_file<P: AsRef<Path>, S: AsRef<str>>(path: P, names: &[S]) -> Result<()> {
    let path = path.as_ref();
    let file = create_new_file(path)?;
    let result = write_sound_list(BufWriter::new(file), names);
    if result.is_err() {
        let _ = fs::remove_file(path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_layout() {
        let mut out = Vec::new();
        write_sound_list(&mut out, &["[sounds]\\a.pcm"]).unwrap();
        let mut expected = vec![1, 0, 0, 0, 0, 0, 0, 0, 14, 0, 0, 0, 0, 0, 0, 0];
        expected.extend_from_slice(b"<sounds>\\a.pcm");
        assert_eq!(out, expected);
    }

    #[test]
    fn test_internal_names_pass_through() {
        let mut out = Vec::new();
        write_sound_list(&mut out, &["<sounds>\\a.pcm", "b.pcm"]).unwrap();

        assert_eq!(
            read_sound_list(&out[..], true).unwrap(),
            vec!["<sounds>\\a.pcm", "b.pcm"]
        );
        assert_eq!(
            read_sound_list(&out[..], false).unwrap(),
            vec!["[sounds]\\a.pcm", "b.pcm"]
        );
    }

    #[test]
    fn test_oversized_name_length() {
        let mut data = vec![1, 0, 0, 0, 0, 0, 0, 0];
        data.extend_from_slice(&(1i64 << 31).to_le_bytes());
        assert!(matches!(
            read_sound_list(&data[..], true),
            Err(Error::Common(snowpak_common::Error::SizeOverflow { .. }))
        ));
    }

    #[test]
    fn test_negative_count() {
        let data = (-1i64).to_le_bytes();
        assert!(matches!(
            read_sound_list(&data[..], true),
            Err(Error::Common(snowpak_common::Error::InvalidLength { offset: 0, length: -1 }))
        ));
    }
}
