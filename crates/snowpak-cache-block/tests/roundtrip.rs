//! Pack/unpack round trips through the filesystem.

use std::fs::{self, File};
use std::path::Path;

use snowpak_cache_block::{pack_file, CacheBlockReader, Error, UnpackOptions};

fn write(root: &Path, relative: &[&str], data: &[u8]) {
    let mut path = root.to_path_buf();
    for part in relative {
        path.push(part);
    }
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, data).unwrap();
}

#[test]
fn test_pack_list_unpack() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("source");
    write(&source, &["[g]", "a.txt"], b"hello12345");
    write(&source, &["[g]", "b.txt"], b"");

    let target = temp.path().join("initial.cache_block");
    let entries = pack_file(&source, &target, |_, _| {}).unwrap();
    assert_eq!(entries.len(), 2);

    let mut reader = CacheBlockReader::open(&target).unwrap();
    let listed: Vec<_> = reader
        .entries()
        .iter()
        .map(|e| (e.internal_name().to_string(), e.relative_offset(), e.size()))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("<g>:a.txt".to_string(), 0, 10),
            ("<g>:b.txt".to_string(), 10, 0),
        ]
    );

    let out = temp.path().join("out");
    reader
        .unpack_all(&out, &UnpackOptions::default(), |_, _| {})
        .unwrap();
    assert_eq!(fs::read(out.join("[g]").join("a.txt")).unwrap(), b"hello12345");
    assert_eq!(fs::read(out.join("[g]").join("b.txt")).unwrap(), b"");
}

#[test]
fn test_nested_round_trip() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("source");
    write(&source, &["[media]", "classes", "trucks", "t.xml"], b"<truck/>");
    write(&source, &["[media]", "_templates", "x.xml"], b"<tpl/>");
    write(&source, &["[ssl_cache]", "s.spdb"], &[0u8, 1, 2, 255]);

    let target = temp.path().join("c.cache_block");
    pack_file(&source, &target, |_, _| {}).unwrap();

    let out = temp.path().join("out");
    CacheBlockReader::open(&target)
        .unwrap()
        .unpack_all(&out, &UnpackOptions::default(), |_, _| {})
        .unwrap();

    for relative in [
        &["[media]", "classes", "trucks", "t.xml"][..],
        &["[media]", "_templates", "x.xml"][..],
        &["[ssl_cache]", "s.spdb"][..],
    ] {
        let a = relative.iter().fold(source.clone(), |p, c| p.join(c));
        let b = relative.iter().fold(out.clone(), |p, c| p.join(c));
        assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
    }
}

#[test]
fn test_pack_refuses_existing_target() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("source");
    write(&source, &["[g]", "a.txt"], b"a");
    let target = temp.path().join("exists.cache_block");
    fs::write(&target, b"keep").unwrap();

    let err = pack_file(&source, &target, |_, _| {}).unwrap_err();
    assert!(err.is_destination_exists());
    assert_eq!(fs::read(&target).unwrap(), b"keep");
}

#[test]
fn test_unpack_refuses_existing_directory_and_files() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("source");
    write(&source, &["[g]", "a.txt"], b"a");
    let target = temp.path().join("c.cache_block");
    pack_file(&source, &target, |_, _| {}).unwrap();

    let out = temp.path().join("out");
    fs::create_dir(&out).unwrap();
    let mut reader = CacheBlockReader::open(&target).unwrap();
    let err = reader
        .unpack_all(&out, &UnpackOptions::default(), |_, _| {})
        .unwrap_err();
    assert!(err.is_destination_exists());

    let options = UnpackOptions {
        allow_existing_directory: true,
    };
    reader.unpack_all(&out, &options, |_, _| {}).unwrap();
    let err = reader.unpack_all(&out, &options, |_, _| {}).unwrap_err();
    assert!(err.is_destination_exists());
}

#[test]
fn test_corrupted_header_magics() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("source");
    write(&source, &["[g]", "a.txt"], b"abc");
    let target = temp.path().join("c.cache_block");
    pack_file(&source, &target, |_, _| {}).unwrap();
    let pristine = fs::read(&target).unwrap();

    // version dword, separator, table tag dword, separator, first name-table separator
    let name_table_end = 78 + 4 + "<g>:a.txt".len();
    for offset in [64usize, 68, 73, 77, name_table_end] {
        let mut data = pristine.clone();
        data[offset] ^= 0x40;
        let corrupted = temp.path().join(format!("bad_{offset}.cache_block"));
        fs::write(&corrupted, &data).unwrap();

        match CacheBlockReader::open(&corrupted).unwrap_err() {
            Error::Common(snowpak_common::Error::BadMagic { offset: at, .. }) => {
                assert_eq!(at, offset as u64)
            }
            other => panic!("unexpected error at {offset}: {other}"),
        }
    }
}

#[test]
fn test_oversized_file_is_rejected_before_copying() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("source");
    fs::create_dir_all(source.join("[g]")).unwrap();
    let big = File::create(source.join("[g]").join("big.bin")).unwrap();
    big.set_len(1 << 31).unwrap();
    drop(big);

    let target = temp.path().join("big.cache_block");
    let err = pack_file(&source, &target, |_, _| {}).unwrap_err();
    assert!(matches!(
        err,
        Error::Common(snowpak_common::Error::SizeOverflow { value: 0x8000_0000, .. })
    ));
    assert!(!target.exists());
}
