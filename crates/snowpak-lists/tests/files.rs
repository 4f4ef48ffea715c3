//! List files written to and read back from disk.

use snowpak_lists::{
    read_sound_list_file, write_sound_list_file, AssetEntry, EntryKind, Error, LoadList,
    LoadListEntry,
};

#[test]
fn test_load_list_file_round_trip() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("pak.load_list");

    let initial: Vec<String> = [
        "[ssl_cache]\\a.spdb",
        "[media]\\classes\\trucks\\t.xml",
        "[media]\\_templates\\x.xml",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let shared = vec!["[meshes]\\trucks\\t".to_string()];
    let shared_sound = vec!["trucks.sound_list".to_string()];

    let list = LoadList::create_initial(&initial, &shared, &shared_sound).unwrap();
    list.write_file(&path).unwrap();

    let read = LoadList::read_file(&path).unwrap();
    assert_eq!(read.len(), list.len());
    for (a, b) in read.entries().iter().zip(list.entries()) {
        assert!(a.same_content(b));
        assert!(a.dependency_offset.is_some() && a.strings_offset.is_some());
    }
    assert!(read.validate_ordering().is_empty());

    let err = list.write_file(&path).unwrap_err();
    assert!(err.is_destination_exists());
}

#[test]
fn test_minimal_scenario() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("minimal.load_list");

    let mut list = LoadList::new(vec![
        LoadListEntry::start(),
        LoadListEntry::stage("A"),
        LoadListEntry::asset(AssetEntry::new("x", "loader", "initial.pak")),
        LoadListEntry::end(),
    ]);
    list.set_default_dependencies();
    list.write_file(&path).unwrap();

    let read = LoadList::read_file(&path).unwrap();
    assert_eq!(read.entries()[2].depends_on, vec![1]);
    assert_eq!(read.entries()[3].depends_on, vec![2]);
    assert!(matches!(&read.entries()[1].kind, EntryKind::Stage { text } if text == "A"));
    assert!(read.validate_ordering().is_empty());
}

#[test]
fn test_unwritable_list_leaves_no_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("bad.load_list");

    // Enough valid stages that part of the file reaches disk before the
    // unencodable one is hit.
    let mut entries = vec![LoadListEntry::start()];
    entries.extend((0..1000).map(|i| LoadListEntry::stage(format!("STAGE_{i:04} load"))));
    entries.push(LoadListEntry::stage("€"));
    entries.push(LoadListEntry::end());
    let mut list = LoadList::new(entries);
    list.set_default_dependencies();

    match list.write_file(&path).unwrap_err() {
        Error::Common(snowpak_common::Error::Unencodable { character }) => {
            assert_eq!(character, '€');
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!path.exists());
}

#[test]
fn test_sound_list_file_round_trip() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("trucks.sound_list");
    let names = ["[sounds]\\trucks\\engine.pcm", "[sounds]\\horn.pcm"];

    write_sound_list_file(&path, &names).unwrap();
    assert_eq!(read_sound_list_file(&path, false).unwrap(), names);
    assert_eq!(
        read_sound_list_file(&path, true).unwrap(),
        vec!["<sounds>\\trucks\\engine.pcm", "<sounds>\\horn.pcm"]
    );
    assert!(write_sound_list_file(&path, &names)
        .unwrap_err()
        .is_destination_exists());
}
