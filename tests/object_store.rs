use assert_fs::TempDir;
use bitstore::Error;
use bitstore::areas::database::Database;
use bitstore::artifacts::objects::blob::Blob;
use bitstore::artifacts::objects::entry_mode::{EntryMode, ObjectKind};
use bitstore::artifacts::objects::object_id::ObjectId;
use bitstore::artifacts::objects::object_type::ObjectType;
use bitstore::artifacts::objects::tree::{Tree, TreeEntry};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

mod common;
use common::repository_dir;

const SIX_ENTRY_TREE: &str = "4f83f3fcc9fc67e784d0348900c420b0a3bee799";
const EMPTY_TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// (mode, name, id) of a tree holding two directories, two files and two symlinks
const SIX_ENTRIES: [(&str, &str, &str); 6] = [
    ("40000", "dir1", "5b253266d4e1848ce479c78d8db7228e5d8b5ee7"),
    ("40000", "dir2", "14c73be0322647ab91da4dc4e97d290f551a5d64"),
    ("100644", "empty.txt", "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391"),
    ("100644", "hello.txt", "af5626b4a114abcb82d63db7c8082c3c4756e51b"),
    (
        "120000",
        "symlink-to-dir2-file05.bin",
        "4bf669a28791d113245ac7813b0af1cc979d023e",
    ),
    (
        "120000",
        "symlink-to-hello.txt",
        "a5162f80d4a6782b7cb2a0a197f834e683cb9eb1",
    ),
];

#[fixture]
fn database(repository_dir: TempDir) -> (TempDir, Database) {
    let database = Database::new(repository_dir.path().join("objects").into_boxed_path());
    (repository_dir, database)
}

fn six_entry_payload() -> Vec<u8> {
    let mut payload = Vec::new();
    for (mode, name, oid) in SIX_ENTRIES {
        payload.extend_from_slice(format!("{mode} {name}\0").as_bytes());
        payload.extend_from_slice(&hex::decode(oid).unwrap());
    }
    payload
}

#[rstest]
fn hello_world_blob_id(database: (TempDir, Database)) {
    let (_dir, database) = database;

    let oid = database.put_blob(&Blob::new("Hello, world!")).unwrap();

    assert_eq!(oid.to_hex(), "5dd01c177f5d7d1be5346a5bc18a569a7410c2ef");
    assert!(database.exists(&oid));
}

#[rstest]
fn put_blob_is_idempotent(database: (TempDir, Database)) {
    let (_dir, database) = database;
    let blob = Blob::new("Hello, world!\n");

    let first = database.put_blob(&blob).unwrap();
    let second = database.put_blob(&blob).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.to_hex(), "af5626b4a114abcb82d63db7c8082c3c4756e51b");
    assert_eq!(database.get_blob(&first).unwrap(), blob);
}

#[rstest]
fn six_entry_tree_fixture(database: (TempDir, Database)) {
    let (_dir, database) = database;
    let payload = six_entry_payload();
    assert_eq!(payload.len(), 238);

    let oid = database.put(ObjectType::Tree, &payload).unwrap();
    assert_eq!(oid.to_hex(), SIX_ENTRY_TREE);

    let tree = database.get_tree(&oid).unwrap();
    let entries = tree.entries();
    assert_eq!(entries.len(), 6);

    let summary = entries
        .iter()
        .map(|e| (e.name().to_str(), e.kind(), e.permissions(), e.oid().to_hex()))
        .collect::<Vec<_>>();
    assert_eq!(
        summary,
        vec![
            (Some("dir1"), ObjectKind::Directory, 0, SIX_ENTRIES[0].2.to_string()),
            (Some("dir2"), ObjectKind::Directory, 0, SIX_ENTRIES[1].2.to_string()),
            (Some("empty.txt"), ObjectKind::RegularFile, 0o644, SIX_ENTRIES[2].2.to_string()),
            (Some("hello.txt"), ObjectKind::RegularFile, 0o644, SIX_ENTRIES[3].2.to_string()),
            (
                Some("symlink-to-dir2-file05.bin"),
                ObjectKind::SymbolicLink,
                0,
                SIX_ENTRIES[4].2.to_string()
            ),
            (
                Some("symlink-to-hello.txt"),
                ObjectKind::SymbolicLink,
                0,
                SIX_ENTRIES[5].2.to_string()
            ),
        ]
    );
}

#[rstest]
fn built_tree_matches_fixture_in_any_order(database: (TempDir, Database)) {
    let (_dir, database) = database;
    let mut entries = SIX_ENTRIES
        .iter()
        .map(|(mode, name, oid)| {
            TreeEntry::new(
                EntryMode::from_octal(mode.as_bytes()).unwrap(),
                *name,
                ObjectId::try_parse(oid).unwrap(),
            )
        })
        .collect::<Vec<_>>();
    entries.reverse();

    let oid = database.put_tree(&Tree::new(entries)).unwrap();

    assert_eq!(oid.to_hex(), SIX_ENTRY_TREE);
}

#[rstest]
fn empty_tree(database: (TempDir, Database)) {
    let (_dir, database) = database;

    let oid = database.put(ObjectType::Tree, b"").unwrap();

    assert_eq!(oid.to_hex(), EMPTY_TREE);
    assert!(database.get_tree(&oid).unwrap().is_empty());
    assert_eq!(database.get_type(&oid).unwrap(), ObjectType::Tree);
}

#[rstest]
fn blob_read_of_tree_is_type_mismatch(database: (TempDir, Database)) {
    let (_dir, database) = database;
    let oid = database.put(ObjectType::Tree, &six_entry_payload()).unwrap();

    assert!(matches!(
        database.get_blob(&oid),
        Err(Error::TypeMismatch {
            expected: ObjectType::Blob,
            actual: ObjectType::Tree,
            ..
        })
    ));
}

#[rstest]
fn tree_with_unknown_mode_is_corrupt(database: (TempDir, Database)) {
    let (_dir, database) = database;
    let mut payload = b"170000 weird\0".to_vec();
    payload.extend_from_slice(&[0xab; 20]);

    let oid = database.put(ObjectType::Tree, &payload).unwrap();

    assert!(matches!(
        database.get_tree(&oid),
        Err(Error::CorruptObject(_))
    ));
}

#[rstest]
fn reads_tree_written_by_git(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    require_git!();

    common::git(repository_dir.path())
        .arg("init")
        .assert()
        .success();
    std::fs::write(repository_dir.path().join("hello.txt"), "Hello, world!\n")?;
    std::fs::write(repository_dir.path().join("empty.txt"), "")?;
    std::fs::create_dir(repository_dir.path().join("sub"))?;
    std::fs::write(repository_dir.path().join("sub/inner.txt"), "inner")?;
    common::git(repository_dir.path())
        .args(["add", "."])
        .assert()
        .success();
    let tree_oid = common::stdout_of(common::git(repository_dir.path()).arg("write-tree"));

    let database = Database::new(repository_dir.path().join(".git/objects").into_boxed_path())
        .with_verified_reads(true);
    let tree = database.get_tree(&ObjectId::try_parse(tree_oid.trim())?)?;

    let names = tree
        .entries()
        .iter()
        .map(|e| e.name().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["empty.txt", "hello.txt", "sub"]);
    assert_eq!(
        tree.entries()[1].oid().to_hex(),
        "af5626b4a114abcb82d63db7c8082c3c4756e51b"
    );
    assert!(tree.entries()[2].is_tree());

    Ok(())
}
