use pubsapp::error::PubsError;
use pubsapp::model::{BibEntry, Fields, Metadata};
use pubsapp::store::docs::{DocRef, FsDocStore};
use pubsapp::store::records::FsRecordStore;
use pubsapp::store::{DocStore, RecordStore};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn entry(key: &str) -> BibEntry {
    let mut fields = Fields::new();
    fields.insert("title".into(), serde_yaml::Value::String("T".into()));
    BibEntry::new(key, fields)
}

fn assert_no_tmp_files(dir: &Path) {
    for item in fs::read_dir(dir).unwrap() {
        let path = item.unwrap().path();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
    }
}

#[test]
fn test_record_store_basic_io() {
    let dir = TempDir::new().unwrap();
    let store = FsRecordStore::<BibEntry>::new(dir.path().join("bib"));

    // 1. Write
    store.save("Doe2013", &entry("Doe2013")).unwrap();
    assert!(store.exists("Doe2013"));

    // 2. Read
    assert_eq!(store.load("Doe2013").unwrap(), Some(entry("Doe2013")));

    // 3. Delete
    assert!(store.delete("Doe2013").unwrap());
    assert_eq!(store.load("Doe2013").unwrap(), None);
    assert!(!store.delete("Doe2013").unwrap());
}

#[test]
fn test_record_store_writes_yaml_atomically() {
    let dir = TempDir::new().unwrap();
    let bib_dir = dir.path().join("bib");
    let store = FsRecordStore::<BibEntry>::new(&bib_dir);

    store.save("Doe2013", &entry("Doe2013")).unwrap();
    store.save("Doe2013", &entry("Doe2013")).unwrap();

    let on_disk = fs::read_to_string(bib_dir.join("Doe2013.yaml")).unwrap();
    assert!(on_disk.starts_with("Doe2013:"));
    assert_no_tmp_files(&bib_dir);
}

#[test]
fn test_citekeys_ignore_foreign_files() {
    let dir = TempDir::new().unwrap();
    let meta_dir = dir.path().join("meta");
    let store = FsRecordStore::<Metadata>::new(&meta_dir);
    for key in ["b", "a"] {
        store.save(key, &Metadata::default()).unwrap();
    }
    fs::write(meta_dir.join("README.md"), "not a record").unwrap();
    fs::write(meta_dir.join(".c.yaml-123.tmp"), "half written").unwrap();

    assert_eq!(store.citekeys().unwrap(), vec!["a", "b"]);
}

#[test]
fn test_corrupt_record_is_an_error() {
    let dir = TempDir::new().unwrap();
    let bib_dir = dir.path().join("bib");
    fs::create_dir_all(&bib_dir).unwrap();
    fs::write(bib_dir.join("bad.yaml"), "a: 1\nb: 2\n").unwrap();

    let store = FsRecordStore::<BibEntry>::new(&bib_dir);
    assert!(store.load("bad").is_err());
}

#[test]
fn test_doc_store_lifecycle() {
    let dir = TempDir::new().unwrap();
    let docs = FsDocStore::new(dir.path().join("doc"));
    let source = dir.path().join("download.pdf");
    fs::write(&source, "%PDF").unwrap();

    let reference = docs.add_doc("Doe2013", &source, false).unwrap();
    assert_eq!(reference, "docsdir://Doe2013.pdf");
    assert!(docs.in_docsdir(&reference));
    assert_no_tmp_files(docs.root());

    let renamed = docs.rename_doc(&reference, "Doe2014", false).unwrap();
    assert!(docs.real_docpath(&renamed).is_file());
    assert!(!docs.real_docpath(&reference).exists());

    docs.remove_doc(&renamed, false).unwrap();
    assert!(matches!(
        docs.remove_doc(&renamed, false),
        Err(PubsError::DocNotFound(_))
    ));
}

#[test]
fn test_absolute_path_inside_docsdir_is_owned() {
    let dir = TempDir::new().unwrap();
    let docsdir = dir.path().join("doc");
    let inside = docsdir.join("Doe2013.pdf");

    assert_eq!(
        DocRef::parse(&inside.display().to_string(), &docsdir),
        DocRef::Owned("Doe2013.pdf".into())
    );
    assert_eq!(
        DocRef::parse("/elsewhere/x.pdf", &docsdir),
        DocRef::Linked("/elsewhere/x.pdf".into())
    );
    assert_eq!(
        DocRef::parse("https://arxiv.org/pdf/1234", &docsdir),
        DocRef::Url("https://arxiv.org/pdf/1234".into())
    );
}
