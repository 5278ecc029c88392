use std::{fs, path::{Path, PathBuf}};

use crate::{codec::HEADER_SIZE, properties::Properties, Error};

use super::{compress_paths, decompress_archive, Archiver};

fn write_tree(root: &Path) -> PathBuf {
    let project = root.join("project");
    fs::create_dir_all(project.join("src/nested/deeper")).unwrap();
    fs::create_dir_all(project.join("empty")).unwrap();
    fs::write(project.join("README"), "read me ".repeat(200)).unwrap();
    fs::write(project.join("src/nested/deeper/blob.bin"), (0..4096u32).map(|i| (i % 4) as u8).collect::<Vec<_>>()).unwrap();
    project
}

#[test]
fn test_compress_and_decompress_paths() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let project = write_tree(src.path());

    let archive = compress_paths(&[&project], None).unwrap();
    assert_eq!(&archive[..4], b"HUFF");

    decompress_archive(&archive, out.path(), None).unwrap();

    let restored = out.path().join("project");
    assert!(restored.join("empty").is_dir());
    assert_eq!(fs::read(restored.join("README")).unwrap(), fs::read(project.join("README")).unwrap());
    assert_eq!(
        fs::read(restored.join("src/nested/deeper/blob.bin")).unwrap(),
        fs::read(project.join("src/nested/deeper/blob.bin")).unwrap()
    );
}

#[test]
fn test_corrupt_archive_creates_nothing() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let project = write_tree(src.path());

    let mut archive = compress_paths(&[&project], None).unwrap();
    archive[0] ^= 0xFF;

    let root = out.path().join("root");
    assert!(matches!(decompress_archive(&archive, &root, None), Err(Error::InvalidArchive(_))));
    assert!(!root.exists());

    let archive = compress_paths(&[&project], None).unwrap();
    assert!(matches!(decompress_archive(&archive[..HEADER_SIZE + 3], &root, None), Err(Error::InvalidArchive(_))));
    assert!(!root.exists());
}

#[test]
fn test_archiver_round_trip_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let project = write_tree(dir.path());
    let mut archiver = Archiver::new(Properties::default());

    let stats = archiver.compress_to_file(&[&project], None, None).unwrap().clone();
    let archive_path = dir.path().join("project.huff");
    assert!(archive_path.is_file());
    assert_eq!(stats.total_files, 2);
    assert_eq!(stats.total_directories, 5);
    assert_eq!(stats.original_size, 1600 + 4096);
    assert_eq!(stats.compressed_size, fs::metadata(&archive_path).unwrap().len());
    assert!(stats.compression_ratio < 1.0);

    fs::remove_dir_all(&project).unwrap();

    let stats = archiver.extract_file(&archive_path, None, None).unwrap();
    assert_eq!(stats.output_path, dir.path().join("project").display().to_string());
    assert_eq!(stats.total_files, 2);
    assert!(dir.path().join("project/project/empty").is_dir());
    assert_eq!(fs::read_to_string(dir.path().join("project/project/README")).unwrap(), "read me ".repeat(200));
}

#[test]
fn test_existing_archive_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let project = write_tree(dir.path());
    let output = dir.path().join("out.huff");
    fs::write(&output, "precious").unwrap();

    let mut archiver = Archiver::new(Properties::default());
    assert!(matches!(archiver.compress_to_file(&[&project], Some(&output), None), Err(Error::Io(_))));
    assert_eq!(fs::read_to_string(&output).unwrap(), "precious");

    let mut archiver = Archiver::new(Properties { overwrite: true, ..Default::default() });
    archiver.compress_to_file(&[&project], Some(&output), None).unwrap();
    assert_eq!(&fs::read(&output).unwrap()[..4], b"HUFF");
}

#[test]
fn test_trailing_slash_archive_lands_beside_source() {
    let dir = tempfile::tempdir().unwrap();
    let project = write_tree(dir.path());
    let mut source = project.into_os_string();
    source.push("/");

    let mut archiver = Archiver::new(Properties::default());
    let stats = archiver.compress_to_file(&[PathBuf::from(source)], None, None).unwrap();

    assert_eq!(stats.output_path, dir.path().join("project.huff").display().to_string());
    assert!(dir.path().join("project.huff").is_file());
    assert!(!dir.path().join("project/.huff").exists());
}

#[test]
fn test_missing_archive() {
    let dir = tempfile::tempdir().unwrap();
    let mut archiver = Archiver::new(Properties::default());

    assert!(matches!(
        archiver.extract_file(&dir.path().join("absent.huff"), None, None),
        Err(Error::PathNotFound(_))
    ));
}

#[test]
fn test_default_paths() {
    let archiver = Archiver::new(Properties::default());

    assert_eq!(archiver.default_archive_path(Path::new("data/docs")), PathBuf::from("data/docs.huff"));
    assert_eq!(archiver.default_archive_path(Path::new("data/docs/")), PathBuf::from("data/docs.huff"));
    assert_eq!(archiver.default_archive_path(Path::new("data/docs//")), PathBuf::from("data/docs.huff"));
    assert_eq!(archiver.default_output_root(Path::new("data/docs.huff")), PathBuf::from("data/docs"));
    assert_eq!(archiver.default_output_root(Path::new("data/docs.zip")), PathBuf::from("data/docs.zip_extracted"));
    assert_eq!(archiver.default_output_root(Path::new(".huff")), PathBuf::from(".huff_extracted"));

    let archiver = Archiver::new(Properties { extension: ".hz".into(), ..Default::default() });
    assert_eq!(archiver.default_archive_path(Path::new("a.txt")), PathBuf::from("a.txt.hz"));
    assert_eq!(archiver.default_output_root(Path::new("a.txt.hz")), PathBuf::from("a.txt"));
}

#[test]
fn test_progress_through_archiver() {
    let dir = tempfile::tempdir().unwrap();
    let project = write_tree(dir.path());
    let mut archiver = Archiver::new(Properties::default());

    let mut calls = 0;
    let mut listener = |_: &str, index: usize, total: usize| {
        calls += 1;
        assert!(index >= 1 && index <= total);
    };
    archiver.compress_to_file(&[&project], None, Some(&mut listener)).unwrap();

    assert_eq!(calls, 7);
}
