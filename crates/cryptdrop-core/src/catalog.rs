//! File catalog derived from the ciphertext directory
//!
//! There is no index. Each blob is stored as `<id>_<name>.enc` and the
//! catalog is rebuilt by scanning the directory on demand, so there is no
//! in-memory state to keep consistent with the filesystem.

use crate::{CoreError, Result, id::FileId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Separates the identifier from the original name in a storage name
pub const RECORD_SEPARATOR: char = '_';

/// Suffix marking a committed ciphertext blob
pub const ENVELOPE_SUFFIX: &str = ".enc";

/// One stored file, as seen by the catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// File identifier
    pub id: FileId,
    /// Sanitized original filename
    pub name: String,
    /// Name of the blob in the uploads directory
    pub storage_name: String,
    /// Size of the stored envelope in bytes (plaintext length + 32)
    pub size: u64,
    /// Creation time of the blob
    pub uploaded: DateTime<Utc>,
}

/// Make a client-supplied filename safe to embed in a storage name
///
/// Keeps only the last path component, drops anything outside
/// `[A-Za-z0-9.-]`, joins whitespace runs with `-` and maps the record
/// separator to `-`. The result never contains `/`, `\` or `_`.
pub fn sanitize_name(raw: &str) -> Result<String> {
    let base = match raw.rfind(|c| c == '/' || c == '\\') {
        Some(pos) => &raw[pos + 1..],
        None => raw,
    };

    let words: Vec<String> = base
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter_map(|c| match c {
                    'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '-' => Some(c),
                    RECORD_SEPARATOR => Some('-'),
                    _ => None,
                })
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect();

    let joined = words.join("-");
    let trimmed = joined.trim_matches(|c| c == '.' || c == '-');
    if trimmed.is_empty() {
        return Err(CoreError::InvalidFilename(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Lowercased extension of a filename, if it has one
pub fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Build the storage name `<id>_<name>.enc`
pub fn compose_storage_name(id: &FileId, name: &str) -> String {
    format!("{}{}{}{}", id, RECORD_SEPARATOR, name, ENVELOPE_SUFFIX)
}

/// Split a storage name back into identifier and original name
///
/// Returns `None` for anything that is not a committed envelope blob.
pub fn parse_storage_name(storage_name: &str) -> Option<(FileId, String)> {
    let stem = storage_name.strip_suffix(ENVELOPE_SUFFIX)?;
    let (id, name) = stem.split_once(RECORD_SEPARATOR)?;
    if name.is_empty() {
        return None;
    }
    let id = id.parse::<FileId>().ok()?;
    Some((id, name.to_string()))
}

/// Read-only view over the ciphertext directory
#[derive(Clone, Debug)]
pub struct Catalog {
    root: PathBuf,
}

impl Catalog {
    /// Create a catalog over a directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory being scanned
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All parsable entries, newest first
    pub fn list_entries(&self) -> Result<Vec<CatalogEntry>> {
        let mut entries = Vec::new();
        for storage_name in self.storage_names()? {
            if let Some(entry) = self.entry_for(&storage_name)? {
                entries.push(entry);
            }
        }
        entries.sort_by(|a, b| {
            b.uploaded
                .cmp(&a.uploaded)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(entries)
    }

    /// Look up an entry by exact identifier
    pub fn find(&self, id: &FileId) -> Result<Option<CatalogEntry>> {
        for storage_name in self.storage_names()? {
            match parse_storage_name(&storage_name) {
                Some((found, _)) if found == *id => {
                    if let Some(entry) = self.entry_for(&storage_name)? {
                        return Ok(Some(entry));
                    }
                }
                _ => {}
            }
        }
        Ok(None)
    }

    /// Number of committed blobs; agrees with `list_entries().len()`
    pub fn count(&self) -> Result<usize> {
        let mut count = 0;
        for storage_name in self.storage_names()? {
            if self.entry_for(&storage_name)?.is_some() {
                count += 1;
            }
        }
        Ok(count)
    }

    fn storage_names(&self) -> Result<Vec<String>> {
        let dir = match fs::read_dir(&self.root) {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in dir {
            let entry = entry?;
            match entry.file_name().into_string() {
                Ok(name) if name.ends_with(ENVELOPE_SUFFIX) => names.push(name),
                Ok(_) => {}
                Err(name) => debug!(name = ?name, "Skipping non UTF-8 file name"),
            }
        }
        Ok(names)
    }

    fn entry_for(&self, storage_name: &str) -> Result<Option<CatalogEntry>> {
        let Some((id, name)) = parse_storage_name(storage_name) else {
            debug!(storage_name, "Skipping unrecognized blob name");
            return Ok(None);
        };

        // The blob may be deleted between the directory scan and this call.
        let metadata = match fs::metadata(self.root.join(storage_name)) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let created = metadata.created().or_else(|_| metadata.modified())?;

        Ok(Some(CatalogEntry {
            id,
            name,
            storage_name: storage_name.to_string(),
            size: metadata.len(),
            uploaded: DateTime::<Utc>::from(created),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("report.pdf", "report.pdf")]
    #[case("My Report 2024.pdf", "My-Report-2024.pdf")]
    #[case("my_notes.txt", "my-notes.txt")]
    #[case("../../etc/passwd", "passwd")]
    #[case("C:\\Users\\bob\\secret.docx", "secret.docx")]
    #[case("  spaced   out .txt ", "spaced-out-.txt")]
    #[case(".hidden.txt", "hidden.txt")]
    #[case("résumé.pdf", "rsum.pdf")]
    #[case("a<b>c:d|e?.csv", "abcde.csv")]
    fn test_sanitize_name(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(sanitize_name(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("..")]
    #[case("dir/")]
    #[case("___")]
    #[case("日本語")]
    fn test_sanitize_rejects_empty_result(#[case] raw: &str) {
        assert!(matches!(sanitize_name(raw), Err(CoreError::InvalidFilename(_))));
    }

    #[rstest]
    #[case("a.TXT", Some("txt"))]
    #[case("archive.tar.gz", Some("gz"))]
    #[case("noext", None)]
    #[case("trailing.", None)]
    fn test_extension_of(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(extension_of(name).as_deref(), expected);
    }

    #[test]
    fn test_compose_storage_name() {
        let id: FileId = "123e4567-e89b-42d3-a456-426614174000".parse().unwrap();
        assert_eq!(
            compose_storage_name(&id, "hello.txt"),
            "123e4567-e89b-42d3-a456-426614174000_hello.txt.enc"
        );
    }

    #[rstest]
    #[case("hello.txt")]
    #[case("no-suffix.enc.bak")]
    #[case("not-a-uuid_hello.txt.enc")]
    #[case("123e4567-e89b-42d3-a456-426614174000_.enc")]
    #[case("123e4567-e89b-42d3-a456-426614174000.enc")]
    fn test_parse_rejects(#[case] storage_name: &str) {
        assert!(parse_storage_name(storage_name).is_none());
    }

    #[test]
    fn test_parse_keeps_underscores_after_first_separator() {
        let id = FileId::generate();
        let legacy = format!("{}_my_old_file.txt.enc", id);
        assert_eq!(
            parse_storage_name(&legacy),
            Some((id, "my_old_file.txt".to_string()))
        );
    }

    #[test]
    fn test_parse_strips_only_final_suffix() {
        let id = FileId::generate();
        let storage_name = compose_storage_name(&id, "backup.enc");
        assert_eq!(
            parse_storage_name(&storage_name),
            Some((id, "backup.enc".to_string()))
        );
    }

    #[test]
    fn test_list_entries_on_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(dir.path().join("absent"));
        assert!(catalog.list_entries().unwrap().is_empty());
        assert_eq!(catalog.count().unwrap(), 0);
    }

    #[test]
    fn test_list_entries_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(dir.path());

        let older = FileId::generate();
        let newer = FileId::generate();
        fs::write(dir.path().join(compose_storage_name(&older, "a.txt")), [0u8; 40]).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        fs::write(dir.path().join(compose_storage_name(&newer, "b.txt")), [0u8; 33]).unwrap();

        // Noise that must be ignored
        fs::write(dir.path().join("README.txt"), b"x").unwrap();
        fs::write(dir.path().join("garbage_name.enc"), b"x").unwrap();
        fs::write(dir.path().join(".staging-abc.part"), b"x").unwrap();
        fs::create_dir(dir.path().join(format!("{}_dir.enc", FileId::generate()))).unwrap();

        let entries = catalog.list_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, newer);
        assert_eq!(entries[0].name, "b.txt");
        assert_eq!(entries[0].size, 33);
        assert_eq!(entries[1].id, older);
        assert_eq!(entries[1].size, 40);
        assert!(entries[0].uploaded >= entries[1].uploaded);
        assert_eq!(catalog.count().unwrap(), entries.len());
    }

    #[test]
    fn test_find_is_exact_match() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(dir.path());
        let id = FileId::generate();
        fs::write(dir.path().join(compose_storage_name(&id, "x.txt")), [1u8; 32]).unwrap();

        let found = catalog.find(&id).unwrap().unwrap();
        assert_eq!(found.name, "x.txt");
        assert!(catalog.find(&FileId::generate()).unwrap().is_none());
    }

    proptest! {
        #[test]
        fn prop_storage_name_roundtrip(raw in "[ -~]{1,64}", bytes in any::<[u8; 16]>()) {
            let id = FileId::from(uuid::Builder::from_random_bytes(bytes).into_uuid());
            if let Ok(name) = sanitize_name(&raw) {
                prop_assert!(!name.contains(RECORD_SEPARATOR));
                prop_assert!(!name.contains('/'));
                prop_assert!(!name.contains('\\'));
                let storage_name = compose_storage_name(&id, &name);
                prop_assert_eq!(parse_storage_name(&storage_name), Some((id, name)));
            }
        }

        #[test]
        fn prop_sanitize_is_idempotent(raw in "\\PC{0,64}") {
            if let Ok(once) = sanitize_name(&raw) {
                prop_assert_eq!(sanitize_name(&once).unwrap(), once);
            }
        }
    }
}
