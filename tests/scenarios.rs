//! End-to-end scenarios over a real storage root
//!
//! These drive the vault exactly as the server does, then inspect the
//! directories on disk.

use cryptdrop::{CoreError, FileId, Vault, VaultConfig};
use cryptdrop_crypto::{HEADER_SIZE, SymmetricKey, envelope};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("cryptdrop_core=debug")
        .with_test_writer()
        .try_init();
}

fn open_vault(root: &Path) -> Vault {
    init_tracing();
    Vault::new(VaultConfig::with_root(root)).unwrap()
}

fn names_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

/// Upload, read back, delete, then confirm nothing is left
#[test]
fn test_upload_retrieve_delete_scenario() {
    let root = tempfile::tempdir().unwrap();
    let vault = open_vault(root.path());

    let id = vault.upload_bytes(b"hello text", "hello.txt").unwrap();

    let uploads = names_in(&vault.config().uploads_dir);
    assert_eq!(uploads, vec![format!("{}_hello.txt.enc", id)]);
    assert_eq!(names_in(&vault.config().keys_dir), vec![format!("{}.key", id)]);

    let file = vault.retrieve(&id).unwrap();
    assert_eq!(file.name, "hello.txt");
    assert_eq!(file.data.as_slice(), b"hello text");

    vault.delete(&id).unwrap();
    assert!(matches!(vault.retrieve(&id), Err(CoreError::NotFound(_))));
    assert!(names_in(&vault.config().uploads_dir).is_empty());
    assert!(names_in(&vault.config().keys_dir).is_empty());
}

/// A single flipped byte on disk is caught, not returned as plaintext
#[test]
fn test_tampered_blob_scenario() {
    let root = tempfile::tempdir().unwrap();
    let vault = open_vault(root.path());

    let id = vault.upload_bytes(b"ledger entries", "ledger.csv").unwrap();
    let blob_path = vault
        .config()
        .uploads_dir
        .join(format!("{}_ledger.csv.enc", id));

    for offset in [0, 20, HEADER_SIZE + 3] {
        let original = fs::read(&blob_path).unwrap();
        let mut tampered = original.clone();
        tampered[offset] ^= 0x80;
        fs::write(&blob_path, &tampered).unwrap();

        assert!(
            matches!(vault.retrieve(&id), Err(CoreError::DecryptionFailed(found)) if found == id),
            "flip at offset {} went undetected",
            offset
        );
        fs::write(&blob_path, &original).unwrap();
    }

    assert_eq!(vault.retrieve(&id).unwrap().data.as_slice(), b"ledger entries");
}

/// Catalog reflects uploads newest first with envelope sizes
#[test]
fn test_listing_scenario() {
    let root = tempfile::tempdir().unwrap();
    let vault = open_vault(root.path());

    let uploads: [(&str, &[u8]); 3] = [
        ("first.txt", b"1"),
        ("Second Report.pdf", b"%PDF-1.7 body"),
        ("third_file.py", b"print('hi')\n"),
    ];
    let mut ids = Vec::new();
    for (name, data) in uploads {
        ids.push(vault.upload_bytes(data, name).unwrap());
        thread::sleep(Duration::from_millis(20));
    }

    let entries = vault.list_entries().unwrap();
    assert_eq!(entries.len(), 3);

    let expected = [
        (ids[2], "third-file.py", uploads[2].1.len()),
        (ids[1], "Second-Report.pdf", uploads[1].1.len()),
        (ids[0], "first.txt", uploads[0].1.len()),
    ];
    for (entry, (id, name, plain_len)) in entries.iter().zip(expected) {
        assert_eq!(entry.id, id);
        assert_eq!(entry.name, name);
        assert_eq!(entry.size, (plain_len + HEADER_SIZE) as u64);
    }
}

/// Ciphertext whose key record vanished reports the missing key
#[test]
fn test_missing_key_scenario() {
    let root = tempfile::tempdir().unwrap();
    let vault = open_vault(root.path());

    let id = vault.upload_bytes(b"keyless", "keyless.txt").unwrap();
    fs::remove_file(vault.config().keys_dir.join(format!("{}.key", id))).unwrap();

    assert!(matches!(vault.retrieve(&id), Err(CoreError::KeyMissing(found)) if found == id));
    assert_eq!(vault.stats().unwrap().files_count, 1);
    assert_eq!(vault.stats().unwrap().keys_count, 0);
}

/// Stored artifacts decrypt with nothing but the crypto crate
#[test]
fn test_artifacts_are_self_contained() {
    let root = tempfile::tempdir().unwrap();
    let vault = open_vault(root.path());

    let id = vault.upload_bytes(b"portable", "portable.txt").unwrap();
    let record = fs::read_to_string(vault.config().keys_dir.join(format!("{}.key", id))).unwrap();
    let blob = fs::read(
        vault
            .config()
            .uploads_dir
            .join(format!("{}_portable.txt.enc", id)),
    )
    .unwrap();

    let key = SymmetricKey::from_base64(&record).unwrap();
    assert_eq!(envelope::decrypt(&key, &blob).unwrap().as_slice(), b"portable");
}

/// Vault state survives reopening over the same directories
#[test]
fn test_reopen_scenario() {
    let root = tempfile::tempdir().unwrap();
    let id = open_vault(root.path())
        .upload_bytes(b"persistent", "persist.txt")
        .unwrap();

    let reopened = open_vault(root.path());
    assert_eq!(reopened.retrieve(&id).unwrap().data.as_slice(), b"persistent");
}

/// Racing retrieve and delete never yields partial plaintext
#[test]
fn test_concurrent_retrieve_and_delete() {
    let root = tempfile::tempdir().unwrap();
    let vault = Arc::new(open_vault(root.path()));
    let payload = vec![0x5Au8; 256 * 1024];

    for _ in 0..8 {
        let id = vault.upload_bytes(&payload, "race.zip").unwrap();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let vault = Arc::clone(&vault);
                thread::spawn(move || vault.retrieve(&id))
            })
            .collect();
        let deleter = {
            let vault = Arc::clone(&vault);
            thread::spawn(move || vault.delete(&id))
        };

        deleter.join().unwrap().unwrap();
        for reader in readers {
            match reader.join().unwrap() {
                Ok(file) => assert_eq!(file.data.as_slice(), payload.as_slice()),
                Err(CoreError::NotFound(_) | CoreError::KeyMissing(_) | CoreError::Io(_)) => {}
                Err(other) => panic!("unexpected error: {}", other),
            }
        }
    }
}

/// Unknown identifiers are reported, not invented
#[test]
fn test_unknown_id_scenario() {
    let root = tempfile::tempdir().unwrap();
    let vault = open_vault(root.path());
    let id = FileId::generate();

    assert!(matches!(vault.retrieve(&id), Err(CoreError::NotFound(_))));
    assert!(matches!(vault.retrieve_ciphertext(&id), Err(CoreError::NotFound(_))));
    assert!(matches!(vault.export_key(&id), Err(CoreError::KeyNotFound(_))));
    vault.delete(&id).unwrap();
    assert!("not-a-uuid".parse::<FileId>().is_err());
}
