//! CryptDrop offline decryption tool

use anyhow::Context;
use clap::Parser;
use cryptdrop_cli::decrypt_tool::{self, format_size};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cryptdrop-decrypt")]
#[command(about = "Decrypt a CryptDrop .enc file with its key file, without the server")]
#[command(version)]
struct Args {
    /// Encrypted file downloaded from the server (.enc); prompted for if omitted
    encrypted_file: Option<PathBuf>,

    /// Key file (.key record or downloaded key file); prompted for if omitted
    key_file: Option<PathBuf>,

    /// Directory to write the decrypted file into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let Some(encrypted_file) = resolve(args.encrypted_file, "encrypted file (.enc)")? else {
        return Ok(());
    };
    let Some(key_file) = resolve(args.key_file, "key file (.key or .txt)")? else {
        return Ok(());
    };

    println!("Starting decryption");
    println!("   Encrypted file: {}", encrypted_file.display());
    println!("   Key file: {}", key_file.display());

    println!("\nLoading encryption key...");
    let key = decrypt_tool::load_key(&key_file)?;
    println!("   Key loaded, fingerprint {}", key.fingerprint());

    println!("\nDecrypting file...");
    let decrypted = decrypt_tool::decrypt_file(&encrypted_file, &key)?;
    let report = &decrypted.report;
    println!("   File size: {} bytes", report.file_size);
    println!("   Nonce: {}...", report.nonce_prefix);
    println!("   Tag: {}...", report.tag_prefix);
    println!("   Ciphertext: {} bytes", report.ciphertext_len);
    println!("   Integrity verified (GCM tag validated)");

    let input_name = encrypted_file
        .file_name()
        .and_then(|name| name.to_str())
        .context("encrypted file path has no usable file name")?;
    let output = decrypt_tool::save_decrypted(&args.output_dir, input_name, &decrypted.plaintext)
        .with_context(|| format!("failed to write into {}", args.output_dir.display()))?;

    println!("\nDecryption complete");
    println!("   Decrypted: {}", output.display());
    println!("   Size: {}", format_size(decrypted.plaintext.len()));
    println!("   SHA-256: {}", decrypted.sha256);
    println!("\nKeep the decrypted file secure and delete the key file after use.");

    Ok(())
}

fn resolve(given: Option<PathBuf>, label: &str) -> anyhow::Result<Option<PathBuf>> {
    match given {
        Some(path) => Ok(Some(path)),
        None => decrypt_tool::prompt_path(&mut io::stdin().lock(), &mut io::stdout(), label)
            .context("failed to read path from stdin"),
    }
}
