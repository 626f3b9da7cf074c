use std::path::PathBuf;

use symcrypt::{
    Algorithm, Charset, CipherConfig, Coordinator, CryptoError, CryptoJobRequest, CryptoJobResult, Direction, IvMaterial, KeyMaterial, MaterialEncoding, Mode, Padding,
};
use tempfile::tempdir;
use tokio::runtime::Handle;

fn material(key: &str, iv: &str) -> (KeyMaterial, IvMaterial) {
    (KeyMaterial::decode(key, MaterialEncoding::Raw, Charset::Utf8).unwrap(), IvMaterial::decode(iv, MaterialEncoding::Raw, Charset::Utf8).unwrap())
}

async fn run_text(config: CipherConfig, key: &str, iv: &str, direction: Direction, input: &str, per_line: bool) -> symcrypt::TextOutput {
    let (key, iv) = material(key, iv);
    let request = CryptoJobRequest::text(config, key, iv, direction, input).with_per_line(per_line);
    match Coordinator::new(Handle::current()).submit(request).unwrap().wait().await.unwrap() {
        CryptoJobResult::Text(output) => output,
        CryptoJobResult::Files(_) => panic!("expected text output"),
    }
}

#[tokio::test]
async fn aes_cbc_end_to_end() {
    let config = CipherConfig::resolve("AES", "CBC", "PKCS5Padding").unwrap();
    assert_eq!(config.transform(), "AES/CBC/PKCS5Padding");

    let encrypted = run_text(config, "0123456789abcdef", "abcdef9876543210", Direction::Encrypt, "hello world", false).await;
    assert!(encrypted.text.chars().all(|c| c.is_ascii_hexdigit()));

    let decrypted = run_text(config, "0123456789abcdef", "abcdef9876543210", Direction::Decrypt, &encrypted.text, false).await;
    assert_eq!(decrypted.text, "hello world");
}

#[test]
fn resolve_matrix() {
    for &algorithm in Algorithm::ALL {
        for &mode in Mode::ALL {
            for &padding in Padding::ALL {
                let result = CipherConfig::resolve(algorithm.name(), mode.name(), padding.name());

                if (mode.is_aead() || mode.is_stream()) && padding != Padding::NoPadding {
                    assert!(matches!(result, Err(CryptoError::IncompatibleModePadding { .. })), "{algorithm}/{mode}/{padding}");
                } else if mode.requires_128_bit_block() && algorithm.block_size() != 16 {
                    assert!(matches!(result, Err(CryptoError::IncompatibleModeAlgorithm { .. })), "{algorithm}/{mode}/{padding}");
                } else {
                    assert_eq!(result.unwrap().transform(), format!("{}/{}/{}", algorithm.name(), mode.name(), padding.name()));
                }
            }
        }
    }
}

#[test]
fn unknown_names_and_malformed_material() {
    assert!(matches!(CipherConfig::resolve("ROT13", "CBC", "NoPadding"), Err(CryptoError::UnsupportedAlgorithm(_))));
    assert!(matches!(CipherConfig::resolve("AES", "XTS", "NoPadding"), Err(CryptoError::UnsupportedMode(_))));
    assert!(matches!(CipherConfig::resolve("AES", "CBC", "Whatever"), Err(CryptoError::UnsupportedPadding(_))));

    assert!(matches!(KeyMaterial::decode("a", MaterialEncoding::Hex, Charset::Utf8), Err(CryptoError::MalformedHex(_))));
    assert!(matches!(KeyMaterial::decode("!!!", MaterialEncoding::Base64, Charset::Utf8), Err(CryptoError::MalformedBase64(_))));

    let first = KeyMaterial::decode("MDEyMzQ1Njc4OWFiY2RlZg==", MaterialEncoding::Base64, Charset::Utf8).unwrap();
    let second = KeyMaterial::decode("MDEyMzQ1Njc4OWFiY2RlZg==", MaterialEncoding::Base64, Charset::Utf8).unwrap();
    assert_eq!(first.expose(), second.expose());
    assert_eq!(first.expose(), b"0123456789abcdef");
}

#[tokio::test]
async fn batch_lines_are_isolated() {
    let config = CipherConfig::resolve("AES", "EAX", "NoPadding").unwrap();
    let encrypted = run_text(config, "0123456789abcdef", "nonce", Direction::Encrypt, "line1\nline2\nline3", true).await;
    let mut lines: Vec<String> = encrypted.text.lines().map(str::to_owned).collect();
    assert_eq!(lines.len(), 3);

    lines[1].truncate(8);
    let decrypted = run_text(config, "0123456789abcdef", "nonce", Direction::Decrypt, &lines.join("\n"), true).await;

    assert_eq!(decrypted.text.lines().collect::<Vec<_>>(), ["line1", "line3"]);
    assert_eq!(decrypted.failures.len(), 1);
    assert!(matches!(decrypted.failures[0], CryptoError::CryptoExecution { line: Some(1), .. }));
}

#[tokio::test]
async fn file_batch_isolates_wrong_key() {
    let dir = tempdir().unwrap();
    let config = CipherConfig::resolve("AES", "GCM", "NoPadding").unwrap();

    let mut encrypted = Vec::new();
    for (i, key) in ["0123456789abcdef", "ffffffffffffffff", "0123456789abcdef"].iter().enumerate() {
        let path = dir.path().join(format!("doc{i}.txt"));
        tokio::fs::write(&path, format!("document {i}")).await.unwrap();

        let (key, iv) = material(key, "abcdef987654");
        let request = CryptoJobRequest::files(config, key, iv, Direction::Encrypt, vec![path]);
        let CryptoJobResult::Files(output) = Coordinator::new(Handle::current()).submit(request).unwrap().wait().await.unwrap() else { panic!("expected files") };
        encrypted.push(output.reports[0].output.clone());
    }

    let (key, iv) = material("0123456789abcdef", "abcdef987654");
    let request = CryptoJobRequest::files(config, key, iv, Direction::Decrypt, encrypted.clone());
    let CryptoJobResult::Files(output) = Coordinator::new(Handle::current()).submit(request).unwrap().wait().await.unwrap() else { panic!("expected files") };

    let expected: Vec<PathBuf> = vec![dir.path().join("doc0.txt.dec"), dir.path().join("doc2.txt.dec")];
    assert_eq!(output.output_paths(), expected.iter().map(PathBuf::as_path).collect::<Vec<_>>());
    assert_eq!(output.failures.len(), 1);
    assert!(matches!(&output.failures[0], CryptoError::FileCrypto { path, .. } if *path == encrypted[1]));
    assert_eq!(tokio::fs::read_to_string(&expected[1]).await.unwrap(), "document 2");
}

#[tokio::test]
async fn coordinator_rejects_concurrent_submit() {
    let coordinator = Coordinator::new(Handle::current());
    let (key, iv) = material("0123456789abcdef", "abcdef9876543210");
    let request = CryptoJobRequest::text(CipherConfig::default(), key, iv, Direction::Encrypt, "hello");

    let running = coordinator.submit(request.clone()).unwrap();
    assert!(matches!(coordinator.submit(request), Err(CryptoError::Busy)));
    assert!(running.wait().await.is_ok());
}
