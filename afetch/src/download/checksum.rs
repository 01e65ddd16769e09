//! Content digest parsing and verification for downloaded assets.
//!
//! GitHub publishes asset digests as `<algorithm>:<hex>`, e.g.
//! `sha256:2cf24dba5fb0a30e...`. SHA-256 and SHA-512 are supported.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use sha2::{Digest, Sha256, Sha512};

use crate::error::{FetchError, FetchResult};

/// Buffer size for reading files during checksum calculation (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Hash algorithm named by a digest prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    /// Length of the hex encoding of this algorithm's output.
    fn hex_len(self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => 64,
            DigestAlgorithm::Sha512 => 128,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestAlgorithm::Sha256 => write!(f, "sha256"),
            DigestAlgorithm::Sha512 => write!(f, "sha512"),
        }
    }
}

/// A published digest: algorithm plus lowercase hex value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedDigest {
    pub algorithm: DigestAlgorithm,
    pub hex: String,
}

impl FromStr for ExpectedDigest {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FetchError::InvalidDigestFormat(s.to_string());

        let (algorithm, hex) = s.split_once(':').ok_or_else(invalid)?;
        let algorithm = match algorithm {
            "sha256" => DigestAlgorithm::Sha256,
            "sha512" => DigestAlgorithm::Sha512,
            _ => return Err(invalid()),
        };
        if hex.len() != algorithm.hex_len() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        Ok(Self {
            algorithm,
            hex: hex.to_ascii_lowercase(),
        })
    }
}

impl fmt::Display for ExpectedDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hex)
    }
}

/// Calculate the checksum of a file with the given algorithm.
///
/// # Returns
///
/// The lowercase hexadecimal hash of the file contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn calculate_file_checksum(path: &Path, algorithm: DigestAlgorithm) -> FetchResult<String> {
    match algorithm {
        DigestAlgorithm::Sha256 => hash_file::<Sha256>(path),
        DigestAlgorithm::Sha512 => hash_file::<Sha512>(path),
    }
}

fn hash_file<D: Digest>(path: &Path) -> FetchResult<String>
where
    sha2::digest::Output<D>: fmt::LowerHex,
{
    let mut file = File::open(path).map_err(|e| FetchError::file_system(path, e))?;

    let mut hasher = D::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| FetchError::file_system(path, e))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Verify that a file matches an expected digest.
///
/// Returns `Ok(())` on a match, `ChecksumMismatch` otherwise.
pub fn verify_checksum(path: &Path, expected: &ExpectedDigest) -> FetchResult<()> {
    let actual = calculate_file_checksum(path, expected.algorithm)?;
    if actual != expected.hex {
        return Err(FetchError::ChecksumMismatch {
            filename: path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            expected: expected.hex.clone(),
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const HELLO_WORLD_SHA256: &str =
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_calculate_file_checksum() {
        let temp = TempDir::new().unwrap();
        let file_path = write_file(&temp, "test.txt", b"hello world");

        let checksum = calculate_file_checksum(&file_path, DigestAlgorithm::Sha256).unwrap();

        assert_eq!(checksum, HELLO_WORLD_SHA256);
    }

    #[test]
    fn test_calculate_empty_file() {
        let temp = TempDir::new().unwrap();
        let file_path = write_file(&temp, "empty.txt", b"");

        let checksum = calculate_file_checksum(&file_path, DigestAlgorithm::Sha256).unwrap();

        assert_eq!(
            checksum,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_calculate_sha512_length() {
        let temp = TempDir::new().unwrap();
        let file_path = write_file(&temp, "a.bin", b"abc");

        let checksum = calculate_file_checksum(&file_path, DigestAlgorithm::Sha512).unwrap();
        assert_eq!(checksum.len(), 128);
        assert!(checksum.starts_with("ddaf35a193617aba"));
    }

    #[test]
    fn test_calculate_nonexistent_file() {
        let result =
            calculate_file_checksum(Path::new("/nonexistent/file.txt"), DigestAlgorithm::Sha256);
        assert!(matches!(result, Err(FetchError::FileSystem { .. })));
    }

    #[test]
    fn test_parse_digest() {
        let digest: ExpectedDigest = format!("sha256:{}", HELLO_SHA256.to_uppercase())
            .parse()
            .unwrap();
        assert_eq!(digest.algorithm, DigestAlgorithm::Sha256);
        assert_eq!(digest.hex, HELLO_SHA256);
        assert_eq!(digest.to_string(), format!("sha256:{}", HELLO_SHA256));
    }

    #[test]
    fn test_parse_digest_rejects_bad_formats() {
        for bad in [
            HELLO_SHA256.to_string(),
            format!("md5:{}", HELLO_SHA256),
            "sha256:abc".to_string(),
            format!("sha256:{}", "z".repeat(64)),
            format!("sha256:{}:x", HELLO_SHA256),
        ] {
            match bad.parse::<ExpectedDigest>() {
                Err(FetchError::InvalidDigestFormat(s)) => assert_eq!(s, bad),
                other => panic!("Expected InvalidDigestFormat for {}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_verify_checksum_match() {
        let temp = TempDir::new().unwrap();
        let file_path = write_file(&temp, "hello.txt", b"hello");
        let expected: ExpectedDigest = format!("sha256:{}", HELLO_SHA256).parse().unwrap();

        assert!(verify_checksum(&file_path, &expected).is_ok());
    }

    #[test]
    fn test_verify_checksum_mismatch() {
        let temp = TempDir::new().unwrap();
        let file_path = write_file(&temp, "hello.txt", b"hellp");
        let expected: ExpectedDigest = format!("sha256:{}", HELLO_SHA256).parse().unwrap();

        match verify_checksum(&file_path, &expected) {
            Err(FetchError::ChecksumMismatch {
                filename,
                expected,
                actual,
            }) => {
                assert_eq!(filename, "hello.txt");
                assert_eq!(expected, HELLO_SHA256);
                assert_ne!(actual, HELLO_SHA256);
            }
            other => panic!("Expected ChecksumMismatch error, got {:?}", other),
        }
    }

    #[test]
    fn test_large_file_checksum() {
        let temp = TempDir::new().unwrap();
        // Larger than the read buffer
        let file_path = write_file(&temp, "large.bin", &vec![0xABu8; 100_000]);

        let checksum = calculate_file_checksum(&file_path, DigestAlgorithm::Sha256).unwrap();
        let checksum2 = calculate_file_checksum(&file_path, DigestAlgorithm::Sha256).unwrap();
        assert_eq!(checksum, checksum2);
    }
}
