//! Run orchestration: fetch → recover → persist, and the seal command.
//!
//! Collaborators are passed in, never constructed here, so the sequence runs
//! against mocks in tests and against the network and filesystem in `main`.

use std::{fs, path::Path};

use common::{
    protocol::{RecoveryReport, SealReport},
    RecoveryError,
};
use tracing::info;
use zeroize::Zeroizing;

use crate::{fetch::Fetcher, passphrase::Passphrase, persist::Persister, pipeline};

/// Fetch the blob at `url`, recover it with `passphrase`, and hand the
/// plaintext to `persister`.
///
/// The persister is only called once every pipeline stage has succeeded.
/// Key derivation and decryption run on the blocking pool.
///
/// # Errors
///
/// Returns the [`RecoveryError`] of the first stage that failed.
pub async fn run_recovery(
    fetcher: &dyn Fetcher,
    persister: &dyn Persister,
    url: &str,
    passphrase: Passphrase,
    output_path: &str,
) -> Result<RecoveryReport, RecoveryError> {
    info!("fetching encrypted blob");
    let raw = fetcher.fetch(url).await?;

    let encoded = String::from_utf8(raw)
        .map_err(|_| RecoveryError::Decode("blob is not UTF-8 text".into()))?;

    let plaintext = tokio::task::spawn_blocking(move || {
        pipeline::recover(encoded.trim(), passphrase.expose()).map(Zeroizing::new)
    })
    .await
    .unwrap_or_else(|e| std::panic::resume_unwind(e.into_panic()))?;
    info!(bytes = plaintext.len(), "blob decrypted");

    persister.persist(plaintext.as_bytes())?;
    Ok(RecoveryReport::new(output_path, &plaintext))
}

/// Seal the UTF-8 text in `input` under `passphrase`.
///
/// # Errors
///
/// Returns [`RecoveryError::Config`] if `input` cannot be read and
/// [`RecoveryError::TextDecode`] if it is not UTF-8.
pub fn run_seal(input: &Path, passphrase: &Passphrase) -> Result<SealReport, RecoveryError> {
    let bytes = fs::read(input).map_err(|e| {
        RecoveryError::Config(format!("failed to read {}: {e}", input.display()))
    })?;
    let text = Zeroizing::new(String::from_utf8(bytes).map_err(|_| {
        RecoveryError::TextDecode(format!("{} is not valid UTF-8", input.display()))
    })?);

    let blob = pipeline::seal(&text, passphrase.expose())?;
    info!(plaintext_bytes = text.len(), blob_len = blob.len(), "input sealed");
    Ok(SealReport::new(blob))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchError, MockFetcher};
    use crate::persist::{FilePersister, MockPersister, PersistError};
    use common::ErrorKind;

    const URL: &str = "https://gist.githubusercontent.com/u/raw/keys.txt";
    const HELLO_BLOB: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAADVkadM28njAJ3dJWkawDZG9UZ0nrA==";

    fn fetcher_returning(body: &'static str) -> MockFetcher {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url == URL)
            .times(1)
            .returning(move |_| Ok(body.as_bytes().to_vec()));
        fetcher
    }

    fn persister_never_called() -> MockPersister {
        let mut persister = MockPersister::new();
        persister.expect_persist().never();
        persister
    }

    #[tokio::test]
    async fn recovers_and_persists_plaintext() {
        let fetcher = fetcher_returning(HELLO_BLOB);
        let mut persister = MockPersister::new();
        persister
            .expect_persist()
            .withf(|bytes| bytes.to_vec() == b"hello")
            .times(1)
            .returning(|_| Ok(()));

        let report = run_recovery(&fetcher, &persister, URL, Passphrase::new("12345"), "out.txt")
            .await
            .unwrap();
        assert_eq!(report.bytes_written, 5);
        assert_eq!(report.lines, 1);
        assert_eq!(report.output_path, "out.txt");
    }

    #[tokio::test]
    async fn trailing_newline_in_download_is_ignored() {
        let fetcher = fetcher_returning(
            "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAADVkadM28njAJ3dJWkawDZG9UZ0nrA==\n",
        );
        let mut persister = MockPersister::new();
        persister.expect_persist().times(1).returning(|_| Ok(()));

        let result = run_recovery(&fetcher, &persister, URL, Passphrase::new("12345"), "o").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn wrong_passphrase_never_persists() {
        let fetcher = fetcher_returning(HELLO_BLOB);
        let persister = persister_never_called();

        let err = run_recovery(&fetcher, &persister, URL, Passphrase::new("wrong"), "o")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn fetch_failure_is_network_error() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_| Err(FetchError::Status(404)));
        let persister = persister_never_called();

        let err = run_recovery(&fetcher, &persister, URL, Passphrase::new("12345"), "o")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn garbage_download_is_decode_error() {
        let fetcher = fetcher_returning("<html>rate limited</html>");
        let persister = persister_never_called();

        let err = run_recovery(&fetcher, &persister, URL, Passphrase::new("12345"), "o")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[tokio::test]
    async fn non_utf8_download_is_decode_error() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_| Ok(vec![0xff, 0xfe, 0x00]));
        let persister = persister_never_called();

        let err = run_recovery(&fetcher, &persister, URL, Passphrase::new("12345"), "o")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.to_string().contains("not UTF-8 text"), "{err}");
    }

    #[tokio::test]
    async fn persist_failure_is_reported() {
        let fetcher = fetcher_returning(HELLO_BLOB);
        let mut persister = MockPersister::new();
        persister.expect_persist().returning(|_| {
            Err(PersistError::Write {
                path: "out.txt".into(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
        });

        let err = run_recovery(&fetcher, &persister, URL, Passphrase::new("12345"), "o")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persist);
    }

    #[tokio::test]
    async fn wrong_passphrase_creates_no_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decrypted_keys.txt");
        let fetcher = fetcher_returning(HELLO_BLOB);
        let persister = FilePersister::new(&path);

        let err = run_recovery(&fetcher, &persister, URL, Passphrase::new("wrong"), "o")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn correct_passphrase_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decrypted_keys.txt");
        let fetcher = fetcher_returning(HELLO_BLOB);
        let persister = FilePersister::new(&path);

        run_recovery(&fetcher, &persister, URL, Passphrase::new("12345"), "o")
            .await
            .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn seal_output_recovers_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("keys.txt");
        fs::write(&input, "openai:sk-proj-abc\n").unwrap();

        let passphrase = Passphrase::new("pw");
        let report = run_seal(&input, &passphrase).unwrap();
        assert_eq!(
            pipeline::recover(&report.blob, "pw").unwrap(),
            "openai:sk-proj-abc\n"
        );
    }

    #[test]
    fn seal_rejects_missing_and_binary_input() {
        let dir = tempfile::tempdir().unwrap();
        let passphrase = Passphrase::new("pw");

        let missing = run_seal(&dir.path().join("nope"), &passphrase).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::Config);

        let binary = dir.path().join("bin");
        fs::write(&binary, [0xffu8, 0x00]).unwrap();
        let err = run_seal(&binary, &passphrase).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TextDecode);
    }
}
