//! Root filesystem archive download.
//!
//! A single blocking HTTP(S) GET with no retry, no resumption, and no
//! timeout. The body is streamed straight to disk.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use burrow_common::error::{BurrowError, Result};

/// Downloads `url` into a new file at `dest`, returning the number of bytes written.
///
/// `dest` is only created once the server has answered with a 2xx status.
///
/// # Errors
///
/// Returns [`BurrowError::Download`] on transport failure or a non-2xx
/// status, and [`BurrowError::Filesystem`] if `dest` cannot be created or written.
pub fn download(url: &str, dest: &Path) -> Result<u64> {
    tracing::info!(url, dest = %dest.display(), "downloading archive");

    let download_error = |message: String| BurrowError::Download {
        url: url.to_string(),
        message,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(None)
        .build()
        .map_err(|e| download_error(e.to_string()))?;
    let mut response = client
        .get(url)
        .send()
        .map_err(|e| download_error(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(download_error(format!("bad status: {status}")));
    }

    let mut out = File::create(dest).map_err(|e| BurrowError::Filesystem {
        path: dest.to_path_buf(),
        source: e,
    })?;

    let written = io::copy(&mut response, &mut out).map_err(|e| {
        if e.get_ref().is_some_and(|inner| inner.is::<reqwest::Error>()) {
            download_error(e.to_string())
        } else {
            BurrowError::Filesystem {
                path: dest.to_path_buf(),
                source: e,
            }
        }
    })?;
    out.flush().map_err(|e| BurrowError::Filesystem {
        path: dest.to_path_buf(),
        source: e,
    })?;

    tracing::info!(bytes = written, "archive downloaded");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{OneShotServer, unreachable_url};

    #[test]
    fn download_writes_body_to_file() {
        let server = OneShotServer::start("200 OK", b"archive bytes".to_vec());
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let dest = dir.path().join("rootfs.tar.gz");

        let written = download(&server.url("rootfs.tar.gz"), &dest).expect("download failed");
        server.join();

        assert_eq!(written, 13);
        assert_eq!(std::fs::read(&dest).expect("read failed"), b"archive bytes");
    }

    #[test]
    fn large_body_is_streamed_intact() {
        let body: Vec<u8> = (0..300 * 1024).map(|i| (i % 251) as u8).collect();
        let server = OneShotServer::start("200 OK", body.clone());
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let dest = dir.path().join("rootfs.tar.gz");

        let written = download(&server.url("rootfs.tar.gz"), &dest).expect("download failed");
        server.join();

        assert_eq!(written, body.len() as u64);
        assert_eq!(std::fs::read(&dest).expect("read failed"), body);
    }

    #[test]
    fn non_success_status_is_a_download_error() {
        let server = OneShotServer::start("404 Not Found", b"missing".to_vec());
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let dest = dir.path().join("rootfs.tar.gz");

        let err = download(&server.url("rootfs.tar.gz"), &dest).expect_err("404 must fail");
        server.join();

        match err {
            BurrowError::Download { message, .. } => assert!(message.contains("404")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dest.exists());
    }

    #[test]
    fn unreachable_host_is_a_download_error() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let dest = dir.path().join("rootfs.tar.gz");

        let err = download(&unreachable_url("rootfs.tar.gz"), &dest).expect_err("must fail");
        assert!(matches!(err, BurrowError::Download { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn unwritable_destination_is_a_filesystem_error() {
        let server = OneShotServer::start("200 OK", b"data".to_vec());
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let dest = dir.path().join("missing-dir").join("rootfs.tar.gz");

        let err = download(&server.url("rootfs.tar.gz"), &dest).expect_err("must fail");
        server.join();
        assert!(matches!(err, BurrowError::Filesystem { .. }));
    }
}
