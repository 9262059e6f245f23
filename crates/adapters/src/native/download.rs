// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource download for the native backend (§4.5): a GET request scoped to
//! the instance's cancellation token, MD5-verified before the file is
//! renamed into place.

use std::path::{Path, PathBuf};

use fleet_core::ResourceSpec;
use md5::{Digest, Md5};
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("download cancelled")]
    Cancelled,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("download returned status {0}")]
    BadStatus(reqwest::StatusCode),
    #[error("file md5 not match: expected {expected}, got {actual}")]
    Md5Mismatch { expected: String, actual: String },
}

fn hex_md5(bytes: &[u8]) -> String {
    let digest = Md5::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

async fn file_md5_matches(path: &Path, expected: &str) -> bool {
    match tokio::fs::read(path).await {
        Ok(bytes) => hex_md5(&bytes).eq_ignore_ascii_case(expected),
        Err(_) => false,
    }
}

/// Downloads `resource` into `dir`, short-circuiting if a file already at
/// the final path matches the expected digest. Writes to a temporary file
/// first and renames into place only after the digest matches, so an
/// interrupted or failed download never leaves a partial file at the final
/// path.
pub async fn download(
    resource: &ResourceSpec,
    dir: &Path,
    cancel: &CancellationToken,
) -> Result<PathBuf, DownloadError> {
    let target = dir.join(&resource.file_name);
    if file_md5_matches(&target, &resource.md5).await {
        return Ok(target);
    }

    let client = reqwest::Client::new();
    let request = client.get(&resource.url).send();

    let response = tokio::select! {
        _ = cancel.cancelled() => return Err(DownloadError::Cancelled),
        result = request => result?,
    };

    if !response.status().is_success() {
        return Err(DownloadError::BadStatus(response.status()));
    }

    let bytes = tokio::select! {
        _ = cancel.cancelled() => return Err(DownloadError::Cancelled),
        result = response.bytes() => result?,
    };

    let actual = hex_md5(&bytes);
    if !actual.eq_ignore_ascii_case(&resource.md5) {
        return Err(DownloadError::Md5Mismatch { expected: resource.md5.clone(), actual });
    }

    let tmp_path = dir.join(format!("{}.tmp", resource.file_name));
    tokio::fs::write(&tmp_path, &bytes).await?;
    tokio::fs::rename(&tmp_path, &target).await?;
    Ok(target)
}

#[cfg(test)]
#[path = "download_tests.rs"]
mod tests;
