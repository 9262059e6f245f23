use fleet_core::ResourceSpec;
use tempfile::tempdir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::*;

/// Serves one HTTP request with `body`, then closes.
async fn serve_once(body: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await;
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.write_all(body).await;
        let _ = socket.shutdown().await;
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn download_verifies_digest_and_renames_into_place() {
    let body = b"hello world";
    let url = serve_once(body).await;
    let dir = tempdir().expect("tempdir");
    let resource = ResourceSpec { url, file_name: "payload.bin".to_string(), md5: hex_md5(body) };
    let cancel = CancellationToken::new();

    let path = download(&resource, dir.path(), &cancel).await.expect("download succeeds");
    assert_eq!(std::fs::read(path).expect("read downloaded file"), body);
    assert!(!dir.path().join("payload.bin.tmp").exists());
}

#[tokio::test]
async fn download_rejects_a_digest_mismatch() {
    let body = b"hello world";
    let url = serve_once(body).await;
    let dir = tempdir().expect("tempdir");
    let resource =
        ResourceSpec { url, file_name: "payload.bin".to_string(), md5: "0".repeat(32) };
    let cancel = CancellationToken::new();

    let err = download(&resource, dir.path(), &cancel).await.expect_err("digest mismatch");
    assert!(matches!(err, DownloadError::Md5Mismatch { .. }));
    assert!(!dir.path().join("payload.bin").exists());
}

#[tokio::test]
async fn download_short_circuits_when_file_already_matches() {
    let dir = tempdir().expect("tempdir");
    let body = b"already here";
    std::fs::write(dir.path().join("payload.bin"), body).expect("seed file");
    let resource = ResourceSpec {
        url: "http://127.0.0.1:1".to_string(), // unreachable; must not be dialed
        file_name: "payload.bin".to_string(),
        md5: hex_md5(body),
    };
    let cancel = CancellationToken::new();

    let path = download(&resource, dir.path(), &cancel).await.expect("short circuit succeeds");
    assert_eq!(std::fs::read(path).expect("read file"), body);
}

#[tokio::test]
async fn download_is_cancellable() {
    let dir = tempdir().expect("tempdir");
    let resource = ResourceSpec {
        url: "http://10.255.255.1:81".to_string(), // non-routable, should hang
        file_name: "payload.bin".to_string(),
        md5: "0".repeat(32),
    };
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = download(&resource, dir.path(), &cancel).await.expect_err("cancelled");
    assert!(matches!(err, DownloadError::Cancelled));
}
