//! Store service integration tests
//!
//! Each test boots a real service on an ephemeral port with a scratch root
//! and drives it through `StoreClient` (or a raw socket where the client
//! would refuse to send the bytes).

use depot_proto::ProtoError;
use depot_store::{serve, StoreClient, StoreConfig, StoreError};
use std::collections::BTreeSet;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

async fn spawn_store(ext: &str) -> (String, TempDir) {
    let root = tempfile::tempdir().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let config = StoreConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        root: root.path().to_path_buf(),
        ext: ext.to_string(),
    };
    tokio::spawn(async move {
        let _ = serve(listener, config).await;
    });
    (addr, root)
}

fn is_err_reply(err: &StoreError, tag: &str) -> bool {
    matches!(err, StoreError::Proto(ProtoError::ErrReply(reason)) if reason == tag)
}

#[tokio::test]
async fn store_then_fetch_round_trips() {
    let (addr, _root) = spawn_store("pdf").await;
    let client = StoreClient::new(&addr);

    let body = b"not really a pdf, but 34 bytes long".to_vec();
    let mut source: &[u8] = &body;
    client
        .store("/x", "report.pdf", body.len() as u64, &mut source)
        .await
        .unwrap();

    let stream = client.fetch("/x", "report.pdf").await.unwrap();
    assert_eq!(stream.size(), body.len() as u64);
    let mut fetched = Vec::new();
    stream.relay(&mut fetched).await.unwrap();
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn fetch_missing_file_is_nofile() {
    let (addr, _root) = spawn_store("pdf").await;
    let client = StoreClient::new(&addr);

    let err = client.fetch("/x", "ghost.pdf").await.unwrap_err();
    assert!(is_err_reply(&err, "nofile"), "unexpected: {err:?}");
}

#[tokio::test]
async fn delete_succeeds_once_then_reports_nofile() {
    let (addr, _root) = spawn_store("txt").await;
    let client = StoreClient::new(&addr);

    let mut source: &[u8] = b"bye";
    client.store("/d", "gone.txt", 3, &mut source).await.unwrap();

    client.delete("/d", "gone.txt").await.unwrap();
    let err = client.delete("/d", "gone.txt").await.unwrap_err();
    assert!(is_err_reply(&err, "nofile"), "unexpected: {err:?}");
}

#[tokio::test]
async fn list_is_sorted_and_extension_filtered() {
    let (addr, root) = spawn_store("pdf").await;
    let client = StoreClient::new(&addr);

    for name in ["b.pdf", "a.pdf"] {
        let mut source: &[u8] = b"x";
        client.store("/docs", name, 1, &mut source).await.unwrap();
    }
    // A foreign-extension file placed directly in the root is invisible.
    std::fs::write(root.path().join("docs/readme.txt"), b"no").unwrap();

    assert_eq!(client.list("/docs").await.unwrap(), ["a.pdf", "b.pdf"]);
    assert!(client.list("/nope").await.unwrap().is_empty());
}

#[tokio::test]
async fn tarall_bundles_every_matching_file() {
    let (addr, _root) = spawn_store("pdf").await;
    let client = StoreClient::new(&addr);

    for (dest, name) in [("/x", "a.pdf"), ("/x/y", "b.pdf")] {
        let mut source: &[u8] = b"pdfpdf";
        client.store(dest, name, 6, &mut source).await.unwrap();
    }

    let stream = client.tar_all(".pdf").await.unwrap();
    let mut bytes = Vec::new();
    stream.relay(&mut bytes).await.unwrap();

    let mut archive = tar::Archive::new(&bytes[..]);
    let entries: BTreeSet<String> = archive
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        entries,
        BTreeSet::from(["x/a.pdf".to_string(), "x/y/b.pdf".to_string()])
    );
}

#[tokio::test]
async fn tarall_with_no_files_is_a_valid_empty_archive() {
    let (addr, _root) = spawn_store("pdf").await;
    let client = StoreClient::new(&addr);

    let stream = client.tar_all("pdf").await.unwrap();
    assert!(stream.size() > 0);
    let mut bytes = Vec::new();
    stream.relay(&mut bytes).await.unwrap();

    let mut archive = tar::Archive::new(&bytes[..]);
    assert_eq!(archive.entries().unwrap().count(), 0);
}

#[tokio::test]
async fn tarall_rejects_a_foreign_extension() {
    let (addr, _root) = spawn_store("pdf").await;
    let client = StoreClient::new(&addr);

    let err = client.tar_all(".txt").await.unwrap_err();
    assert!(is_err_reply(&err, "ext"), "unexpected: {err:?}");
}

#[tokio::test]
async fn traversal_destinations_are_rejected_before_filesystem_access() {
    let (addr, root) = spawn_store("pdf").await;

    for command in ["STORE ../evil f.pdf 3", "LIST ../evil", "DELETE ../evil f.pdf"] {
        let socket = TcpStream::connect(&addr).await.unwrap();
        let (read_half, mut write_half) = socket.into_split();
        let mut reader = BufReader::new(read_half);

        write_half
            .write_all(format!("{command}\n").as_bytes())
            .await
            .unwrap();
        let mut reply = String::new();
        reader.read_line(&mut reply).await.unwrap();
        assert_eq!(reply.trim_end(), "ERR badpath", "for {command}");
    }
    assert!(!root.path().parent().unwrap().join("evil").exists());
}

#[tokio::test]
async fn partial_store_body_is_removed() {
    let (addr, root) = spawn_store("pdf").await;

    // Announce 10 bytes, send 4, then close.
    let socket = TcpStream::connect(&addr).await.unwrap();
    let (read_half, mut write_half) = socket.into_split();
    let mut reader = BufReader::new(read_half);
    write_half
        .write_all(b"STORE /x short.pdf 10\nfour")
        .await
        .unwrap();
    write_half.shutdown().await.unwrap();

    let mut reply = String::new();
    reader.read_line(&mut reply).await.unwrap();
    assert_eq!(reply.trim_end(), "ERR stream");
    assert!(!root.path().join("x/short.pdf").exists());
}
