//! Launcher failure paths that must stop before any namespace is created.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::io::{Read, Write};
use std::net::TcpListener;

use burrow_common::config::BurrowConfig;
use burrow_common::error::BurrowError;
use burrow_common::types::{InstanceId, ProcessSpec};

fn workload() -> ProcessSpec {
    ProcessSpec {
        program: "/bin/true".into(),
        args: vec![],
    }
}

fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/alpine-minirootfs.tar.gz")
}

fn answer_once_with(status: &'static str) -> (String, std::thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    let handle = std::thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else {
            return;
        };
        let mut buf = [0u8; 4096];
        let _ = stream.read(&mut buf);
        let _ = write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        );
    });
    (format!("http://{addr}/alpine-minirootfs.tar.gz"), handle)
}

#[test]
fn unreachable_archive_aborts_before_spawning() {
    let scratch = tempfile::tempdir().expect("failed to create tempdir");
    let config = BurrowConfig {
        source_url: closed_port_url(),
        scratch_root: scratch.path().to_path_buf(),
    };
    let id = InstanceId::generate().expect("generate failed");

    let err = burrow_runtime::launcher::launch(&config, &id, &workload())
        .expect_err("launch must fail");
    assert!(matches!(err, BurrowError::Download { .. }), "got {err}");
}

#[test]
fn server_error_aborts_before_spawning() {
    let (url, server) = answer_once_with("503 Service Unavailable");
    let scratch = tempfile::tempdir().expect("failed to create tempdir");
    let config = BurrowConfig {
        source_url: url,
        scratch_root: scratch.path().to_path_buf(),
    };
    let id = InstanceId::generate().expect("generate failed");

    let err = burrow_runtime::launcher::launch(&config, &id, &workload())
        .expect_err("launch must fail");
    server.join().expect("server thread panicked");

    match err {
        BurrowError::Download { message, .. } => assert!(message.contains("503")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!config.rootfs_dir(&id).join("alpine-minirootfs.tar.gz").exists());
}
