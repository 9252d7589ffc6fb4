//! End-to-end tests for the monitor engine against live unix-socket
//! event sources.
//!
//! Each test stands up real listeners inside scratch storage roots,
//! feeds fixed-size records through them, and drives the actual poll
//! loop. The loop has no cancellation input, so every scenario ends the
//! way a real broken source does: the peer closes and the loop reports
//! a framing failure after rendering what it received.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::io::{Read, Write};
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use contmon_common::config::MonitorConfig;
use contmon_common::error::MonitorError;
use contmon_events::connector;
use contmon_events::multiplex::run_monitor;
use contmon_events::record::{NAME_CAPACITY, RECORD_SIZE};

const STATE_CHANGE: i32 = 0;
const EXIT_CODE: i32 = 2;

fn raw_record(tag: i32, name: &str, value: i32) -> [u8; RECORD_SIZE] {
    let mut raw = [0_u8; RECORD_SIZE];
    raw[..4].copy_from_slice(&tag.to_ne_bytes());
    raw[4..4 + name.len()].copy_from_slice(name.as_bytes());
    raw[4 + NAME_CAPACITY..].copy_from_slice(&value.to_ne_bytes());
    raw
}

/// Accepts and discards the connector's daemon-liveness probe, then
/// returns the real monitor connection.
fn accept_monitor_client(listener: &UnixListener) -> std::os::unix::net::UnixStream {
    let (probe, _) = listener.accept().expect("accept probe");
    drop(probe);
    let (stream, _) = listener.accept().expect("accept monitor");
    stream
}

/// Binds a source socket in `root` and serves the given records to the
/// monitor connection, then closes it.
fn serve_records(root: &Path, records: Vec<[u8; RECORD_SIZE]>) -> JoinHandle<()> {
    let listener = UnixListener::bind(connector::socket_path(root)).expect("bind");
    std::thread::spawn(move || {
        let mut stream = accept_monitor_client(&listener);
        for record in records {
            stream.write_all(&record).expect("write record");
        }
    })
}

fn config_for(pattern: &str, roots: &[&Path]) -> MonitorConfig {
    MonitorConfig {
        name_pattern: pattern.to_owned(),
        storage_roots: roots.iter().map(|r| r.to_path_buf()).collect(),
    }
}

/// A sink that forwards each completed line over a channel, letting the
/// test observe output while the loop is still blocked on its sources.
struct LineSink {
    tx: mpsc::Sender<String>,
    pending: Vec<u8>,
}

impl Write for LineSink {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.pending.extend_from_slice(data);
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line[..line.len() - 1]).into_owned();
            let _ = self.tx.send(text);
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// ── Monitor mode ─────────────────────────────────────────────────────

#[test]
fn renders_state_change_then_fails_on_peer_close() {
    let root = tempfile::tempdir().expect("tempdir");
    let server = serve_records(root.path(), vec![raw_record(STATE_CHANGE, "c1", 2)]);

    let mut out = Vec::new();
    let config = config_for(".*", &[root.path()]);
    let err = run_monitor(&config, &mut out).expect_err("loop must end in error");

    assert!(matches!(err, MonitorError::Framing { .. }));
    assert_eq!(
        String::from_utf8(out).expect("utf8"),
        "'c1' changed state to [RUNNING]\n"
    );
    server.join().expect("server");
}

#[test]
fn renders_exit_status_decoded_from_wait_status() {
    let root = tempfile::tempdir().expect("tempdir");
    let server = serve_records(root.path(), vec![raw_record(EXIT_CODE, "batch", 137 << 8)]);

    let mut out = Vec::new();
    let config = config_for(".*", &[root.path()]);
    let _ = run_monitor(&config, &mut out).expect_err("loop must end in error");

    assert_eq!(
        String::from_utf8(out).expect("utf8"),
        "'batch' exited with status [137]\n"
    );
    server.join().expect("server");
}

#[test]
fn non_matching_subject_produces_no_output() {
    let root = tempfile::tempdir().expect("tempdir");
    let server = serve_records(root.path(), vec![raw_record(STATE_CHANGE, "web2", 2)]);

    let mut out = Vec::new();
    let config = config_for("^web$", &[root.path()]);
    let err = run_monitor(&config, &mut out).expect_err("loop must end in error");

    assert!(matches!(err, MonitorError::Framing { .. }));
    assert!(out.is_empty());
    server.join().expect("server");
}

#[test]
fn mixed_event_stream_renders_in_arrival_order() {
    let root = tempfile::tempdir().expect("tempdir");
    let server = serve_records(
        root.path(),
        vec![
            raw_record(STATE_CHANGE, "c1", 1),
            raw_record(1, "c1", 5),
            raw_record(STATE_CHANGE, "c1", 2),
            raw_record(EXIT_CODE, "c1", 0),
        ],
    );

    let mut out = Vec::new();
    let config = config_for(".*", &[root.path()]);
    let _ = run_monitor(&config, &mut out).expect_err("loop must end in error");

    // The priority record (tag 1) is unrecognized and renders nothing.
    assert_eq!(
        String::from_utf8(out).expect("utf8"),
        "'c1' changed state to [STARTING]\n\
         'c1' changed state to [RUNNING]\n\
         'c1' exited with status [0]\n"
    );
    server.join().expect("server");
}

#[test]
fn multiplexes_records_from_several_sources() {
    let roots: Vec<_> = (0..2)
        .map(|_| tempfile::tempdir().expect("tempdir"))
        .collect();

    // Servers hold their connection open until told to close, so both
    // records are observed before any source reports end-of-stream.
    let mut holds = Vec::new();
    let servers: Vec<_> = roots
        .iter()
        .enumerate()
        .map(|(i, root)| {
            let listener =
                UnixListener::bind(connector::socket_path(root.path())).expect("bind");
            let (hold_tx, hold_rx) = mpsc::channel::<()>();
            holds.push(hold_tx);
            std::thread::spawn(move || {
                let mut stream = accept_monitor_client(&listener);
                stream
                    .write_all(&raw_record(STATE_CHANGE, &format!("c{i}"), 2))
                    .expect("write record");
                let _ = hold_rx.recv();
            })
        })
        .collect();

    let (line_tx, line_rx) = mpsc::channel();
    let paths: Vec<PathBuf> = roots.iter().map(|r| r.path().to_path_buf()).collect();
    let monitor = std::thread::spawn(move || {
        let config = MonitorConfig {
            name_pattern: ".*".to_owned(),
            storage_roots: paths,
        };
        run_monitor(
            &config,
            LineSink {
                tx: line_tx,
                pending: Vec::new(),
            },
        )
    });

    let mut lines = Vec::new();
    for _ in 0..2 {
        lines.push(
            line_rx
                .recv_timeout(Duration::from_secs(10))
                .expect("rendered line"),
        );
    }
    lines.sort();
    assert_eq!(
        lines,
        vec![
            "'c0' changed state to [RUNNING]".to_owned(),
            "'c1' changed state to [RUNNING]".to_owned(),
        ]
    );

    // Release the servers; the first closed stream ends the loop.
    drop(holds);
    let err = monitor.join().expect("monitor").expect_err("loop must fail");
    assert!(matches!(err, MonitorError::Framing { .. }));
    for server in servers {
        server.join().expect("server");
    }
}

#[test]
fn bad_pattern_aborts_before_any_connect() {
    let root = tempfile::tempdir().expect("tempdir");
    // No listener: a connect attempt would fail with Connect, not Pattern.
    let config = config_for("(", &[root.path()]);
    let err = run_monitor(&config, &mut Vec::new()).expect_err("must fail");
    assert!(matches!(err, MonitorError::Pattern { .. }));
}

#[test]
fn failed_setup_closes_already_open_handles() {
    let live = tempfile::tempdir().expect("tempdir");
    let dead = tempfile::tempdir().expect("tempdir");

    let listener = UnixListener::bind(connector::socket_path(live.path())).expect("bind");
    let observer: JoinHandle<usize> = std::thread::spawn(move || {
        let mut stream = accept_monitor_client(&listener);
        let mut buf = [0_u8; 1];
        // EOF here proves the monitor dropped its half after setup failed.
        stream.read(&mut buf).expect("read")
    });

    let config = config_for(".*", &[live.path(), dead.path()]);
    let err = run_monitor(&config, &mut Vec::new()).expect_err("must fail");
    match err {
        MonitorError::Connect { path, .. } => assert_eq!(path, dead.path()),
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(observer.join().expect("observer"), 0);
}

// ── Quit broadcast ───────────────────────────────────────────────────

#[test]
fn quit_broadcast_signals_all_roots() {
    let roots: Vec<_> = (0..3)
        .map(|_| tempfile::tempdir().expect("tempdir"))
        .collect();
    let receivers: Vec<JoinHandle<Vec<u8>>> = roots
        .iter()
        .map(|root| {
            let listener =
                UnixListener::bind(connector::socket_path(root.path())).expect("bind");
            std::thread::spawn(move || {
                // Quit mode connects directly; there is no daemon probe.
                let (mut stream, _) = listener.accept().expect("accept");
                let mut payload = Vec::new();
                let _ = stream.read_to_end(&mut payload).expect("read");
                payload
            })
        })
        .collect();

    let paths: Vec<PathBuf> = roots.iter().map(|r| r.path().to_path_buf()).collect();
    contmon_events::quit::broadcast_quit(&paths).expect("broadcast");

    for receiver in receivers {
        assert_eq!(receiver.join().expect("join"), b"quit");
    }
}
