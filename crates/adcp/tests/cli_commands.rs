#![cfg(feature = "cli")]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Command, Output};
use std::thread::JoinHandle;
use std::time::Duration;

use adcp_frame::{encode_frame, FrameType};
use bytes::BytesMut;

fn adcp_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_adcp"))
}

fn send_frame(stream: &mut TcpStream, frame_type: FrameType, payload: &[u8]) {
    let mut buf = BytesMut::new();
    encode_frame(frame_type, payload, &mut buf).expect("frame should encode");
    stream.write_all(&buf).expect("mock write should succeed");
}

fn read_exact(stream: &mut TcpStream, len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    stream.read_exact(&mut bytes).expect("mock read should succeed");
    bytes
}

/// Accept one connection, answer the handshake and the initial state
/// query, then run the per-test script.
fn spawn_mock(script: impl FnOnce(&mut TcpStream) + Send + 'static) -> (u16, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("mock should bind");
    let port = listener.local_addr().expect("mock should have an addr").port();

    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("mock should accept");
        stream
            .set_read_timeout(Some(Duration::from_secs(10)))
            .expect("mock read timeout should apply");

        let hello = read_exact(&mut stream, 3);
        assert_eq!(&hello[..2], &[0x10, 0x00], "handshake magic");
        stream
            .write_all(&[0x00, 0x01, 0x00, 0x00])
            .expect("mock ack should send");

        // Initial `adc update state` issued by the run subcommand.
        let query = read_exact(&mut stream, 2);
        assert_eq!(query, vec![0x40, 0x07]);
        let mut payload = vec![0x00];
        payload.extend(vec![0u8; 29]);
        send_frame(&mut stream, FrameType::Response, &payload);

        script(&mut stream);
    });

    (port, handle)
}

fn run_against_mock(port: u16, args: &[&str]) -> Output {
    adcp_bin()
        .args(["--host", "127.0.0.1", "--port", &port.to_string(), "--timeout", "5s"])
        .args(args)
        .output()
        .expect("adcp binary should run")
}

#[test]
fn commands_subcommand_lists_registry_as_json() {
    let output = adcp_bin()
        .args(["commands", "--format", "json"])
        .output()
        .expect("adcp binary should run");

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let names: Vec<&str> = value["commands"]
        .as_array()
        .expect("commands array")
        .iter()
        .map(|entry| entry["name"].as_str().expect("name"))
        .collect();

    assert!(names.contains(&"adc update state"));
    assert!(names.contains(&"measurement oneshot"));
    assert!(!names.contains(&"connection set type"));
}

#[test]
fn run_subcommand_executes_and_reports_ok() {
    let (port, mock) = spawn_mock(|stream| {
        let command = read_exact(stream, 3);
        assert_eq!(command, vec![0x40, 0x03, 0x03]);
        send_frame(stream, FrameType::Response, &[0x00]);
    });

    let output = run_against_mock(
        port,
        &["--format", "json", "run", "adc", "pga", "set", "gain", "3"],
    );

    assert_eq!(output.status.code(), Some(0), "{output:?}");
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value["command"], "adc pga set gain");
    assert_eq!(value["ok"], true);

    mock.join().expect("mock should finish");
}

#[test]
fn device_reported_error_maps_to_exit_code() {
    let (port, mock) = spawn_mock(|stream| {
        let command = read_exact(stream, 3);
        assert_eq!(command, vec![0x40, 0x03, 0x00]);
        send_frame(stream, FrameType::Response, &[0x0C]);
    });

    let output = run_against_mock(
        port,
        &["--format", "json", "run", "adc", "pga", "set", "gain", "0"],
    );

    assert_eq!(output.status.code(), Some(65), "{output:?}");
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value["status"], "RESPONSE_WRONG_ARGUMENT");
    assert_eq!(value["ok"], false);

    mock.join().expect("mock should finish");
}

#[test]
fn out_of_range_argument_never_reaches_the_wire() {
    let (port, mock) = spawn_mock(|stream| {
        // The rejected command must not produce any bytes; the next thing
        // the mock sees is the client hanging up.
        let mut buf = [0u8; 8];
        let read = stream.read(&mut buf).unwrap_or(0);
        assert_eq!(read, 0, "unexpected bytes after rejected command");
    });

    let output = run_against_mock(port, &["run", "adc", "pga", "set", "gain", "9"]);

    assert_eq!(output.status.code(), Some(64), "{output:?}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("out of range"), "{stderr}");

    mock.join().expect("mock should finish");
}

#[test]
fn state_subcommand_renders_snapshot() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("mock should bind");
    let port = listener.local_addr().expect("addr").port();

    let mock = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let hello = read_exact(&mut stream, 3);
        assert_eq!(&hello[..2], &[0x10, 0x00]);
        stream.write_all(&[0x00, 0x01, 0x00, 0x00]).expect("ack");

        let query = read_exact(&mut stream, 2);
        assert_eq!(query, vec![0x40, 0x07]);
        let mut payload = vec![0x00];
        let mut state = vec![0u8; 29];
        state[0] = 0x05; // Running, internal reference
        state[1] = 0x32; // 10 SPS, sinc4
        payload.extend(state);
        send_frame(&mut stream, FrameType::Response, &payload);
    });

    let output = run_against_mock(port, &["--format", "json", "state"]);

    assert_eq!(output.status.code(), Some(0), "{output:?}");
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value["started"], "Running");
    assert_eq!(value["internal_reference"], true);
    assert_eq!(value["samplerate_sps"], 10.0);
    assert_eq!(value["filter"], "sinc4");

    mock.join().expect("mock should finish");
}
