use ctelnet::ClientError;
use ctelnet::byte_log::ByteLogger;
use ctelnet::connector::Connector;
use ctelnet::signals::SignalFlag;
use ctelnet::{ClientConfig, LoopStrategy, Session, SessionEnd};

use std::fs;
use std::io::{Read, Write};
use std::net::{Ipv4Addr, TcpListener, TcpStream};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const STRATEGIES: [LoopStrategy; 2] = [LoopStrategy::DualDescriptor, LoopStrategy::SocketPolling];

fn config(strategy: LoopStrategy) -> ClientConfig {
    ClientConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        send_crlf_at_newline: false,
        send_cr_after_lf: false,
        show_lf_after_newline: false,
        slow_pause: None,
        log_path: None,
        loop_strategy: strategy,
    }
}

/// Start a one-shot host on loopback; `script` runs against the accepted
/// connection and returns whatever the host wants to report back
fn serve<F>(script: F) -> (Connector, JoinHandle<Vec<u8>>)
where
    F: FnOnce(&mut TcpStream) -> Vec<u8> + Send + 'static,
{
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
        script(&mut stream)
    });

    let connector = Connector::connect(Ipv4Addr::LOCALHOST, port).unwrap();
    (connector, handle)
}

fn read_n(stream: &mut TcpStream, n: usize) -> Vec<u8> {
    let mut buf = vec![0u8; n];
    stream.read_exact(&mut buf).unwrap();
    buf
}

fn log_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_plain_byte_reaches_screen_and_log() {
    for strategy in STRATEGIES {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("ctelnet_log_1.txt");

        let (connector, host) = serve(|stream| {
            stream.write_all(b"A").unwrap();
            Vec::new()
        });
        let (local, _typist) = UnixStream::pair().unwrap();

        let mut session = Session::new(&config(strategy), connector, local, Vec::new())
            .with_logger(ByteLogger::create(&log_path).unwrap());

        assert_eq!(session.run().unwrap(), SessionEnd::RemoteClosed);
        assert_eq!(session.output().as_slice(), b"A");
        assert_eq!(session.stats().bytes_in, 1);
        assert_eq!(session.stats().bytes_out, 0);
        host.join().unwrap();

        let lines = log_lines(&log_path);
        assert!(lines.contains(&"I 00000000 41 A".to_string()), "{strategy:?}: {lines:?}");
        assert_eq!(
            lines.last().map(String::as_str),
            Some("INFO: Connection closed by the remote end")
        );
    }
}

#[test]
fn test_window_size_request_is_answered() {
    for strategy in STRATEGIES {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("ctelnet_log_2.txt");

        let (connector, host) = serve(|stream| {
            stream.write_all(&[0xFF, 0xFD, 0x1F]).unwrap();
            read_n(stream, 12)
        });
        let (local, _typist) = UnixStream::pair().unwrap();

        let mut session = Session::new(&config(strategy), connector, local, Vec::new())
            .with_logger(ByteLogger::create(&log_path).unwrap());

        assert_eq!(session.run().unwrap(), SessionEnd::RemoteClosed);
        assert_eq!(
            host.join().unwrap(),
            vec![0xFF, 0xFB, 0x1F, 0xFF, 0xFA, 0x1F, 0x00, 0x50, 0x00, 0x18, 0xFF, 0xF0]
        );
        // Negotiation never reaches the screen
        assert!(session.output().is_empty());
        assert_eq!(session.stats().bytes_in, 3);
        assert_eq!(session.stats().bytes_out, 12);

        // Every byte on the wire is recorded: the three received plus both
        // reply writes (3 byte WILL NAWS and the 9 byte size report)
        let lines = log_lines(&log_path);
        let records: Vec<&String> = lines
            .iter()
            .filter(|line| line.starts_with("I ") || line.starts_with("O "))
            .collect();
        let inbound = records.iter().filter(|line| line.starts_with("I ")).count();
        let outbound_will = 3;
        let outbound_report = 9;
        assert_eq!(inbound, 3);
        assert_eq!(records.len() - inbound, outbound_will + outbound_report);
        assert_eq!(records[0], "I 00000000 ff 8/DEL");
        assert_eq!(records[2], "I 00000002 1f US");
        assert_eq!(records[3], "O 00000000 ff 8/DEL");
        assert_eq!(records[14], "O 00000011 f0 8/p");
    }
}

#[test]
fn test_other_requests_are_declined_or_acknowledged() {
    for strategy in STRATEGIES {
        let (connector, host) = serve(|stream| {
            // DO ECHO, then WILL SUPPRESS-GO-AHEAD
            stream.write_all(&[0xFF, 0xFD, 0x01, 0xFF, 0xFB, 0x03]).unwrap();
            read_n(stream, 6)
        });
        let (local, _typist) = UnixStream::pair().unwrap();

        let mut session = Session::new(&config(strategy), connector, local, Vec::new());

        assert_eq!(session.run().unwrap(), SessionEnd::RemoteClosed);
        assert_eq!(host.join().unwrap(), vec![0xFF, 0xFC, 0x01, 0xFF, 0xFD, 0x03]);
        assert!(session.output().is_empty());
    }
}

#[test]
fn test_text_around_negotiation_keeps_its_order() {
    for strategy in STRATEGIES {
        let (connector, host) = serve(|stream| {
            stream.write_all(b"ab").unwrap();
            stream.write_all(&[0xFF, 0xFE, 0x01]).unwrap();
            stream.write_all(b"cd").unwrap();
            read_n(stream, 3)
        });
        let (local, _typist) = UnixStream::pair().unwrap();

        let mut session = Session::new(&config(strategy), connector, local, Vec::new());

        assert_eq!(session.run().unwrap(), SessionEnd::RemoteClosed);
        assert_eq!(session.output().as_slice(), b"abcd");
        // DONT is echoed unchanged
        assert_eq!(host.join().unwrap(), vec![0xFF, 0xFE, 0x01]);
    }
}

#[test]
fn test_host_closing_immediately_ends_cleanly() {
    for strategy in STRATEGIES {
        let (connector, host) = serve(|_stream| Vec::new());
        let (local, _typist) = UnixStream::pair().unwrap();

        let mut session = Session::new(&config(strategy), connector, local, Vec::new());

        assert_eq!(session.run().unwrap(), SessionEnd::RemoteClosed);
        assert!(session.output().is_empty());
        host.join().unwrap();
    }
}

#[test]
fn test_host_closing_inside_a_command_ends_cleanly() {
    for strategy in STRATEGIES {
        let (connector, host) = serve(|stream| {
            stream.write_all(&[0xFF, 0xFD]).unwrap();
            Vec::new()
        });
        let (local, _typist) = UnixStream::pair().unwrap();

        let mut session = Session::new(&config(strategy), connector, local, Vec::new());

        assert_eq!(session.run().unwrap(), SessionEnd::RemoteClosed);
        assert_eq!(session.stats().bytes_out, 0);
        host.join().unwrap();
    }
}

#[test]
fn test_local_eof_ends_session() {
    for strategy in STRATEGIES {
        let (connector, host) = serve(|stream| {
            let mut rest = Vec::new();
            stream.read_to_end(&mut rest).unwrap();
            rest
        });
        let (local, typist) = UnixStream::pair().unwrap();
        drop(typist);

        let mut session = Session::new(&config(strategy), connector, local, Vec::new());

        assert_eq!(session.run().unwrap(), SessionEnd::LocalEof);
        session.close();
        assert!(host.join().unwrap().is_empty());
    }
}

#[test]
fn test_typed_bytes_are_sent_verbatim() {
    for strategy in STRATEGIES {
        let (connector, host) = serve(|stream| read_n(stream, 3));
        let (local, mut typist) = UnixStream::pair().unwrap();
        typist.write_all(b"hi\r").unwrap();

        let mut session = Session::new(&config(strategy), connector, local, Vec::new());

        assert_eq!(session.run().unwrap(), SessionEnd::RemoteClosed);
        assert_eq!(host.join().unwrap(), b"hi\r");
        assert_eq!(session.stats().bytes_out, 3);
    }
}

#[test]
fn test_crlf_appends_line_feed() {
    for strategy in STRATEGIES {
        let mut config = config(strategy);
        config.send_crlf_at_newline = true;

        let (connector, host) = serve(|stream| read_n(stream, 4));
        let (local, mut typist) = UnixStream::pair().unwrap();
        typist.write_all(b"hi\r").unwrap();

        let mut session = Session::new(&config, connector, local, Vec::new());

        assert_eq!(session.run().unwrap(), SessionEnd::RemoteClosed);
        assert_eq!(host.join().unwrap(), b"hi\r\n");
        assert_eq!(session.stats().bytes_out, 4);
    }
}

#[test]
fn test_lfafternl_echoes_carriage_return() {
    for strategy in STRATEGIES {
        let mut config = config(strategy);
        config.show_lf_after_newline = true;

        let (connector, host) = serve(|stream| read_n(stream, 1));
        let (local, mut typist) = UnixStream::pair().unwrap();
        typist.write_all(b"\n").unwrap();

        let mut session = Session::new(&config, connector, local, Vec::new());

        assert_eq!(session.run().unwrap(), SessionEnd::RemoteClosed);
        assert_eq!(host.join().unwrap(), b"\n");
        assert_eq!(session.output().as_slice(), b"\r");
    }
}

#[test]
fn test_raised_signal_ends_session() {
    for strategy in STRATEGIES {
        let (connector, host) = serve(|stream| {
            let mut rest = Vec::new();
            stream.read_to_end(&mut rest).unwrap();
            rest
        });
        let (local, _typist) = UnixStream::pair().unwrap();

        let signals = SignalFlag::detached();
        signals.raise(15);

        let mut session =
            Session::new(&config(strategy), connector, local, Vec::new()).with_signals(signals);

        let end = session.run().unwrap();
        assert_eq!(end, SessionEnd::Signalled(15));
        assert_eq!(end.exit_code(), 143);
        session.close();
        host.join().unwrap();
    }
}

#[test]
fn test_screen_sharing_keyboard_description_gets_every_byte() {
    // On a terminal stdin and stdout are one open file description, so a
    // flag set on the keyboard side shows up on the screen side as well.
    const TOTAL: usize = 512 * 1024;

    for strategy in STRATEGIES {
        let (connector, host) = serve(|stream| {
            stream.write_all(&vec![b'x'; TOTAL]).unwrap();
            Vec::new()
        });
        let (terminal, mut viewer) = UnixStream::pair().unwrap();
        let screen = terminal.try_clone().unwrap();

        // Drain slowly so the screen side fills up first
        let drain = thread::spawn(move || {
            thread::sleep(Duration::from_millis(300));
            let mut seen = 0;
            let mut buf = [0u8; 4096];
            while seen < TOTAL {
                match viewer.read(&mut buf).unwrap() {
                    0 => break,
                    n => seen += n,
                }
            }
            // Handed back so the keyboard side never sees a hangup
            (seen, viewer)
        });

        let mut session = Session::new(&config(strategy), connector, terminal, screen);

        assert_eq!(session.run().unwrap(), SessionEnd::RemoteClosed, "{strategy:?}");
        assert_eq!(session.stats().bytes_in, TOTAL as u64);
        host.join().unwrap();
        let (seen, _viewer) = drain.join().unwrap();
        assert_eq!(seen, TOTAL);
    }
}

#[test]
fn test_connection_reset_is_fatal_and_logged() {
    for strategy in STRATEGIES {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("ctelnet_log_3.txt");

        let (connector, host) = serve(|stream| {
            // Closing with unread data makes the kernel reset the connection
            let mut first = [0u8; 1];
            stream.peek(&mut first).unwrap();
            Vec::new()
        });
        let (local, mut typist) = UnixStream::pair().unwrap();
        typist.write_all(b"x").unwrap();

        let mut session = Session::new(&config(strategy), connector, local, Vec::new())
            .with_logger(ByteLogger::create(&log_path).unwrap());

        let err = session.run().unwrap_err();
        assert!(
            matches!(err, ClientError::Receive(_) | ClientError::Send(_)),
            "{strategy:?}: {err:?}"
        );
        assert_eq!(err.exit_code(), 1);
        host.join().unwrap();

        let lines = log_lines(&log_path);
        assert!(lines.contains(&"O 00000000 78 x".to_string()));
        let last = lines.last().unwrap();
        assert!(last.starts_with("ERROR: "), "{last}");
        assert_eq!(last, &format!("ERROR: {}", err));
    }
}

#[test]
fn test_slow_mode_pauses_only_after_newline() {
    let pause = Duration::from_millis(500);

    for strategy in STRATEGIES {
        for (typed, should_pause) in [(&b"\nls"[..], true), (&b"a\n"[..], false)] {
            let mut config = config(strategy);
            config.slow_pause = Some(pause);

            let expected = typed.len();
            let (connector, host) = serve(move |stream| read_n(stream, expected));
            let (local, mut typist) = UnixStream::pair().unwrap();
            typist.write_all(typed).unwrap();

            let mut session = Session::new(&config, connector, local, Vec::new());

            let started = Instant::now();
            assert_eq!(session.run().unwrap(), SessionEnd::RemoteClosed);
            let elapsed = started.elapsed();
            assert_eq!(host.join().unwrap(), typed);

            if should_pause {
                assert!(elapsed >= pause, "{strategy:?} {typed:?}: {elapsed:?}");
            } else {
                assert!(elapsed < pause, "{strategy:?} {typed:?}: {elapsed:?}");
            }
        }
    }
}
