mod common;
use crate::common::{
    init_tracing, with_timeout, ConfigFileBuilder, GroupBuilder, RecordingEmitter, SignalBuilder,
    TestResult,
};

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use signalwatch::config::ProviderKind;
use signalwatch::engine::SignalEngine;
use signalwatch::provider::{socket, ProviderContext, ProviderStatus};
use signalwatch::Value;

fn motion_group() -> signalwatch::config::SignalGroup {
    GroupBuilder::new("presence", "wake")
        .signal(SignalBuilder::new("motion").reset(true).build())
        .build()
}

#[tokio::test]
async fn process_provider_lines_reach_emitter() -> TestResult {
    init_tracing();
    let cfg = ConfigFileBuilder::new()
        .with_group(motion_group())
        .with_process("sensor", "echo motion=1; echo '# comment'; echo motion=2")
        .build();

    let emitter = RecordingEmitter::new();
    let mut running = SignalEngine::new(cfg).bind(emitter.clone()).run();

    let emissions = with_timeout(emitter.wait_for(2)).await;
    assert_eq!(emissions[0].values.get("motion"), Some(&Value::Int(1)));
    assert_eq!(emissions[1].values.get("motion"), Some(&Value::Int(2)));

    // The command exits cleanly and is not restarted.
    let mut statuses = Vec::new();
    while let Some(event) = with_timeout(running.next_status()).await {
        assert_eq!(event.provider, "sensor");
        statuses.push(event.status);
    }
    assert_eq!(statuses, vec![ProviderStatus::Started, ProviderStatus::Stopped]);

    running.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn failing_process_is_reported_on_status_channel() -> TestResult {
    init_tracing();
    let cfg = ConfigFileBuilder::new()
        .with_group(motion_group())
        .with_process("broken", "exit 3")
        .build();

    let mut running = SignalEngine::new(cfg)
        .bind(RecordingEmitter::new())
        .run();

    let mut statuses = Vec::new();
    while let Some(event) = with_timeout(running.next_status()).await {
        statuses.push(event.status);
    }

    assert_eq!(statuses.len(), 3);
    assert_eq!(statuses[0], ProviderStatus::Started);
    assert!(matches!(statuses[1], ProviderStatus::Failed(ref msg) if msg.contains("exit")));
    assert_eq!(statuses[2], ProviderStatus::Stopped);

    running.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn restarting_process_stops_on_shutdown() -> TestResult {
    init_tracing();
    let cfg = ConfigFileBuilder::new()
        .with_group(motion_group())
        .with_provider(
            "looping",
            ProviderKind::Process {
                command: "echo motion=1".into(),
                restart_delay: Some(Duration::from_millis(20)),
            },
        )
        .build();

    let emitter = RecordingEmitter::new();
    let running = SignalEngine::new(cfg).bind(emitter.clone()).run();

    // One-shot signal: every restart produces a fresh emission.
    with_timeout(emitter.wait_for(3)).await;

    with_timeout(running.shutdown()).await?;
    Ok(())
}

#[tokio::test]
async fn socket_lines_reach_emitter() -> TestResult {
    init_tracing();
    let cfg = ConfigFileBuilder::new()
        .with_group(
            GroupBuilder::new("halt", "stop")
                .signal(SignalBuilder::new("button").required("stop").build())
                .build(),
        )
        .build();

    let emitter = RecordingEmitter::new();
    let engine = SignalEngine::new(cfg).bind(emitter.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let token = CancellationToken::new();
    let (status_tx, _status_rx) = mpsc::unbounded_channel();
    let ctx = ProviderContext::new("remote".into(), engine.handle(), token.clone(), status_tx);

    let server = tokio::spawn(async move { socket::serve(listener, &ctx).await });

    let mut stream = TcpStream::connect(addr).await?;
    stream
        .write_all(b"button=play\nnot a pair\n{\"button\": \"stop\"}\n")
        .await?;
    stream.flush().await?;

    let emissions = with_timeout(emitter.wait_for(1)).await;
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].action, "stop");

    token.cancel();
    with_timeout(server).await??;

    // Open connections are closed before `serve` returns.
    let mut buf = [0u8; 16];
    let read = with_timeout(stream.read(&mut buf)).await?;
    assert_eq!(read, 0);
    Ok(())
}

#[tokio::test]
async fn file_provider_reads_initial_contents_and_changes() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("env");
    std::fs::write(&path, "temp=21.5\nwifi=home\n")?;

    let cfg = ConfigFileBuilder::new()
        .with_group(
            GroupBuilder::new("climate", "report")
                .signal(SignalBuilder::new("temp").threshold(1.0).build())
                .build(),
        )
        .with_file("env-file", &path)
        .build();

    let emitter = RecordingEmitter::new();
    let running = SignalEngine::new(cfg).bind(emitter.clone()).run();

    let first = with_timeout(emitter.wait_for(1)).await;
    assert_eq!(first[0].values.get("temp"), Some(&Value::Float(21.5)));

    // Replace atomically so the watcher never sees a half-written file.
    let staged = dir.path().join("env.tmp");
    std::fs::write(&staged, "temp=30.0\nwifi=home\n")?;
    std::fs::rename(&staged, &path)?;

    let all = with_timeout(emitter.wait_for(2)).await;
    assert_eq!(all[1].values.get("temp"), Some(&Value::Float(30.0)));

    running.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn url_provider_polls_json_endpoint() -> TestResult {
    init_tracing();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(async move {
        let body = r#"{"location": {"latitude": 50.08, "longitude": 14.42}}"#;
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let mut buf = vec![0u8; 4096];
            let mut read = 0;
            // Read the request head before answering.
            while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf[read..]).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => read += n,
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    let cfg = ConfigFileBuilder::new()
        .with_group(
            GroupBuilder::new("context", "report")
                .signal(SignalBuilder::new("location").threshold(0.001).build())
                .build(),
        )
        .with_provider(
            "geo",
            ProviderKind::Url {
                url: format!("http://{addr}/location"),
                interval: Duration::from_millis(50),
                request_timeout: Duration::from_secs(2),
            },
        )
        .build();

    let emitter = RecordingEmitter::new();
    let running = SignalEngine::new(cfg).bind(emitter.clone()).run();

    let emissions = with_timeout(emitter.wait_for(1)).await;
    assert_eq!(
        emissions[0].values.get("location"),
        Some(&Value::Location {
            latitude: 50.08,
            longitude: 14.42
        })
    );

    // Unchanged readings do not emit again.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(emitter.emissions().len(), 1);

    running.shutdown().await?;
    server.abort();
    Ok(())
}
