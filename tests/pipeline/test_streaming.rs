use crate::common::{RecordingClient, options_for};
use sentry_log_bridge::app::forward;
use sentry_log_bridge::sink::EnvDefaults;
use sentry_log_bridge::PipelineBuilder;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[tokio::test]
async fn test_records_split_across_chunks() {
    let client = RecordingClient::new();
    let stream = PipelineBuilder::new(options_for(&client))
        .env_defaults(EnvDefaults::default())
        .build()
        .unwrap();

    let reader = tokio_test::io::Builder::new()
        .read(b"{\"level\":50,\"ms")
        .read(b"g\":\"split\"}\r\n{\"level\"")
        .read(b":30,\"msg\":\"second\"}\n")
        .build();

    let stats = forward(reader, stream, std::future::pending()).await.unwrap();

    assert_eq!(stats.lines, 2);
    assert_eq!(client.exceptions()[0].0.message(), "split");
    assert_eq!(client.breadcrumbs()[0].message.as_deref(), Some("second"));
}

#[tokio::test]
async fn test_trailing_partial_line_is_discarded() {
    let client = RecordingClient::new();
    let stream = PipelineBuilder::new(options_for(&client))
        .env_defaults(EnvDefaults::default())
        .build()
        .unwrap();

    let reader = tokio_test::io::Builder::new()
        .read(b"{\"level\":30,\"msg\":\"kept\"}\n{\"level\":50,\"msg\":\"lost\"}")
        .build();

    let stats = forward(reader, stream, std::future::pending()).await.unwrap();

    assert_eq!(client.breadcrumbs().len(), 1);
    assert!(client.exceptions().is_empty());
    assert_eq!(stats.discarded_bytes, "{\"level\":50,\"msg\":\"lost\"}".len() as u64);
}

#[tokio::test]
async fn test_passthrough_receives_identical_bytes() {
    let client = RecordingClient::new();
    let (tee, mut tee_reader) = tokio::io::duplex(1024 * 1024);
    let mut stream = PipelineBuilder::new(options_for(&client))
        .env_defaults(EnvDefaults::default())
        .passthrough(tee)
        .build()
        .unwrap();

    let input = b"{\"level\":30,\"msg\":\"a\"}\nnot json\n\xff\xfe\n{\"level\":50}\npartial";
    stream.write_all(input).await.unwrap();
    stream.finish().await.unwrap();

    let mut echoed = Vec::new();
    tee_reader.read_to_end(&mut echoed).await.unwrap();
    assert_eq!(echoed, input.to_vec());
}

#[tokio::test]
async fn test_closed_passthrough_does_not_stop_dispatch() {
    let client = RecordingClient::new();
    let (tee, tee_reader) = tokio::io::duplex(64);
    drop(tee_reader);
    let mut stream = PipelineBuilder::new(options_for(&client))
        .env_defaults(EnvDefaults::default())
        .passthrough(tee)
        .build()
        .unwrap();

    stream
        .write_all(b"{\"level\":50,\"msg\":\"disk full\"}\n")
        .await
        .unwrap();
    stream
        .write_all(b"{\"level\":30,\"msg\":\"still here\"}\n")
        .await
        .unwrap();
    let stats = stream.finish().await.unwrap();

    assert_eq!(stats.exceptions, 1);
    assert_eq!(stats.breadcrumbs, 1);
    assert_eq!(client.exceptions()[0].0.message(), "disk full");
    assert_eq!(client.breadcrumbs()[0].message.as_deref(), Some("still here"));
}

#[tokio::test]
async fn test_small_buffer_loses_nothing() {
    let client = RecordingClient::new();
    let stream = PipelineBuilder::new(options_for(&client))
        .env_defaults(EnvDefaults::default())
        .buffer_capacity(8)
        .build()
        .unwrap();

    let mut input = Vec::new();
    for i in 0..500 {
        input.extend_from_slice(format!("{{\"level\":30,\"msg\":\"{i}\"}}\n").as_bytes());
    }

    let stats = forward(input.as_slice(), stream, std::future::pending())
        .await
        .unwrap();

    assert_eq!(stats.breadcrumbs, 500);
    assert_eq!(client.breadcrumbs().len(), 500);
}

#[tokio::test]
async fn test_writes_fail_after_sink_error() {
    let client = RecordingClient::failing_at(0);
    let mut stream = PipelineBuilder::new(options_for(&client))
        .env_defaults(EnvDefaults::default())
        .build()
        .unwrap();

    let line = b"{\"level\":30,\"msg\":\"x\"}\n";
    let outcome = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match stream.write_all(line).await {
                Ok(()) => tokio::task::yield_now().await,
                Err(e) => return e.kind(),
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(outcome, ErrorKind::BrokenPipe);
    assert!(stream.finish().await.is_err());
}

#[tokio::test]
async fn test_shutdown_stops_forwarding_open_input() {
    let client = RecordingClient::new();
    let stream = PipelineBuilder::new(options_for(&client))
        .env_defaults(EnvDefaults::default())
        .build()
        .unwrap();

    let (mut input, reader) = tokio::io::duplex(1024);
    input.write_all(b"{\"level\":30,\"msg\":\"before\"}\n").await.unwrap();

    let stats = forward(
        reader,
        stream,
        tokio::time::sleep(Duration::from_millis(100)),
    )
    .await
    .unwrap();

    assert_eq!(stats.breadcrumbs, 1);
    drop(input);
}
