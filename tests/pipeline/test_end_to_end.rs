use crate::common::{Call, RecordingClient, stream_for};
use sentry_log_bridge::{PipelineError, SentryOptions, Severity, SinkError};
use serde_json::json;
use tokio::io::AsyncWriteExt;

async fn run_lines(client: &std::sync::Arc<RecordingClient>, options: SentryOptions, input: &[u8]) {
    let mut stream = stream_for(client, options);
    stream.write_all(input).await.unwrap();
    stream.finish().await.unwrap();
}

#[tokio::test]
async fn test_error_record_becomes_exception() {
    let client = RecordingClient::new();
    let input = concat!(
        r#"{"level":50,"msg":"boom","err":{"type":"E","message":"bad","stack":"x"}}"#,
        "\n"
    );

    run_lines(&client, SentryOptions::default(), input.as_bytes()).await;

    let exceptions = client.exceptions();
    assert_eq!(exceptions.len(), 1);
    assert!(client.breadcrumbs().is_empty());

    let (error, context) = &exceptions[0];
    assert_eq!(error.message(), "boom: bad");
    assert_eq!(error.name(), "E");
    assert_eq!(error.stack(), Some("x"));
    assert_eq!(context.extra.get("msg"), Some(&json!("boom")));
    assert_eq!(
        context.extra.get("error"),
        Some(&json!({"type":"E","message":"bad","stack":"x"}))
    );
}

#[tokio::test]
async fn test_info_record_becomes_breadcrumb() {
    let client = RecordingClient::new();

    run_lines(
        &client,
        SentryOptions::default(),
        b"{\"level\":30,\"msg\":\"hello\",\"reqId\":\"abc\"}\n",
    )
    .await;

    assert!(client.exceptions().is_empty());
    let breadcrumbs = client.breadcrumbs();
    assert_eq!(breadcrumbs.len(), 1);
    assert_eq!(breadcrumbs[0].message.as_deref(), Some("hello"));
    assert_eq!(breadcrumbs[0].level, Severity::Info);
    assert_eq!(breadcrumbs[0].data.get("reqId"), Some(&json!("abc")));
}

#[tokio::test]
async fn test_error_without_err_uses_plain_message() {
    let client = RecordingClient::new();

    run_lines(
        &client,
        SentryOptions::default(),
        b"{\"level\":60,\"msg\":\"disk full\",\"category\":\"storage\"}\n",
    )
    .await;

    let exceptions = client.exceptions();
    assert_eq!(exceptions.len(), 1);
    assert_eq!(exceptions[0].0.name(), "Error");
    assert_eq!(exceptions[0].0.message(), "disk full");
    assert_eq!(exceptions[0].0.stack(), None);
    assert_eq!(exceptions[0].1.extra.get("category"), Some(&json!("storage")));
}

#[tokio::test]
async fn test_malformed_lines_are_skipped() {
    let client = RecordingClient::new();
    let mut stream = stream_for(&client, SentryOptions::default());

    stream
        .write_all(b"not json\n[1,2,3]\n\n{\"level\":30,\"msg\":\"ok\"}\n")
        .await
        .unwrap();
    let stats = stream.finish().await.unwrap();

    assert_eq!(client.breadcrumbs().len(), 1);
    assert_eq!(stats.lines, 4);
    assert_eq!(stats.malformed, 3);
    assert_eq!(stats.breadcrumbs, 1);
}

#[tokio::test]
async fn test_minimum_level_filters_before_sink() {
    let client = RecordingClient::new();
    let options = SentryOptions {
        level: Some("error".to_string()),
        ..SentryOptions::default()
    };
    let mut stream = stream_for(&client, options);

    stream
        .write_all(
            b"{\"level\":20,\"msg\":\"d\"}\n{\"level\":40,\"msg\":\"w\"}\n{\"level\":50,\"msg\":\"e\"}\n",
        )
        .await
        .unwrap();
    let stats = stream.finish().await.unwrap();

    assert_eq!(stats.filtered, 2);
    assert_eq!(stats.exceptions, 1);
    assert!(client.breadcrumbs().is_empty());
    assert_eq!(client.exceptions()[0].0.message(), "e");
}

#[tokio::test]
async fn test_custom_exception_levels() {
    let client = RecordingClient::new();
    let options = SentryOptions {
        sentry_exception_levels: Some(vec![Severity::Warning]),
        ..SentryOptions::default()
    };

    run_lines(
        &client,
        options,
        b"{\"level\":40,\"msg\":\"slow query\"}\n{\"level\":50,\"msg\":\"failed\"}\n",
    )
    .await;

    assert_eq!(client.exceptions().len(), 1);
    assert_eq!(client.exceptions()[0].0.message(), "slow query");
    assert_eq!(client.breadcrumbs().len(), 1);
    assert_eq!(client.breadcrumbs()[0].level, Severity::Error);
}

#[tokio::test]
async fn test_same_input_yields_same_calls() {
    let input = concat!(
        r#"{"level":30,"msg":"a"}"#,
        "\n",
        r#"{"level":50,"msg":"b","err":{"message":"c"}}"#,
        "\n",
        r#"{"level":10,"msg":"d"}"#,
        "\n",
    );

    let first = RecordingClient::new();
    run_lines(&first, SentryOptions::default(), input.as_bytes()).await;
    let second = RecordingClient::new();
    run_lines(&second, SentryOptions::default(), input.as_bytes()).await;

    assert_eq!(first.calls(), second.calls());
    assert_eq!(first.calls().len(), 3);
}

#[tokio::test]
async fn test_calls_follow_input_order() {
    let client = RecordingClient::new();
    let mut input = String::new();
    for i in 0..50 {
        input.push_str(&format!("{{\"level\":30,\"msg\":\"m{i}\"}}\n"));
    }

    run_lines(&client, SentryOptions::default(), input.as_bytes()).await;

    let messages: Vec<_> = client
        .breadcrumbs()
        .into_iter()
        .filter_map(|crumb| crumb.message)
        .collect();
    let expected: Vec<_> = (0..50).map(|i| format!("m{i}")).collect();
    assert_eq!(messages, expected);
}

#[tokio::test]
async fn test_max_value_length_truncates() {
    let client = RecordingClient::new();
    let options = SentryOptions {
        max_value_length: Some(4),
        ..SentryOptions::default()
    };

    run_lines(
        &client,
        options,
        b"{\"level\":50,\"msg\":\"overflowing\"}\n{\"level\":30,\"msg\":\"breadcrumb\"}\n",
    )
    .await;

    assert_eq!(client.exceptions()[0].0.message(), "over...");
    assert_eq!(client.breadcrumbs()[0].message.as_deref(), Some("brea..."));
}

#[tokio::test]
async fn test_sink_error_terminates_stream() {
    let client = RecordingClient::failing_at(1);
    let mut stream = stream_for(&client, SentryOptions::default());

    stream
        .write_all(
            b"{\"level\":30,\"msg\":\"one\"}\n{\"level\":30,\"msg\":\"two\"}\n{\"level\":30,\"msg\":\"three\"}\n",
        )
        .await
        .unwrap();
    let result = stream.finish().await;

    assert!(matches!(
        result,
        Err(PipelineError::Sink(SinkError::CallFailed { .. }))
    ));
    let attempted: Vec<_> = client
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::Breadcrumb(_)))
        .collect();
    assert_eq!(attempted.len(), 2);
}
