use crate::common::RecordingClient;
use sentry_log_bridge::app::{App, forward};
use sentry_log_bridge::sink::EnvDefaults;
use sentry_log_bridge::{PipelineBuilder, ReportingClient, SentryOptions};
use serial_test::serial;
use std::sync::Arc;

#[test]
#[serial]
fn test_app_from_args() {
    let app = App::from_args([
        "sentry-log-bridge",
        "-l",
        "error",
        "--exception-levels",
        "fatal",
        "--maxValueLength",
        "80",
    ])
    .unwrap();

    let options = app.config().sentry_options();
    assert_eq!(options.level.as_deref(), Some("error"));
    assert_eq!(options.max_value_length, Some(80));
    assert!(options.sentry_instance.is_none());
}

#[test]
#[serial]
fn test_app_rejects_bad_sample_rate() {
    assert!(App::from_args(["sentry-log-bridge", "--sample-rate", "1.5"]).is_err());
}

#[tokio::test]
#[serial]
async fn test_configured_pipeline_forwards_input() {
    let app = App::from_args(["sentry-log-bridge", "--level", "warning", "--exception-levels", "fatal"])
        .unwrap();
    let client = RecordingClient::new();
    let options = SentryOptions {
        sentry_instance: Some(Arc::clone(&client) as Arc<dyn ReportingClient>),
        ..app.config().sentry_options()
    };
    let stream = PipelineBuilder::new(options)
        .env_defaults(EnvDefaults::default())
        .buffer_capacity(app.config().buffer_capacity)
        .build()
        .unwrap();

    let input: &[u8] = b"{\"level\":30,\"msg\":\"info\"}\n{\"level\":50,\"msg\":\"err\"}\n{\"level\":60,\"msg\":\"fatal\"}\n";
    let stats = forward(input, stream, std::future::pending()).await.unwrap();

    assert_eq!(stats.filtered, 1);
    assert_eq!(stats.breadcrumbs, 1);
    assert_eq!(stats.exceptions, 1);
    assert_eq!(client.exceptions()[0].0.message(), "fatal");
}
