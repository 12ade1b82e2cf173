//! 🧪 End to end: a file of NDJSON lines in, real HTTP bulk requests out.
//!
//! wiremock plays Elasticsearch. It does not index anything. It just remembers
//! every request so we can check the bytes afterwards. 🦆

use std::io::Write;

use esgz::app_config::{
    AppConfig, ElasticsearchSinkConfig, FileSourceConfig, MalformedPolicy, RuntimeConfig, SinkConfig,
    SourceConfig,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn input_file(lines: &[&str]) -> anyhow::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(".ndjson").tempfile()?;
    for line in lines {
        writeln!(file, "{line}")?;
    }
    file.flush()?;
    Ok(file)
}

fn app_config(file: &tempfile::NamedTempFile, server: &MockServer, runtime: RuntimeConfig) -> AppConfig {
    AppConfig {
        source_config: SourceConfig::File(FileSourceConfig {
            file_name: file.path().display().to_string(),
        }),
        sink_config: SinkConfig::Elasticsearch(ElasticsearchSinkConfig {
            url: server.uri(),
            index: None,
        }),
        runtime,
    }
}

fn single_worker() -> RuntimeConfig {
    RuntimeConfig {
        worker_count: 1,
        ..RuntimeConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn the_one_where_three_lines_become_two_bulk_requests() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/logs/_bulk"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"errors":false}"#))
        .expect(2)
        .mount(&server)
        .await;

    let file = input_file(&[r#"{"id":"a"}"#, "", r#"{"id":"b"}"#, r#"{"id":"c"}"#])?;
    let summary = esgz::run(app_config(&file, &server, single_worker()), Some("logs")).await?;

    assert_eq!(summary.target_url, format!("{}/logs/_bulk", server.uri()));
    assert_eq!(summary.lines_read, 3);
    assert_eq!(summary.batches_submitted, 2);
    assert_eq!(summary.documents_submitted, 3);
    assert_eq!(summary.rate.total, 2);

    let requests = server
        .received_requests()
        .await
        .expect("💀 wiremock should be recording requests");
    let bodies: Vec<String> = requests
        .iter()
        .map(|request| String::from_utf8_lossy(&request.body).into_owned())
        .collect();
    assert_eq!(
        bodies,
        vec![
            "{\"_id\":\"a\"}\n{\"id\":\"a\"}\n{\"_id\":\"b\"}\n{\"id\":\"b\"}\n",
            "{\"_id\":\"c\"}\n{\"id\":\"c\"}\n",
        ]
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn the_one_where_an_empty_file_never_calls_elasticsearch() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let file = input_file(&[])?;
    let summary = esgz::run(app_config(&file, &server, RuntimeConfig::default()), Some("logs")).await?;

    assert_eq!(summary.lines_read, 0);
    assert_eq!(summary.batches_submitted, 0);
    assert_eq!(summary.rate.total, 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn the_one_where_rejected_batches_do_not_stop_the_run() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/logs/_bulk"))
        .respond_with(ResponseTemplate::new(400).set_body_string("nope"))
        .expect(2)
        .mount(&server)
        .await;

    let file = input_file(&[r#"{"id":"a"}"#, r#"{"id":"b"}"#, r#"{"id":"c"}"#, r#"{"id":"d"}"#])?;
    let summary = esgz::run(app_config(&file, &server, single_worker()), Some("logs")).await?;

    assert_eq!(summary.documents_submitted, 4);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn the_one_where_a_malformed_line_fails_the_whole_run() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let file = input_file(&[r#"{"id":"a"}"#, "this is not json", r#"{"id":"z"}"#])?;
    let err = esgz::run(app_config(&file, &server, single_worker()), Some("logs"))
        .await
        .expect_err("💀 a malformed line should fail the run");

    let chain = format!("{err:#}");
    assert!(chain.contains("malformed input line"), "got: {chain}");
    assert!(chain.contains("this is not json"), "got: {chain}");

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(
        requests
            .iter()
            .all(|request| !String::from_utf8_lossy(&request.body).contains(r#""_id":"z""#)),
        "nothing after the bad line may ship"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn the_one_where_dead_letter_mode_ships_everything_else() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let runtime = RuntimeConfig {
        malformed_policy: MalformedPolicy::DeadLetter,
        report_final_flush: true,
        ..RuntimeConfig::default()
    };
    let file = input_file(&[r#"{"id":"a"}"#, r#"{"no_id":true}"#, r#"{"id":"b"}"#, r#"{"id":"c"}"#])?;
    let summary = esgz::run(app_config(&file, &server, runtime), Some("logs")).await?;

    assert_eq!(summary.dead_lettered, 1);
    assert_eq!(summary.documents_submitted, 3);
    assert_eq!(summary.rate.total, 3);
    Ok(())
}

#[tokio::test]
async fn the_one_where_nobody_named_an_index() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let file = input_file(&[r#"{"id":"a"}"#])?;

    let err = esgz::run(app_config(&file, &server, RuntimeConfig::default()), None)
        .await
        .expect_err("💀 no index anywhere should be a config error");
    assert!(format!("{err:#}").contains("no index name"));
    Ok(())
}
