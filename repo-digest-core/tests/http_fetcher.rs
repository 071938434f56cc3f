use std::io::Write;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use repo_digest_core::config::{DigestOptions, FetchConfig};
use repo_digest_core::contract::ArchiveFetcher;
use repo_digest_core::error::SourceError;
use repo_digest_core::fetch::HttpFetcher;
use repo_digest_core::pipeline::build_digest;

fn fast_retries() -> FetchConfig {
    FetchConfig {
        reference: None,
        timeout_secs: 5,
        max_attempts: 2,
        initial_backoff_ms: 10,
    }
}

#[tokio::test]
async fn returns_body_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/o/r/archive/HEAD.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK-bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&fast_retries()).unwrap();
    let bytes = fetcher
        .fetch(&format!("{}/o/r/archive/HEAD.zip", server.uri()))
        .await
        .unwrap();
    assert_eq!(bytes, b"PK-bytes");
}

#[tokio::test]
async fn server_errors_are_retried_then_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/archive.zip"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&fast_retries()).unwrap();
    let err = fetcher
        .fetch(&format!("{}/archive.zip", server.uri()))
        .await
        .unwrap_err();

    match err {
        SourceError::Unreachable {
            attempts, reason, ..
        } => {
            assert_eq!(attempts, 2);
            assert!(reason.contains("503"), "reason was {reason}");
        }
        other => panic!("expected Unreachable, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_archives_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.zip"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&fast_retries()).unwrap();
    let err = fetcher
        .fetch(&format!("{}/gone.zip", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn recovers_when_a_retry_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky.zip"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&fast_retries()).unwrap();
    let bytes = fetcher
        .fetch(&format!("{}/flaky.zip", server.uri()))
        .await
        .unwrap();
    assert_eq!(bytes, b"ok");
}

#[tokio::test]
async fn build_digest_downloads_the_requested_reference() {
    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file("r-main/lib/core.ts", SimpleFileOptions::default())
        .unwrap();
    writer
        .write_all(b"// comment\nexport function run(): void {}\nrun();\n")
        .unwrap();
    let archive = writer.finish().unwrap().into_inner();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/o/r/archive/main.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
        .expect(1)
        .mount(&server)
        .await;

    let options = DigestOptions {
        fetch: FetchConfig {
            reference: Some("main".to_string()),
            ..fast_retries()
        },
        ..Default::default()
    };
    let digest = build_digest(&format!("{}/o/r.git", server.uri()), &options)
        .await
        .unwrap();

    assert_eq!(
        digest.text,
        "// File: r-main/lib/core.ts\nexport function run(): void {}\n\n"
    );
}
