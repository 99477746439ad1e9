//! End-to-end tests of llms.txt generation against a mock Firecrawl server.
//!
//! Covers:
//! - map → filter → scrape → render → write
//! - partial and total scrape failure
//! - resuming into existing output
//! - generated titles and descriptions

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crawl_ltx::llms::mock::MockLlmProvider;
use crawl_ltx::render::{FULL_FILE_NAME, INDEX_FILE_NAME};
use crawl_ltx::{
    Firecrawl, Generator, GeneratorOptions, MetadataResolver, ResumeState, Strategy, UrlSource,
};

const SITE: &str = "https://ex.com";

/// Starts a server whose map endpoint lists `urls`.
async fn firecrawl_server(urls: &[&str]) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/map"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "links": urls,
        })))
        .mount(&server)
        .await;
    server
}

/// Serves a page with the given title and description for `url`.
async fn mount_page(server: &MockServer, url: &str, title: &str, description: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({"url": url})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "markdown": format!("# {}\n\nContent of {}", title, url),
                "rawHtml": format!(
                    r#"<html><head><title>{}</title><meta name="description" content="{}"></head><body></body></html>"#,
                    title, description
                ),
                "metadata": {"statusCode": 200, "sourceURL": url}
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// Every scrape not matched by a more specific mock fails with a 500.
async fn mount_scrape_failure(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .with_priority(10)
        .mount(server)
        .await;
}

fn generator(server: &MockServer, options: GeneratorOptions, resolver: MetadataResolver) -> Generator {
    let api = Firecrawl::new("fc-test", &format!("{}/v1", server.uri()), Duration::from_secs(5)).unwrap();
    Generator::new(Arc::new(api), resolver, options)
}

fn options() -> GeneratorOptions {
    GeneratorOptions::builder().batch_delay(Duration::ZERO).build()
}

#[tokio::test]
async fn test_filtered_site_round_trip() {
    let server = firecrawl_server(&["https://ex.com/", "https://ex.com/docs/a", "https://ex.com/blog/b"]).await;
    mount_page(&server, "https://ex.com/docs/a", "Docs A", "About page A").await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(10)
        .expect(0)
        .mount(&server)
        .await;

    let options = GeneratorOptions::builder()
        .include_pattern(".*/docs/.*".to_string())
        .batch_delay(Duration::ZERO)
        .build();
    let generator = generator(&server, options, MetadataResolver::without_generation());

    let output = generator.generate(SITE, &UrlSource::Map, None).await.unwrap();
    assert_eq!(output.summary.discovered, 3);
    assert_eq!(output.summary.filtered, 1);
    assert_eq!(output.summary.succeeded, 1);
    assert_eq!(output.results[0].status_code, Some(200));

    let dir = tempfile::tempdir().unwrap();
    output.write_to(dir.path()).unwrap();

    let index = std::fs::read_to_string(dir.path().join(INDEX_FILE_NAME)).unwrap();
    assert_eq!(
        index,
        "# https://ex.com llms.txt\n\n- [Docs A](https://ex.com/docs/a): About page A\n"
    );

    let full = std::fs::read_to_string(dir.path().join(FULL_FILE_NAME)).unwrap();
    assert_eq!(
        full,
        "# https://ex.com llms-full.txt\n\n\
         <|firecrawl-page-1-lllmstxt|>\n## Docs A\n# Docs A\n\nContent of https://ex.com/docs/a\n\n"
    );
}

#[tokio::test]
async fn test_partial_failure_keeps_successes() {
    let server = firecrawl_server(&["https://ex.com/a", "https://ex.com/b", "https://ex.com/c"]).await;
    mount_page(&server, "https://ex.com/a", "A", "Page A").await;
    mount_page(&server, "https://ex.com/c", "C", "Page C").await;
    mount_scrape_failure(&server).await;

    let generator = generator(&server, options(), MetadataResolver::without_generation());
    let output = generator.generate(SITE, &UrlSource::Map, None).await.unwrap();

    assert_eq!(output.summary.attempted, 3);
    assert_eq!(output.summary.succeeded, 2);
    assert_eq!(output.summary.failed, 1);
    assert_eq!(output.summary.failures[0].url, "https://ex.com/b");
    assert_eq!(
        output.results.iter().map(|r| r.url.as_str()).collect::<Vec<_>>(),
        vec!["https://ex.com/a", "https://ex.com/c"]
    );
}

#[tokio::test]
async fn test_every_scrape_fails() {
    let server = firecrawl_server(&["https://ex.com/a", "https://ex.com/b"]).await;
    mount_scrape_failure(&server).await;

    let generator = generator(&server, options(), MetadataResolver::without_generation());
    let output = generator.generate(SITE, &UrlSource::Map, None).await.unwrap();

    assert!(output.results.is_empty());
    assert_eq!(output.summary.failed, 2);
}

#[tokio::test]
async fn test_resume_appends_to_existing_output() {
    let urls = ["https://ex.com/a", "https://ex.com/b", "https://ex.com/c"];
    let server = firecrawl_server(&urls).await;
    mount_page(&server, "https://ex.com/a", "A", "Page A").await;
    mount_page(&server, "https://ex.com/b", "B", "Page B").await;
    mount_page(&server, "https://ex.com/c", "C", "Page C").await;
    let dir = tempfile::tempdir().unwrap();

    // Every run uses the same cap, so each one adds exactly one page.
    let one_page = || {
        GeneratorOptions::builder()
            .max_urls(1)
            .batch_delay(Duration::ZERO)
            .build()
    };
    generator(&server, one_page(), MetadataResolver::without_generation())
        .generate(SITE, &UrlSource::Map, None)
        .await
        .unwrap()
        .write_to(dir.path())
        .unwrap();

    let state = ResumeState::load(dir.path()).unwrap();
    assert!(state.is_processed("https://ex.com/a"));
    assert_eq!(state.next_page(), 2);

    let resumed = generator(&server, one_page(), MetadataResolver::without_generation());
    let plan = resumed.plan(SITE, &UrlSource::Map, Some(&state)).await.unwrap();
    assert_eq!(plan.urls, vec!["https://ex.com/b"]);
    assert_eq!(plan.skipped, 1);
    assert_eq!(plan.resume_from, Some(2));
    resumed.execute(&plan).await.unwrap().write_to(dir.path()).unwrap();

    let state = ResumeState::load(dir.path()).unwrap();
    generator(&server, one_page(), MetadataResolver::without_generation())
        .generate(SITE, &UrlSource::Map, Some(&state))
        .await
        .unwrap()
        .write_to(dir.path())
        .unwrap();

    // The map call asks for room past the pages already written.
    let map_limits: Vec<u64> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.url.path() == "/v1/map")
        .map(|request| request.body_json::<serde_json::Value>().unwrap()["limit"].as_u64().unwrap())
        .collect();
    assert_eq!(map_limits, vec![1, 2, 3]);

    let index = std::fs::read_to_string(dir.path().join(INDEX_FILE_NAME)).unwrap();
    assert_eq!(
        index,
        "# https://ex.com llms.txt\n\n\
         - [A](https://ex.com/a): Page A\n\
         - [B](https://ex.com/b): Page B\n\
         - [C](https://ex.com/c): Page C\n"
    );

    let full = std::fs::read_to_string(dir.path().join(FULL_FILE_NAME)).unwrap();
    assert_eq!(full.matches("llms-full.txt").count(), 1);
    assert!(full.contains("<|firecrawl-page-1-lllmstxt|>\n## A\n"));
    assert!(full.contains("<|firecrawl-page-2-lllmstxt|>\n## B\n"));
    assert!(full.contains("<|firecrawl-page-3-lllmstxt|>\n## C\n"));
}

#[tokio::test]
async fn test_generated_titles() {
    let server = firecrawl_server(&["https://ex.com/a"]).await;
    mount_page(&server, "https://ex.com/a", "A", "Page A").await;

    let provider = MockLlmProvider::with_summary("Getting Started Guide", "How to install and configure the tool step by step.");
    let resolver = MetadataResolver::new(Some(Arc::new(provider)), Duration::from_secs(1));
    let output = generator(&server, options(), resolver)
        .generate(SITE, &UrlSource::Map, None)
        .await
        .unwrap();

    let page = &output.results[0];
    assert_eq!(page.title, "Getting Started Guide");
    assert_eq!(page.description, "How to install and configure the tool step by step.");
    assert_eq!(page.title_source, Strategy::Generative);
}

#[tokio::test]
async fn test_url_file_skips_map() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/map"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(&server, "https://ex.com/blog/b", "B", "Page B").await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("urls.csv");
    std::fs::write(&file, "url\nhttps://ex.com/blog/b\n").unwrap();
    let source = UrlSource::Provided(crawl_ltx::discovery::read_url_file(&file).unwrap());

    let options = GeneratorOptions::builder()
        .include_pattern(".*/docs/.*".to_string())
        .batch_delay(Duration::ZERO)
        .build();
    let output = generator(&server, options, MetadataResolver::without_generation())
        .generate(SITE, &source, None)
        .await
        .unwrap();
    assert_eq!(output.results.len(), 1);
    assert_eq!(output.results[0].title, "B");
}
