mod support;

use repurposer::scraping::{ArticleExtractor, ContentExtractor, PageFetcher};
use repurposer::PipelineError;

fn extractor() -> ContentExtractor {
    ContentExtractor::new(
        PageFetcher::with_client(reqwest::Client::new()),
        ArticleExtractor::default(),
    )
}

#[tokio::test]
async fn test_extracts_article_body_from_page() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/blog/batch-size")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(support::article_page())
        .create_async()
        .await;

    let url = format!("{}/blog/batch-size", server.url());
    let text = extractor().extract(&url).await.expect("extract");

    assert!(text.chars().count() > 500);
    assert!(text.starts_with("Continuous delivery works best"));
    assert!(!text.contains("Home Blog About"));
    assert!(!text.contains("Copyright"));
    assert!(!text.contains("  "));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetcher_sends_browser_user_agent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/post")
        .match_header("user-agent", mockito::Matcher::Regex("^Mozilla/5.0".to_string()))
        .with_status(200)
        .with_body(support::article_page())
        .create_async()
        .await;

    let fetcher = PageFetcher::new(&common::FetchConfig::default()).expect("fetcher");
    let extractor = ContentExtractor::new(fetcher, ArticleExtractor::default());
    extractor
        .extract(&format!("{}/post", server.url()))
        .await
        .expect("extract");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_success_status_is_fetch_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/missing")
        .with_status(404)
        .with_body("not found")
        .create_async()
        .await;

    let err = extractor()
        .extract(&format!("{}/missing", server.url()))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Fetch(_)));
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_empty_body_is_extraction_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/empty")
        .with_status(200)
        .with_body("")
        .create_async()
        .await;

    let err = extractor()
        .extract(&format!("{}/empty", server.url()))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Extraction { length: 0 }));
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_unreachable_host_is_fetch_error() {
    // Port 9 (discard) on localhost is closed in test environments
    let err = extractor().extract("http://127.0.0.1:9/post").await.unwrap_err();
    assert!(matches!(err, PipelineError::Fetch(_)));
}

#[tokio::test]
async fn test_missing_and_invalid_urls() {
    assert!(matches!(extractor().extract("").await, Err(PipelineError::MissingUrl)));
    assert!(matches!(
        extractor().extract("example.com/post").await,
        Err(PipelineError::InvalidUrl(_))
    ));
}
