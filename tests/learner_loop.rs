//! Continuous learner end-to-end: queue, crawl, persist, stop

use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use tokio::time::sleep;

use basinsearch::core::encoding::BasinEncoder;
use basinsearch::fetch::PageFetcher;
use basinsearch::index::document::doc_id_for_url;
use basinsearch::index::store::DocumentStore;
use basinsearch::learner::{ContinuousLearner, LearnerOptions};
use basinsearch::search::orchestrator::SearchOrchestrator;

fn fast_options() -> LearnerOptions {
    LearnerOptions {
        crawl_delay: Duration::from_millis(10),
        ..LearnerOptions::default()
    }
}

fn learner_over(store: Arc<DocumentStore>) -> ContinuousLearner {
    let fetcher = Arc::new(PageFetcher::new(Duration::from_secs(2), 5000).unwrap());
    ContinuousLearner::new(store, fetcher, BasinEncoder::default(), &fast_options())
}

async fn mock_article(server: &MockServer, path: &str, title: &str, paragraph: &str) {
    // Repeat the paragraph so the page clears the minimum content length.
    let body = format!(
        "<html><head><title>{title}</title></head><body><p>{}</p></body></html>",
        format!("{paragraph} ").repeat(30)
    );
    server
        .mock_async(|when, then| {
            when.method(GET).path(path.to_string());
            then.status(200)
                .header("content-type", "text/html")
                .body(body);
        })
        .await;
}

/// Poll until the learner has finished `n` tasks (crawled + failed) or time out.
async fn wait_for_tasks(learner: &ContinuousLearner, n: u64) {
    for _ in 0..300 {
        let stats = learner.stats();
        if stats.urls_crawled + stats.urls_failed >= n {
            return;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("learner did not finish {n} tasks in time");
}

#[tokio::test]
async fn learner_crawls_and_indexes_queued_urls() {
    let server = MockServer::start_async().await;
    mock_article(
        &server,
        "/geometry",
        "Information Geometry",
        "fisher information metrics on statistical manifolds",
    )
    .await;
    mock_article(
        &server,
        "/runtime",
        "Async Runtime",
        "tokio task scheduling and cooperative multitasking",
    )
    .await;

    let store = Arc::new(DocumentStore::open_in_memory().unwrap());
    let learner = learner_over(Arc::clone(&store));

    assert!(learner.enqueue(&server.url("/geometry"), 2, "seed"));
    assert!(learner.enqueue(&server.url("/runtime"), 1, "seed"));

    learner.start();
    wait_for_tasks(&learner, 2).await;
    learner.stop().await;

    let stats = learner.stats();
    assert_eq!(stats.urls_crawled, 2);
    assert_eq!(stats.urls_failed, 0);
    assert_eq!(stats.documents_added, 2);
    assert!(stats.last_crawl_time.is_some());
    assert!(!stats.running);

    assert_eq!(store.count().unwrap(), 2);
    let doc = store
        .get_document(&doc_id_for_url(&server.url("/geometry")))
        .unwrap()
        .unwrap();
    assert_eq!(doc.title, "Information Geometry");
    assert!(doc.text.contains("fisher information"));
    assert!(doc.phi > 0.0);

    // Learned documents are immediately searchable.
    let orchestrator = SearchOrchestrator::new(store, BasinEncoder::default());
    let results = orchestrator
        .search("fisher information statistical manifolds", 10)
        .unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].url.ends_with("/geometry"));
}

#[tokio::test]
async fn short_content_is_discarded_not_failed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/stub");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html><body><p>too short</p></body></html>");
        })
        .await;

    let store = Arc::new(DocumentStore::open_in_memory().unwrap());
    let learner = learner_over(Arc::clone(&store));

    learner.enqueue(&server.url("/stub"), 0, "seed");
    learner.start();
    wait_for_tasks(&learner, 1).await;
    learner.stop().await;

    let stats = learner.stats();
    assert_eq!(stats.urls_crawled, 1);
    assert_eq!(stats.urls_failed, 0);
    assert_eq!(stats.documents_added, 0);
    assert_eq!(store.count().unwrap(), 0);
}

#[tokio::test]
async fn fetch_failure_counts_and_loop_continues() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/gone");
            then.status(404);
        })
        .await;
    mock_article(&server, "/alive", "Alive", "a perfectly healthy page body").await;

    let store = Arc::new(DocumentStore::open_in_memory().unwrap());
    let learner = learner_over(Arc::clone(&store));

    // Higher priority first, so the failure happens before the success.
    learner.enqueue(&server.url("/gone"), 5, "seed");
    learner.enqueue(&server.url("/alive"), 1, "seed");

    learner.start();
    wait_for_tasks(&learner, 2).await;
    learner.stop().await;

    let stats = learner.stats();
    assert_eq!(stats.urls_failed, 1);
    assert_eq!(stats.urls_crawled, 1);
    assert_eq!(stats.documents_added, 1);
    assert_eq!(store.count().unwrap(), 1);
}

#[tokio::test]
async fn recrawl_of_known_doc_id_is_idempotent() {
    let server = MockServer::start_async().await;
    mock_article(&server, "/page", "Original Title", "original page body text").await;

    let store = Arc::new(DocumentStore::open_in_memory().unwrap());

    // First pass indexes the page.
    let learner = learner_over(Arc::clone(&store));
    learner.enqueue(&server.url("/page"), 0, "seed");
    learner.start();
    wait_for_tasks(&learner, 1).await;
    learner.stop().await;
    assert_eq!(store.count().unwrap(), 1);

    // A fresh learner (empty seen-set) crawls the same URL again; the
    // store-level idempotent insert leaves the original untouched.
    let second = learner_over(Arc::clone(&store));
    assert!(second.enqueue(&server.url("/page"), 0, "seed"));
    second.start();
    wait_for_tasks(&second, 1).await;
    second.stop().await;

    let stats = second.stats();
    assert_eq!(stats.urls_crawled, 1);
    assert_eq!(stats.documents_added, 0);
    assert_eq!(store.count().unwrap(), 1);
}
