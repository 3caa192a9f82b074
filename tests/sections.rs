//! Home section aggregation tests
//!
//! Two-phase delivery, failure isolation and concurrency of section fetches.

use futures::StreamExt;
use hondana::paged::PagedFetcher;
use hondana::section::{SectionAggregator, default_sections};
use hondana::types::{Section, SectionDefinition, SectionState};
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{API_BASE, MockResponse, MockTransport, empty_page, envelope, series_item};

fn aggregator(mock: &Arc<MockTransport>) -> SectionAggregator {
    SectionAggregator::new(PagedFetcher::new(mock.clone()), API_BASE, 20)
}

fn delayed(ms: u64, response: MockResponse) -> MockResponse {
    MockResponse::Delayed(Duration::from_millis(ms), Box::new(response))
}

#[cfg(test)]
mod section_tests {
    use super::*;

    #[tokio::test]
    async fn test_each_section_delivered_twice() {
        let mock = MockTransport::new();
        mock.route_page(
            "/series/new",
            0,
            envelope(vec![series_item("S1", "One"), series_item("S2", "Two")]),
        )
        .route_page("/series/updated", 0, envelope(vec![series_item("S3", "Three")]));

        let mut delivered: Vec<Section> = Vec::new();
        let failed = aggregator(&mock)
            .run(&default_sections(), |section| delivered.push(section))
            .await;

        assert_eq!(failed, 0);
        assert_eq!(delivered.len(), 4);

        for definition in default_sections() {
            let states: Vec<&Section> = delivered
                .iter()
                .filter(|s| s.id == definition.id)
                .collect();
            assert_eq!(states.len(), 2);
            assert!(states[0].is_pending());
            assert!(states[0].items.is_empty());
            assert_eq!(states[1].state, SectionState::Loaded);
            assert_eq!(states[1].title, definition.title);
        }

        let new = delivered
            .iter()
            .find(|s| s.id == "new" && !s.is_pending())
            .unwrap();
        assert_eq!(new.items.len(), 2);
        assert_eq!(new.items[0].subtitle, "id: S1");
        assert!(new.has_more_available);
    }

    #[tokio::test]
    async fn test_first_page_uses_section_page_size() {
        let mock = MockTransport::new();
        mock.route_page("/series/new", 0, empty_page())
            .route_page("/series/updated", 0, empty_page());

        aggregator(&mock).run(&default_sections(), |_| {}).await;

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        for request in requests {
            assert_eq!(request.query_value("page"), Some("0"));
            assert_eq!(request.query_value("size"), Some("20"));
        }
    }

    #[tokio::test]
    async fn test_failed_section_does_not_block_siblings() {
        let mock = MockTransport::new();
        mock.route_page("/series/new", 0, MockResponse::Status(500))
            .route_page("/series/updated", 0, envelope(vec![series_item("S3", "Three")]));

        let mut delivered = Vec::new();
        let failed = aggregator(&mock)
            .run(&default_sections(), |section| delivered.push(section))
            .await;

        assert_eq!(failed, 1);
        assert_eq!(delivered.len(), 4);

        let new = delivered.iter().find(|s| s.id == "new" && !s.is_pending()).unwrap();
        assert!(new.is_failed());
        assert!(matches!(
            &new.state,
            SectionState::Failed { message, source_unavailable: true }
                if message.contains("500") && message.contains("[new]")
        ));
        assert!(new.is_source_unavailable());
        assert!(new.items.is_empty());

        let updated = delivered
            .iter()
            .find(|s| s.id == "updated" && !s.is_pending())
            .unwrap();
        assert_eq!(updated.state, SectionState::Loaded);
        assert_eq!(updated.items.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_section_is_source_unavailable() {
        let mock = MockTransport::new();
        mock.route_page(
            "/series/new",
            0,
            MockResponse::Raw("<html>Login</html>".to_string()),
        )
        .route_page("/series/updated", 0, empty_page());

        let mut delivered = Vec::new();
        let failed = aggregator(&mock)
            .run(&default_sections(), |section| delivered.push(section))
            .await;

        assert_eq!(failed, 1);
        let new = delivered
            .iter()
            .find(|s| s.id == "new" && !s.is_pending())
            .unwrap();
        assert!(new.is_failed());
        assert!(new.is_source_unavailable());

        let updated = delivered
            .iter()
            .find(|s| s.id == "updated" && !s.is_pending())
            .unwrap();
        assert!(!updated.is_source_unavailable());
    }

    #[tokio::test]
    async fn test_empty_section_has_nothing_more() {
        let mock = MockTransport::new();
        mock.route_page("/series/new", 0, empty_page());

        let definitions = vec![SectionDefinition::new("new", "Recently added series")];
        let mut delivered = Vec::new();
        aggregator(&mock)
            .run(&definitions, |section| delivered.push(section))
            .await;

        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[1].state, SectionState::Loaded);
        assert!(!delivered[1].has_more_available);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sections_resolve_in_completion_order() {
        let mock = MockTransport::new();
        mock.route_page(
            "/series/new",
            0,
            delayed(500, envelope(vec![series_item("S1", "One")])),
        )
        .route_page(
            "/series/updated",
            0,
            delayed(10, envelope(vec![series_item("S2", "Two")])),
        );

        let sections = default_sections();
        let aggregator = aggregator(&mock);
        let delivered: Vec<(String, bool)> = aggregator
            .stream(&sections)
            .map(|section| (section.id.clone(), section.is_pending()))
            .collect()
            .await;

        assert_eq!(
            delivered,
            vec![
                ("new".to_string(), true),
                ("updated".to_string(), true),
                ("updated".to_string(), false),
                ("new".to_string(), false),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_run_concurrently() {
        let mock = MockTransport::new();
        let definitions: Vec<SectionDefinition> = (0..5)
            .map(|i| SectionDefinition::new(format!("s{}", i), format!("Section {}", i)))
            .collect();
        for definition in &definitions {
            mock.route_page(
                &format!("/series/{}", definition.id),
                0,
                delayed(1_000, empty_page()),
            );
        }

        let start = tokio::time::Instant::now();
        let mut count = 0;
        aggregator(&mock).run(&definitions, |_| count += 1).await;

        assert_eq!(count, 10);
        assert!(start.elapsed() < Duration::from_millis(2_000));
    }

    #[tokio::test]
    async fn test_no_sections() {
        let mock = MockTransport::new();
        let mut count = 0;
        let failed = aggregator(&mock).run(&[], |_| count += 1).await;
        assert_eq!(count, 0);
        assert_eq!(failed, 0);
        assert!(mock.requests().is_empty());
    }
}
