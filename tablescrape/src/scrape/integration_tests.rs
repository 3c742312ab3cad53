//! End-to-end tests for scraping.

#[cfg(test)]
mod tests {
    use crate::config::{ExtractionConfig, FetchConfig, ScrapeConfig};
    use crate::errors::{ErrorKind, ScrapeError};
    use crate::export::{export, parse_csv, ExportFormat};
    use crate::extract::Diagnostic;
    use crate::fetch::HttpFetcher;
    use crate::scrape::{ScrapeOptions, Scraper};
    use crate::testing::{
        assert_columns, assert_dataset_shape, assert_has_diagnostic, assert_no_data,
        assert_rectangular, fixtures, MockFetcher,
    };
    use pretty_assertions::assert_eq;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mock_scraper(fetcher: MockFetcher) -> Scraper<MockFetcher> {
        Scraper::new(fetcher, ExtractionConfig::default())
    }

    #[tokio::test]
    async fn test_scrape_leaderboard() {
        let scraper = mock_scraper(
            MockFetcher::new().with_page("https://example.com/hiscores/", fixtures::LEADERBOARD_PAGE),
        );

        let result = scraper
            .scrape("https://example.com/hiscores/", &ScrapeOptions::new())
            .await
            .unwrap();

        assert_eq!(result.datasets.len(), 1);
        assert_dataset_shape(&result.datasets[0], 3, 3);
        assert_columns(&result.datasets[0], &["Rank", "Player", "Level"]);
        assert_eq!(result.datasets[0].rows[0], vec!["1", "Alice", "99"]);
        assert_eq!(result.resources.stylesheets, vec!["https://example.com/css/site.css"]);
        assert_eq!(result.source_url.as_deref(), Some("https://example.com/hiscores/"));
    }

    #[tokio::test]
    async fn test_scrape_passes_headers_and_timeout() {
        let fetcher = MockFetcher::new().with_page("https://example.com/", fixtures::SIMPLE_TABLE);
        let scraper = mock_scraper(fetcher);
        let options = ScrapeOptions::new()
            .with_header("Accept-Language", "en")
            .with_timeout(Duration::from_secs(5));

        scraper.scrape("https://example.com/", &options).await.unwrap();

        let calls = scraper.fetcher().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].headers.get("Accept-Language"), Some(&"en".to_string()));
        assert_eq!(calls[0].timeout, Some(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_scrape_without_tables_is_success() {
        let scraper =
            mock_scraper(MockFetcher::new().with_page("https://example.com/", fixtures::NO_TABLES_PAGE));

        let result = scraper
            .scrape("https://example.com/", &ScrapeOptions::new())
            .await
            .unwrap();

        assert_no_data(&result);
        assert_eq!(result.resources.scripts, vec!["https://example.com/js/app.js"]);
    }

    #[tokio::test]
    async fn test_scrape_ragged_and_nested() {
        let scraper = mock_scraper(
            MockFetcher::new()
                .with_page("https://example.com/ragged", fixtures::RAGGED_TABLE)
                .with_page("https://example.com/nested", fixtures::NESTED_TABLES),
        );
        let options = ScrapeOptions::new();

        let ragged = scraper.scrape("https://example.com/ragged", &options).await.unwrap();
        assert_rectangular(&ragged.datasets[0]);
        assert_has_diagnostic(
            &ragged.diagnostics,
            &Diagnostic::RaggedRows { index: 0, padded: 1, truncated: 1 },
        );

        let nested = scraper.scrape("https://example.com/nested", &options).await.unwrap();
        assert_eq!(nested.datasets.len(), 1);
        assert_columns(&nested.datasets[0], &["Region", "Servers"]);
        assert_eq!(nested.datasets[0].len(), 2);
        let cells: Vec<&String> = nested.datasets[0].rows.iter().flatten().collect();
        assert!(!cells.iter().any(|c| c.as_str() == "eu-1"));
    }

    #[tokio::test]
    async fn test_scrape_combine() {
        let scraper =
            mock_scraper(MockFetcher::new().with_page("https://example.com/", fixtures::MULTI_TABLE_PAGE));

        let result = scraper
            .scrape("https://example.com/", &ScrapeOptions::new().combined())
            .await
            .unwrap();

        assert_eq!(result.datasets.len(), 1);
        assert_columns(&result.datasets[0], &["Rank", "Player", "Level"]);
        assert_eq!(
            result.datasets[0].rows,
            vec![vec!["1", "Alice", ""], vec!["", "Bob", "40"]]
        );
    }

    #[tokio::test]
    async fn test_scrape_combine_without_tables_stays_empty() {
        let scraper =
            mock_scraper(MockFetcher::new().with_page("https://example.com/", fixtures::NO_TABLES_PAGE));

        let result = scraper
            .scrape("https://example.com/", &ScrapeOptions::new().combined())
            .await
            .unwrap();
        assert!(result.datasets.is_empty());
    }

    #[tokio::test]
    async fn test_scrape_fetch_failures_have_no_result() {
        let scraper = mock_scraper(
            MockFetcher::new()
                .with_status("https://example.com/missing", 404)
                .with_network_error("https://example.com/down", "dns failure"),
        );
        let options = ScrapeOptions::new();

        let err = scraper.scrape("https://example.com/missing", &options).await.unwrap_err();
        assert_eq!(err.http_status_code(), Some(404));

        let err = scraper.scrape("https://example.com/down", &options).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);

        let err = scraper.scrape("ftp://example.com/", &options).await.unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_scrape_many_keeps_input_order() {
        let fetcher = MockFetcher::new()
            .with_page(
                "https://a.example.com/",
                "<table><tr><th>site</th></tr><tr><td>a</td></tr></table>",
            )
            .with_page(
                "https://b.example.com/",
                "<table><tr><th>site</th></tr><tr><td>b</td></tr></table>",
            )
            .with_status("https://c.example.com/", 500)
            .with_delay(Duration::from_millis(20));
        let scraper = mock_scraper(fetcher);
        let urls = [
            "https://a.example.com/",
            "https://b.example.com/",
            "https://c.example.com/",
        ];

        let results = scraper.scrape_many(&urls, &ScrapeOptions::new(), 3).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().datasets[0].rows[0], vec!["a"]);
        assert_eq!(results[1].as_ref().unwrap().datasets[0].rows[0], vec!["b"]);
        assert_eq!(results[2].as_ref().unwrap_err().http_status_code(), Some(500));
        assert_eq!(scraper.fetcher().call_count(), 3);
    }

    #[tokio::test]
    async fn test_scrape_many_runs_concurrently() {
        let fetcher = MockFetcher::new()
            .with_page("https://a.example.com/", fixtures::SIMPLE_TABLE)
            .with_page("https://b.example.com/", fixtures::SIMPLE_TABLE)
            .with_page("https://c.example.com/", fixtures::SIMPLE_TABLE)
            .with_page("https://d.example.com/", fixtures::SIMPLE_TABLE)
            .with_delay(Duration::from_millis(100));
        let scraper = mock_scraper(fetcher);
        let urls = vec![
            "https://a.example.com/".to_string(),
            "https://b.example.com/".to_string(),
            "https://c.example.com/".to_string(),
            "https://d.example.com/".to_string(),
        ];

        let start = Instant::now();
        let results = scraper.scrape_many(&urls, &ScrapeOptions::new(), 4).await;
        let elapsed = start.elapsed();

        assert!(results.iter().all(Result::is_ok));
        assert!(elapsed < Duration::from_millis(350), "took {elapsed:?}");
    }

    #[tokio::test]
    async fn test_scrape_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hiscores/"))
            .and(header("x-client", "tablescrape"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(fixtures::LEADERBOARD_PAGE, "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let config = ScrapeConfig {
            fetch: FetchConfig::new().with_header("X-Client", "tablescrape"),
            extraction: ExtractionConfig::default(),
        };
        let scraper = Scraper::from_config(config).unwrap();
        let url = format!("{}/hiscores/", server.uri());

        let result = scraper.scrape(&url, &ScrapeOptions::new()).await.unwrap();

        assert_dataset_shape(&result.datasets[0], 3, 3);
        assert_eq!(
            result.resources.images,
            vec![format!("{}/hiscores/img/logo.png", server.uri())]
        );

        let csv = export(&result.datasets[0], ExportFormat::Csv).unwrap();
        let records = parse_csv(&String::from_utf8(csv).unwrap(), ',').unwrap();
        assert_eq!(records[0], vec!["Rank", "Player", "Level"]);
        assert_eq!(records[3], vec!["3", "Carol", "85"]);
    }

    #[tokio::test]
    async fn test_scrape_http_404_has_no_partial_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string(fixtures::SIMPLE_TABLE))
            .mount(&server)
            .await;

        let scraper = Scraper::new(
            HttpFetcher::new(FetchConfig::default()).unwrap(),
            ExtractionConfig::default(),
        );
        let err = scraper
            .scrape(&server.uri(), &ScrapeOptions::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ScrapeError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_concurrent_scrapes_of_different_servers_are_independent() {
        let first = MockServer::start().await;
        let second = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<table><tr><th>host</th></tr><tr><td>first</td></tr></table>",
            ))
            .mount(&first)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<table><tr><th>port</th><th>state</th></tr><tr><td>80</td><td>open</td></tr></table>",
            ))
            .mount(&second)
            .await;

        let scraper = Scraper::from_config(ScrapeConfig::default()).unwrap();
        let options = ScrapeOptions::new();
        let (first_url, second_url) = (first.uri(), second.uri());
        let (a, b) = tokio::join!(
            scraper.scrape(&first_url, &options),
            scraper.scrape(&second_url, &options)
        );

        let (a, b) = (a.unwrap(), b.unwrap());
        assert_columns(&a.datasets[0], &["host"]);
        assert_columns(&b.datasets[0], &["port", "state"]);
        assert_eq!(b.datasets[0].rows[0], vec!["80", "open"]);
    }
}
