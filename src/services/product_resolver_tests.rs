// src/services/product_resolver_tests.rs
//
// ProductResolver lookup policy
//
// INVARIANTS TESTED:
// - Malformed codes never reach the network
// - Mirrors are tried in order; first "found" wins
// - Every failure mode folds into `error`, never a panic or Err
// - Nutrition collapses to None without primary macros

#[cfg(test)]
mod lookup_tests {
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    use crate::domain::ProductSource;
    use crate::error::AppError;
    use crate::events::{EventBus, ProductQueryCompleted};
    use crate::integrations::openfoodfacts::client::MockJsonFetcher;
    use crate::services::product_resolver::{
        CANCELLED_MESSAGE, INVALID_FORMAT_MESSAGE, NOT_FOUND_MESSAGE, TIMEOUT_MESSAGE,
    };
    use crate::services::testing::*;

    #[tokio::test]
    async fn test_invalid_barcode_makes_no_request() {
        let mut fetcher = MockJsonFetcher::new();
        fetcher.expect_get_json().times(0);
        let resolver = resolver_with(Arc::new(fetcher), Arc::new(EventBus::new()));

        for code in ["abc", "", "1234567", "123456789012345", "12345678a"] {
            let result = resolver.query(code).await;
            assert!(!result.found);
            assert_eq!(result.source, ProductSource::Unknown);
            assert_eq!(result.error.as_deref(), Some(INVALID_FORMAT_MESSAGE));
            assert!(result.product.is_none());
        }
    }

    #[tokio::test]
    async fn test_energy_only_nutrition_from_first_mirror() {
        let mut fetcher = MockJsonFetcher::new();
        fetcher
            .expect_get_json()
            .withf(|url| url == "https://zh.openfoodfacts.org/api/v0/product/6901234567892.json")
            .times(1)
            .returning(|_| {
                Ok(json!({
                    "status": 1,
                    "product": {
                        "product_name": "Soda",
                        "nutriments": {"energy-kcal_100g": 42}
                    }
                }))
            });

        let resolver = resolver_with(Arc::new(fetcher), Arc::new(EventBus::new()));
        let result = resolver.query("6901234567892").await;

        assert!(result.found);
        assert_eq!(result.source, ProductSource::OpenFoodFacts);
        assert!(result.error.is_none());

        let nutrition = result.product.unwrap().nutrition.unwrap();
        assert_eq!(nutrition.energy, "42 kcal");
        assert_eq!(nutrition.proteins, "");
        assert_eq!(nutrition.carbohydrates, "");
        assert_eq!(nutrition.fat, "");
    }

    #[tokio::test]
    async fn test_both_mirrors_report_status_zero() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .answer("zh.", FetchAnswer::Json(json!({"status": 0})))
                .answer("world.", FetchAnswer::Json(json!({"status": 0}))),
        );
        let resolver = resolver_with(fetcher.clone(), Arc::new(EventBus::new()));

        let result = resolver.query("6901234567892").await;

        assert!(!result.found);
        assert_eq!(result.source, ProductSource::OpenFoodFacts);
        assert_eq!(result.error.as_deref(), Some(NOT_FOUND_MESSAGE));

        let requested = fetcher.requested.lock().unwrap().clone();
        assert_eq!(requested.len(), 2);
        assert!(requested[0].contains("zh.openfoodfacts.org"));
        assert!(requested[1].contains("world.openfoodfacts.org"));
    }

    #[tokio::test]
    async fn test_falls_through_to_second_mirror() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .answer("zh.", FetchAnswer::Error(AppError::Http("HTTP 503".into())))
                .answer(
                    "world.",
                    FetchAnswer::Json(json!({"status": 1, "product": {"product_name_en": "Chips"}})),
                ),
        );
        let resolver = resolver_with(fetcher.clone(), Arc::new(EventBus::new()));

        let result = resolver.query("96385074").await;

        assert!(result.found);
        assert_eq!(result.product.unwrap().name, "Chips");
        assert_eq!(fetcher.request_count(), 2);
    }

    #[tokio::test]
    async fn test_last_error_is_reported() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .answer("zh.", FetchAnswer::Json(json!({"status": 0})))
                .answer("world.", FetchAnswer::Error(AppError::Http("HTTP 502".into()))),
        );
        let resolver = resolver_with(fetcher, Arc::new(EventBus::new()));

        let result = resolver.query("6901234567892").await;
        assert_eq!(result.error.as_deref(), Some("HTTP 502"));
        assert_eq!(resolver.last_error().as_deref(), Some("HTTP 502"));
        assert!(!resolver.is_loading());
    }

    #[tokio::test]
    async fn test_timeout_advances_to_next_mirror() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .answer("zh.", FetchAnswer::Hang)
                .answer("world.", FetchAnswer::Hang),
        );
        let resolver = resolver_with(fetcher.clone(), Arc::new(EventBus::new()));

        let result = resolver.query("6901234567892").await;

        assert!(!result.found);
        assert_eq!(result.error.as_deref(), Some(TIMEOUT_MESSAGE));
        assert_eq!(fetcher.request_count(), 2);
    }

    #[tokio::test]
    async fn test_malformed_body_is_folded_into_error() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .answer("zh.", FetchAnswer::Json(json!({"status": "ok"})))
                .answer("world.", FetchAnswer::Json(json!(["not", "an", "object"]))),
        );
        let resolver = resolver_with(fetcher, Arc::new(EventBus::new()));

        let result = resolver.query("6901234567892").await;
        assert!(!result.found);
        assert!(result.error.is_some());
        assert_ne!(result.error.as_deref(), Some(NOT_FOUND_MESSAGE));
    }

    #[tokio::test]
    async fn test_cancellation_stops_remaining_attempts() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .answer("zh.", FetchAnswer::Hang)
                .answer("world.", FetchAnswer::Json(json!({"status": 0}))),
        );
        let config = crate::config::ProductQueryConfig {
            timeout_ms: 60_000,
            ..test_config().product
        };
        let resolver = crate::services::product_resolver::ProductResolver::new(
            fetcher.clone(),
            &config,
            Arc::new(EventBus::new()),
        );

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = resolver.query_with_cancel("6901234567892", &cancel).await;
        assert_eq!(result.error.as_deref(), Some(CANCELLED_MESSAGE));
        assert_eq!(fetcher.request_count(), 1);
    }

    #[tokio::test]
    async fn test_state_and_events() {
        let bus = Arc::new(EventBus::new());
        let completed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&completed);
        bus.subscribe::<ProductQueryCompleted, _>(move |event| {
            assert!(event.found);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let fetcher = Arc::new(FakeFetcher::new().answer(
            "zh.",
            FetchAnswer::Json(json!({"status": 1, "product": {"product_name": "Tea"}})),
        ));
        let resolver = resolver_with(fetcher, bus);

        let result = resolver.query("6901234567892").await;
        assert_eq!(resolver.last_result(), Some(result));
        assert_eq!(completed.load(Ordering::SeqCst), 1);

        resolver.clear();
        assert!(resolver.last_result().is_none());
        assert!(resolver.last_error().is_none());
        assert!(!resolver.is_loading());
    }
}
