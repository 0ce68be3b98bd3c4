// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP transport tests against a mock server.

use std::time::Duration;

use serde_json::json;
use vane_common_http::RetryableError;
use vane_flags::{
	EvaluationContext, EvaluationReason, FetchOutcome, FlagsClient, FlagsError,
	HttpSnapshotFetcher, RetryConfig, SnapshotFetcher, SyncOutcome,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "ff_test_key";

fn snapshot_body(version: u64) -> serde_json::Value {
	json!({
		"environmentId": "production",
		"version": version,
		"flags": {
			"new-checkout": {
				"enabled": true,
				"defaultVariant": "control",
				"variants": ["treatment"],
				"rules": [],
				"rollout": { "type": "PERCENT", "percentage": 25, "stickinessKey": "userId" }
			}
		}
	})
}

fn fast_retry() -> RetryConfig {
	RetryConfig {
		max_attempts: 4,
		base_delay: Duration::from_millis(5),
		max_delay: Duration::from_millis(50),
		backoff_factor: 2.0,
		jitter: false,
	}
}

fn fetcher(server: &MockServer) -> HttpSnapshotFetcher {
	HttpSnapshotFetcher::new(reqwest::Client::new(), &server.uri(), API_KEY)
}

#[tokio::test]
async fn test_fetch_sends_bearer_key_and_reads_etag() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/v1/flags/snapshot"))
		.and(header("authorization", format!("Bearer {API_KEY}").as_str()))
		.respond_with(
			ResponseTemplate::new(200)
				.insert_header("etag", "\"v3\"")
				.set_body_json(snapshot_body(3)),
		)
		.expect(1)
		.mount(&server)
		.await;

	match fetcher(&server).fetch(None).await.unwrap() {
		FetchOutcome::Modified { snapshot, etag } => {
			assert_eq!(snapshot.version, 3);
			assert_eq!(etag.as_deref(), Some("\"v3\""));
			assert!(snapshot.flag("new-checkout").is_some());
		}
		other => panic!("expected snapshot, got {other:?}"),
	}
}

#[tokio::test]
async fn test_fetch_with_current_etag_is_not_modified() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/v1/flags/snapshot"))
		.and(header("if-none-match", "\"v3\""))
		.respond_with(ResponseTemplate::new(304))
		.mount(&server)
		.await;

	let outcome = fetcher(&server).fetch(Some("\"v3\"")).await.unwrap();
	assert_eq!(outcome, FetchOutcome::NotModified);
}

#[tokio::test]
async fn test_non_success_status_is_retryable_error() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
		.mount(&server)
		.await;

	let err = fetcher(&server).fetch(None).await.unwrap_err();
	match &err {
		FlagsError::ServerError { status, message } => {
			assert_eq!(*status, 401);
			assert_eq!(message, "Invalid API key");
		}
		other => panic!("expected server error, got {other:?}"),
	}
	assert!(err.is_retryable());
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
		.mount(&server)
		.await;

	let err = fetcher(&server).fetch(None).await.unwrap_err();
	assert!(matches!(err, FlagsError::ParseFailed(_)));
}

#[tokio::test]
async fn test_client_gives_up_after_four_attempts() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/v1/flags/snapshot"))
		.respond_with(ResponseTemplate::new(500))
		.expect(4)
		.mount(&server)
		.await;

	let client = FlagsClient::builder()
		.api_key(API_KEY)
		.base_url(server.uri())
		.retry_config(fast_retry())
		.build()
		.unwrap();

	assert_eq!(client.sync().await, SyncOutcome::Failed { attempts: 4 });
	assert!(client.snapshot().is_none());
	assert_eq!(client.consecutive_failures(), 1);
}

#[tokio::test]
async fn test_client_evaluates_fetched_snapshot() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/v1/flags/snapshot"))
		.respond_with(
			ResponseTemplate::new(200)
				.insert_header("etag", "\"v5\"")
				.set_body_json(snapshot_body(5)),
		)
		.mount(&server)
		.await;

	let client = FlagsClient::builder()
		.api_key(API_KEY)
		.base_url(format!("{}/", server.uri()))
		.retry_config(fast_retry())
		.build()
		.unwrap();

	assert_eq!(client.init().await, SyncOutcome::Updated { version: 5 });

	let included = EvaluationContext::new().with_attribute("userId", "user-2");
	let result = client.evaluate_flag("new-checkout", &included);
	assert!(result.enabled);
	assert_eq!(result.variant, "treatment");
	assert_eq!(result.reason, EvaluationReason::Rollout);

	let excluded = EvaluationContext::new().with_attribute("userId", "user-1");
	assert!(!client.is_enabled("new-checkout", &excluded));
	assert_eq!(client.get_variant("new-checkout", &excluded), "control");

	client.close();
	assert!(client.is_closed());
}
