// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Feature flags client holding a locally evaluated snapshot.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use vane_common_http::{retry, RetryConfig};
use vane_flags_core::{EvaluationContext, EvaluationResult, Snapshot};

use crate::error::{FlagsError, Result};
use crate::fetcher::{FetchOutcome, HttpSnapshotFetcher, SnapshotFetcher};

/// Configuration for the flags client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
	/// Delay between background syncs after `init`.
	pub refresh_interval: Duration,
	/// Timeout for a single snapshot request.
	pub request_timeout: Duration,
	/// Attempts and backoff for one `sync`.
	pub retry_config: RetryConfig,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			refresh_interval: Duration::from_secs(30),
			request_timeout: Duration::from_secs(10),
			retry_config: RetryConfig {
				max_attempts: 4,
				base_delay: Duration::from_secs(1),
				max_delay: Duration::from_secs(30),
				backoff_factor: 2.0,
				jitter: false,
			},
		}
	}
}

/// What a call to [`FlagsClient::sync`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
	/// A new snapshot replaced the held one.
	Updated { version: u64 },
	/// The server confirmed the held snapshot is current.
	NotModified,
	/// Every attempt failed; the held snapshot, if any, is unchanged.
	Failed { attempts: u32 },
	/// The client was closed before the sync started.
	Closed,
}

/// Builder for constructing a FlagsClient.
pub struct FlagsClientBuilder {
	api_key: Option<String>,
	base_url: Option<String>,
	config: ClientConfig,
	fetcher: Option<Arc<dyn SnapshotFetcher>>,
}

impl FlagsClientBuilder {
	pub fn new() -> Self {
		Self {
			api_key: None,
			base_url: None,
			config: ClientConfig::default(),
			fetcher: None,
		}
	}

	/// Sets the environment API key sent as a bearer token.
	pub fn api_key(mut self, key: impl Into<String>) -> Self {
		self.api_key = Some(key.into());
		self
	}

	/// Sets the base URL of the Vane server, e.g. `https://flags.example.com`.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());
		self
	}

	pub fn refresh_interval(mut self, interval: Duration) -> Self {
		self.config.refresh_interval = interval;
		self
	}

	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.config.request_timeout = timeout;
		self
	}

	pub fn retry_config(mut self, config: RetryConfig) -> Self {
		self.config.retry_config = config;
		self
	}

	/// Replaces the HTTP transport. API key and base URL are then not required.
	pub fn fetcher(mut self, fetcher: impl SnapshotFetcher + 'static) -> Self {
		self.fetcher = Some(Arc::new(fetcher));
		self
	}

	/// Builds the client without contacting the server; call
	/// [`FlagsClient::init`] to load the first snapshot.
	pub fn build(self) -> Result<FlagsClient> {
		let fetcher = match self.fetcher {
			Some(fetcher) => fetcher,
			None => {
				let api_key = self
					.api_key
					.filter(|k| !k.is_empty())
					.ok_or(FlagsError::InvalidApiKey)?;
				let base_url = self
					.base_url
					.filter(|u| !u.is_empty())
					.ok_or(FlagsError::InvalidBaseUrl)?;

				let http_client = vane_common_http::builder()
					.timeout(self.config.request_timeout)
					.build()
					.map_err(FlagsError::ConnectionFailed)?;

				Arc::new(HttpSnapshotFetcher::new(http_client, &base_url, api_key))
			}
		};

		let (closed, _) = watch::channel(false);

		Ok(FlagsClient {
			inner: Arc::new(ClientInner {
				fetcher,
				config: self.config,
				held: ArcSwapOption::empty(),
				consecutive_failures: AtomicU32::new(0),
				closed,
				sync_lock: AsyncMutex::new(()),
				refresh_task: Mutex::new(None),
			}),
		})
	}
}

impl Default for FlagsClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

struct HeldSnapshot {
	snapshot: Arc<Snapshot>,
	etag: Option<String>,
}

struct ClientInner {
	fetcher: Arc<dyn SnapshotFetcher>,
	config: ClientConfig,
	held: ArcSwapOption<HeldSnapshot>,
	consecutive_failures: AtomicU32,
	closed: watch::Sender<bool>,
	/// Held for a whole sync so a slower sync cannot store over a later one.
	sync_lock: AsyncMutex<()>,
	refresh_task: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl ClientInner {
	fn is_closed(&self) -> bool {
		*self.closed.borrow()
	}

	async fn sync(&self) -> SyncOutcome {
		if self.is_closed() {
			debug!("sync skipped, client closed");
			return SyncOutcome::Closed;
		}

		let _sync = self.sync_lock.lock().await;
		if self.is_closed() {
			debug!("queued sync skipped, client closed");
			return SyncOutcome::Closed;
		}

		let etag = self.held.load().as_ref().and_then(|h| h.etag.clone());
		let mut attempts = 0u32;
		let result = retry(&self.config.retry_config, || {
			attempts += 1;
			self.fetcher.fetch(etag.as_deref())
		})
		.await;

		match result {
			Ok(FetchOutcome::Modified { snapshot, etag }) => {
				let version = snapshot.version;
				self.held.store(Some(Arc::new(HeldSnapshot {
					snapshot: Arc::new(snapshot),
					etag,
				})));
				self.consecutive_failures.store(0, Ordering::SeqCst);
				info!(version, attempts, "flag snapshot updated");
				SyncOutcome::Updated { version }
			}
			Ok(FetchOutcome::NotModified) => {
				self.consecutive_failures.store(0, Ordering::SeqCst);
				debug!("flag snapshot unchanged");
				SyncOutcome::NotModified
			}
			Err(e) => {
				let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
				match self.held.load().as_ref() {
					Some(held) => warn!(
						error = %e,
						attempts,
						consecutive_failures = failures,
						version = held.snapshot.version,
						"snapshot sync failed, keeping previous snapshot"
					),
					None => warn!(
						error = %e,
						attempts,
						consecutive_failures = failures,
						"snapshot sync failed and no snapshot is held, evaluations return safe defaults"
					),
				}
				SyncOutcome::Failed { attempts }
			}
		}
	}
}

/// Client evaluating feature flags against a locally held snapshot.
///
/// Clones share the same snapshot and lifecycle. Evaluations never block on
/// the network: they read whichever snapshot the last successful sync stored,
/// and fail closed when a flag is unknown or no snapshot has been loaded.
#[derive(Clone)]
pub struct FlagsClient {
	inner: Arc<ClientInner>,
}

impl FlagsClient {
	pub fn builder() -> FlagsClientBuilder {
		FlagsClientBuilder::new()
	}

	/// Fetches the snapshot with retry and backoff.
	///
	/// Never fails the caller: when all attempts fail, the previously held
	/// snapshot stays in place and the failure is logged. Concurrent calls on
	/// the same client run one after another.
	pub async fn sync(&self) -> SyncOutcome {
		self.inner.sync().await
	}

	/// Runs a first sync, then keeps syncing every `refresh_interval` until
	/// [`close`](Self::close) is called. Calling `init` again only syncs.
	pub async fn init(&self) -> SyncOutcome {
		let outcome = self.sync().await;
		if outcome == SyncOutcome::Closed {
			return outcome;
		}

		let mut task = match self.inner.refresh_task.lock() {
			Ok(guard) => guard,
			Err(poisoned) => poisoned.into_inner(),
		};
		if task.is_none() {
			let inner = Arc::downgrade(&self.inner);
			let closed_rx = self.inner.closed.subscribe();
			let interval = self.inner.config.refresh_interval;
			*task = Some(tokio::spawn(refresh_loop(inner, closed_rx, interval)));
			info!(
				interval_secs = interval.as_secs(),
				"started background snapshot refresh"
			);
		}

		outcome
	}

	/// Stops future background syncs. A sync already in progress, including
	/// its backoff sleeps, runs to completion.
	pub fn close(&self) {
		if !self.inner.closed.send_replace(true) {
			info!("flags client closed");
		}
	}

	pub fn is_closed(&self) -> bool {
		self.inner.is_closed()
	}

	pub fn evaluate_flag(&self, key: &str, context: &EvaluationContext) -> EvaluationResult {
		match self.inner.held.load().as_ref() {
			Some(held) => held.snapshot.evaluate(key, context),
			None => EvaluationResult::safe_default(),
		}
	}

	pub fn is_enabled(&self, key: &str, context: &EvaluationContext) -> bool {
		self.evaluate_flag(key, context).enabled
	}

	pub fn get_variant(&self, key: &str, context: &EvaluationContext) -> String {
		self.evaluate_flag(key, context).variant
	}

	/// The currently held snapshot, if any sync has succeeded.
	pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
		self.inner.held.load().as_ref().map(|h| Arc::clone(&h.snapshot))
	}

	pub fn version(&self) -> Option<u64> {
		self.inner.held.load().as_ref().map(|h| h.snapshot.version)
	}

	/// Number of `sync` calls in a row that exhausted their attempts.
	pub fn consecutive_failures(&self) -> u32 {
		self.inner.consecutive_failures.load(Ordering::SeqCst)
	}
}

async fn refresh_loop(
	inner: Weak<ClientInner>,
	mut closed_rx: watch::Receiver<bool>,
	period: Duration,
) {
	let mut ticker = tokio::time::interval(period);
	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
	// The first tick completes immediately; init has just synced.
	ticker.tick().await;

	loop {
		tokio::select! {
			_ = ticker.tick() => {}
			_ = closed_rx.changed() => {}
		}

		if *closed_rx.borrow() {
			break;
		}
		let Some(inner) = inner.upgrade() else {
			break;
		};
		inner.sync().await;
	}

	debug!("background snapshot refresh stopped");
}
