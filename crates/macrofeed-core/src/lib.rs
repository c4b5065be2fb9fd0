//! # Macrofeed Core
//!
//! Core contracts and fetch pipeline for the macrofeed macroeconomic data
//! toolkit: acquisition from multiple unreliable third-party APIs,
//! staleness-aware caching, and provenance-tagged fallback composition.
//!
//! ## Overview
//!
//! - **Canonical domain models** for indicators, regions, and time series
//! - **Provider adapters** normalizing each upstream's quirks
//! - **Fetch orchestrator** with parallel fan-out and per-call timeouts
//! - **Cache store** with TTL staleness metadata and JSON persistence
//! - **Fallback resolver** composing live, cached, and estimated data
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (World Bank, FRED, Open Exchange Rates, Numbeo) |
//! | [`cache`] | TTL-aware cache store |
//! | [`config`] | Typed configuration surface |
//! | [`cooldown`] | Per-provider backoff and degradation gate |
//! | [`data_source`] | Adapter contract and source errors |
//! | [`domain`] | Domain models (Indicator, Region, Series, DataPoint) |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`orchestrator`] | Fetch orchestration and fallback composition |
//! | [`policy`] | Freshness policies and provenance tags |
//! | [`provider_policy`] | Per-provider quotas and backoff tuning |
//! | [`resolve`] | Priority-wins merging and carry-forward estimation |
//! | [`source`] | Provider identifiers |
//! | [`throttling`] | Rate-limit budgets |
//!
//! ## Quick Start
//!
//! ```rust
//! use macrofeed_core::{
//!     FetchOrchestrator, FreshnessPolicy, Indicator, Region, Resolution, SeriesRequest,
//!     TimeRange,
//! };
//! use time::macros::date;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Offline orchestrator with deterministic mock providers.
//!     let orchestrator = FetchOrchestrator::builder().with_mock_providers().build();
//!
//!     let request = SeriesRequest::new(
//!         Indicator::InflationRate,
//!         Region::parse("US")?,
//!         TimeRange::new(date!(2024 - 01 - 01), date!(2025 - 06 - 01))?,
//!         Resolution::Monthly,
//!     );
//!
//!     let resolved = orchestrator.get(&request, FreshnessPolicy::EstimateOk).await?;
//!     println!("{} points via {}", resolved.series.len(), resolved.provenance);
//!     Ok(())
//! }
//! ```
//!
//! ## Trust levels
//!
//! Every result carries a [`Provenance`] tag; callers never silently
//! receive data without knowing whether it is `live`, `cached`,
//! `cached-stale`, or `estimated`. The pipeline degrades to visibly
//! lower-trust data rather than failing while any data exists.

pub mod adapters;
pub mod cache;
pub mod config;
pub mod cooldown;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod orchestrator;
pub mod policy;
pub mod provider_policy;
pub mod resolve;
pub mod source;
pub mod throttling;

// Re-export commonly used types at crate root for convenience

// Adapter implementations
pub use adapters::{FredAdapter, NumbeoAdapter, OpenExchangeAdapter, WorldBankAdapter};

// Caching
pub use cache::{CacheEntry, CacheKey, CacheSnapshot, CacheStore};

// Configuration
pub use config::{
    default_priorities, CachePolicy, FredConfig, NumbeoConfig, OpenExchangeConfig,
    WorldBankConfig,
};

// Provider gate
pub use cooldown::{GateDecision, ProviderGate};

// Data source trait and types
pub use data_source::{IndicatorSource, SeriesRequest, SourceError, SourceErrorKind};

// Domain models
pub use domain::{
    Confidence, DataPoint, Indicator, Region, RegionScope, Resolution, Series, TimeRange, Unit,
    UtcDateTime,
};

// Error types
pub use error::{CoreError, ValidationError};

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};

// Orchestration
pub use orchestrator::{
    FetchError, FetchOrchestrator, FetchOrchestratorBuilder, ResolveMeta, ResolvedSeries,
};

// Freshness and provenance
pub use policy::{FreshnessPolicy, Provenance};

// Provider policies
pub use provider_policy::{BackoffPolicy, ProviderPolicy};

// Resolution helpers
pub use resolve::{carry_forward, merge_live, LiveResult, MergedLive};

// Source identifiers
pub use source::ProviderId;

// Throttling
pub use throttling::RateBudget;
