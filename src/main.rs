//! Prio TTL Cache demo
//!
//! Replays a short workload on a manual clock and logs what the eviction
//! pass does at each step.

use anyhow::Result;
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prio_ttl_cache::{Cache, Config, ManualClock};

/// Main entry point for the demo.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Fill a five-slot cache across three priority classes
/// 4. Advance the clock and shrink the cache so expired entries go first
/// 5. Overflow again with nothing expired so the lowest class pays
fn main() -> Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prio_ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_items={}, default_ttl_ms={}",
        config.max_items, config.default_ttl_ms
    );

    let clock = ManualClock::new(0);
    let mut cache = Cache::with_clock(5, clock.clone())?;

    cache.set_item("A", json!("alpha"), 5, Some(10_000))?;
    cache.set_item("B", json!("bravo"), 15, Some(30_000))?;
    cache.set_item("C", json!("charlie"), 5, Some(10_000))?;
    cache.set_item("D", json!("delta"), 1, Some(15_000))?;
    cache.set_item("E", json!("echo"), 5, Some(1_500))?;
    cache.get_item("A");
    info!("Filled: {:?}", cache.keys());

    clock.set(12_000);
    cache.set_max_items(4)?;
    info!("After expiry at t=12000ms and resize to 4: {:?}", cache.keys());

    cache.set_item("F", json!("foxtrot"), 20, Some(60_000))?;
    cache.set_item("G", json!("golf"), 20, Some(60_000))?;
    cache.set_item("H", json!("hotel"), 20, Some(60_000))?;
    info!("After overflow with nothing expired: {:?}", cache.keys());

    info!("Stats: {}", serde_json::to_string(&cache.stats())?);
    Ok(())
}
