//! Basic usage example of the memo-kit cache.

use memo_kit::{error::Result, CacheService, Memoizer};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Example value: User
#[derive(Clone, Serialize, Deserialize, Debug)]
struct User {
    id: u64,
    name: String,
    email: String,
}

/// Simulates an expensive computation (report generation, API call, ...).
async fn expensive_report(quarter: &str, year: u16) -> Result<String> {
    println!("  [COMPUTE] Building report for {} {}...", quarter, year);
    tokio::time::sleep(Duration::from_millis(200)).await;
    Ok(format!("Report for {} {}: all good", quarter, year))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .try_init()
        .ok();

    println!("\n=== Memo Kit - Basic Example ===\n");

    // 1. Initialize the cache
    println!("1. Initializing cache service...");
    let cache = CacheService::new();
    println!("   ✓ Cache ready\n");

    // 2. Typed set/get
    println!("2. Storing and fetching a typed value:");
    let user = User {
        id: 1,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
    };
    cache.set("user:1", &user, None).await?;

    if let Some(cached) = cache.get::<User>("user:1").await? {
        println!("   ✓ User loaded from cache: {} <{}>\n", cached.name, cached.email);
    }

    // 3. TTL expiration
    println!("3. TTL expiration (500ms entry):");
    cache
        .set("session:abc", &"token-xyz", Some(Duration::from_millis(500)))
        .await?;
    println!(
        "   Before expiry: {:?}",
        cache.get::<String>("session:abc").await?
    );
    tokio::time::sleep(Duration::from_millis(600)).await;
    println!(
        "   After expiry:  {:?}\n",
        cache.get::<String>("session:abc").await?
    );

    // 4. Atomic counters
    println!("4. Atomic counters:");
    for _ in 0..3 {
        cache.increment("page_views", 1).await?;
    }
    let views = cache.increment("page_views", 0).await?;
    println!("   ✓ page_views = {}", views);
    let floored = cache.decrement("page_views", 100).await?;
    println!("   ✓ decrement floors at zero: {}\n", floored);

    // 5. Memoization - the second call returns instantly from the cache
    println!("5. Memoizing an expensive computation:");
    let memo = Memoizer::new(cache.clone());

    let start = Instant::now();
    let report = memo
        .call("report", &("q3", 2026u16), || expensive_report("q3", 2026))
        .await?;
    println!("   First call:  {:?} -> {}", start.elapsed(), report);

    let start = Instant::now();
    let report = memo
        .call("report", &("q3", 2026u16), || expensive_report("q3", 2026))
        .await?;
    println!("   Second call: {:?} -> {} (cached)\n", start.elapsed(), report);

    // 6. Multi-key reads
    println!("6. Fetching several keys at once:");
    cache.set("color:1", &"red", None).await?;
    cache.set("color:2", &"green", None).await?;
    let colors = cache
        .get_multi::<String>(&["color:1", "color:2", "color:3"])
        .await?;
    println!("   ✓ Found {} of 3 requested keys: {:?}\n", colors.len(), colors);

    // 7. Statistics
    println!("7. Cache statistics:");
    let stats = cache.stats().await;
    println!(
        "   items: {}, hits: {}, misses: {}, bytes: {}, tracked keys: {}",
        stats.items, stats.hits, stats.misses, stats.total_bytes, stats.tracked_keys
    );
    println!("   hit rate: {:.1}%\n", stats.hit_rate() * 100.0);

    // 8. Flush
    println!("8. Flushing the cache:");
    cache.flush().await;
    println!("   ✓ Items after flush: {}\n", cache.stats().await.items);

    println!("=== Example Complete ===\n");

    Ok(())
}
