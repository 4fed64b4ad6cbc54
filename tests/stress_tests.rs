//! Stress tests for concurrent dispatch and reload
//!
//! These tests verify:
//! - The per-dispatch concurrency bound holds under load
//! - Concurrent resolvers of one name share a single handle
//! - Reloads racing with dispatch never lose or duplicate entries
//! - High-volume detached logging drains completely on shutdown

use async_trait::async_trait;
use rust_logger_core::prelude::*;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

/// Records how many writes were running at once
#[derive(Clone, Default)]
struct Gauge {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

struct GaugedProvider {
    gauge: Gauge,
    delay: Duration,
}

#[async_trait]
impl LogProvider for GaugedProvider {
    async fn write(&self, _entry: &LogEntry) -> Result<()> {
        let now = self.gauge.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.gauge.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.gauge.current.fetch_sub(1, Ordering::SeqCst);
        self.gauge.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "gauged"
    }
}

fn gauged_logger(concurrency: usize, providers: usize, gauge: &Gauge) -> Logger {
    let mut builder = Logger::builder().concurrency_level(concurrency);
    for _ in 0..providers {
        builder = builder.provider(GaugedProvider {
            gauge: gauge.clone(),
            delay: Duration::from_millis(15),
        });
    }
    builder.build()
}

/// No more than C provider writes run at once within a dispatch
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_bound_holds() {
    for concurrency in 1..=4 {
        let gauge = Gauge::default();
        let logger = gauged_logger(concurrency, 8, &gauge);

        logger
            .log(LogEntry::new(LogLevel::Info, "bounded"), Some(DispatchMode::Blocking), None)
            .await
            .expect("all writes succeed");

        assert_eq!(gauge.writes.load(Ordering::SeqCst), 8);
        let peak = gauge.peak.load(Ordering::SeqCst);
        assert!(
            peak <= concurrency,
            "concurrency {} exceeded: peak was {}",
            concurrency,
            peak
        );
    }
}

/// A bound of C allows C writes to overlap, so the dispatch is actually parallel
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_bound_is_used() {
    let gauge = Gauge::default();
    let logger = gauged_logger(4, 8, &gauge);

    logger
        .log(LogEntry::new(LogLevel::Info, "parallel"), Some(DispatchMode::Blocking), None)
        .await
        .unwrap();

    assert!(gauge.peak.load(Ordering::SeqCst) > 1);
}

/// Concurrent resolvers of the same name all receive the same handle
#[test]
fn test_concurrent_resolve_shares_handle() {
    let config = LoggingConfiguration::new(ConfigSection::root(json!([
        { "name": "A" },
        { "name": "B" }
    ])));

    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let config = config.clone();
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                let name = if i % 2 == 0 { "A" } else { "B" };
                config.resolve(name).expect("resolve")
            })
        })
        .collect();

    let resolved: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("Thread panicked"))
        .collect();

    for (i, handle) in resolved.iter().enumerate() {
        let first = &resolved[i % 2];
        assert!(Arc::ptr_eq(first, handle));
    }
    assert_eq!(config.cached_names(), vec!["A", "B"]);
    assert_eq!(config.live_handles(), 2);
}

/// Racing resolvers of one name build its logger exactly once
#[test]
fn test_concurrent_resolve_constructs_once() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&constructed);

    let mut registry = ProviderRegistry::new();
    registry.register_provider("counted", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        // Widen the window for a duplicate construction
        std::thread::sleep(Duration::from_millis(20));
        Ok(MemoryLogProvider::new())
    });

    let config = LoggingConfiguration::builder(ConfigSection::root(json!({
        "name": "shared",
        "providers": "counted"
    })))
    .registry(registry)
    .build();

    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let config = config.clone();
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                config.resolve("shared").expect("resolve")
            })
        })
        .collect();

    let resolved: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("Thread panicked"))
        .collect();

    assert_eq!(constructed.load(Ordering::SeqCst), 1);
    assert!(resolved.iter().all(|handle| Arc::ptr_eq(handle, &resolved[0])));
    assert_eq!(config.live_handles(), 1);
}

/// Entries logged while the configuration flips land exactly once
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reload_during_dispatch_loses_nothing() {
    let left = MemoryLogProvider::named("left");
    let right = MemoryLogProvider::named("right");

    let mut registry = ProviderRegistry::new();
    let (l, r) = (left.clone(), right.clone());
    registry.register_provider("left", move |_| Ok(l.clone()));
    registry.register_provider("right", move |_| Ok(r.clone()));

    let config = LoggingConfiguration::builder(ConfigSection::root(json!({ "providers": "left" })))
        .registry(registry)
        .build();
    let handle = config.resolve(DEFAULT_LOGGER_NAME).unwrap();

    let producers = 8;
    let per_producer = 100;
    let mut tasks = Vec::new();
    for p in 0..producers {
        let handle = Arc::clone(&handle);
        tasks.push(tokio::spawn(async move {
            for i in 0..per_producer {
                handle
                    .log(
                        LogEntry::new(LogLevel::Info, format!("{}-{}", p, i)),
                        Some(DispatchMode::Blocking),
                        None,
                    )
                    .await
                    .expect("dispatch");
            }
        }));
    }

    let flipper = {
        let config = config.clone();
        tokio::spawn(async move {
            for round in 0..20 {
                let target = if round % 2 == 0 { "right" } else { "left" };
                config.update(ConfigSection::root(json!({ "providers": target })));
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
    };

    for task in tasks {
        task.await.expect("producer panicked");
    }
    flipper.await.expect("flipper panicked");

    let total = left.len() + right.len();
    assert_eq!(total, producers * per_producer);
    assert_eq!(handle.reload_count(), 20);
}

/// Many detached entries from many tasks all arrive before shutdown returns
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_high_volume_detached_drains_on_shutdown() {
    let memory = MemoryLogProvider::new();
    let logger = Arc::new(
        Logger::builder()
            .block_until_complete(false)
            .provider(memory.clone())
            .provider(MemoryLogProvider::named("second"))
            .build(),
    );

    let mut tasks = Vec::new();
    for t in 0..10 {
        let logger = Arc::clone(&logger);
        tasks.push(tokio::spawn(async move {
            for i in 0..200 {
                logger.log_detached(LogEntry::new(LogLevel::Info, format!("{}:{}", t, i)), None);
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert!(logger.shutdown(Duration::from_secs(10)).await);
    assert_eq!(memory.len(), 2000);
    assert_eq!(logger.metrics().dispatched_count(), 2000);
    assert_eq!(logger.metrics().dropped_count(), 0);
}

/// Detached calls racing shutdown are either drained or dropped, never
/// written after shutdown returns
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_detached_racing_shutdown_never_writes_late() {
    let gauge = Gauge::default();
    let logger = Arc::new(
        Logger::builder()
            .provider(GaugedProvider {
                gauge: gauge.clone(),
                delay: Duration::from_millis(1),
            })
            .build(),
    );

    let producers = 8;
    let per_producer = 200;
    let mut tasks = Vec::new();
    for p in 0..producers {
        let logger = Arc::clone(&logger);
        tasks.push(tokio::spawn(async move {
            for i in 0..per_producer {
                logger.log_detached(LogEntry::new(LogLevel::Info, format!("{}:{}", p, i)), None);
                tokio::task::yield_now().await;
            }
        }));
    }

    tokio::time::sleep(Duration::from_millis(5)).await;
    assert!(logger.shutdown(Duration::from_secs(10)).await);
    let written_at_shutdown = gauge.writes.load(Ordering::SeqCst);

    for task in tasks {
        task.await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    let written = gauge.writes.load(Ordering::SeqCst);
    assert_eq!(written, written_at_shutdown);
    assert_eq!(logger.in_flight(), 0);
    assert_eq!(
        written as u64 + logger.metrics().dropped_count(),
        (producers * per_producer) as u64
    );
}

/// Context providers shared across threads stay consistent under contention
#[test]
fn test_static_context_concurrent_updates() {
    let context = StaticContextProvider::new();
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let context = context.clone();
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                for i in 0..500 {
                    let _guard = context.scoped(format!("t{}", t), i);
                    let entry = LogEntry::new(LogLevel::Info, "x");
                    let props = context.contribute(&entry).expect("contribute");
                    assert!(props.contains_key(&format!("t{}", t)));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }
    assert!(context.is_empty());
}
