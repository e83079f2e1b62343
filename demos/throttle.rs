//! Request throttle walkthrough.
//!
//! Run with `RUST_LOG=kalkulator=debug cargo run --example throttle` to see
//! the tracker's own log lines.

use kalkulator::{App, AppConfig, DeploymentMode, TrackerBuilder};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    println!("=== Request Throttle Example ===\n");

    // Example 1: Mode presets
    presets_example();

    println!("{}", "\n".to_owned() + "=".repeat(50).as_str() + "\n");

    // Example 2: Refresh on activity
    refresh_example();

    println!("{}", "\n".to_owned() + "=".repeat(50).as_str() + "\n");

    // Example 3: Shared across threads with the reaper running
    shared_example();
}

fn presets_example() {
    println!("1. Mode Presets:");

    for mode in [DeploymentMode::Development, DeploymentMode::Production] {
        let tracker = TrackerBuilder::new().mode(mode).build();
        let mut admitted = 0;

        for _ in 0..15 {
            if tracker.try_admit("weather-api") {
                admitted += 1;
            }
        }

        println!("   {:<12} admitted {}/15 in one burst", mode, admitted);
    }
}

fn refresh_example() {
    println!("2. Refresh on Activity:");

    let tracker = TrackerBuilder::new().max_events(3).window_ms(300).build();

    // Events every 200ms keep pushing the reset out
    for i in 1..=5 {
        let admitted = tracker.try_admit("geo-api");
        println!(
            "   t≈{:>4}ms request {} - {}",
            (i - 1) * 200,
            i,
            if admitted { "✅ Allowed" } else { "❌ Throttled" }
        );
        thread::sleep(Duration::from_millis(200));
    }

    // A full quiet window resets the key
    thread::sleep(Duration::from_millis(350));
    println!(
        "   after a quiet window: {}",
        if tracker.can_admit("geo-api") { "✅ Allowed" } else { "❌ Throttled" }
    );
}

fn shared_example() {
    println!("3. Shared Tracker:");

    let config = AppConfig::from_env().unwrap_or_else(|err| {
        eprintln!("   ignoring environment: {}", err);
        AppConfig::default()
    });
    let app = match App::new(config) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("   invalid configuration: {}", err);
            return;
        }
    };

    let reaper = app.start_reaper();
    let tracker = app.tracker();
    let mut handles = vec![];

    for worker in 0..4 {
        let tracker = Arc::clone(&tracker);
        handles.push(thread::spawn(move || {
            let key = format!("worker-{}", worker % 2);
            (0..5).filter(|_| tracker.try_admit(&key)).count()
        }));
    }

    for (worker, handle) in handles.into_iter().enumerate() {
        let admitted = handle.join().unwrap_or(0);
        println!("   worker {} admitted {}", worker, admitted);
    }

    for row in tracker.snapshot() {
        println!("   {:<10} {}", row.key, row.count);
    }
    println!("\n{}", tracker.stats().summary());

    if let Ok((handle, stop_tx)) = reaper {
        let _ = stop_tx.send(());
        let _ = handle.join();
    }
}
