//! Resolver micro-benchmark
//!
//! Measures full-scan resolution latency (partition + match + fold) over a
//! synthetic results page. The workload is seeded so runs are comparable.

use std::cmp::Ordering;
use std::time::Instant;

use hs_core::{resolve, Action, Config, DomainRule, ResultElement, ResultKind};

pub struct BenchOptions {
    /// Config record to benchmark against; synthesized when absent
    pub config_path: Option<String>,
    pub rules: usize,
    pub results: usize,
    pub iterations: usize,
    pub seed: u32,
}

const DEFAULT_SEED: u32 = 0xc0ffee;

pub fn run(opts: BenchOptions) -> Result<(), String> {
    println!("============================================================");
    println!("Hypersearch Resolver Benchmark");
    println!("============================================================");

    let rules = match &opts.config_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read '{}': {}", path, e))?;
            let config: Config = serde_json::from_str(&text)
                .map_err(|e| format!("Invalid config record '{}': {}", path, e))?;
            config.domains
        }
        None => generate_rules(opts.rules, opts.seed),
    };

    let elements = generate_results(opts.results, &rules, opts.seed ^ DEFAULT_SEED);

    println!("Rules:      {}", rules.len());
    println!("Results:    {}", elements.len());
    println!("Iterations: {}", opts.iterations);
    println!();

    println!("Warmup...");
    let mut sink = 0usize;
    for _ in 0..100 {
        sink ^= count_matches(&resolve(&elements, &rules));
    }

    println!("------------------------------------------------------------");
    println!("Benchmark: Full Scan Resolution");
    println!("------------------------------------------------------------");

    let mut latencies = Vec::with_capacity(opts.iterations);
    let start = Instant::now();
    for _ in 0..opts.iterations {
        let scan_start = Instant::now();
        let resolutions = resolve(&elements, &rules);
        latencies.push(scan_start.elapsed().as_secs_f64() * 1_000_000.0);
        sink ^= count_matches(&resolutions);
    }
    let total_ms = start.elapsed().as_secs_f64() * 1000.0;

    if sink == usize::MAX {
        println!("sink {}", sink);
    }

    latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let avg_us = latencies.iter().sum::<f64>() / latencies.len().max(1) as f64;
    let p50 = percentile(&latencies, 0.50);
    let p95 = percentile(&latencies, 0.95);
    let p99 = percentile(&latencies, 0.99);
    let scans_per_sec = if total_ms > 0.0 {
        (opts.iterations as f64 / (total_ms / 1000.0)) as u64
    } else {
        0
    };

    println!("  Scans:       {}", opts.iterations);
    println!("  Total time:  {:.2}ms", total_ms);
    println!("  Avg latency: {:.2}μs", avg_us);
    println!("  P50 latency: {:.2}μs", p50);
    println!("  P95 latency: {:.2}μs", p95);
    println!("  P99 latency: {:.2}μs", p99);
    println!("  Throughput:  {} scans/sec", scans_per_sec);
    println!();

    // One mutation-observer callback should stay well under a frame.
    println!("============================================================");
    println!("Summary");
    println!("============================================================");
    println!("Target: <5ms per scan (5000μs)");
    println!("Achieved: {:.2}μs P99", p99);
    println!(
        "Status: {}",
        if p99 < 5000.0 { "✓ PASS" } else { "✗ FAIL" }
    );

    Ok(())
}

fn count_matches(resolutions: &[hs_core::Resolution]) -> usize {
    resolutions
        .iter()
        .filter(|resolution| resolution.action != Action::None)
        .count()
}

fn create_rng(seed: u32) -> impl FnMut() -> f64 {
    let mut state = seed;
    move || {
        state = state.wrapping_mul(1664525).wrapping_add(1013904223);
        (state as f64) / (u32::MAX as f64)
    }
}

fn pick<T: Clone>(items: &[T], rand: &mut impl FnMut() -> f64) -> T {
    let idx = (rand() * items.len() as f64).floor() as usize;
    items[idx.min(items.len() - 1)].clone()
}

const BASE_DOMAINS: &[&str] = &[
    "example.com",
    "pinterest.com",
    "quora.com",
    "medium.com",
    "w3schools.com",
    "geeksforgeeks.org",
    "stackoverflow.com",
    "github.com",
    "reddit.com",
    "news.example.co.uk",
];

fn generate_rules(count: usize, seed: u32) -> Vec<DomainRule> {
    let mut rng = create_rng(seed);
    let mut rules = Vec::with_capacity(count);

    for i in 0..count {
        let base = pick(BASE_DOMAINS, &mut rng);
        let domain = if rng() < 0.3 {
            format!("sub{}.{}", i % 7, base)
        } else {
            format!("d{}.{}", i, base)
        };

        let mut rule = if rng() < 0.2 {
            DomainRule::pinned(domain)
        } else {
            DomainRule::hidden(domain)
        };
        rule.opts.strict = rng() < 0.3;
        rule.opts.override_others = rng() < 0.1;
        rules.push(rule);
    }

    rules
}

fn generate_results(count: usize, rules: &[DomainRule], seed: u32) -> Vec<ResultElement> {
    let mut rng = create_rng(seed);
    let mut elements = Vec::with_capacity(count);

    for _ in 0..count {
        // ~40% of results sit under a configured domain, like a page where
        // the user's rules actually bite
        let hostname = if !rules.is_empty() && rng() < 0.4 {
            let rule = pick(rules, &mut rng);
            if rng() < 0.5 {
                rule.domain
            } else {
                format!("tracker.{}", rule.domain)
            }
        } else {
            let base = pick(BASE_DOMAINS, &mut rng);
            if rng() < 0.5 {
                base.to_string()
            } else {
                format!("blog.{}", base)
            }
        };

        let kind = if rng() < 0.1 {
            ResultKind::Video
        } else if rng() < 0.05 {
            ResultKind::Social
        } else {
            ResultKind::Default
        };

        elements.push(ResultElement::new(kind, hostname));
    }

    elements
}
