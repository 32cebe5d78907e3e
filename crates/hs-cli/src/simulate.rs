//! Scan simulation against a JSON fixture
//!
//! Replays the content script's classify-resolve pipeline over a fixture
//! of result probes, so rule sets can be checked without a browser.

use std::fs;

use serde::Deserialize;

use hs_core::{classify_all, resolve, Action, Config, ResultProbe};

/// One candidate result in the fixture file.
#[derive(Debug, Deserialize)]
struct FixtureResult {
    /// `href` of the result's first anchor; absent models a linkless result
    #[serde(default)]
    href: Option<String>,
    #[serde(default)]
    video: bool,
    #[serde(default)]
    social: bool,
}

pub fn run(config_path: &str, fixture_path: &str) -> Result<(), String> {
    let config_text = fs::read_to_string(config_path)
        .map_err(|e| format!("Failed to read '{}': {}", config_path, e))?;
    let config: Config = serde_json::from_str(&config_text)
        .map_err(|e| format!("Invalid config record '{}': {}", config_path, e))?;

    let fixture_text = fs::read_to_string(fixture_path)
        .map_err(|e| format!("Failed to read '{}': {}", fixture_path, e))?;
    let fixture: Vec<FixtureResult> = serde_json::from_str(&fixture_text)
        .map_err(|e| format!("Invalid fixture '{}': {}", fixture_path, e))?;

    let probes: Vec<ResultProbe> = fixture
        .iter()
        .map(|result| ResultProbe {
            has_video_slot: result.video,
            has_social_section: result.social,
            anchor_href: result.href.clone(),
        })
        .collect();

    let classified = classify_all(&probes);
    let elements: Vec<_> = classified
        .iter()
        .map(|(_, element)| element.clone())
        .collect();
    let resolutions = resolve(&elements, &config.domains);

    println!(
        "Simulating {} results against {} rules",
        fixture.len(),
        config.domains.len()
    );
    println!();

    let mut removed = 0usize;
    let mut pinned = 0usize;

    let by_index: std::collections::HashMap<usize, (usize, &hs_core::ResultElement)> = classified
        .iter()
        .enumerate()
        .map(|(slot, (probe_index, element))| (*probe_index, (slot, element)))
        .collect();

    for index in 0..probes.len() {
        let Some((slot, element)) = by_index.get(&index) else {
            println!("  [{}] (skipped: no usable anchor)", index);
            continue;
        };
        let resolution = &resolutions[*slot];

        match resolution.action {
            Action::Remove => removed += 1,
            Action::Pin => pinned += 1,
            Action::None => {}
        }
        let rule = resolution
            .rule_index
            .map(|i| config.domains[i].domain.as_str())
            .unwrap_or("-");
        println!(
            "  [{}] {:<40} {:<8} {:<8} rule: {}",
            index,
            element.hostname,
            format!("{:?}", element.kind).to_lowercase(),
            resolution.action.to_string(),
            rule
        );
    }

    println!();
    println!("Results:  {}", fixture.len());
    println!("  Matched:  {} removed, {} pinned", removed, pinned);
    println!("  Neutral:  {}", elements.len() - removed - pinned);
    println!("  Skipped:  {}", fixture.len() - elements.len());

    Ok(())
}
