use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use thirtyfour::extensions::cdp::ChromeDevTools;
use thirtyfour::prelude::*;
use thirtyfour::ChromeCapabilities;

pub struct E2eOptions {
    pub chromedriver_url: String,
    pub extension_path: String,
    pub search_url: String,
    pub headless: bool,
}

pub fn run_e2e(opts: E2eOptions) -> Result<(), String> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to start tokio runtime: {}", e))?;
    runtime.block_on(run_e2e_async(opts))
}

async fn run_e2e_async(opts: E2eOptions) -> Result<(), String> {
    let extension_path = canonicalize_path(&opts.extension_path)?;

    let mut caps = ChromeCapabilities::new();
    let disable_arg = format!("--disable-extensions-except={}", extension_path.display());
    caps.add_arg(&disable_arg)
        .map_err(|e| format!("Failed to set chrome arg: {}", e))?;
    let load_arg = format!("--load-extension={}", extension_path.display());
    caps.add_arg(&load_arg)
        .map_err(|e| format!("Failed to set chrome arg: {}", e))?;
    caps.add_arg("--no-first-run")
        .map_err(|e| format!("Failed to set chrome arg: {}", e))?;
    caps.add_arg("--no-default-browser-check")
        .map_err(|e| format!("Failed to set chrome arg: {}", e))?;
    caps.add_arg("--disable-default-apps")
        .map_err(|e| format!("Failed to set chrome arg: {}", e))?;
    if opts.headless {
        caps.add_arg("--headless=new")
            .map_err(|e| format!("Failed to set chrome arg: {}", e))?;
        caps.add_arg("--disable-gpu")
            .map_err(|e| format!("Failed to set chrome arg: {}", e))?;
    }

    let driver = WebDriver::new(&opts.chromedriver_url, caps)
        .await
        .map_err(|e| format!("Failed to connect to chromedriver: {}", e))?;

    let cdp = ChromeDevTools::new(driver.handle.clone());
    tokio::time::sleep(Duration::from_secs(1)).await;

    let extension_id = find_extension_id(&cdp)
        .await
        .ok_or_else(|| "Failed to locate extension context".to_string())?;

    let mut errors = Vec::new();

    if let Err(e) = check_page_has_selector(
        &driver,
        &format!("chrome-extension://{}/popup/popup.html", extension_id),
        "#confirm-input",
    )
    .await
    {
        errors.push(format!("Popup page check failed: {}", e));
    }

    if let Err(e) = seed_config(&driver, &extension_id).await {
        errors.push(format!("Config seeding failed: {}", e));
    }

    if let Err(e) = check_scan_results(&driver, &opts.search_url).await {
        errors.push(format!("Scan checks failed: {}", e));
    }

    driver.quit().await.ok();

    if errors.is_empty() {
        println!("✓ E2E checks passed");
        Ok(())
    } else {
        Err(format!("E2E failed:\n- {}", errors.join("\n- ")))
    }
}

async fn find_extension_id(cdp: &ChromeDevTools) -> Option<String> {
    let targets = cdp.execute_cdp("Target.getTargets").await.ok()?;
    let infos = targets.get("targetInfos")?.as_array()?;
    for info in infos {
        let target_type = info.get("type").and_then(Value::as_str).unwrap_or("");
        let url = info.get("url").and_then(Value::as_str).unwrap_or("");
        let is_extension_context =
            target_type == "background_page" || target_type == "service_worker";
        if is_extension_context && url.starts_with("chrome-extension://") {
            let id = url.trim_start_matches("chrome-extension://");
            if let Some(id) = id.split('/').next() {
                if !id.is_empty() {
                    return Some(id.to_string());
                }
            }
        }
    }
    None
}

async fn check_page_has_selector(driver: &WebDriver, url: &str, selector: &str) -> WebDriverResult<()> {
    driver.goto(url).await?;
    driver.find(By::Css(selector)).await?;
    Ok(())
}

/// Persist a rule set the scan checks can assert against: w3schools.com
/// hidden lazily, stackoverflow.com pinned.
async fn seed_config(driver: &WebDriver, extension_id: &str) -> Result<(), String> {
    let url = format!("chrome-extension://{}/popup/popup.html", extension_id);
    driver
        .goto(&url)
        .await
        .map_err(|e| format!("Failed to open popup page: {}", e))?;

    let script = r#"
        const done = arguments[0];
        const config = {
            domains: [
                { domain: "w3schools.com", opts: { strict: false, pinned: false, override: false } },
                { domain: "stackoverflow.com", opts: { strict: false, pinned: true, override: false } },
            ],
            opts: { debug: true, streamlining: {
                shopping: true, graph: true, snippets: true, questions: true,
                related: true, images: true, videos: true, definitions: true,
            } },
        };
        (globalThis.browser ?? globalThis.chrome).storage.local
            .set({ config })
            .then(() => done(true), () => done(false));
    "#;
    let result = driver
        .execute_async(script, Vec::<Value>::new())
        .await
        .map_err(|e| format!("Failed to seed config: {}", e))?;
    if !result.json().as_bool().unwrap_or(false) {
        return Err("storage.local.set did not resolve".to_string());
    }
    Ok(())
}

async fn check_scan_results(driver: &WebDriver, search_url: &str) -> Result<(), String> {
    driver
        .goto(search_url)
        .await
        .map_err(|e| format!("Failed to navigate to '{}': {}", search_url, e))?;

    // give the content script time to finish its initial scan
    tokio::time::sleep(Duration::from_secs(2)).await;

    let marked = eval_usize(
        driver,
        "return document.querySelectorAll('div.g[data-hypersearch-opts]').length;",
    )
    .await
    .map_err(|e| format!("Failed to count marked results: {}", e))?;
    if marked == 0 {
        return Err("Content script did not mark any results".to_string());
    }

    let controls = eval_usize(
        driver,
        "return document.querySelectorAll('.hypersearch-opts').length;",
    )
    .await
    .map_err(|e| format!("Failed to count injected controls: {}", e))?;
    if controls == 0 {
        return Err("No control affordances were injected".to_string());
    }

    let hidden = eval_usize(
        driver,
        "return document.querySelectorAll('[data-hypersearch-hidden]').length;",
    )
    .await
    .map_err(|e| format!("Failed to count hidden results: {}", e))?;
    if hidden == 0 {
        return Err("Expected at least one result hidden by the seeded rule".to_string());
    }

    Ok(())
}

async fn eval_usize(driver: &WebDriver, script: &str) -> WebDriverResult<usize> {
    let result = driver.execute(script, Vec::<Value>::new()).await?;
    Ok(result.json().as_u64().unwrap_or(0) as usize)
}

fn canonicalize_path(path: &str) -> Result<PathBuf, String> {
    std::fs::canonicalize(path)
        .map_err(|e| format!("Failed to resolve '{}': {}", path, e))
}
