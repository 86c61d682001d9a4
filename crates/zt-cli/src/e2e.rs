use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use thirtyfour::extensions::cdp::ChromeDevTools;
use thirtyfour::prelude::*;
use thirtyfour::ChromeCapabilities;

use zt_core::Flag;

pub struct E2eOptions {
    pub chromedriver_url: String,
    pub extension_path: String,
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
    let load_arg = format!("--load-extension={}", extension_path.display());
    let mut args = vec![
        disable_arg.as_str(),
        load_arg.as_str(),
        "--no-first-run",
        "--no-default-browser-check",
        "--disable-default-apps",
    ];
    if opts.headless {
        args.extend(["--headless=new", "--disable-gpu"]);
    }
    for arg in args {
        caps.add_arg(arg)
            .map_err(|e| format!("Failed to set chrome arg: {}", e))?;
    }

    let driver = WebDriver::new(&opts.chromedriver_url, caps)
        .await
        .map_err(|e| format!("Failed to connect to chromedriver: {}", e))?;

    let cdp = ChromeDevTools::new(driver.handle.clone());
    tokio::time::sleep(Duration::from_secs(1)).await;

    let extension_id = match find_extension_id(&cdp).await {
        Some(id) => id,
        None => {
            driver.quit().await.ok();
            return Err("Failed to locate extension service worker".to_string());
        }
    };

    let mut errors = Vec::new();

    if let Err(e) = check_popup_toggles(&driver, &extension_id).await {
        errors.push(format!("Popup check failed: {}", e));
    }

    if let Err(e) = check_toggle_persists(&driver, &extension_id).await {
        errors.push(format!("Toggle persistence check failed: {}", e));
    }

    if let Err(e) = check_content_script(&driver).await {
        errors.push(format!("Content script check failed: {}", e));
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
        let is_background = matches!(target_type, "service_worker" | "background_page");
        if is_background && url.starts_with("chrome-extension://") {
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

fn popup_url(extension_id: &str) -> String {
    format!("chrome-extension://{}/popup/popup.html", extension_id)
}

async fn check_popup_toggles(driver: &WebDriver, extension_id: &str) -> Result<(), String> {
    driver.goto(&popup_url(extension_id))
        .await
        .map_err(|e| format!("Failed to open popup: {}", e))?;

    for flag in Flag::ALL {
        driver.find(By::Id(flag.storage_key()))
            .await
            .map_err(|e| format!("Missing toggle #{}: {}", flag.storage_key(), e))?;
    }
    Ok(())
}

async fn check_toggle_persists(driver: &WebDriver, extension_id: &str) -> Result<(), String> {
    let key = Flag::SuppressComments.storage_key();
    driver.goto(&popup_url(extension_id))
        .await
        .map_err(|e| format!("Failed to open popup: {}", e))?;

    let before = read_stored_flag(driver, key).await?;
    let toggle = driver.find(By::Id(key))
        .await
        .map_err(|e| format!("Missing toggle #{}: {}", key, e))?;
    // The checkbox is visually hidden behind a styled label, so click via script.
    driver.execute("arguments[0].click();", vec![toggle.to_json().map_err(|e| e.to_string())?])
        .await
        .map_err(|e| format!("Failed to click toggle: {}", e))?;
    tokio::time::sleep(Duration::from_millis(500)).await;

    let after = read_stored_flag(driver, key).await?;
    if after == before {
        return Err(format!("{} stayed {} after toggling", key, before));
    }
    Ok(())
}

async fn read_stored_flag(driver: &WebDriver, key: &str) -> Result<bool, String> {
    let script = r#"
        const done = arguments[arguments.length - 1];
        chrome.storage.sync.get([arguments[0]]).then((r) => done(r[arguments[0]] === true));
    "#;
    let result = driver.execute_async(script, vec![Value::from(key)])
        .await
        .map_err(|e| format!("Failed to read storage: {}", e))?;
    Ok(result.json().as_bool().unwrap_or(false))
}

async fn check_content_script(driver: &WebDriver) -> Result<(), String> {
    driver.goto("https://www.youtube.com/")
        .await
        .map_err(|e| format!("Failed to navigate to target site: {}", e))?;
    tokio::time::sleep(Duration::from_secs(1)).await;
    let injected = eval_bool(driver, "return document.documentElement.dataset.ztInjected === '1';")
        .await
        .map_err(|e| format!("Failed to read injected flag: {}", e))?;
    if !injected {
        return Err("Content script did not inject".to_string());
    }
    Ok(())
}

async fn eval_bool(driver: &WebDriver, script: &str) -> WebDriverResult<bool> {
    let result = driver.execute(script, Vec::<Value>::new()).await?;
    Ok(result.json().as_bool().unwrap_or(false))
}

fn canonicalize_path(path: &str) -> Result<PathBuf, String> {
    std::fs::canonicalize(path)
        .map_err(|e| format!("Failed to resolve '{}': {}", path, e))
}
