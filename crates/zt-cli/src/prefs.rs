use std::fs;

use serde::Serialize;

use zt_core::rules::active_rules;
use zt_core::store::{load_preferences, MemoryStore};
use zt_core::{Flag, PreferenceSet};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PrefsReport {
    pub enabled: Vec<&'static str>,
    pub suppressed_selectors: Vec<&'static str>,
    pub pause_on_tab_leave: bool,
    pub ignored_keys: Vec<String>,
}

pub fn cmd_prefs(input: &str, json: bool) -> Result<(), String> {
    let text = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read '{}': {}", input, e))?;
    let report = evaluate(&text)?;

    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Failed to encode report: {}", e))?;
        println!("{out}");
        return Ok(());
    }

    println!("Preferences: {}", input);
    if report.enabled.is_empty() {
        println!("  Enabled:     (none)");
    } else {
        println!("  Enabled:     {}", report.enabled.join(", "));
    }
    println!("  Pause on tab leave: {}", if report.pause_on_tab_leave { "yes" } else { "no" });
    println!();
    println!("Suppressed regions:");
    for selector in &report.suppressed_selectors {
        println!("  {}", selector);
    }
    if !report.ignored_keys.is_empty() {
        println!();
        println!("Ignored keys: {}", report.ignored_keys.join(", "));
    }
    Ok(())
}

/// Resolve a storage export through the same store read the page agent uses.
pub fn evaluate(text: &str) -> Result<PrefsReport, String> {
    let store = MemoryStore::from_json(text).map_err(|e| e.to_string())?;
    let ignored_keys = store
        .snapshot()
        .into_keys()
        .filter(|key| Flag::from_storage_key(key).is_none())
        .collect();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|e| format!("Failed to start tokio runtime: {}", e))?;
    let prefs: PreferenceSet = runtime
        .block_on(load_preferences(&store))
        .map_err(|e| e.to_string())?;

    Ok(PrefsReport {
        enabled: prefs.enabled().map(|flag| flag.name()).collect(),
        suppressed_selectors: active_rules(prefs).map(|rule| rule.selector).collect(),
        pause_on_tab_leave: prefs.is_enabled(Flag::PauseOnTabLeave),
        ignored_keys,
    })
}
