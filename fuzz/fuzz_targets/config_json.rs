#![no_main]

use edgeload::config::types::ConfigFile;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let parsed: Option<ConfigFile> = serde_json::from_slice(data).ok();
    if edgeload::fuzzing::apply_config_from_json(data).is_ok() {
        if let Some(config) = parsed {
            debug_assert!(config.url.is_none() || config.target.is_none());
        }
    }
});
