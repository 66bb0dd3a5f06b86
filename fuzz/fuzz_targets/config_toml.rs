#![no_main]

use edgeload::config::types::ConfigFile;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let parsed: Option<ConfigFile> = toml::from_str(input).ok();
        if edgeload::fuzzing::apply_config_from_toml(input).is_ok() {
            if let Some(config) = parsed {
                debug_assert!(config.url.is_none() || config.target.is_none());
                if let Some(requests) = config.requests {
                    debug_assert!(requests > 0);
                }
                if let Some(concurrency) = config.concurrency {
                    debug_assert!(concurrency > 0);
                }
            }
        }
    }
});
