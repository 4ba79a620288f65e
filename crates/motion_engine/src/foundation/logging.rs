//! Logging setup

/// Initialize the logging system
///
/// Uses `RUST_LOG` when set, otherwise logs at `default_level`.
pub fn init(default_level: log::LevelFilter) {
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();
}

/// Initialize logging for tests; repeated calls are ignored
pub fn init_for_tests() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .parse_default_env()
        .is_test(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_for_tests_can_run_twice() {
        init_for_tests();
        init_for_tests();
        log::debug!("logger installed");
    }
}
