//! Logger setup built on `tracing-subscriber`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the filter enables `default_level` for
/// the given binary's crate and for `tower_http` request traces.
///
/// # Arguments
///
/// * `bin_name` - Binary name (e.g. `env!("CARGO_BIN_NAME")`); dashes are mapped to
///   underscores to match the crate target
/// * `default_level` - Level used when `RUST_LOG` is not set (e.g. "info")
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(bin_name, default_level)));

    // A second call (e.g. from several tests) keeps the first subscriber.
    if tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .is_ok()
    {
        tracing::debug!("Logger initialized for {} (default level: {})", bin_name, default_level);
    }
}

fn default_directives(bin_name: &str, default_level: &str) -> String {
    let target = bin_name.replace('-', "_");
    format!("{target}={default_level},tower_http={default_level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_maps_dashes() {
        // テスト項目: バイナリ名のハイフンがアンダースコアに変換される
        // when (操作):
        let directives = default_directives("hiroba-server", "debug");

        // then (期待する結果):
        assert_eq!(directives, "hiroba_server=debug,tower_http=debug");
    }
}
