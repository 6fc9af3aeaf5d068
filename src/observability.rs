//! Observability hooks for the strategy cascade.
//!
//! The cascade picks one of nine layouts per key set, and which one it picked is
//! the first thing anyone debugging a slow or surprising parser wants to know.
//! Decisions go through the `log` facade; the `log_metric!` macro adds structured
//! key-value records on top, and only exists in debug builds.

use std::sync::Once;

use log::LevelFilter;

/// Logs a structured key-value metric record, only in debug builds.
///
/// Records are emitted at `trace` level under the `perfkey::metric` target so they
/// can be filtered independently of ordinary log output.
///
/// # Example
/// ```
/// use perfkey::log_metric;
/// let keys = 4;
/// log_metric!("event"="select_strategy", "strategy"="single_byte", "keys"=&keys);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            // Collect each pair as a JSON string fragment
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+

            $crate::__log::trace!(target: "perfkey::metric", "PERFKEY_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` backend that prints every cascade decision at `level`.
///
/// Safe to call more than once; only the first call installs the logger, and an
/// already-installed global logger is left untouched.
pub fn enable_verbose_logging(level: LevelFilter) {
    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(level);

        // Custom formatter: just print the level and message
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        let _ = builder.try_init();
    });
}
