use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Setup tracing for a test run
///
/// Silent unless `RUST_LOG` is set:
/// ```bash
/// RUST_LOG=mqtt_topic_index=trace cargo test --test topic_matching
/// ```
/// Safe to call from every test; only the first call installs a subscriber.
pub fn setup() {
	if std::env::var("RUST_LOG").is_err() {
		return;
	}

	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| "info".into());

	let _ = tracing_subscriber::registry()
		.with(filter)
		.with(
			tracing_subscriber::fmt::layer()
				.with_target(true)
				.with_test_writer()
				.compact(),
		)
		.try_init();
}
