/// Path to the SQLite database file. Defaults to `data/todos.db` relative to the working directory
/// when not provided.
pub const DB_PATH: &str = "TODO_DB_PATH";
/// Log level configuration for the application. For formatting info, see [EnvFilter's documentation](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// OpenTelemetry span export URL. Should be http://localhost:4317 when the service runs with an
/// OpenTelemetry collector sidecar. Spans are not exported when unset.
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 when the service runs with an
/// OpenTelemetry collector sidecar. Metrics are not exported when unset.
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";
