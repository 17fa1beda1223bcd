//! Timestamp formatting and process shutdown helpers.

use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Wire and storage format for all timestamps: `YYYY-MM-DDTHH:MM:SSZ`.
pub const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

/// Format a UTC timestamp as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_timestamp(ts: OffsetDateTime) -> Result<String, time::error::Format> {
    ts.format(&TIMESTAMP_FORMAT)
}

/// Parse a stored `YYYY-MM-DDTHH:MM:SSZ` timestamp back into UTC.
pub fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(raw, &TIMESTAMP_FORMAT).map(PrimitiveDateTime::assume_utc)
}

/// Current UTC time truncated to whole seconds, so the stored value equals
/// the reported one after a round-trip through the wire format.
pub fn now_utc_second() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}

/// Serde helper for fields carrying [`OffsetDateTime`].
pub fn serialize_timestamp<S>(ts: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let rendered = format_timestamp(*ts).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&rendered)
}

/// Wait for Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .unwrap_or_else(|e| tracing::error!("failed to install Ctrl+C handler: {}", e));
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
