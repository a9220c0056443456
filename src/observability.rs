use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::model::StoreDocument;

// ── Booking activity ────────────────────────────────────────────

/// Counter: bookings accepted by `create`.
pub const BOOKINGS_CREATED_TOTAL: &str = "roombook_bookings_created_total";

/// Counter: creates refused because of an overlapping active booking.
pub const CONFLICTS_TOTAL: &str = "roombook_conflicts_total";

/// Counter: bookings removed by delete. Labels: collection.
pub const BOOKINGS_DELETED_TOTAL: &str = "roombook_bookings_deleted_total";

/// Counter: bookings moved into the archive by a sweep.
pub const BOOKINGS_ARCHIVED_TOTAL: &str = "roombook_bookings_archived_total";

/// Counter: archive clear requests.
pub const ARCHIVE_CLEARS_TOTAL: &str = "roombook_archive_clears_total";

// ── Store state ─────────────────────────────────────────────────

/// Gauge: bookings currently active.
pub const BOOKINGS_ACTIVE: &str = "roombook_bookings_active";

/// Gauge: bookings currently archived.
pub const BOOKINGS_PAST: &str = "roombook_bookings_past";

/// Histogram: time to write and rename the data file, in seconds.
pub const PERSIST_DURATION_SECONDS: &str = "roombook_persist_duration_seconds";

/// Histogram: size of each persisted document in bytes.
pub const PERSIST_BYTES: &str = "roombook_persist_bytes";

/// Serve `/metrics` on `port` when one is configured.
pub fn init(port: Option<u16>) -> Result<(), BuildError> {
    let Some(port) = port else {
        tracing::debug!("metrics exporter disabled");
        return Ok(());
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!("metrics endpoint: http://{addr}/metrics");
    Ok(())
}

/// Publish collection sizes after the document changes.
pub fn record_sizes(doc: &StoreDocument) {
    metrics::gauge!(BOOKINGS_ACTIVE).set(doc.bookings.len() as f64);
    metrics::gauge!(BOOKINGS_PAST).set(doc.past.len() as f64);
}
