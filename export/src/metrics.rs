use std::sync::Once;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

static REGISTER_METRICS: Once = Once::new();

pub const EXPORT_RECORDS_READ_TOTAL: &str = "export_records_read_total";
pub const EXPORT_RECORDS_WRITTEN_TOTAL: &str = "export_records_written_total";
pub const EXPORT_RECORDS_DROPPED_TOTAL: &str = "export_records_dropped_total";
pub const EXPORT_BATCH_SIZE: &str = "export_batch_size";
pub const EXPORT_BATCH_WRITE_DURATION_SECONDS: &str = "export_batch_write_duration_seconds";

/// Register metrics emitted by the export crate. This should be called before starting
/// a pipeline. It is safe to call this method multiple times. It is guaranteed to
/// register the metrics only once.
pub(crate) fn register_metrics() {
    REGISTER_METRICS.call_once(|| {
        describe_counter!(
            EXPORT_RECORDS_READ_TOTAL,
            Unit::Count,
            "Total number of records fetched from the source"
        );

        describe_counter!(
            EXPORT_RECORDS_WRITTEN_TOTAL,
            Unit::Count,
            "Total number of formatted records delivered to the destination"
        );

        describe_counter!(
            EXPORT_RECORDS_DROPPED_TOTAL,
            Unit::Count,
            "Total number of records dropped due to per-record formatting failures"
        );

        describe_gauge!(
            EXPORT_BATCH_SIZE,
            Unit::Count,
            "Number of records in the batch currently being processed"
        );

        describe_histogram!(
            EXPORT_BATCH_WRITE_DURATION_SECONDS,
            Unit::Seconds,
            "Time taken in seconds to flush a batch of formatted records to the destination"
        );
    });
}
