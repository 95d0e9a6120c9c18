//! Hit/miss, delegate, and prune counters (feature `metrics`).

pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use exporter::PrometheusTextExporter;
pub use metrics_impl::MemoMetrics;
pub use snapshot::MemoMetricsSnapshot;
pub use traits::{
    CoreMetricsRecorder, MemoMetricsRecorder, MetricsExporter, MetricsReset,
    MetricsSnapshotProvider,
};
