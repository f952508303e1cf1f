//! Metrics recorder initialization and configuration.

use tracing::info;

use crate::Result;

/// Handle to the metrics system, providing access to exported metrics.
#[derive(Clone)]
pub struct MetricsHandle {
    #[cfg(feature = "prometheus")]
    prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl MetricsHandle {
    /// Render metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        #[cfg(feature = "prometheus")]
        {
            self.prometheus_handle.render()
        }
        #[cfg(not(feature = "prometheus"))]
        {
            String::new()
        }
    }
}

/// Configuration for the metrics system.
#[derive(Debug, Clone, Default)]
pub struct MetricsRecorderConfig {
    /// Whether metrics collection is enabled.
    pub enabled: bool,
    /// Prefix for all metric names (default: "signalrt").
    pub prefix: Option<String>,
    /// Global labels to add to all metrics.
    pub global_labels: Vec<(String, String)>,
}

/// Initialize the metrics system.
///
/// Call once at application startup. When the `prometheus` feature is
/// enabled this installs the Prometheus recorder; otherwise it returns a
/// handle whose `render()` is a no-op.
///
/// # Errors
///
/// Returns an error if the metrics system fails to initialize.
pub fn init_metrics(config: MetricsRecorderConfig) -> Result<MetricsHandle> {
    if !config.enabled {
        info!("metrics collection is disabled");
        return Ok(MetricsHandle {
            #[cfg(feature = "prometheus")]
            prometheus_handle: init_prometheus_disabled()?,
        });
    }

    #[cfg(feature = "prometheus")]
    {
        let handle = init_prometheus(config)?;
        info!("prometheus metrics exporter initialized");
        Ok(MetricsHandle {
            prometheus_handle: handle,
        })
    }

    #[cfg(not(feature = "prometheus"))]
    {
        info!("metrics feature not enabled at compile time");
        Ok(MetricsHandle {})
    }
}

#[cfg(feature = "prometheus")]
fn init_prometheus(
    config: MetricsRecorderConfig,
) -> Result<metrics_exporter_prometheus::PrometheusHandle> {
    use {crate::buckets, metrics_exporter_prometheus::PrometheusBuilder};

    let mut builder = PrometheusBuilder::new();

    builder = builder
        .set_buckets_for_metric(
            metrics_exporter_prometheus::Matcher::Suffix("_duration_seconds".to_string()),
            &buckets::HTTP_DURATION,
        )?
        .set_buckets_for_metric(
            metrics_exporter_prometheus::Matcher::Full(
                crate::worker::QUEUE_LATENCY_SECONDS.to_string(),
            ),
            &buckets::QUEUE_LATENCY,
        )?
        .set_buckets_for_metric(
            metrics_exporter_prometheus::Matcher::Full(crate::worker::QUEUE_DEPTH.to_string()),
            &buckets::QUEUE_SIZE,
        )?;

    for (key, value) in config.global_labels {
        builder = builder.add_global_label(key, value);
    }

    let handle = builder.install_recorder()?;

    Ok(handle)
}

#[cfg(feature = "prometheus")]
fn init_prometheus_disabled() -> Result<metrics_exporter_prometheus::PrometheusHandle> {
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;
    Ok(handle)
}
