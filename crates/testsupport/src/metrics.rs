use anyhow::{bail, Result};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Metrics {
    /// Plain samples (counters and gauges) plus histogram `_count` values.
    pub counters: HashMap<String, f64>,
    pub histograms: HashMap<String, HistogramData>,
}

#[derive(Debug, Default)]
pub struct HistogramData {
    pub buckets: HashMap<String, f64>,
    pub sum: f64,
    pub count: f64,
}

/// Reads the Prometheus text exposition format produced by `/metrics`.
pub fn prom_parse(text: &str) -> Result<Metrics> {
    let mut metrics = Metrics::default();

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((series, value)) = line.rsplit_once(' ') else {
            bail!("malformed sample line: {line}");
        };
        let value: f64 = value.trim().parse()?;
        let (name, labels) = match series.split_once('{') {
            Some((name, rest)) => (name, rest.trim_end_matches('}')),
            None => (series, ""),
        };

        if let Some(base) = name.strip_suffix("_bucket") {
            let le = label_value(labels, "le").unwrap_or_else(|| "unknown".to_string());
            metrics
                .histograms
                .entry(base.to_string())
                .or_default()
                .buckets
                .insert(le, value);
        } else if let Some(base) = name.strip_suffix("_sum") {
            metrics.histograms.entry(base.to_string()).or_default().sum = value;
        } else {
            if let Some(base) = name.strip_suffix("_count") {
                metrics.histograms.entry(base.to_string()).or_default().count = value;
            }
            metrics.counters.insert(name.to_string(), value);
        }
    }

    Ok(metrics)
}

fn label_value(labels: &str, key: &str) -> Option<String> {
    labels.split(',').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k.trim() == key).then(|| v.trim().trim_matches('"').to_string())
    })
}
