//! End-to-end warnings pass: fetch → normalize → aggregate → cluster →
//! reconcile → hotspots.
//!
//! Nothing in a run is fatal. Transport failures become empty layers,
//! malformed features become counters, and an empty coordinate set becomes
//! an empty clustering result, so the caller always gets a well-formed
//! `WarningReport`.

use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::analysis::aggregate::aggregate_layers;
use crate::analysis::dbscan::{ClusterParams, cluster_coordinates};
use crate::analysis::hotspots::{Hotspot, summarize_hotspots};
use crate::analysis::reconcile::reconcile_labels;
use crate::config::WarningsConfig;
use crate::ingest::arcgis::LayerSource;
use crate::layers::feature_layers;
use crate::logging::{self, DataSource};
use crate::model::{LayerId, LayerSummary, NormalizedEvent};

/// Result of one warnings pass, shaped for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct WarningReport {
    pub generated_at: DateTime<Utc>,
    /// Category → annotated events, categories in first-seen order.
    pub events: IndexMap<String, Vec<NormalizedEvent>>,
    pub layer_summaries: BTreeMap<LayerId, LayerSummary>,
    pub failed_layers: Vec<LayerId>,
    pub total_events: usize,
    pub cluster_count: usize,
    pub noise_count: usize,
    pub hotspots: Vec<Hotspot>,
}

/// Runs the full warnings pass against `source`.
pub fn run_warnings_pipeline<S: LayerSource + ?Sized>(
    source: &S,
    warnings: &WarningsConfig,
    params: &ClusterParams,
) -> WarningReport {
    let layers = feature_layers(&warnings.layers, &warnings.category_field, &warnings.events);
    let filter = layers.first().map(|l| l.filter.as_str()).unwrap_or_default();
    logging::debug(
        DataSource::Warnings,
        None,
        &format!("Querying {} layers with filter: {}", layers.len(), filter),
    );

    let mut aggregation = aggregate_layers(source, &layers, &warnings.category_field);
    let clusters = cluster_coordinates(&aggregation.coordinates, params);
    let labeled = reconcile_labels(&mut aggregation, &clusters);
    logging::debug(DataSource::Cluster, None, &format!("Labeled {} events", labeled));

    let hotspots = summarize_hotspots(&aggregation.events);

    WarningReport {
        generated_at: Utc::now(),
        total_events: aggregation.total_events(),
        events: aggregation.events,
        layer_summaries: aggregation.layer_summaries,
        failed_layers: aggregation.failed_layers,
        cluster_count: clusters.cluster_count,
        noise_count: clusters.noise_count,
        hotspots,
    }
}

/// Writes the report as pretty-printed JSON.
pub fn write_report(report: &WarningReport, path: &str) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)?;
    Ok(())
}

pub fn print_summary(report: &WarningReport) {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("WARNING HOTSPOT SUMMARY  ({})", report.generated_at.format("%Y-%m-%d %H:%M UTC"));
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!("Layer   Features   Valid   Invalid");
    for (layer, s) in &report.layer_summaries {
        let marker = if report.failed_layers.contains(layer) { "  (query failed)" } else { "" };
        println!(
            "{:>5} {:>10} {:>7} {:>9}{}",
            layer, s.total_features, s.valid_coordinates, s.invalid_geometries, marker
        );
    }
    println!();
    for (event_type, events) in &report.events {
        println!("  {:<26} {:>5} events", event_type, events.len());
    }
    println!();
    println!(
        "Events: {}   Clusters: {}   Noise: {}",
        report.total_events, report.cluster_count, report.noise_count
    );
    for h in &report.hotspots {
        println!(
            "  cluster {:>3}: {:>4} events near ({:.3}, {:.3})",
            h.cluster_id, h.event_count, h.latitude, h.longitude
        );
    }
    println!("═══════════════════════════════════════════════════════════");
}
