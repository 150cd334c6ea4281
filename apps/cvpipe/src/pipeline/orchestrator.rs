//! Batch orchestrator — chunked dispatch over a bounded worker pool.
//!
//! Documents are processed in consecutive fixed-size chunks; within a
//! chunk, up to `worker_count` extractions run concurrently and the
//! chunk completes as a unit before the next begins. A pacing pause
//! between chunks (never after the last) throttles throughput against
//! provider rate limits. Completion order inside a chunk is
//! unspecified; chunk order is preserved.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::loader::DocumentRef;
use crate::pipeline::worker::ExtractionWorker;
use crate::pipeline::ExtractionResult;
use crate::usage::{UsageMeter, UsageStats};

/// Per-format success accounting in the run statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatStats {
    pub total: usize,
    pub successful: usize,
}

/// Aggregate outcome of one extraction run, serialized as the
/// `statistics` block of the output file. Built once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatistics {
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub processing_time: String,
    pub processing_time_seconds: f64,
    pub format_statistics: BTreeMap<String, FormatStats>,
    pub api_usage: UsageStats,
}

impl RunStatistics {
    fn from_results(
        results: &[ExtractionResult],
        elapsed_seconds: f64,
        api_usage: UsageStats,
    ) -> Self {
        let mut format_statistics: BTreeMap<String, FormatStats> = BTreeMap::new();
        for result in results {
            let entry = format_statistics
                .entry(result.metadata.file_type.clone())
                .or_insert(FormatStats {
                    total: 0,
                    successful: 0,
                });
            entry.total += 1;
            if result.is_success() {
                entry.successful += 1;
            }
        }

        let successful = results.iter().filter(|r| r.is_success()).count();

        Self {
            total_processed: results.len(),
            successful,
            failed: results.len() - successful,
            processing_time: format_processing_time(elapsed_seconds),
            processing_time_seconds: (elapsed_seconds * 100.0).round() / 100.0,
            format_statistics,
            api_usage,
        }
    }
}

/// Converts seconds to a "5m 30s" display string.
pub fn format_processing_time(seconds: f64) -> String {
    let minutes = (seconds / 60.0) as u64;
    let remaining = (seconds % 60.0) as u64;
    format!("{minutes}m {remaining}s")
}

pub struct BatchOrchestrator {
    worker: ExtractionWorker,
    meter: Arc<UsageMeter>,
    config: PipelineConfig,
}

impl BatchOrchestrator {
    pub fn new(worker: ExtractionWorker, meter: Arc<UsageMeter>, config: PipelineConfig) -> Self {
        Self {
            worker,
            meter,
            config,
        }
    }

    /// Processes every document and returns one result per document
    /// plus the run statistics. Per-document failures are recorded in
    /// the results; this method itself cannot fail.
    pub async fn run(&self, documents: &[DocumentRef]) -> (Vec<ExtractionResult>, RunStatistics) {
        let started = Instant::now();
        let batch_size = self.config.batch_size.max(1);
        let worker_count = self.config.worker_count.max(1);

        let mut format_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        for doc in documents {
            *format_counts.entry(doc.format.extension()).or_insert(0) += 1;
        }
        info!("Found files by format: {format_counts:?}");
        info!("Starting to process {} resumes", documents.len());

        let chunk_count = documents.len().div_ceil(batch_size);
        let mut all_results: Vec<ExtractionResult> = Vec::with_capacity(documents.len());

        for (index, chunk) in documents.chunks(batch_size).enumerate() {
            info!("Processing batch {} of {chunk_count}", index + 1);

            let mut chunk_results: Vec<ExtractionResult> =
                stream::iter(chunk.iter().map(|doc| self.worker.extract(doc)))
                    .buffer_unordered(worker_count)
                    .collect()
                    .await;
            all_results.append(&mut chunk_results);

            // Pacing between chunks, never after the last
            if index + 1 < chunk_count && !self.config.pacing.is_zero() {
                tokio::time::sleep(self.config.pacing).await;
            }
        }

        let stats = RunStatistics::from_results(
            &all_results,
            started.elapsed().as_secs_f64(),
            self.meter.get_stats(),
        );

        info!(
            "Run complete: {} successful, {} failed in {}",
            stats.successful, stats.failed, stats.processing_time
        );

        (all_results, stats)
    }
}

#[derive(Serialize)]
struct RunReport<'a> {
    resumes: &'a [ExtractionResult],
    statistics: &'a RunStatistics,
}

/// Writes the run report to `output_path`, creating parent directories
/// as needed. This is the orchestration-fatal path: an unwritable
/// output location aborts the run.
pub fn write_report(
    output_path: &Path,
    results: &[ExtractionResult],
    statistics: &RunStatistics,
) -> Result<(), PipelineError> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let report = RunReport {
        resumes: results,
        statistics,
    };
    fs::write(output_path, serde_json::to_string_pretty(&report)?)?;
    info!("Results saved to {}", output_path.display());
    Ok(())
}
