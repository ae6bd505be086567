/*!
 * Batch scheduling across a fixed number of concurrent lanes.
 *
 * The input list is cut into contiguous chunks, one per lane. Each lane is a
 * tokio task that converts its chunk strictly in order; lanes run concurrently
 * and `run` returns once all of them are done. The lane count is the only
 * bound on in-flight translation requests.
 */

use futures::future::join_all;
use log::error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::conversion::{ConversionTask, RetryingConverter};
use crate::progress::BatchSummary;

/// Input files split into ordered lanes of ordered tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    lanes: Vec<Vec<ConversionTask>>,
}

impl BatchPlan {
    /// Split `files` into exactly `lane_count` contiguous chunks of
    /// `ceil(len / lane_count)` tasks; trailing lanes may be short or empty.
    pub fn partition(files: &[PathBuf], lane_count: usize, source_format: &str) -> Self {
        let lane_count = lane_count.max(1);
        let chunk_size = files.len().div_ceil(lane_count).max(1);

        let mut lanes: Vec<Vec<ConversionTask>> = files
            .chunks(chunk_size)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|path| ConversionTask::new(path.clone(), source_format))
                    .collect()
            })
            .collect();
        lanes.resize_with(lane_count, Vec::new);

        Self { lanes }
    }

    pub fn lanes(&self) -> &[Vec<ConversionTask>] {
        &self.lanes
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn total_tasks(&self) -> usize {
        self.lanes.iter().map(Vec::len).sum()
    }

    pub fn into_lanes(self) -> Vec<Vec<ConversionTask>> {
        self.lanes
    }
}

/// Drives a file list through the retrying converter on concurrent lanes
pub struct BatchScheduler {
    converter: Arc<RetryingConverter>,
    lane_count: usize,
    source_format: String,
}

impl BatchScheduler {
    pub const DEFAULT_LANE_COUNT: usize = 8;

    pub fn new(converter: Arc<RetryingConverter>, source_format: impl Into<String>) -> Self {
        Self {
            converter,
            lane_count: Self::DEFAULT_LANE_COUNT,
            source_format: source_format.into(),
        }
    }

    pub fn lane_count(mut self, lane_count: usize) -> Self {
        self.lane_count = lane_count.max(1);
        self
    }

    /// Convert every file and wait for all lanes to finish.
    ///
    /// Per-file failures never stop a lane; an empty list starts no lane.
    pub async fn run(&self, files: &[PathBuf]) -> BatchSummary {
        let start_time = Instant::now();
        let counters = Arc::clone(self.converter.converter().counters());
        let reporter = self.converter.converter().reporter().clone();

        if files.is_empty() {
            return BatchSummary {
                total: 0,
                counts: counters.snapshot(),
                elapsed: start_time.elapsed(),
            };
        }

        let plan = BatchPlan::partition(files, self.lane_count, &self.source_format);
        let total = plan.total_tasks();
        reporter.run_started(total, plan.lane_count());

        let mut lane_ids = Vec::with_capacity(plan.lane_count());
        let mut handles = Vec::with_capacity(plan.lane_count());
        let mut offset = 0;
        for (lane, tasks) in plan.into_lanes().into_iter().enumerate() {
            if tasks.is_empty() {
                continue;
            }
            let lane_offset = offset;
            offset += tasks.len();

            let converter = Arc::clone(&self.converter);
            let reporter = reporter.clone();
            lane_ids.push(lane);
            handles.push(tokio::spawn(async move {
                for (index, task) in tasks.iter().enumerate() {
                    reporter.task_started(lane, lane_offset + index + 1, total, task.path());
                    converter.convert_with_retry(task, lane).await;
                }
            }));
        }

        for (lane, result) in lane_ids.into_iter().zip(join_all(handles).await) {
            if let Err(e) = result {
                error!("Lane task {} aborted: {}", lane + 1, e);
            }
        }

        let summary = BatchSummary {
            total,
            counts: counters.snapshot(),
            elapsed: start_time.elapsed(),
        };
        reporter.run_finished(&summary);
        summary
    }
}
