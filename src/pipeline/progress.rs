// file: src/pipeline/progress.rs
// description: run stage tracking and process-wide counters for the prospectus pipeline
// reference: uses indicatif for the CLI stage bar and atomics for request metrics

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Run states: `Idle → Searching → Selecting → Fetching → Extracting → Cached
/// → Summarizing → AnswerReady`. Question answering re-enters at `Cached`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStage {
    Idle,
    Searching,
    Selecting,
    Fetching,
    Extracting,
    Cached,
    Summarizing,
    AnswerReady,
}

impl PipelineStage {
    pub fn step(&self) -> u64 {
        match self {
            PipelineStage::Idle => 0,
            PipelineStage::Searching => 1,
            PipelineStage::Selecting => 2,
            PipelineStage::Fetching => 3,
            PipelineStage::Extracting => 4,
            PipelineStage::Cached => 5,
            PipelineStage::Summarizing => 6,
            PipelineStage::AnswerReady => 7,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Searching => "searching",
            PipelineStage::Selecting => "selecting candidate",
            PipelineStage::Fetching => "fetching document",
            PipelineStage::Extracting => "extracting text",
            PipelineStage::Cached => "cached",
            PipelineStage::Summarizing => "summarizing",
            PipelineStage::AnswerReady => "ready",
        };
        f.write_str(label)
    }
}

/// Reports stage transitions for one pipeline run. The server uses a hidden
/// tracker; the CLI draws a bar.
pub struct ProgressTracker {
    bar: ProgressBar,
    history: Mutex<Vec<PipelineStage>>,
    started: Instant,
}

impl ProgressTracker {
    pub fn new(colored: bool) -> Self {
        let bar = ProgressBar::new(PipelineStage::AnswerReady.step());
        bar.set_style(stage_style(colored));
        Self::with_bar(bar)
    }

    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        Self {
            bar,
            history: Mutex::new(vec![PipelineStage::Idle]),
            started: Instant::now(),
        }
    }

    pub fn set_stage(&self, stage: PipelineStage) {
        self.bar.set_position(stage.step());
        self.bar.set_message(stage.to_string());

        let previous = match self.history.lock() {
            Ok(mut history) => {
                let previous = history.last().copied().unwrap_or(PipelineStage::Idle);
                history.push(stage);
                previous
            }
            Err(_) => PipelineStage::Idle,
        };

        debug!(
            "Pipeline stage: {} -> {} at {:.2}s",
            previous,
            stage,
            self.elapsed().as_secs_f64()
        );
    }

    /// Time since the tracker was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn stage(&self) -> PipelineStage {
        self.history
            .lock()
            .ok()
            .and_then(|h| h.last().copied())
            .unwrap_or(PipelineStage::Idle)
    }

    pub fn history(&self) -> Vec<PipelineStage> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn finish(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn stage_style(colored: bool) -> ProgressStyle {
    let template = if colored {
        "{spinner:.green} [{elapsed_precise}] [{bar:21.cyan/blue}] {pos}/{len} {msg}"
    } else {
        "{spinner} [{elapsed_precise}] [{bar:21}] {pos}/{len} {msg}"
    };

    ProgressStyle::default_bar()
        .template(template)
        .map(|style| style.progress_chars(if colored { "█▓▒░" } else { "=>-" }))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineStats {
    pub summaries_served: usize,
    pub summaries_failed: usize,
    pub not_found: usize,
    pub answers_served: usize,
    pub answers_failed: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub uptime_secs: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            return 0.0;
        }
        (self.cache_hits as f64 / total as f64) * 100.0
    }

    pub fn summary_success_rate(&self) -> f64 {
        let total = self.summaries_served + self.summaries_failed + self.not_found;
        if total == 0 {
            return 0.0;
        }
        (self.summaries_served as f64 / total as f64) * 100.0
    }
}

/// Process-wide request counters.
pub struct PipelineCounters {
    summaries_served: AtomicUsize,
    summaries_failed: AtomicUsize,
    not_found: AtomicUsize,
    answers_served: AtomicUsize,
    answers_failed: AtomicUsize,
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
    start_time: Instant,
}

impl PipelineCounters {
    pub fn new() -> Self {
        Self {
            summaries_served: AtomicUsize::new(0),
            summaries_failed: AtomicUsize::new(0),
            not_found: AtomicUsize::new(0),
            answers_served: AtomicUsize::new(0),
            answers_failed: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
            cache_misses: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn inc_summaries_served(&self) {
        self.summaries_served.fetch_add(1, Ordering::SeqCst);
    }

    pub fn inc_summaries_failed(&self) {
        self.summaries_failed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn inc_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::SeqCst);
    }

    pub fn inc_answers_served(&self) {
        self.answers_served.fetch_add(1, Ordering::SeqCst);
    }

    pub fn inc_answers_failed(&self) {
        self.answers_failed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_cache_lookup(&self, hit: bool) {
        if hit {
            self.cache_hits.fetch_add(1, Ordering::SeqCst);
        } else {
            self.cache_misses.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            summaries_served: self.summaries_served.load(Ordering::SeqCst),
            summaries_failed: self.summaries_failed.load(Ordering::SeqCst),
            not_found: self.not_found.load(Ordering::SeqCst),
            answers_served: self.answers_served.load(Ordering::SeqCst),
            answers_failed: self.answers_failed.load(Ordering::SeqCst),
            cache_hits: self.cache_hits.load(Ordering::SeqCst),
            cache_misses: self.cache_misses.load(Ordering::SeqCst),
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for PipelineCounters {
    fn default() -> Self {
        Self::new()
    }
}
