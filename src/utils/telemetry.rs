//! Telemetry Module
//!
//! In-memory counters of pages served. Nothing about the visitor is
//! recorded, only which page variant went out and how long it took.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::{AppResult, Strategy};

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TelemetryStats {
    /// Pages rendered with a frame
    pub frame_pages: u64,
    /// Pages rendered with a redirect
    pub redirect_pages: u64,
    /// Descriptor (JSON) requests
    pub descriptors_served: u64,
    /// Requests rejected for bad overrides
    pub rejected_requests: u64,
    /// Average render latency (ms)
    pub avg_render_ms: f64,
    /// Period start timestamp
    pub period_start: u64,
    /// Period end timestamp
    pub period_end: u64,
}

impl TelemetryStats {
    pub fn total_pages(&self) -> u64 {
        self.frame_pages + self.redirect_pages
    }
}

/// Lock-free counters shared across handlers
pub struct TelemetryCollector {
    frame_pages: AtomicU64,
    redirect_pages: AtomicU64,
    descriptors_served: AtomicU64,
    rejected_requests: AtomicU64,
    total_render_micros: AtomicU64,
    period_start: u64,
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            frame_pages: AtomicU64::new(0),
            redirect_pages: AtomicU64::new(0),
            descriptors_served: AtomicU64::new(0),
            rejected_requests: AtomicU64::new(0),
            total_render_micros: AtomicU64::new(0),
            period_start: current_timestamp(),
        }
    }

    pub fn record_page(&self, strategy: Strategy, render_micros: u64) {
        match strategy {
            Strategy::FrameEmbed => self.frame_pages.fetch_add(1, Ordering::Relaxed),
            Strategy::AutoRedirect => self.redirect_pages.fetch_add(1, Ordering::Relaxed),
        };
        self.total_render_micros
            .fetch_add(render_micros, Ordering::Relaxed);
    }

    pub fn record_descriptor(&self) {
        self.descriptors_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> TelemetryStats {
        let frame_pages = self.frame_pages.load(Ordering::Relaxed);
        let redirect_pages = self.redirect_pages.load(Ordering::Relaxed);
        let pages = frame_pages + redirect_pages;
        let avg_render_ms = if pages > 0 {
            self.total_render_micros.load(Ordering::Relaxed) as f64 / pages as f64 / 1000.0
        } else {
            0.0
        };

        TelemetryStats {
            frame_pages,
            redirect_pages,
            descriptors_served: self.descriptors_served.load(Ordering::Relaxed),
            rejected_requests: self.rejected_requests.load(Ordering::Relaxed),
            avg_render_ms,
            period_start: self.period_start,
            period_end: current_timestamp(),
        }
    }

    /// Write current stats to `<dir>/stats_<timestamp>.json`
    pub fn export_stats_json(&self, dir: &Path) -> AppResult<PathBuf> {
        fs::create_dir_all(dir)?;
        let stats = self.get_stats();
        let filename = format!(
            "stats_{}.json",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        let path = dir.join(filename);
        fs::write(&path, serde_json::to_string_pretty(&stats)?)?;
        Ok(path)
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
