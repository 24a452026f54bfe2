// src/domain/metrics.rs
//! Dashboard aggregates. Everything here is a pure pass over complaints
//! already fetched from the store.

use chrono::{FixedOffset, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::db::status_updates::History;
use crate::domain::complaint::{Complaint, StatusUpdate};
use crate::domain::dates::local_month;
use crate::domain::status::Status;

const SECONDS_PER_DAY: f64 = 86_400.0;
pub const TOP_LOCATIONS: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusCounts {
    pub new: usize,
    pub in_progress: usize,
    pub fixed: usize,
    pub closed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ResolutionStats {
    pub sample_size: usize,
    /// Mean resolution time in days, 2 decimals.
    pub avg_days: f64,
    /// Median resolution time in days, 2 decimals.
    pub median_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyCount {
    /// `YYYY-MM`
    pub month: String,
    /// e.g. `March 2024`
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationCount {
    pub location: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TechnicianMetrics {
    pub total: usize,
    pub status_counts: StatusCounts,
    pub resolution: ResolutionStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct GlobalMetrics {
    pub total: usize,
    pub breakdown: StatusCounts,
    pub resolution: ResolutionStats,
    pub monthly: Vec<MonthlyCount>,
    pub top_locations: Vec<LocationCount>,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn count_by_status(complaints: &[Complaint]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for c in complaints {
        match c.status {
            Status::New => counts.new += 1,
            Status::InProgress => counts.in_progress += 1,
            Status::Fixed => counts.fixed += 1,
            Status::Closed => counts.closed += 1,
        }
    }
    counts
}

/// The history entry that moved the complaint into its current terminal
/// status. Terminal states accept no further updates, so this is the last
/// entry, provided it carries that status.
pub fn closing_update<'a>(
    complaint: &Complaint,
    updates: &'a [StatusUpdate],
) -> Option<&'a StatusUpdate> {
    if !complaint.status.is_terminal() {
        return None;
    }
    updates.last().filter(|u| u.status == complaint.status)
}

/// Days from creation to the closing update; `None` without one.
pub fn resolution_days(complaint: &Complaint, updates: &[StatusUpdate]) -> Option<f64> {
    closing_update(complaint, updates)
        .map(|u| (u.timestamp - complaint.created_at) as f64 / SECONDS_PER_DAY)
}

pub fn resolution_stats(sample: &[f64]) -> ResolutionStats {
    if sample.is_empty() {
        return ResolutionStats::default();
    }

    let mean = sample.iter().sum::<f64>() / sample.len() as f64;

    let mut sorted = sample.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    ResolutionStats {
        sample_size: sample.len(),
        avg_days: round2(mean),
        median_days: round2(median),
    }
}

fn resolution_sample<'a>(
    complaints: impl Iterator<Item = &'a Complaint>,
    history: &History,
) -> Vec<f64> {
    complaints
        .filter_map(|c| {
            let updates = history.get(&c.id).map(Vec::as_slice).unwrap_or(&[]);
            resolution_days(c, updates)
        })
        .collect()
}

/// Scoped view over the complaints assigned to one technician.
/// Only complaints currently Closed feed the resolution sample.
pub fn technician_metrics(assigned: &[Complaint], history: &History) -> TechnicianMetrics {
    let closed = assigned.iter().filter(|c| c.status == Status::Closed);
    TechnicianMetrics {
        total: assigned.len(),
        status_counts: count_by_status(assigned),
        resolution: resolution_stats(&resolution_sample(closed, history)),
    }
}

/// Manager view over every complaint. The `closed` bucket only counts
/// Fixed/Closed complaints that went through a technician.
pub fn global_metrics(
    complaints: &[Complaint],
    history: &History,
    offset: FixedOffset,
) -> GlobalMetrics {
    let per_status = count_by_status(complaints);
    let closed_by_tech = complaints
        .iter()
        .filter(|c| c.status.is_terminal() && c.assigned_to.is_some())
        .count();

    let resolved = complaints.iter().filter(|c| c.status.is_terminal());

    GlobalMetrics {
        total: complaints.len(),
        breakdown: StatusCounts {
            closed: closed_by_tech,
            ..per_status
        },
        resolution: resolution_stats(&resolution_sample(resolved, history)),
        monthly: monthly_counts(complaints, offset),
        top_locations: top_locations(complaints, TOP_LOCATIONS),
    }
}

/// Complaints per calendar month of creation, oldest month first.
pub fn monthly_counts(complaints: &[Complaint], offset: FixedOffset) -> Vec<MonthlyCount> {
    let mut buckets: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for c in complaints {
        *buckets.entry(local_month(c.created_at, offset)).or_default() += 1;
    }

    buckets
        .into_iter()
        .map(|((year, month), count)| MonthlyCount {
            month: format!("{year:04}-{month:02}"),
            label: NaiveDate::from_ymd_opt(year, month, 1)
                .map(|d| d.format("%B %Y").to_string())
                .unwrap_or_default(),
            count,
        })
        .collect()
}

/// Most frequent locations; equal counts fall back to alphabetical order.
pub fn top_locations(complaints: &[Complaint], limit: usize) -> Vec<LocationCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for c in complaints {
        *counts.entry(c.location.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<LocationCount> = counts
        .into_iter()
        .map(|(location, count)| LocationCount {
            location: location.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.location.cmp(&b.location)));
    ranked.truncate(limit);
    ranked
}
