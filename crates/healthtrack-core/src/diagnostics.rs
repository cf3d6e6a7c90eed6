//! Error classification and a bounded journal of handled errors.
//!
//! Failures from sensors and remote services are only ever classified by
//! message text. The buckets drive the messages shown to the user; they
//! are not a substitute for the typed errors in [`crate::error`].

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::ApiError;

/// Number of errors kept in [`ErrorJournal::recent`].
const RECENT_CAPACITY: usize = 20;

/// Number of errors rendered into a text report.
const REPORT_ENTRIES: usize = 10;

/// Coarse bucket for an error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Network,
    Permission,
    Location,
    Camera,
    Storage,
    Timeout,
    Unknown,
}

impl ErrorCategory {
    /// Classify by case-insensitive substring. Order matters: a
    /// "connection timeout" is a network problem, not a timeout.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        let has = |needle: &str| lower.contains(needle);

        if has("network") || has("connection") {
            ErrorCategory::Network
        } else if has("permission") {
            ErrorCategory::Permission
        } else if has("gps") || has("location") {
            ErrorCategory::Location
        } else if has("camera") {
            ErrorCategory::Camera
        } else if has("storage") || has("file") {
            ErrorCategory::Storage
        } else if has("timeout") {
            ErrorCategory::Timeout
        } else {
            ErrorCategory::Unknown
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Network problem, please check your connection settings.",
            ErrorCategory::Permission => {
                "Insufficient permissions, please grant the required permissions in settings."
            }
            ErrorCategory::Location => "Location service problem, please check your GPS settings.",
            ErrorCategory::Camera => "Camera access problem, please check camera permissions.",
            ErrorCategory::Storage => "Storage access problem, please check storage permissions.",
            ErrorCategory::Timeout => "The operation timed out, please try again.",
            ErrorCategory::Unknown => "The operation failed, please try again later.",
        }
    }
}

/// Message for a failed network operation such as a barcode lookup.
pub fn classify_network(message: &str, operation: &str) -> String {
    let lower = message.to_lowercase();
    if lower.contains("timeout") {
        format!("{operation} timed out, check your connection or try again later.")
    } else if lower.contains("connection") {
        "Network connection failed, please check your network settings.".to_string()
    } else if lower.contains("dns") {
        "Name resolution failed, please check your network connection.".to_string()
    } else {
        format!("{operation} failed, please check your network connection.")
    }
}

/// Message for a failed API call. Transport failures get an
/// operation-specific message built from the whole error chain; anything
/// else keeps its own text.
pub fn describe_api_error(error: &ApiError, operation: &str) -> String {
    match error {
        ApiError::Network(_) => classify_network(&error_chain(error), operation),
        other => other.to_string(),
    }
}

/// An error followed by each of its sources, joined with `: `.
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        let _ = write!(text, ": {inner}");
        source = inner.source();
    }
    text
}

/// One handled error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub at: DateTime<Utc>,
    pub message: String,
    pub context: String,
    pub category: ErrorCategory,
    pub critical: bool,
}

/// Aggregate counts over the journal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorStats {
    pub total_errors: u64,
    pub recent_errors: usize,
    pub critical_errors: usize,
}

/// Bounded record of handled errors.
#[derive(Debug, Default, Clone)]
pub struct ErrorJournal {
    total: u64,
    recent: Vec<ErrorEntry>,
}

impl ErrorJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error and log it. Returns the stored entry.
    pub fn handle(&mut self, message: impl Into<String>, context: &str, critical: bool) -> &ErrorEntry {
        let message = message.into();
        if critical {
            error!(context, %message, "critical error");
        } else {
            warn!(context, %message, "handled error");
        }

        self.total += 1;
        self.recent.push(ErrorEntry {
            at: Utc::now(),
            category: ErrorCategory::classify(&message),
            message,
            context: context.to_string(),
            critical,
        });
        if self.recent.len() > RECENT_CAPACITY {
            self.recent.remove(0);
        }
        &self.recent[self.recent.len() - 1]
    }

    pub fn recent(&self) -> &[ErrorEntry] {
        &self.recent
    }

    pub fn stats(&self) -> ErrorStats {
        ErrorStats {
            total_errors: self.total,
            recent_errors: self.recent.len(),
            critical_errors: self.recent.iter().filter(|e| e.critical).count(),
        }
    }

    /// Plain-text report of the most recent errors.
    pub fn report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "HealthTrack error report");
        let _ = writeln!(out, "Generated: {}", Utc::now().to_rfc3339());
        let _ = writeln!(out, "Total errors: {}\n", self.total);
        let _ = writeln!(out, "Recent errors:");
        let _ = writeln!(out, "{}", "=".repeat(50));

        let start = self.recent.len().saturating_sub(REPORT_ENTRIES);
        for (i, entry) in self.recent[start..].iter().enumerate() {
            let _ = writeln!(out, "\nError #{}:", i + 1);
            let _ = writeln!(out, "Time: {}", entry.at.to_rfc3339());
            let _ = writeln!(out, "Context: {}", entry.context);
            let _ = writeln!(out, "Error: {}", entry.message);
            let _ = writeln!(out, "Category: {:?}", entry.category);
            let _ = writeln!(out, "Critical: {}", if entry.critical { "yes" } else { "no" });
            let _ = writeln!(out, "{}", "-".repeat(30));
        }
        out
    }
}
