//! Text formatting functions for `civic_issues`.
//!
//! Provides plain text (non-ANSI) formatting for terminal output:
//! - Status icons (○ ◐ ✓)
//! - Type badges ([pothole], [streetlight], etc.)
//! - Issue lines, detail blocks and the statistics summary

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use civic_lib::{Comment, Issue, IssueType, Statistics, Status};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display columns for a title in one-line listings.
pub const TITLE_WIDTH: usize = 48;

/// Status icon characters.
pub mod icons {
    /// Pending - reported, not yet picked up (hollow circle).
    pub const PENDING: &str = "○";
    /// In progress - work under way (half-filled).
    pub const IN_PROGRESS: &str = "◐";
    /// Resolved - fixed (checkmark).
    pub const RESOLVED: &str = "✓";
}

/// Return the icon character for a status.
#[must_use]
pub const fn format_status_icon(status: Status) -> &'static str {
    match status {
        Status::Pending => icons::PENDING,
        Status::InProgress => icons::IN_PROGRESS,
        Status::Resolved => icons::RESOLVED,
    }
}

/// Format issue type as a bracketed badge.
#[must_use]
pub fn format_type_badge(issue_type: IssueType) -> String {
    format!("[{}]", issue_type.as_str())
}

#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Cut `text` to at most `width` display columns, ending in `…` when cut.
#[must_use]
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let budget = width.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

fn plural(n: impl Into<u64>, one: &str, many: &str) -> String {
    let n = n.into();
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Format a single-line issue summary.
///
/// Format: `{icon} {id} [{type}] {title} ({upvotes}, {comments})`
#[must_use]
pub fn format_issue_line(issue: &Issue) -> String {
    format!(
        "{} {} {} {} ({}, {})",
        format_status_icon(issue.status),
        issue.id,
        format_type_badge(issue.issue_type),
        truncate_to_width(&issue.title, TITLE_WIDTH),
        plural(issue.upvotes, "upvote", "upvotes"),
        plural(issue.comment_count() as u64, "comment", "comments"),
    )
}

fn format_location(issue: &Issue) -> String {
    let coords = format!(
        "{:.4}, {:.4}",
        issue.location.latitude, issue.location.longitude
    );
    match &issue.location.address {
        Some(address) => format!("{address} ({coords})"),
        None => coords,
    }
}

fn write_comment(out: &mut dyn Write, comment: &Comment) -> io::Result<()> {
    let tag = if comment.is_admin { "[Official] " } else { "" };
    writeln!(
        out,
        "  {tag}{} · {}",
        comment.author,
        format_timestamp(comment.created_at)
    )?;
    for line in comment.content.lines() {
        writeln!(out, "    {line}")?;
    }
    Ok(())
}

/// Write the full detail block for one issue.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_issue_details(out: &mut dyn Write, issue: &Issue) -> io::Result<()> {
    writeln!(
        out,
        "{} {} {}",
        format_status_icon(issue.status),
        issue.id,
        issue.title
    )?;
    writeln!(
        out,
        "Type: {}  Status: {}",
        issue.issue_type.label(),
        issue.status.label()
    )?;
    writeln!(
        out,
        "Reported by {} on {}",
        issue.reported_by,
        format_timestamp(issue.created_at)
    )?;
    if issue.was_updated() {
        writeln!(out, "Updated {}", format_timestamp(issue.updated_at))?;
    }
    writeln!(out, "Location: {}", format_location(issue))?;
    writeln!(out, "Upvotes: {}", issue.upvotes)?;
    writeln!(out)?;
    writeln!(out, "{}", issue.description)?;

    if !issue.media.is_empty() {
        writeln!(out)?;
        writeln!(out, "Media:")?;
        for item in &issue.media {
            writeln!(out, "  - {item}")?;
        }
    }

    writeln!(out)?;
    if issue.comments.is_empty() {
        writeln!(out, "No comments yet.")?;
    } else {
        writeln!(out, "Comments ({}):", issue.comments.len())?;
        for comment in &issue.comments {
            write_comment(out, comment)?;
        }
    }
    Ok(())
}

/// Write the dashboard summary.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_statistics(out: &mut dyn Write, stats: &Statistics) -> io::Result<()> {
    writeln!(out, "Issues: {}", stats.total)?;
    for status in Status::ALL {
        writeln!(
            out,
            "  {} {}: {}",
            format_status_icon(status),
            status.label(),
            stats.count(status)
        )?;
    }
    writeln!(out, "Upvotes: {}", stats.total_upvotes)?;
    writeln!(
        out,
        "Comments: {} ({} official, {} citizen)",
        stats.total_comments, stats.official_comments, stats.citizen_comments
    )?;
    writeln!(
        out,
        "Resolved: {:.0}%",
        stats.resolution_rate() * 100.0
    )
}
