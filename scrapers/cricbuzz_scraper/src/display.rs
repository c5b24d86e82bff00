use std::fmt::Write;

use crate::{
    match_scraper::MatchRunReport, metrics::FetchMetrics, squad_scraper::SquadRunReport,
    types::MatchRecord,
};

const RULE_WIDTH: usize = 140;

fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

/// Fixed-width table of stored matches.
pub fn matches_table(matches: &[MatchRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(
        out,
        "{:<10} {:<10} {:<50} {:<30} {}",
        "ID", "FORMAT", "MATCH NAME", "WINNER", "VENUE"
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    for m in matches {
        let _ = writeln!(
            out,
            "{:<10} {:<10} {:<50} {:<30} {}",
            m.match_id,
            m.format.as_str(),
            fit(&m.match_name, 50),
            fit(&m.winner, 30),
            m.venue
        );
    }
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    out
}

pub fn match_summary(report: &MatchRunReport) -> String {
    format!(
        "Matches: {} candidates, {} accepted, {} rejected",
        report.candidates,
        report.accepted.len(),
        report.rejected.len()
    )
}

pub fn squad_summary(report: &SquadRunReport) -> String {
    format!(
        "Squads: {} matches processed, {} skipped, {} new players, {} updated, {} memberships added, {} profile fetches failed",
        report.matches_processed,
        report.matches_skipped.len(),
        report.players_added,
        report.players_updated,
        report.memberships_added,
        report.profiles_failed
    )
}

pub fn fetch_summary(metrics: &FetchMetrics) -> String {
    format!(
        "Requests: {} total, {} ok, {} failed, avg {:.0} ms",
        metrics.total_requests,
        metrics.successful_requests,
        metrics.failed_requests,
        metrics.avg_response_time_ms
    )
}
