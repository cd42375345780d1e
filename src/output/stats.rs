//! Statistics display for a finished crawl

use crate::crawler::CrawlReport;
use std::fmt::Write;

/// Renders a crawl report as a plain-text summary
pub fn format_statistics(report: &CrawlReport) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "=== Crawl Statistics ===\n");

    let _ = writeln!(out, "Overview:");
    let _ = writeln!(
        out,
        "  Started: {}",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "  Duration: {:.1}s", report.elapsed.as_secs_f64());
    match report.stop_reason {
        Some(reason) => {
            let _ = writeln!(out, "  Stopped: {}", reason);
        }
        None => {
            let _ = writeln!(out, "  Stopped: unknown");
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Pages:");
    let _ = writeln!(out, "  Saved: {}", report.pages_saved);
    let _ = writeln!(out, "  Addresses claimed: {}", report.addresses_claimed);
    let _ = writeln!(out, "  Addresses queued: {}", report.addresses_queued);
    let _ = writeln!(out, "  Still in frontier: {}", report.frontier_remaining);
    let _ = writeln!(out, "  Links found: {}", report.links_found);
    let _ = writeln!(out, "  Duplicates skipped: {}", report.duplicates_skipped);
    let _ = writeln!(out);

    if report.fetch_failures > 0 || report.save_failures > 0 {
        let _ = writeln!(out, "Error Summary:");
        let _ = writeln!(out, "  Fetch failures: {}", report.fetch_failures);
        let _ = writeln!(out, "  Save failures: {}", report.save_failures);
        let _ = writeln!(out);
    }

    let rate = if report.elapsed.as_secs_f64() > 0.0 {
        report.pages_saved as f64 / report.elapsed.as_secs_f64()
    } else {
        0.0
    };
    let _ = write!(out, "Throughput: {:.2} pages/sec", rate);

    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(report: &CrawlReport) {
    println!("{}", format_statistics(report));
}
