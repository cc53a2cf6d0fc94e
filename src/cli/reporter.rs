// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use super::runner::{CheckOutcome, MeshInfo};
use crate::intersect::SelfIntersectionReport;
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// One line per checked file
    pub fn report_check(outcome: &CheckOutcome) {
        let file = outcome.path.display().to_string();
        if outcome.self_intersecting {
            println!(
                "{} {} {}",
                "❌".red(),
                file.cyan(),
                "self-intersecting".red().bold()
            );
        } else {
            println!("{} {} {}", "✅".green(), file.cyan(), "clean".green());
        }
        println!(
            "   {} {}  {} {}",
            "Facets:".bright_black(),
            outcome.facets.to_string().cyan(),
            "Time:".bright_black(),
            Self::format_duration(outcome.duration).yellow()
        );
    }

    /// Intersecting pairs of one file, at most `limit` of them
    pub fn report_pairs(file: &str, report: &SelfIntersectionReport, limit: usize) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "File:".bold(), file.cyan());
        println!("{}", "━".repeat(80).bright_black());

        if report.is_self_intersecting() {
            println!(
                "{} {}",
                "❌".red(),
                format!("{} intersecting facet pairs", report.intersecting_pairs.len())
                    .red()
                    .bold()
            );
            for (first, second) in report.intersecting_pairs.iter().take(limit) {
                println!("  {} {} ↔ {}", "•".bright_black(), first, second);
            }
            if report.intersecting_pairs.len() > limit {
                println!(
                    "  {}",
                    format!("... {} more", report.intersecting_pairs.len() - limit).bright_black()
                );
            }
        } else {
            println!("{} {}", "✅".green(), "No self-intersections".green().bold());
        }

        println!("\n{}", "Statistics:".bold());
        println!("  {} {}", "Facets:".bright_black(), report.facet_count.to_string().cyan());
        println!(
            "  {} {}",
            "Candidate pairs:".bright_black(),
            report.candidate_pairs.to_string().cyan()
        );
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(Duration::from_secs_f64(report.elapsed_ms / 1000.0)).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    pub fn report_mesh_info(file: &str, info: &MeshInfo) {
        println!("\n{} {}", "Mesh:".bold(), file.cyan());
        println!("  {} {}", "Vertices:".bright_black(), info.vertices.to_string().cyan());
        println!("  {} {}", "Facets:".bright_black(), info.facets.to_string().cyan());
        println!("  {} {}", "Edges:".bright_black(), info.edges.to_string().cyan());
        println!("  {} {}", "Closed:".bright_black(), Self::flag(info.closed));
        println!("  {} {}", "Triangulated:".bright_black(), Self::flag(info.triangulated));
        if !info.closed {
            println!(
                "  {} {}",
                "Border half-edges:".bright_black(),
                info.border_halfedges.to_string().yellow()
            );
        }
        println!(
            "  {} [{:.4}, {:.4}, {:.4}] - [{:.4}, {:.4}, {:.4}]",
            "Bounds:".bright_black(),
            info.bounds.min.x,
            info.bounds.min.y,
            info.bounds.min.z,
            info.bounds.max.x,
            info.bounds.max.y,
            info.bounds.max.z
        );
    }

    /// Totals after a batch run
    pub fn report_summary(checked: usize, intersecting: usize, errors: usize) {
        println!("\n{}", "═".repeat(80).bright_black());
        println!("{}", "Summary".bold());
        println!("{}", "═".repeat(80).bright_black());
        println!("  {} {}", "Checked:".bright_black(), checked.to_string().cyan());
        println!(
            "  {} {}",
            "Clean:".bright_black(),
            (checked - intersecting).to_string().green()
        );
        println!(
            "  {} {}",
            "Self-intersecting:".bright_black(),
            if intersecting > 0 {
                intersecting.to_string().red()
            } else {
                intersecting.to_string().green()
            }
        );
        println!(
            "  {} {}",
            "Errors:".bright_black(),
            if errors > 0 {
                errors.to_string().red()
            } else {
                errors.to_string().green()
            }
        );
        println!("{}", "═".repeat(80).bright_black());
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    fn flag(value: bool) -> ColoredString {
        if value {
            "yes".green()
        } else {
            "no".yellow()
        }
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}
