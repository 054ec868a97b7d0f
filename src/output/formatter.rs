use chrono::Local;
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::attainment::{AttainmentLevel, ScoreDistribution};
use crate::scores::{ScoreBook, INDIRECT_ASSESSMENT};
use crate::subject::Subject;
use crate::survey::SurveyAnalysis;

const BAR_WIDTH: usize = 20;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

fn bar_width() -> usize {
    match get_terminal_width() {
        Some(w) if w < 60 => 10,
        _ => BAR_WIDTH,
    }
}

/// Render a filled/empty bar proportional to `count` out of `total`.
fn format_bar(count: usize, total: usize, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let filled = (count as f64 / total as f64 * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn level_label(level: u8, use_colors: bool) -> String {
    if !use_colors {
        return level.to_string();
    }
    match level {
        3 => level.green().bold().to_string(),
        2 => level.yellow().bold().to_string(),
        _ => level.red().bold().to_string(),
    }
}

/// Format one distribution as three bar lines plus the average.
pub fn format_distribution(dist: &ScoreDistribution, use_colors: bool) -> String {
    let width = bar_width();
    let total = dist.total();
    let rows = [
        ("Band 3", dist.band3_count),
        ("Band 2", dist.band2_count),
        ("Band 1", dist.band1_count),
    ];
    let mut lines: Vec<String> = rows
        .iter()
        .map(|(label, count)| {
            let bar = format_bar(*count, total, width);
            let bar = if use_colors {
                match *label {
                    "Band 3" => bar.green().to_string(),
                    "Band 2" => bar.yellow().to_string(),
                    _ => bar.red().to_string(),
                }
            } else {
                bar
            };
            format!("  {}  {}  {:>3}", label, bar, count)
        })
        .collect();
    lines.push(format!("  Average band: {:.2}", dist.average_band));
    lines.join("\n")
}

/// One-line band summary for a single (assessment, CO) pair.
fn format_co_breakdown_line(co_id: &str, dist: &ScoreDistribution) -> String {
    format!(
        "  {}  3:{} 2:{} 1:{}  average {:.2}",
        co_id, dist.band3_count, dist.band2_count, dist.band1_count, dist.average_band
    )
}

/// Distributions for every assessment of the subject, each with a per-CO
/// breakdown, the survey-based indirect one last.
pub fn format_assessment_distributions(
    subject: &Subject,
    book: &ScoreBook,
    use_colors: bool,
) -> String {
    let mut sections = Vec::new();
    for assessment in &subject.direct_assessments {
        let dist = book.distribution_for_assessment(&assessment.name);
        let heading = format!("{} (weightage {})", assessment.name, assessment.weightage);
        let heading = if use_colors {
            heading.bold().to_string()
        } else {
            heading
        };
        let mut section = format!("{}\n{}", heading, format_distribution(&dist, use_colors));
        for co_id in assessment.co_marks.keys() {
            let co_dist = book.distribution_for_co(&assessment.name, co_id);
            if co_dist.total() == 0 {
                continue;
            }
            section.push('\n');
            section.push_str(&format_co_breakdown_line(co_id, &co_dist));
        }
        sections.push(section);
    }

    let indirect = book.distribution_for_assessment(INDIRECT_ASSESSMENT);
    if indirect.total() > 0 {
        let heading = format!(
            "Indirect survey (weightage {})",
            subject.indirect_assessment.weightage
        );
        let heading = if use_colors {
            heading.bold().to_string()
        } else {
            heading
        };
        sections.push(format!(
            "{}\n{}",
            heading,
            format_distribution(&indirect, use_colors)
        ));
    }

    sections.join("\n\n")
}

/// Format the CO/PO attainment matrix as an aligned table.
/// Columns: CO, PO, attainment %, level.
pub fn format_attainment_table(levels: &[AttainmentLevel], use_colors: bool) -> String {
    if levels.is_empty() {
        return "No attainment data. Feed score files first.".to_string();
    }

    let mut lines = vec![format!(
        "{:<6} {:<6} {:>10} {:>6}",
        "CO", "PO", "Attain %", "Level"
    )];
    for entry in levels {
        lines.push(format!(
            "{:<6} {:<6} {:>10.1} {:>6}",
            entry.co_id,
            entry.po_id,
            entry.percentage,
            level_label(entry.level, use_colors)
        ));
    }
    lines.join("\n")
}

/// Format attainment as tab-separated values for scripting
/// Columns: co, po, percentage, level (no headers, no colors)
pub fn format_attainment_tsv(levels: &[AttainmentLevel]) -> String {
    levels
        .iter()
        .map(|entry| {
            format!(
                "{}\t{}\t{:.1}\t{}",
                entry.co_id, entry.po_id, entry.percentage, entry.level
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The full plain-text report: header, distributions, attainment matrix.
pub fn format_report(
    subject: &Subject,
    book: &ScoreBook,
    levels: &[AttainmentLevel],
    use_colors: bool,
) -> String {
    let title = format!("{} ({}) attainment report", subject.name, subject.code);
    let title = if use_colors {
        title.bold().to_string()
    } else {
        title
    };
    let generated = Local::now().format("%Y-%m-%d %H:%M");

    format!(
        "{}\nGenerated {}  |  {} students  |  thresholds {}/{}\n\n{}\n\n{}",
        title,
        generated,
        subject.student_count,
        subject.threshold2,
        subject.threshold3,
        format_assessment_distributions(subject, book, use_colors),
        format_attainment_table(levels, use_colors)
    )
}

/// Format a survey analysis block for the terminal.
pub fn format_survey_analysis(analysis: &SurveyAnalysis, use_colors: bool) -> String {
    let heading = "Survey analysis";
    let heading = if use_colors {
        heading.bold().to_string()
    } else {
        heading.to_string()
    };

    let mut lines = vec![
        heading,
        format!("  Average score: {:.2}", analysis.average_score),
        format!("  {}", analysis.feedback),
    ];
    if !analysis.recommendations.is_empty() {
        lines.push("  Recommendations:".to_string());
        for rec in &analysis.recommendations {
            lines.push(format!("    - {}", rec));
        }
    }
    lines.join("\n")
}
