use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::scoring::{
    Diagnostics, Evaluation, FeatureOutcome, ModelRegistry, Outcome, ScoredContract, ScoringModel,
};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score with up to 4 decimals, trailing zeros trimmed (1.2500 -> "1.25", 2.0 -> "2")
pub fn format_score(score: f64) -> String {
    let formatted = format!("{:.4}", score);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn format_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Score(score) => format_score(*score),
        Outcome::Identifier(value) => value.to_string(),
    }
}

/// One line per model: name, base and feature count
pub fn format_model_list(registry: &ModelRegistry, use_colors: bool) -> String {
    let name_width = registry.names().map(|n| n.chars().count()).max().unwrap_or(0);

    registry
        .iter()
        .map(|(name, model)| {
            let padded = format!("{:<width$}", name, width = name_width);
            let details = match model {
                ScoringModel::Weighted(m) => format!(
                    "base {}  {} features",
                    format_score(m.base),
                    m.features().len()
                ),
                ScoringModel::Identity(m) => format!("identifier ({})", m.field()),
            };
            if use_colors {
                format!("{}  {}", padded.bold(), details.dimmed())
            } else {
                format!("{}  {}", padded, details)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Per-feature trail of one evaluation (for verbose mode)
pub fn format_evaluation(model: &str, evaluation: &Evaluation, use_colors: bool) -> String {
    let mut lines = vec![format!("{}: base {}", model, format_score(evaluation.base))];
    let mut running = evaluation.base;

    for entry in &evaluation.features {
        let line = match &entry.outcome {
            FeatureOutcome::Matched { value, coefficient } => {
                let before = running;
                running *= coefficient;
                let text = format!(
                    "  {} = {} -> x{} ({} -> {})",
                    entry.feature,
                    value,
                    format_score(*coefficient),
                    format_score(before),
                    format_score(running)
                );
                if use_colors { text.green().to_string() } else { text }
            }
            FeatureOutcome::Unmatched { value } => {
                let text = format!("  {} = {} -> unknown modality", entry.feature, value);
                if use_colors { text.yellow().to_string() } else { text }
            }
            FeatureOutcome::NotFound => {
                let text = format!("  {} -> not in contract", entry.feature);
                if use_colors { text.dimmed().to_string() } else { text }
            }
        };
        lines.push(line);
    }

    lines.push(format!("  = {}", format_score(evaluation.score)));
    lines.join("\n")
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a cell to fit available width, accounting for Unicode
fn truncate_cell(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format scored contracts as a table: header with model names, then one
/// right-aligned row per contract. Columns are narrowed to fit the terminal.
pub fn format_scored_table(columns: &[String], rows: &[ScoredContract], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No contracts scored.".to_string();
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|name| row.get(name).map(format_outcome).unwrap_or_default())
                .collect()
        })
        .collect();

    let separator = "  ";
    let mut widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    if let Some(term_width) = get_terminal_width() {
        let total: usize = widths.iter().sum::<usize>() + separator.len() * widths.len().saturating_sub(1);
        if total > term_width && !widths.is_empty() {
            let share = (term_width / widths.len()).saturating_sub(separator.len()).max(6);
            for width in widths.iter_mut() {
                *width = (*width).min(share);
            }
        }
    }

    let header = columns
        .iter()
        .zip(&widths)
        .map(|(name, width)| format!("{:>width$}", truncate_cell(name, *width), width = *width))
        .collect::<Vec<_>>()
        .join(separator);
    let header = if use_colors { header.bold().to_string() } else { header };

    let body = cells.iter().map(|row| {
        row.iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:>width$}", truncate_cell(cell, *width), width = *width))
            .collect::<Vec<_>>()
            .join(separator)
    });

    std::iter::once(header).chain(body).collect::<Vec<_>>().join("\n")
}

/// Format scored contracts as tab-separated values for scripting
/// Header row with model names, full precision scores, no colors
pub fn format_tsv(columns: &[String], rows: &[ScoredContract]) -> String {
    let mut lines = vec![columns.join("\t")];
    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|name| row.get(name).map(|o| o.to_string()).unwrap_or_default())
            .collect();
        lines.push(cells.join("\t"));
    }
    lines.join("\n")
}

/// Matched / unmatched / not-found report collected in debug mode
pub fn format_diagnostics(diagnostics: &Diagnostics, use_colors: bool) -> String {
    let section = |title: &str, names: Vec<&str>| {
        let title = format!("{} ({})", title, names.len());
        let title = if use_colors { title.bold().to_string() } else { title };
        if names.is_empty() {
            title
        } else {
            format!("{}\n  {}", title, names.join(", "))
        }
    };

    [
        section("Matched", diagnostics.matched.iter().map(String::as_str).collect()),
        section("Unmatched", diagnostics.unmatched.iter().map(String::as_str).collect()),
        section("Not found", diagnostics.not_found.iter().map(String::as_str).collect()),
        section("Never matched", diagnostics.never_matched().into_iter().collect()),
    ]
    .join("\n")
}
