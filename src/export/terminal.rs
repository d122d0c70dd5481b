//! Colored table for the terminal.

use cal_exporter_core::Event;
use owo_colors::OwoColorize;

use super::row::{ALL_DAY, Row, rows, total_hours};

const TITLE: &str = "Calendar Events";
const COLUMNS: [&str; 5] = ["Date", "Time", "Duration", "Summary", "Hashtags"];

/// Print the table to stdout.
pub fn print_table(events: &[Event]) {
    print!("{}", render_table(events, true));
}

/// Render the table; `color` toggles ANSI styling.
pub fn render_table(events: &[Event], color: bool) -> String {
    if events.is_empty() {
        let message = "No events to display.";
        return if color {
            format!("{}\n", message.yellow())
        } else {
            format!("{message}\n")
        };
    }

    let cells: Vec<[String; 5]> = rows(events).into_iter().map(table_cells).collect();

    let mut widths = COLUMNS.map(|c| c.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let total_width: usize = widths.iter().sum::<usize>() + 3 * (widths.len() - 1);
    let mut out = String::new();

    let title = format!("{TITLE:^total_width$}");
    out.push_str(&paint(&title, color, |s| s.bold().to_string()));
    out.push('\n');

    let header: Vec<String> = COLUMNS
        .iter()
        .zip(widths)
        .map(|(name, width)| {
            let padded = format!("{name:<width$}");
            paint(&padded, color, |s| s.bold().cyan().to_string())
        })
        .collect();
    out.push_str(&header.join(" │ "));
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    out.push_str(&rule.join("─┼─"));
    out.push('\n');

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (cell, width))| {
                // Duration is right-aligned
                let padded = if i == 2 {
                    format!("{cell:>width$}")
                } else {
                    format!("{cell:<width$}")
                };
                match i {
                    0 | 1 => paint(&padded, color, |s| s.green().to_string()),
                    2 => paint(&padded, color, |s| s.yellow().to_string()),
                    4 => paint(&padded, color, |s| s.magenta().to_string()),
                    _ => padded,
                }
            })
            .collect();
        out.push_str(line.join(" │ ").trim_end());
        out.push('\n');
    }

    out.push('\n');
    let events_label = paint("Total events:", color, |s| s.bold().to_string());
    let hours_label = paint("Total hours:", color, |s| s.bold().to_string());
    out.push_str(&format!("{events_label} {}\n", events.len()));
    out.push_str(&format!("{hours_label} {:.2}\n", total_hours(events)));

    out
}

fn table_cells(row: Row) -> [String; 5] {
    let time = if row.start_time == ALL_DAY {
        ALL_DAY.to_string()
    } else {
        format!("{} - {}", row.start_time, row.end_time)
    };

    // Keep each row on one line
    let summary = row.summary.replace(['\n', '\r'], " ");

    [row.date, time, row.duration_formatted, summary, row.hashtags]
}

fn paint(text: &str, color: bool, style: impl Fn(&str) -> String) -> String {
    if color {
        style(text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_events;

    #[test]
    fn empty_set_message() {
        assert_eq!(render_table(&[], false), "No events to display.\n");
    }

    #[test]
    fn table_lists_events_and_totals() {
        let out = render_table(&sample_events(), false);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0].trim(), "Calendar Events");
        assert!(lines[1].starts_with("Date"));
        assert!(lines[1].contains("Hashtags"));
        assert!(lines[3].contains("09:00 - 10:30"));
        assert!(lines[3].contains("1:30"));
        assert!(lines[3].contains("#billable, #clientA"));
        assert!(lines[4].contains("all-day"));
        assert!(out.contains("Total events: 2\n"));
        assert!(out.contains("Total hours: 25.50\n"));
    }

    #[test]
    fn columns_line_up() {
        let out = render_table(&sample_events(), false);
        let separators: Vec<Option<usize>> = out
            .lines()
            .skip(1)
            .take(4)
            .map(|line| line.chars().position(|c| c == '│' || c == '┼'))
            .collect();
        assert!(separators.iter().all(|s| *s == separators[0]));
    }

    #[test]
    fn colored_output_has_ansi_codes() {
        let out = render_table(&sample_events(), true);
        assert!(out.contains("\u{1b}["));
    }
}
