use std::borrow::Cow;

use colored::{ColoredString, Colorize};

use super::{
    BadgeStyle, DetailView, FieldValue, StatusBadge, TableRow, DETAIL_NOT_FOUND_MESSAGE,
    NO_RESULTS_MESSAGE, TABLE_COLUMNS, TABLE_HEADERS,
};

const TERMINAL_COLUMNS: usize = TABLE_COLUMNS - 1;

fn paint_badge(badge: &StatusBadge<'_>, padded: &str) -> ColoredString {
    match badge.style {
        BadgeStyle::Success => padded.green().bold(),
        BadgeStyle::Warning => padded.yellow().bold(),
        BadgeStyle::Danger => padded.red().bold(),
        BadgeStyle::Neutral => padded.normal(),
    }
}

/// Record text with control characters (escape sequences included) replaced
/// by U+FFFD, so a field cannot drive the terminal.
fn printable(value: &str) -> Cow<'_, str> {
    if !value.chars().any(char::is_control) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(
        value
            .chars()
            .map(|c| if c.is_control() { '\u{FFFD}' } else { c })
            .collect(),
    )
}

fn pad(value: &str, width: usize) -> String {
    let value = printable(value);
    let len = value.chars().count();
    let mut out = value.into_owned();
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(len)));
    out
}

/// Aligned table without the action column.
pub fn table(rows: &[TableRow<'_>]) -> String {
    if rows.is_empty() {
        return format!("{}\n", NO_RESULTS_MESSAGE.dimmed());
    }

    let cells: Vec<[&str; TERMINAL_COLUMNS]> = rows
        .iter()
        .map(|r| {
            [
                r.id,
                r.patient_name,
                r.scheduled_at.as_str(),
                r.reason,
                r.badge.label,
            ]
        })
        .collect();

    let mut widths = [0usize; TERMINAL_COLUMNS];
    for (i, h) in TABLE_HEADERS.iter().take(TERMINAL_COLUMNS).enumerate() {
        widths[i] = h.chars().count();
    }
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(printable(cell).chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = TABLE_HEADERS
        .iter()
        .take(TERMINAL_COLUMNS)
        .enumerate()
        .map(|(i, h)| pad(h, widths[i]))
        .collect();
    out.push_str(&header.join("  ").bold().to_string());
    out.push('\n');

    for (row, cell) in rows.iter().zip(cells.iter()) {
        let mut line: Vec<String> = (0..TERMINAL_COLUMNS - 1)
            .map(|i| pad(cell[i], widths[i]))
            .collect();
        let status = pad(cell[TERMINAL_COLUMNS - 1], widths[TERMINAL_COLUMNS - 1]);
        line.push(paint_badge(&row.badge, &status).to_string());
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

pub fn load_failed(message: &str) -> String {
    format!("{}\n", message.red())
}

pub fn detail(view: &DetailView<'_>) -> String {
    let mut out = format!(
        "{} {}\n",
        "Consultation".bold(),
        printable(view.id).bold()
    );
    for section in &view.sections {
        out.push('\n');
        out.push_str(&format!("{}\n", section.title.cyan().bold()));
        let width = section
            .fields
            .iter()
            .map(|f| f.label.chars().count())
            .max()
            .unwrap_or(0);
        for field in &section.fields {
            let label = pad(&format!("{}:", field.label), width + 1);
            let value = match &field.value {
                FieldValue::Text(text) => printable(text).into_owned(),
                FieldValue::Badge(b) => paint_badge(b, &printable(b.label)).to_string(),
            };
            out.push_str(&format!("  {label} {value}\n"));
        }
    }
    out.push('\n');
    out.push_str(&format!("{}\n", "Additional notes".cyan().bold()));
    out.push_str(&format!("  {}\n", printable(view.notes)));
    out
}

pub fn detail_not_found() -> String {
    format!("{}\n", DETAIL_NOT_FOUND_MESSAGE.red())
}
