//! View models for the consultation table and detail view, plus the
//! presenters that turn them into HTML fragments or terminal text.
//!
//! Presenters only ever see view models. Anything shown to the user goes
//! through [`TableRow`] or [`DetailView`] first, which keeps escaping and
//! placeholder rules in one place per output format.

pub mod html;
pub mod terminal;

use std::borrow::Cow;

use crate::model::ConsultationRecord;

pub const TABLE_COLUMNS: usize = 6;
pub const TABLE_HEADERS: [&str; TABLE_COLUMNS] =
    ["ID", "Patient", "Date & time", "Reason", "Status", "Actions"];

pub const NO_RESULTS_MESSAGE: &str = "No results found for your search.";
pub const LOAD_FAILED_MESSAGE: &str = "Error loading data. Check the console.";
pub const DETAIL_NOT_FOUND_MESSAGE: &str = "No details found for this consultation.";
pub const NO_NOTES_PLACEHOLDER: &str = "No additional notes.";

/// Visual category of a treatment status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BadgeStyle {
    Success,
    Warning,
    Danger,
    Neutral,
}

impl BadgeStyle {
    /// Exact, case-sensitive match. Unknown statuses fall back to
    /// [`BadgeStyle::Neutral`].
    pub fn for_status(status: &str) -> Self {
        match status {
            "Completed" => Self::Success,
            "In progress" => Self::Warning,
            "Pending" => Self::Danger,
            _ => Self::Neutral,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Success => "bg-success",
            Self::Warning => "bg-warning text-dark",
            Self::Danger => "bg-danger",
            Self::Neutral => "bg-secondary",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusBadge<'a> {
    pub label: &'a str,
    pub style: BadgeStyle,
}

impl<'a> StatusBadge<'a> {
    pub fn new(status: &'a str) -> Self {
        Self {
            label: status,
            style: BadgeStyle::for_status(status),
        }
    }
}

/// One line of the consultation table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRow<'a> {
    pub id: &'a str,
    pub patient_name: &'a str,
    pub scheduled_at: String,
    pub reason: &'a str,
    pub badge: StatusBadge<'a>,
}

impl<'a> TableRow<'a> {
    pub fn from_record(record: &'a ConsultationRecord) -> Self {
        Self {
            id: &record.id,
            patient_name: &record.patient.name,
            scheduled_at: record.scheduled_at(),
            reason: &record.reason,
            badge: StatusBadge::new(&record.treatment.status),
        }
    }
}

pub fn table_rows<'a, I>(records: I) -> Vec<TableRow<'a>>
where
    I: IntoIterator<Item = &'a ConsultationRecord>,
{
    records.into_iter().map(TableRow::from_record).collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Badge(StatusBadge<'a>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailField<'a> {
    pub label: &'static str,
    pub value: FieldValue<'a>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailSection<'a> {
    pub title: &'static str,
    pub fields: Vec<DetailField<'a>>,
}

/// Grouped presentation of a single record for the detail modal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailView<'a> {
    pub id: &'a str,
    pub sections: Vec<DetailSection<'a>>,
    /// Record notes, or [`NO_NOTES_PLACEHOLDER`] when absent or empty.
    pub notes: &'a str,
}

fn text<'a>(label: &'static str, value: impl Into<Cow<'a, str>>) -> DetailField<'a> {
    DetailField {
        label,
        value: FieldValue::Text(value.into()),
    }
}

impl<'a> DetailView<'a> {
    pub fn from_record(record: &'a ConsultationRecord) -> Self {
        let patient = DetailSection {
            title: "Patient information",
            fields: vec![
                text("Name", record.patient.name.as_str()),
                text("Patient ID", record.patient.patient_id.as_str()),
                text("Age", record.patient.age.to_string()),
                text("Gender", record.patient.gender.as_str()),
            ],
        };

        let mut appointment_fields = Vec::with_capacity(3);
        if let Some(dentist) = record.dentist.as_deref().filter(|d| !d.is_empty()) {
            appointment_fields.push(text("Dentist", dentist));
        }
        appointment_fields.push(text("Date", record.date.as_str()));
        appointment_fields.push(text("Time", record.time.as_str()));
        let appointment = DetailSection {
            title: "Appointment details",
            fields: appointment_fields,
        };

        let clinical = DetailSection {
            title: "Diagnosis and treatment",
            fields: vec![
                text("Reason", record.reason.as_str()),
                text("Diagnosis", record.diagnosis.description.as_str()),
                text("ICD code", record.diagnosis.icd_code.as_str()),
                text("Treatment", record.treatment.procedure.as_str()),
                text("Cost (USD)", record.treatment.cost_usd.to_string()),
                DetailField {
                    label: "Status",
                    value: FieldValue::Badge(StatusBadge::new(&record.treatment.status)),
                },
            ],
        };

        Self {
            id: &record.id,
            sections: vec![patient, appointment, clinical],
            notes: record.notes().unwrap_or(NO_NOTES_PLACEHOLDER),
        }
    }
}

pub fn escape_html(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
