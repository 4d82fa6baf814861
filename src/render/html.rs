use std::fmt::Write as _;

use super::{
    escape_html, BadgeStyle, DetailView, FieldValue, StatusBadge, TableRow,
    DETAIL_NOT_FOUND_MESSAGE, LOAD_FAILED_MESSAGE, NO_NOTES_PLACEHOLDER, NO_RESULTS_MESSAGE,
    TABLE_COLUMNS, TABLE_HEADERS,
};
use crate::loader::RECORDS_PATH;

pub const TABLE_BODY_ID: &str = "consultas-tbody";
pub const FILTER_INPUT_ID: &str = "filtro-input";
pub const DETAIL_MODAL_ID: &str = "detalleModal";
pub const MODAL_CONTENT_ID: &str = "modal-body-content";
pub const PAGE_CONFIG_ID: &str = "consultlog-config";

pub fn badge(badge: &StatusBadge<'_>) -> String {
    format!(
        r#"<span class="badge {}">{}</span>"#,
        badge.style.css_class(),
        escape_html(badge.label)
    )
}

/// Single full-width row carrying `message`, used for both the empty result
/// and the load failure cases.
pub fn message_row(message: &str, class: &str) -> String {
    format!(
        r#"<tr><td colspan="{TABLE_COLUMNS}" class="{class}">{}</td></tr>"#,
        escape_html(message)
    )
}

pub fn table_row(row: &TableRow<'_>) -> String {
    let id = escape_html(row.id);
    format!(
        r##"<tr>
  <td>{id}</td>
  <td>{}</td>
  <td>{}</td>
  <td>{}</td>
  <td>{}</td>
  <td><button class="btn btn-primary btn-sm" data-bs-toggle="modal" data-bs-target="#{DETAIL_MODAL_ID}" data-bs-id="{id}">View details</button></td>
</tr>"##,
        escape_html(row.patient_name),
        escape_html(&row.scheduled_at),
        escape_html(row.reason),
        badge(&row.badge),
    )
}

/// Complete replacement for the table body. An empty input yields exactly one
/// "no results" row.
pub fn table_body(rows: &[TableRow<'_>]) -> String {
    if rows.is_empty() {
        return message_row(NO_RESULTS_MESSAGE, "text-center");
    }
    let mut out = String::new();
    for row in rows {
        out.push_str(&table_row(row));
        out.push('\n');
    }
    out
}

pub fn detail(view: &DetailView<'_>) -> String {
    let mut out = String::new();
    for section in &view.sections {
        let _ = writeln!(out, "<h6>{}</h6>", escape_html(section.title));
        out.push_str(r#"<div class="info-grid">"#);
        out.push('\n');
        for field in &section.fields {
            let value = match &field.value {
                FieldValue::Text(text) => escape_html(text).into_owned(),
                FieldValue::Badge(b) => badge(b),
            };
            let _ = writeln!(
                out,
                "  <strong>{}:</strong><span>{value}</span>",
                escape_html(field.label)
            );
        }
        out.push_str("</div>\n");
    }
    out.push_str("<h6>Additional notes</h6>\n");
    let _ = writeln!(out, "<p>{}</p>", escape_html(view.notes));
    out
}

pub fn detail_not_found() -> String {
    format!(
        r#"<p class="text-danger">{}</p>"#,
        escape_html(DETAIL_NOT_FOUND_MESSAGE)
    )
}

pub fn landing_page() -> String {
    layout(
        "Dental clinic",
        r#"<div class="container py-5">
  <h1 class="mb-4">Dental clinic</h1>
  <p class="lead">Consultation records for the clinic's patients.</p>
  <a class="btn btn-primary" href="/historial.html">Consultation history</a>
</div>"#,
    )
}

/// Consultation history page: filter input, table and the detail modal.
///
/// `table_body` and `modal_body` are the server-rendered first paint. On
/// load the inline script fetches the record collection once, then filters
/// it and looks up detail records locally without further requests.
pub fn history_page(filter_value: &str, table_body: &str, modal_body: &str) -> String {
    let mut headers = String::new();
    for h in TABLE_HEADERS {
        let _ = write!(headers, "<th>{}</th>", escape_html(h));
    }
    let content = format!(
        r##"<div class="container py-4">
  <h1 class="mb-3">Consultation history</h1>
  <form method="get" action="/historial.html" class="mb-3">
    <input type="text" id="{FILTER_INPUT_ID}" name="q" class="form-control" placeholder="Filter by patient, ID, reason, status or date..." value="{filter}" autocomplete="off">
  </form>
  <table class="table table-striped table-hover">
    <thead><tr>{headers}</tr></thead>
    <tbody id="{TABLE_BODY_ID}">
{table_body}
    </tbody>
  </table>
</div>
<div class="modal fade" id="{DETAIL_MODAL_ID}" tabindex="-1" aria-hidden="true">
  <div class="modal-dialog modal-lg">
    <div class="modal-content">
      <div class="modal-header">
        <h5 class="modal-title">Consultation details</h5>
        <button type="button" class="btn-close" data-bs-dismiss="modal" aria-label="Close"></button>
      </div>
      <div class="modal-body" id="{MODAL_CONTENT_ID}">
{modal_body}
      </div>
    </div>
  </div>
</div>
<script type="application/json" id="{PAGE_CONFIG_ID}">{config}</script>
<script>
{PAGE_SCRIPT}</script>"##,
        filter = escape_html(filter_value),
        config = page_config(),
    );
    layout("Consultation history", &content)
}

/// Values the page script shares with the Rust presenters, serialized into a
/// JSON data block. `</` is escaped so no value can close the surrounding
/// script element.
fn page_config() -> String {
    let badges: serde_json::Map<String, serde_json::Value> = ["Completed", "In progress", "Pending"]
        .into_iter()
        .map(|status| {
            let class = BadgeStyle::for_status(status).css_class();
            (status.to_string(), serde_json::Value::from(class))
        })
        .collect();
    let config = serde_json::json!({
        "recordsPath": RECORDS_PATH,
        "columns": TABLE_COLUMNS,
        "ids": {
            "tbody": TABLE_BODY_ID,
            "filter": FILTER_INPUT_ID,
            "modal": DETAIL_MODAL_ID,
            "content": MODAL_CONTENT_ID,
        },
        "badges": badges,
        "neutralBadge": BadgeStyle::Neutral.css_class(),
        "messages": {
            "noResults": NO_RESULTS_MESSAGE,
            "loadFailed": LOAD_FAILED_MESSAGE,
            "detailNotFound": DETAIL_NOT_FOUND_MESSAGE,
            "noNotes": NO_NOTES_PLACEHOLDER,
        },
    });
    config.to_string().replace("</", "<\\/")
}

/// Client lifecycle: one fetch of the collection on `DOMContentLoaded`,
/// then synchronous filtering on `keyup` and detail lookup from the same
/// array. Markup mirrors `table_row`, `message_row` and `detail`.
const PAGE_SCRIPT: &str = r##"document.addEventListener('DOMContentLoaded', () => {
  const cfg = JSON.parse(document.getElementById('consultlog-config').textContent);
  const tbody = document.getElementById(cfg.ids.tbody);
  const input = document.getElementById(cfg.ids.filter);
  const modal = document.getElementById(cfg.ids.modal);
  const content = document.getElementById(cfg.ids.content);
  let consultas = [];

  const escapeHtml = (value) => String(value ?? '').replace(/[&<>"']/g, (c) => ({
    '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;'
  })[c]);
  const badge = (status) => {
    const cls = Object.prototype.hasOwnProperty.call(cfg.badges, status) ? cfg.badges[status] : cfg.neutralBadge;
    return `<span class="badge ${cls}">${escapeHtml(status)}</span>`;
  };
  const messageRow = (message, cls) =>
    `<tr><td colspan="${cfg.columns}" class="${cls}">${escapeHtml(message)}</td></tr>`;

  const tableRow = (c) => {
    const id = escapeHtml(c.id);
    return `<tr>
  <td>${id}</td>
  <td>${escapeHtml(c.patient.name)}</td>
  <td>${escapeHtml(c.date + ' ' + c.time)}</td>
  <td>${escapeHtml(c.reason)}</td>
  <td>${badge(c.treatment.status)}</td>
  <td><button class="btn btn-primary btn-sm" data-bs-toggle="modal" data-bs-target="#${cfg.ids.modal}" data-bs-id="${id}">View details</button></td>
</tr>`;
  };
  const renderTable = (records) => records.length === 0
    ? messageRow(cfg.messages.noResults, 'text-center')
    : records.map(tableRow).join('
');

  const matches = (c, needle) => [c.patient.name, c.id, c.reason, c.treatment.status, c.date]
    .some((field) => String(field ?? '').toLowerCase().includes(needle));
  const applyFilter = () => {
    const needle = input.value.toLowerCase();
    tbody.innerHTML = renderTable(consultas.filter((c) => matches(c, needle)));
  };

  const section = (title, fields) => `<h6>${escapeHtml(title)}</h6>
<div class="info-grid">
${fields.map(([label, value]) => `  <strong>${escapeHtml(label)}:</strong><span>${value}</span>`).join('
')}
</div>`;
  const renderDetail = (c) => {
    const appointment = [];
    if (c.dentist) appointment.push(['Dentist', escapeHtml(c.dentist)]);
    appointment.push(['Date', escapeHtml(c.date)], ['Time', escapeHtml(c.time)]);
    return [
      section('Patient information', [
        ['Name', escapeHtml(c.patient.name)],
        ['Patient ID', escapeHtml(c.patient.patientId)],
        ['Age', escapeHtml(c.patient.age)],
        ['Gender', escapeHtml(c.patient.gender)],
      ]),
      section('Appointment details', appointment),
      section('Diagnosis and treatment', [
        ['Reason', escapeHtml(c.reason)],
        ['Diagnosis', escapeHtml(c.diagnosis.description)],
        ['ICD code', escapeHtml(c.diagnosis.icdCode)],
        ['Treatment', escapeHtml(c.treatment.procedure)],
        ['Cost (USD)', escapeHtml(c.treatment.costUsd)],
        ['Status', badge(c.treatment.status)],
      ]),
      '<h6>Additional notes</h6>',
      `<p>${escapeHtml(c.notes || cfg.messages.noNotes)}</p>`,
    ].join('
');
  };

  input.addEventListener('keyup', applyFilter);
  modal.addEventListener('show.bs.modal', (event) => {
    const id = event.relatedTarget ? event.relatedTarget.getAttribute('data-bs-id') : null;
    const record = id ? consultas.find((c) => c.id === id) : undefined;
    content.innerHTML = record
      ? renderDetail(record)
      : `<p class="text-danger">${escapeHtml(cfg.messages.detailNotFound)}</p>`;
  });

  fetch(cfg.recordsPath)
    .then((res) => {
      if (!res.ok) throw new Error(`HTTP error! status: ${res.status}`);
      return res.json();
    })
    .then((data) => {
      if (!Array.isArray(data)) throw new Error('unexpected response body');
      consultas = data;
      applyFilter();
    })
    .catch((error) => {
      console.error('Error loading consultations:', error);
      tbody.innerHTML = messageRow(cfg.messages.loadFailed, 'text-center text-danger');
    });
});
"##;

fn layout(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{}</title>
  <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css" rel="stylesheet">
  <style>
    .info-grid {{ display: grid; grid-template-columns: max-content 1fr; gap: .25rem 1rem; margin-bottom: 1rem; }}
  </style>
</head>
<body>
{content}
<script src="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/js/bootstrap.bundle.min.js"></script>
</body>
</html>
"#,
        escape_html(title)
    )
}
