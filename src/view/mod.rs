//! Page-level controller for the consultation history view.
//!
//! The controller owns the record cache and the two rendered regions (table
//! body and detail modal content). Hosts feed it [`ViewEvent`]s and read the
//! regions back; no host touches the cache directly.

use crate::filter::RecordFilter;
use crate::loader::{LoadError, RecordSource};
use crate::model::ConsultationRecord;
use crate::render::{self, html, terminal, DetailView, LOAD_FAILED_MESSAGE};
use crate::store::ConsultationStore;

#[derive(Debug)]
pub enum ViewEvent {
    /// Outcome of the single load issued at start-up.
    Loaded(Result<Vec<ConsultationRecord>, LoadError>),
    /// The filter input changed to this value.
    FilterChanged(String),
    /// The detail modal is about to open for this identifier. `None` when
    /// the triggering control carried no identifier.
    DetailRequested(Option<String>),
}

/// Output format for the rendered regions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Surface {
    #[default]
    Html,
    Terminal,
}

impl Surface {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "html" | "htm" => Some(Self::Html),
            "terminal" | "term" | "text" | "txt" => Some(Self::Terminal),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ConsultationView {
    store: ConsultationStore,
    surface: Surface,
    filter: RecordFilter,
    filter_input: String,
    table_body: String,
    modal_body: String,
    load_failed: bool,
}

impl ConsultationView {
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            ..Self::default()
        }
    }

    /// Runs the loader once against `source` and applies the outcome.
    /// A failed load is reported through the returned error as well as the
    /// rendered table region.
    pub async fn load(&mut self, source: &RecordSource) -> Result<(), String> {
        let outcome = source.fetch().await;
        let err = outcome.as_ref().err().map(|e| e.to_string());
        self.handle(ViewEvent::Loaded(outcome));
        match err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn handle(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::Loaded(Ok(records)) => {
                tracing::info!(count = records.len(), "consultation records loaded");
                self.store.replace(records);
                self.load_failed = false;
                self.render_table();
            }
            ViewEvent::Loaded(Err(e)) => {
                tracing::error!(error = %e, "failed to load consultation records");
                self.load_failed = true;
                self.table_body = match self.surface {
                    Surface::Html => html::message_row(LOAD_FAILED_MESSAGE, "text-center text-danger"),
                    Surface::Terminal => terminal::load_failed(LOAD_FAILED_MESSAGE),
                };
            }
            ViewEvent::FilterChanged(input) => {
                self.filter = RecordFilter::new(&input);
                self.filter_input = input;
                self.render_table();
            }
            ViewEvent::DetailRequested(id) => self.render_detail(id.as_deref()),
        }
    }

    fn render_table(&mut self) {
        let selected = self.filter.apply(self.store.records());
        let rows = render::table_rows(selected);
        self.table_body = match self.surface {
            Surface::Html => html::table_body(&rows),
            Surface::Terminal => terminal::table(&rows),
        };
    }

    fn render_detail(&mut self, id: Option<&str>) {
        let record = id.and_then(|id| self.store.find(id));
        self.modal_body = match (record, self.surface) {
            (Some(r), Surface::Html) => html::detail(&DetailView::from_record(r)),
            (Some(r), Surface::Terminal) => terminal::detail(&DetailView::from_record(r)),
            (None, Surface::Html) => html::detail_not_found(),
            (None, Surface::Terminal) => terminal::detail_not_found(),
        };
        if record.is_none() {
            tracing::debug!(id = id.unwrap_or_default(), "no consultation matches detail request");
        }
    }

    pub fn records(&self) -> &[ConsultationRecord] {
        self.store.records()
    }

    /// Records currently selected by the filter, in cache order.
    pub fn visible(&self) -> Vec<&ConsultationRecord> {
        self.filter.apply(self.store.records())
    }

    pub fn filter_input(&self) -> &str {
        &self.filter_input
    }

    pub fn table_body(&self) -> &str {
        &self.table_body
    }

    pub fn modal_body(&self) -> &str {
        &self.modal_body
    }

    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    pub fn render_page(&self) -> String {
        html::history_page(&self.filter_input, &self.table_body, &self.modal_body)
    }
}
