use crate::model::ConsultationRecord;

/// Case-insensitive substring filter over the five searchable fields:
/// patient name, record id, reason, treatment status and date.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordFilter {
    needle: String,
}

impl RecordFilter {
    pub fn new(input: &str) -> Self {
        Self {
            needle: input.to_lowercase(),
        }
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, record: &ConsultationRecord) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        searchable_fields(record)
            .iter()
            .any(|field| field.to_lowercase().contains(&self.needle))
    }

    /// Borrowing selection in cache order. The input slice is never touched.
    pub fn apply<'a>(&self, records: &'a [ConsultationRecord]) -> Vec<&'a ConsultationRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

fn searchable_fields(record: &ConsultationRecord) -> [&str; 5] {
    [
        record.patient.name.as_str(),
        record.id.as_str(),
        record.reason.as_str(),
        record.treatment.status.as_str(),
        record.date.as_str(),
    ]
}

pub fn filter_records<'a>(
    records: &'a [ConsultationRecord],
    input: &str,
) -> Vec<&'a ConsultationRecord> {
    RecordFilter::new(input).apply(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refresh::sample_records;

    fn ids(selected: &[&ConsultationRecord]) -> Vec<String> {
        selected.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn empty_input_selects_everything_in_order() {
        let records = sample_records();
        let selected = filter_records(&records, "");
        assert_eq!(ids(&selected), vec!["C001", "C002", "C004", "C005"]);
    }

    #[test]
    fn matches_patient_name_case_insensitively() {
        let records = sample_records();
        assert_eq!(ids(&filter_records(&records, "ANA gar")), vec!["C001"]);
    }

    #[test]
    fn matches_non_ascii_names_after_lowercasing() {
        let records = sample_records();
        assert_eq!(ids(&filter_records(&records, "MARTÍNEZ")), vec!["C002"]);
    }

    #[test]
    fn matches_id_reason_status_and_date() {
        let records = sample_records();
        assert_eq!(ids(&filter_records(&records, "c00")).len(), 4);
        assert_eq!(ids(&filter_records(&records, "implant")), vec!["C004"]);
        assert_eq!(ids(&filter_records(&records, "pending")), vec!["C004", "C005"]);
        assert_eq!(ids(&filter_records(&records, "2025-09-26")), vec!["C001", "C002"]);
    }

    #[test]
    fn ignores_unsearched_fields() {
        let records = sample_records();
        // ICD codes and procedures are not searchable.
        assert!(filter_records(&records, "K03.6").is_empty());
        assert!(filter_records(&records, "prophylaxis").is_empty());
    }

    #[test]
    fn selection_partitions_the_cache() {
        let records = sample_records();
        for input in ["a", "o", "C00", "progress", "zzz", "09-2", " "] {
            let f = RecordFilter::new(input);
            let selected = f.apply(&records);
            let needle = input.to_lowercase();
            for r in &records {
                let hit = searchable_fields(r)
                    .iter()
                    .any(|s| s.to_lowercase().contains(&needle));
                assert_eq!(hit, selected.iter().any(|s| s.id == r.id), "input {input:?}");
            }
        }
    }

    #[test]
    fn filtering_leaves_the_source_untouched() {
        let records = sample_records();
        let before = records.clone();
        let _ = filter_records(&records, "pending");
        assert_eq!(records, before);
    }
}
