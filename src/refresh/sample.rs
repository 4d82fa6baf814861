use crate::model::{ConsultationRecord, Diagnosis, Patient, Treatment};

/// Built-in dataset used when no upstream source is configured.
pub fn sample_records() -> Vec<ConsultationRecord> {
    vec![
        record(
            "C001",
            ("Ana García", "P078", 34, "Female"),
            ("2025-09-26", "10:00 AM"),
            "Dr. Carlos Sánchez",
            "Checkup and dental cleaning.",
            ("Plaque and tartar.", "K03.6"),
            ("Prophylaxis.", 80, "Completed"),
            "Improve brushing technique.",
        ),
        record(
            "C002",
            ("Luis Martínez", "P102", 45, "Male"),
            ("2025-09-26", "11:30 AM"),
            "Dr. Elena Torres",
            "Molar pain.",
            ("Deep caries.", "K02.1"),
            ("Root canal.", 750, "In progress"),
            "Follow-up in 2 weeks.",
        ),
        record(
            "C004",
            ("Ricardo Vargas", "P115", 52, "Male"),
            ("2025-09-28", "04:00 PM"),
            "Dr. Elena Torres",
            "Dental implant.",
            ("Missing tooth 24.", "K08.1"),
            ("Titanium implant placement.", 1200, "Pending"),
            "Requires CT scan evaluation.",
        ),
        record(
            "C005",
            ("Elena Jiménez", "P120", 28, "Female"),
            ("2025-09-30", "09:00 AM"),
            "Dr. Carlos Sánchez",
            "Orthodontics.",
            ("Malocclusion.", "K07.4"),
            ("Braces fitting.", 2500, "Pending"),
            "24-month treatment plan.",
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn record(
    id: &str,
    patient: (&str, &str, u32, &str),
    when: (&str, &str),
    dentist: &str,
    reason: &str,
    diagnosis: (&str, &str),
    treatment: (&str, u64, &str),
    notes: &str,
) -> ConsultationRecord {
    ConsultationRecord {
        id: id.to_string(),
        patient: Patient {
            name: patient.0.to_string(),
            patient_id: patient.1.to_string(),
            age: patient.2,
            gender: patient.3.to_string(),
        },
        date: when.0.to_string(),
        time: when.1.to_string(),
        dentist: Some(dentist.to_string()),
        reason: reason.to_string(),
        diagnosis: Diagnosis {
            description: diagnosis.0.to_string(),
            icd_code: diagnosis.1.to_string(),
        },
        treatment: Treatment {
            procedure: treatment.0.to_string(),
            cost_usd: treatment.1.into(),
            status: treatment.2.to_string(),
        },
        notes: Some(notes.to_string()),
    }
}
