use serde::{Deserialize, Serialize};

/// One consultation entry as returned by the backend.
///
/// Field names on the wire are camelCase English. The Spanish names used by
/// the clinic's legacy export (`id_consulta`, `paciente`, ...) are accepted
/// on decode so older data files keep loading.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationRecord {
    #[serde(alias = "id_consulta")]
    pub id: String,
    #[serde(alias = "paciente")]
    pub patient: Patient,
    #[serde(alias = "fecha")]
    pub date: String,
    #[serde(alias = "hora")]
    pub time: String,
    #[serde(default, alias = "dentista", skip_serializing_if = "Option::is_none")]
    pub dentist: Option<String>,
    #[serde(alias = "motivo_consulta")]
    pub reason: String,
    #[serde(alias = "diagnostico")]
    pub diagnosis: Diagnosis,
    #[serde(alias = "tratamiento")]
    pub treatment: Treatment,
    #[serde(default, alias = "notas_adicionales", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "id_paciente")]
    pub patient_id: String,
    #[serde(alias = "edad")]
    pub age: u32,
    #[serde(alias = "genero")]
    pub gender: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    #[serde(alias = "descripcion")]
    pub description: String,
    #[serde(alias = "codigo_cie")]
    pub icd_code: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    #[serde(alias = "procedimiento")]
    pub procedure: String,
    /// Kept as the JSON number it arrived as, so `80`, `80.0` and `80.5`
    /// display exactly as received.
    #[serde(alias = "costo_usd")]
    pub cost_usd: serde_json::Number,
    #[serde(alias = "estado")]
    pub status: String,
}

impl ConsultationRecord {
    /// Notes with empty strings folded into `None`.
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref().filter(|n| !n.is_empty())
    }

    /// Date and time joined the way the table shows them.
    pub fn scheduled_at(&self) -> String {
        format!("{} {}", self.date, self.time)
    }
}

pub fn parse_records(bytes: &[u8]) -> Result<Vec<ConsultationRecord>, serde_json::Error> {
    serde_json::from_slice(bytes)
}
