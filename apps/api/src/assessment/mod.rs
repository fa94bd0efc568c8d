pub mod handlers;
pub mod prompts;
pub mod suitability;

use std::sync::Arc;

use serde::Serialize;

use crate::catalog::CatalogEnum;
use crate::llm_client::LlmClient;
use crate::models::candidate::Candidate;
use suitability::{CandidateAssessor, HeuristicAssessor, LlmAssessor};

/// The candidate facts an assessment may look at.
#[derive(Debug, Clone)]
pub struct AssessmentInput {
    pub nombres_apellidos: String,
    pub edad: Option<i64>,
    pub experiencia: String,
    /// Display label.
    pub area_interes: &'static str,
    pub ubicacion: String,
    /// Display label.
    pub estatus_actual: &'static str,
    pub expectativa_salarial: Option<f64>,
}

impl From<&Candidate> for AssessmentInput {
    fn from(c: &Candidate) -> Self {
        AssessmentInput {
            nombres_apellidos: c.nombres_apellidos.clone(),
            edad: c.edad,
            experiencia: c.experiencia.clone(),
            area_interes: c.area_interes.label(),
            ubicacion: c.ubicacion.clone(),
            estatus_actual: c.estatus.label(),
            expectativa_salarial: c.expectativa_salarial,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuitabilityAssessment {
    pub es_apto: bool,
    pub explicacion: String,
    pub recomendacion: String,
    pub backend: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExperienceSummary {
    pub summary: String,
    pub backend: &'static str,
}

/// LLM backend when a client is available, heuristic otherwise.
pub fn select_assessor(llm: Option<LlmClient>) -> Arc<dyn CandidateAssessor> {
    match llm {
        Some(client) => Arc::new(LlmAssessor::new(client)),
        None => Arc::new(HeuristicAssessor),
    }
}
