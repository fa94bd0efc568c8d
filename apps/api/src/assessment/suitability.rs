//! Candidate assessment backends for the two AI tasks: suitability and experience summaries.
//!
//! `LlmAssessor` asks the generative model; `HeuristicAssessor` is pure Rust,
//! deterministic and needs no network. `AppState` holds an
//! `Arc<dyn CandidateAssessor>` chosen at startup from configuration.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::assessment::prompts::{build_suitability_prompt, build_summary_prompt};
use crate::assessment::{AssessmentInput, ExperienceSummary, SuitabilityAssessment};
use crate::catalog::{AreaInteres, CatalogEnum, EstatusCandidato};
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait CandidateAssessor: Send + Sync {
    /// Short name reported back to clients as `backend`.
    fn backend(&self) -> &'static str;

    async fn assess_suitability(&self, input: &AssessmentInput) -> Result<SuitabilityAssessment, AppError>;

    async fn summarize_experience(&self, experiencia: &str) -> Result<ExperienceSummary, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmAssessor
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmAssessor {
    llm: LlmClient,
}

impl LlmAssessor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[derive(Debug, Deserialize)]
struct LlmSuitability {
    #[serde(alias = "esApto")]
    es_apto: bool,
    explicacion: String,
    recomendacion: String,
}

#[derive(Debug, Deserialize)]
struct LlmSummary {
    #[serde(alias = "resumen")]
    summary: String,
}

#[async_trait]
impl CandidateAssessor for LlmAssessor {
    fn backend(&self) -> &'static str {
        "llm"
    }

    async fn assess_suitability(&self, input: &AssessmentInput) -> Result<SuitabilityAssessment, AppError> {
        let prompt = build_suitability_prompt(input);
        let answer: LlmSuitability = self.llm.call_json(&prompt, JSON_ONLY_SYSTEM).await?;

        if answer.explicacion.trim().is_empty() || answer.recomendacion.trim().is_empty() {
            return Err(AppError::Llm("La evaluación de idoneidad no generó una respuesta válida".into()));
        }

        Ok(SuitabilityAssessment {
            es_apto: answer.es_apto,
            explicacion: answer.explicacion.trim().to_string(),
            recomendacion: answer.recomendacion.trim().to_string(),
            backend: self.backend(),
        })
    }

    async fn summarize_experience(&self, experiencia: &str) -> Result<ExperienceSummary, AppError> {
        let prompt = build_summary_prompt(experiencia);
        let answer: LlmSummary = self.llm.call_json(&prompt, JSON_ONLY_SYSTEM).await?;

        let summary = answer.summary.trim();
        if summary.is_empty() {
            return Err(AppError::Llm("El resumen de la experiencia no generó una respuesta válida".into()));
        }
        Ok(ExperienceSummary {
            summary: summary.to_string(),
            backend: self.backend(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HeuristicAssessor: used when no API key is configured
// ────────────────────────────────────────────────────────────────────────────

/// Rule-based assessor.
///
/// Suitability:
/// 1. A closed or negative pipeline status (rejected, discarded, resigned...) → not suitable.
/// 2. Otherwise suitable when the experience text reports ≥ 1 year, or mentions
///    a keyword of the candidate's area of interest, and is not trivially short.
///
/// The salary expectation is never read.
pub struct HeuristicAssessor;

static YEARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2})\s*(?:\+\s*)?(?:años|anos|año)").expect("valid years regex"));

const MIN_EXPERIENCE_CHARS: usize = 20;
const SUMMARY_MAX_CHARS: usize = 400;

fn area_keywords(area: AreaInteres) -> &'static [&'static str] {
    match area {
        AreaInteres::OperarioMantenimiento => &["mantenimiento", "eléctric", "mecánic", "reparaci", "equipos"],
        AreaInteres::ServiciosGenerales => &["limpieza", "servicios generales", "conserje", "aseo"],
        AreaInteres::OperarioMantenimientoServiciosGenerales => {
            &["mantenimiento", "limpieza", "servicios generales", "reparaci"]
        }
        AreaInteres::EncargadaDePDS => &["pds", "supervis", "encargad", "coordin", "personal"],
        AreaInteres::Ventas => &["venta", "vendedor", "comercial", "cliente"],
        AreaInteres::Administracion => &["administra", "contab", "factura", "oficina"],
        AreaInteres::Marketing => &["marketing", "mercadeo", "redes sociales", "publicidad"],
        AreaInteres::TecnologiaInformacion => &["software", "programa", "sistemas", "soporte técnico", "redes"],
        AreaInteres::RecursosHumanos => &["recursos humanos", "reclutamiento", "nómina", "selección"],
        AreaInteres::Finanzas => &["finanz", "contab", "tesorer", "presupuesto"],
        AreaInteres::Operaciones => &["operaci", "logística", "producción", "supervis"],
        AreaInteres::AtencionCliente => &["atención al cliente", "cliente", "cajer", "call center", "recepci"],
        AreaInteres::Logistica => &["logística", "almacén", "inventario", "despacho", "transporte"],
        AreaInteres::Produccion => &["producción", "planta", "operari", "manufactura", "línea"],
        AreaInteres::Otro => &[],
    }
}

/// Largest "N años" figure in the text.
pub fn years_of_experience(text: &str) -> Option<u32> {
    YEARS
        .captures_iter(text)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .max()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl HeuristicAssessor {
    fn evaluate(&self, input: &AssessmentInput) -> (bool, String, String) {
        let experiencia = collapse_whitespace(&input.experiencia);
        let lower = experiencia.to_lowercase();
        let years = years_of_experience(&experiencia);
        let estatus = EstatusCandidato::from_label(input.estatus_actual);
        let area = AreaInteres::from_label(input.area_interes);
        let matched: Vec<&str> = area
            .map(area_keywords)
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(|k| lower.contains(k))
            .collect();

        if let Some(estatus) = estatus.filter(|e| e.is_negative()) {
            return (
                false,
                format!(
                    "{} se encuentra en estatus \"{}\", por lo que no continúa en el proceso de selección actual.",
                    input.nombres_apellidos,
                    estatus.label()
                ),
                format!("Archivar para futuras vacantes en el área de {}.", input.area_interes),
            );
        }

        let experience_part = match years {
            Some(y) if y >= 1 => format!("reporta {y} año{} de experiencia", if y == 1 { "" } else { "s" }),
            _ => "no indica años de experiencia".to_string(),
        };
        let relevance_part = if matched.is_empty() {
            format!("no se identifican en su experiencia términos afines al área de {}", input.area_interes)
        } else {
            format!(
                "su experiencia menciona aspectos afines al área de {} ({})",
                input.area_interes,
                matched.join(", ")
            )
        };

        let apto = experiencia.chars().count() >= MIN_EXPERIENCE_CHARS
            && (years.unwrap_or(0) >= 1 || !matched.is_empty());

        let explicacion = format!(
            "{} {} y {}. {}",
            input.nombres_apellidos,
            experience_part,
            relevance_part,
            if apto {
                "El perfil se considera apto para continuar en el proceso."
            } else {
                "La información disponible no es suficiente para considerarlo apto."
            }
        );

        let recomendacion = match (apto, estatus) {
            (_, Some(EstatusCandidato::Contratado)) => {
                "El candidato ya fue contratado; no se requieren nuevas acciones de selección.".to_string()
            }
            (true, Some(EstatusCandidato::Entrevistado)) => {
                "Avanzar a la siguiente etapa y verificar referencias laborales.".to_string()
            }
            (true, _) => "Agendar una entrevista inicial para validar su experiencia.".to_string(),
            (false, _) => "Solicitar más detalles sobre su experiencia laboral antes de decidir.".to_string(),
        };

        (apto, explicacion, recomendacion)
    }
}

#[async_trait]
impl CandidateAssessor for HeuristicAssessor {
    fn backend(&self) -> &'static str {
        "heuristic"
    }

    async fn assess_suitability(&self, input: &AssessmentInput) -> Result<SuitabilityAssessment, AppError> {
        let (es_apto, explicacion, recomendacion) = self.evaluate(input);
        Ok(SuitabilityAssessment {
            es_apto,
            explicacion,
            recomendacion,
            backend: self.backend(),
        })
    }

    async fn summarize_experience(&self, experiencia: &str) -> Result<ExperienceSummary, AppError> {
        let text = collapse_whitespace(experiencia);
        if text.is_empty() {
            return Err(AppError::Validation("La experiencia está vacía".into()));
        }

        // First two sentences, clipped.
        let mut summary = String::new();
        for sentence in text.split_inclusive(|c: char| matches!(c, '.' | '!' | '?')).take(2) {
            summary.push_str(sentence);
        }
        let mut summary: String = summary.trim().to_string();
        if summary.chars().count() > SUMMARY_MAX_CHARS {
            summary = summary.chars().take(SUMMARY_MAX_CHARS).collect::<String>().trim_end().to_string();
            summary.push('…');
        }
        if let Some(years) = years_of_experience(&text) {
            summary.push_str(&format!(" Experiencia total reportada: {years} años."));
        }

        Ok(ExperienceSummary {
            summary,
            backend: self.backend(),
        })
    }
}
