use crate::assessment::AssessmentInput;
use crate::llm_client::prompts::SALARY_INSTRUCTION;

/// Longest experience text forwarded to the model.
pub const MAX_EXPERIENCE_CHARS: usize = 12_000;

fn clipped(text: &str) -> String {
    text.chars().take(MAX_EXPERIENCE_CHARS).collect()
}

pub fn build_suitability_prompt(input: &AssessmentInput) -> String {
    let edad = input
        .edad
        .map(|e| format!("- Edad: {e} años\n"))
        .unwrap_or_default();
    let salario = input
        .expectativa_salarial
        .map(|s| format!("\n(Nota: el candidato indicó una expectativa salarial de {s} USD.)\n{SALARY_INSTRUCTION}\n"))
        .unwrap_or_default();

    format!(
        r#"Eres un especialista en Recursos Humanos y reclutamiento. Evalúa la idoneidad del siguiente candidato.

Información del candidato:
- Nombre: {nombre}
{edad}- Experiencia laboral: {experiencia}
- Área de interés: {area}
- Ubicación: {ubicacion}
- Estatus actual en el proceso: {estatus}
{salario}
Responde con un objeto JSON con exactamente estas claves:
{{
  "es_apto": true | false,
  "explicacion": "2-3 frases que justifiquen la evaluación considerando experiencia, habilidades y área de interés",
  "recomendacion": "próximo paso claro y accionable, p. ej. 'Agendar entrevista inicial' o 'Archivar para futuras vacantes en el área de {area}'"
}}

No menciones la expectativa salarial en "explicacion" ni en "recomendacion"."#,
        nombre = input.nombres_apellidos,
        experiencia = clipped(&input.experiencia),
        area = input.area_interes,
        ubicacion = input.ubicacion,
        estatus = input.estatus_actual,
    )
}

pub fn build_summary_prompt(experiencia: &str) -> String {
    format!(
        r#"Eres un reclutador experto. Resume la siguiente experiencia laboral en un párrafo conciso, destacando las habilidades y logros más relevantes para que un reclutador evalúe rápidamente el historial del candidato.

Experiencia:
{experiencia}

Responde con un objeto JSON: {{"summary": "..."}}"#,
        experiencia = clipped(experiencia),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(salary: Option<f64>) -> AssessmentInput {
        AssessmentInput {
            nombres_apellidos: "Carmen Vásquez".into(),
            edad: Some(29),
            experiencia: "4 años en mantenimiento".into(),
            area_interes: "Servicios Generales",
            ubicacion: "Caracas".into(),
            estatus_actual: "En Proceso",
            expectativa_salarial: salary,
        }
    }

    #[test]
    fn test_salary_comes_with_its_instruction() {
        let prompt = build_suitability_prompt(&input(Some(650.0)));
        assert!(prompt.contains("650 USD"));
        assert!(prompt.contains(SALARY_INSTRUCTION));
        assert!(prompt.contains("- Edad: 29 años"));
    }

    #[test]
    fn test_no_salary_no_note() {
        let prompt = build_suitability_prompt(&input(None));
        assert!(!prompt.contains("USD"));
        assert!(prompt.contains("\"es_apto\""));
    }

    #[test]
    fn test_summary_prompt_is_clipped() {
        let long = "x".repeat(MAX_EXPERIENCE_CHARS + 50);
        let prompt = build_summary_prompt(&long);
        assert!(prompt.len() < MAX_EXPERIENCE_CHARS + 1000);
    }
}
