//! Candidate form validation.
//!
//! `CandidateInput` is the loose wire shape: every field optional, enums as
//! key-or-label strings, numbers as JSON numbers or numeric strings. Creation
//! validates it directly; updates first overlay the patch on the stored
//! candidate (`CandidateInput::from(&Candidate).overlay(patch)`) and validate
//! the merged result, so a partial update can never produce a record a create
//! would have rejected.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::catalog::{AreaInteres, CanalRecepcion, CatalogEnum, EstatusCandidato, Sexo, TipoContacto};
use crate::errors::FieldError;
use crate::models::candidate::{Candidate, NewCandidate};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CandidateInput {
    pub nombres_apellidos: Option<String>,
    pub cedula: Option<String>,
    pub sexo: Option<String>,
    pub edad: Option<Value>,
    pub num_hijos: Option<Value>,
    pub canal_recepcion: Option<String>,
    pub fuente: Option<String>,
    pub referido: Option<String>,
    pub tipo_contacto: Option<String>,
    pub fecha_contacto: Option<String>,
    pub telefonos: Option<String>,
    pub citado_entrevista: Option<bool>,
    pub fecha_entrevista: Option<String>,
    pub entrevistador_telefonico: Option<String>,
    pub entrevistador_presencial: Option<String>,
    pub solicitud_empleo: Option<bool>,
    pub guia_entrevista: Option<bool>,
    pub ubicacion: Option<String>,
    pub zona_reside: Option<String>,
    pub direccion: Option<String>,
    pub area_interes: Option<String>,
    pub expectativa_salarial: Option<Value>,
    pub experiencia: Option<String>,
    pub cuenta_bancaria: Option<String>,
    pub seguridad_bancaria: Option<String>,
    pub estatus: Option<String>,
    pub pds_asignado: Option<String>,
    pub comentarios: Option<String>,
}

impl CandidateInput {
    /// Fields present in `patch` replace the ones in `self`.
    pub fn overlay(self, patch: CandidateInput) -> CandidateInput {
        macro_rules! merged {
            ($($field:ident),+ $(,)?) => {
                CandidateInput { $($field: patch.$field.or(self.$field)),+ }
            };
        }
        merged!(
            nombres_apellidos,
            cedula,
            sexo,
            edad,
            num_hijos,
            canal_recepcion,
            fuente,
            referido,
            tipo_contacto,
            fecha_contacto,
            telefonos,
            citado_entrevista,
            fecha_entrevista,
            entrevistador_telefonico,
            entrevistador_presencial,
            solicitud_empleo,
            guia_entrevista,
            ubicacion,
            zona_reside,
            direccion,
            area_interes,
            expectativa_salarial,
            experiencia,
            cuenta_bancaria,
            seguridad_bancaria,
            estatus,
            pds_asignado,
            comentarios,
        )
    }
}

impl From<&Candidate> for CandidateInput {
    fn from(c: &Candidate) -> Self {
        CandidateInput {
            nombres_apellidos: Some(c.nombres_apellidos.clone()),
            cedula: Some(c.cedula.clone()),
            sexo: Some(c.sexo.key().to_string()),
            edad: c.edad.map(Value::from),
            num_hijos: c.num_hijos.map(Value::from),
            canal_recepcion: Some(c.canal_recepcion.key().to_string()),
            fuente: c.fuente.clone(),
            referido: c.referido.clone(),
            tipo_contacto: Some(c.tipo_contacto.key().to_string()),
            fecha_contacto: Some(c.fecha_contacto.to_rfc3339()),
            telefonos: Some(c.telefonos.clone()),
            citado_entrevista: Some(c.citado_entrevista),
            fecha_entrevista: c.fecha_entrevista.map(|d| d.to_rfc3339()),
            entrevistador_telefonico: c.entrevistador_telefonico.clone(),
            entrevistador_presencial: c.entrevistador_presencial.clone(),
            solicitud_empleo: Some(c.solicitud_empleo),
            guia_entrevista: Some(c.guia_entrevista),
            ubicacion: Some(c.ubicacion.clone()),
            zona_reside: Some(c.zona_reside.clone()),
            direccion: Some(c.direccion.clone()),
            area_interes: Some(c.area_interes.key().to_string()),
            expectativa_salarial: c.expectativa_salarial.map(Value::from),
            experiencia: Some(c.experiencia.clone()),
            cuenta_bancaria: c.cuenta_bancaria.clone(),
            seguridad_bancaria: c.seguridad_bancaria.clone(),
            estatus: Some(c.estatus.key().to_string()),
            pds_asignado: c.pds_asignado.clone(),
            comentarios: c.comentarios.clone(),
        }
    }
}

/// Collects every violation instead of stopping at the first one.
#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn fail(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError::new(field, message));
    }

    fn text(&mut self, field: &str, value: Option<&str>, min_chars: usize, message: &str) -> String {
        let value = value.map(str::trim).unwrap_or_default();
        if value.chars().count() < min_chars {
            self.fail(field, message);
        }
        value.to_string()
    }

    fn choice<T: CatalogEnum>(&mut self, field: &str, value: Option<&str>, message: &str) -> Option<T> {
        let parsed = value.and_then(T::normalize);
        if parsed.is_none() {
            self.fail(field, message);
        }
        parsed
    }

    fn number(&mut self, field: &str, value: Option<&Value>) -> Option<f64> {
        match coerce_number(value) {
            Ok(n) => n,
            Err(()) => {
                self.fail(field, "Debe ser un número.");
                None
            }
        }
    }

    fn integer_in(&mut self, field: &str, value: Option<&Value>, min: i64, max: i64, message: &str) -> Option<i64> {
        let n = self.number(field, value)?;
        if n.fract() != 0.0 || n < min as f64 || n > max as f64 {
            self.fail(field, message);
            return None;
        }
        Some(n as i64)
    }
}

/// Validates a candidate payload. `now` fills a missing `fecha_contacto`.
pub fn validate_candidate(input: &CandidateInput, now: DateTime<Utc>) -> Result<NewCandidate, Vec<FieldError>> {
    let mut c = Checker::default();

    let nombres_apellidos = c.text(
        "nombres_apellidos",
        input.nombres_apellidos.as_deref(),
        3,
        "Nombres y apellidos son requeridos.",
    );

    let cedula = c.text("cedula", input.cedula.as_deref(), 6, "Cédula es requerida.");
    if !cedula.is_empty() && !cedula.chars().all(|ch| ch.is_ascii_digit()) {
        c.fail("cedula", "Cédula debe ser numérica.");
    }

    let sexo = c.choice::<Sexo>("sexo", input.sexo.as_deref(), "Seleccione un sexo.");
    let edad = c.integer_in("edad", input.edad.as_ref(), 18, 99, "Edad debe estar entre 18 y 99.");
    let num_hijos = c.integer_in(
        "num_hijos",
        input.num_hijos.as_ref(),
        0,
        20,
        "Número de hijos debe ser entre 0 y 20.",
    );
    let canal_recepcion = c.choice::<CanalRecepcion>(
        "canal_recepcion",
        input.canal_recepcion.as_deref(),
        "Seleccione un canal de recepción.",
    );
    let tipo_contacto = c.choice::<TipoContacto>(
        "tipo_contacto",
        input.tipo_contacto.as_deref(),
        "Seleccione un tipo de contacto.",
    );

    let fecha_contacto = match non_blank(input.fecha_contacto.as_deref()) {
        None => Some(now),
        Some(raw) => {
            let parsed = parse_datetime(&raw);
            if parsed.is_none() {
                c.fail("fecha_contacto", "Fecha de contacto inválida.");
            }
            parsed
        }
    };

    let telefonos = c.text("telefonos", input.telefonos.as_deref(), 7, "Teléfono es requerido.");
    let citado_entrevista = input.citado_entrevista.unwrap_or(false);

    let fecha_entrevista = match non_blank(input.fecha_entrevista.as_deref()) {
        None => None,
        Some(raw) => {
            let parsed = parse_datetime(&raw);
            if parsed.is_none() {
                c.fail("fecha_entrevista", "Fecha de entrevista inválida.");
            }
            parsed
        }
    };
    if citado_entrevista && fecha_entrevista.is_none() && non_blank(input.fecha_entrevista.as_deref()).is_none() {
        c.fail("fecha_entrevista", "Fecha de entrevista es requerida si fue citado.");
    }

    let ubicacion = c.text("ubicacion", input.ubicacion.as_deref(), 1, "Ubicación es requerida.");
    let zona_reside = c.text("zona_reside", input.zona_reside.as_deref(), 1, "Zona de residencia es requerida.");
    let direccion = c.text("direccion", input.direccion.as_deref(), 5, "Dirección es requerida.");
    let area_interes = c.choice::<AreaInteres>(
        "area_interes",
        input.area_interes.as_deref(),
        "Seleccione un área de interés.",
    );

    let expectativa_salarial = c.number("expectativa_salarial", input.expectativa_salarial.as_ref());
    if matches!(expectativa_salarial, Some(v) if v <= 0.0) {
        c.fail("expectativa_salarial", "Expectativa salarial debe ser un número positivo.");
    }

    let experiencia = c.text("experiencia", input.experiencia.as_deref(), 1, "Experiencia es requerida.");
    let estatus = c.choice::<EstatusCandidato>("estatus", input.estatus.as_deref(), "Seleccione un estatus.");

    match (sexo, canal_recepcion, tipo_contacto, fecha_contacto, area_interes, estatus) {
        (Some(sexo), Some(canal_recepcion), Some(tipo_contacto), Some(fecha_contacto), Some(area_interes), Some(estatus))
            if c.errors.is_empty() =>
        {
            Ok(NewCandidate {
                nombres_apellidos,
                cedula,
                sexo,
                edad,
                num_hijos,
                canal_recepcion,
                fuente: non_blank(input.fuente.as_deref()),
                referido: non_blank(input.referido.as_deref()),
                tipo_contacto,
                fecha_contacto,
                telefonos,
                citado_entrevista,
                fecha_entrevista,
                entrevistador_telefonico: non_blank(input.entrevistador_telefonico.as_deref()),
                entrevistador_presencial: non_blank(input.entrevistador_presencial.as_deref()),
                solicitud_empleo: input.solicitud_empleo.unwrap_or(false),
                guia_entrevista: input.guia_entrevista.unwrap_or(false),
                ubicacion,
                zona_reside,
                direccion,
                area_interes,
                expectativa_salarial: expectativa_salarial.filter(|v| *v > 0.0),
                experiencia,
                cuenta_bancaria: non_blank(input.cuenta_bancaria.as_deref()),
                seguridad_bancaria: non_blank(input.seguridad_bancaria.as_deref()),
                estatus,
                pds_asignado: non_blank(input.pds_asignado.as_deref()),
                comentarios: non_blank(input.comentarios.as_deref()),
            })
        }
        _ => Err(c.errors),
    }
}

/// Trims optional free text; blank becomes `None`.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

/// `Ok(None)` for absent, null or blank values; `Err` for anything non-numeric.
fn coerce_number(value: Option<&Value>) -> Result<Option<f64>, ()> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_f64().map(Some).ok_or(()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(Some).map_err(|_| ()),
        Some(_) => Err(()),
    }
}

/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM[:SS]` (read as UTC) and plain dates.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    pub(crate) fn valid_input() -> CandidateInput {
        serde_json::from_value(json!({
            "nombres_apellidos": "María Fernanda Pérez",
            "cedula": "18456789",
            "sexo": "Femenino",
            "edad": 29,
            "num_hijos": "1",
            "canal_recepcion": "Redes Sociales",
            "tipo_contacto": "Llamada",
            "fecha_contacto": "2026-03-02",
            "telefonos": "0412-5551234",
            "citado_entrevista": false,
            "solicitud_empleo": true,
            "guia_entrevista": false,
            "ubicacion": "Caracas",
            "zona_reside": "Petare",
            "direccion": "Calle 3, Casa 12",
            "area_interes": "Atención al Cliente",
            "expectativa_salarial": 250,
            "experiencia": "Tres años como cajera en supermercado",
            "estatus": "Nuevo",
            "comentarios": "   "
        }))
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_valid_input_normalizes_enums_and_blanks() {
        let c = validate_candidate(&valid_input(), now()).unwrap();
        assert_eq!(c.canal_recepcion, CanalRecepcion::RedesSociales);
        assert_eq!(c.area_interes, AreaInteres::AtencionCliente);
        assert_eq!(c.num_hijos, Some(1));
        assert_eq!(c.comentarios, None);
        assert_eq!(c.fecha_contacto, Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_missing_fecha_contacto_defaults_to_now() {
        let mut input = valid_input();
        input.fecha_contacto = None;
        let c = validate_candidate(&input, now()).unwrap();
        assert_eq!(c.fecha_contacto, now());
    }

    #[test]
    fn test_cedula_must_be_numeric() {
        let mut input = valid_input();
        input.cedula = Some("V-1845678".into());
        let errors = validate_candidate(&input, now()).unwrap_err();
        assert_eq!(errors[0].message, "Cédula debe ser numérica.");
    }

    #[test]
    fn test_reports_all_violations_at_once() {
        let input = CandidateInput {
            edad: Some(json!(17)),
            expectativa_salarial: Some(json!(-5)),
            ..Default::default()
        };
        let errors = validate_candidate(&input, now()).unwrap_err();
        let fields = fields(&errors);
        for expected in [
            "nombres_apellidos",
            "cedula",
            "sexo",
            "edad",
            "canal_recepcion",
            "tipo_contacto",
            "telefonos",
            "ubicacion",
            "zona_reside",
            "direccion",
            "area_interes",
            "expectativa_salarial",
            "experiencia",
            "estatus",
        ] {
            assert!(fields.contains(&expected), "missing error for {expected}");
        }
    }

    #[test]
    fn test_interview_date_required_when_cited() {
        let mut input = valid_input();
        input.citado_entrevista = Some(true);
        let errors = validate_candidate(&input, now()).unwrap_err();
        assert_eq!(fields(&errors), vec!["fecha_entrevista"]);

        input.fecha_entrevista = Some("2026-03-12T14:30".into());
        let c = validate_candidate(&input, now()).unwrap();
        assert_eq!(c.fecha_entrevista, Some(Utc.with_ymd_and_hms(2026, 3, 12, 14, 30, 0).unwrap()));
    }

    #[test]
    fn test_numeric_strings_are_coerced_and_garbage_rejected() {
        let mut input = valid_input();
        input.edad = Some(json!("35"));
        input.expectativa_salarial = Some(json!(""));
        let c = validate_candidate(&input, now()).unwrap();
        assert_eq!(c.edad, Some(35));
        assert_eq!(c.expectativa_salarial, None);

        input.num_hijos = Some(json!("dos"));
        let errors = validate_candidate(&input, now()).unwrap_err();
        assert_eq!(fields(&errors), vec!["num_hijos"]);
    }

    #[test]
    fn test_fractional_age_rejected() {
        let mut input = valid_input();
        input.edad = Some(json!(30.5));
        assert!(validate_candidate(&input, now()).is_err());
    }

    #[test]
    fn test_overlay_keeps_unpatched_fields() {
        let base = valid_input();
        let patch = CandidateInput {
            estatus: Some("En Proceso".into()),
            comentarios: Some("Llamar el lunes".into()),
            ..Default::default()
        };
        let merged = base.overlay(patch);
        let c = validate_candidate(&merged, now()).unwrap();
        assert_eq!(c.estatus, EstatusCandidato::EnProceso);
        assert_eq!(c.cedula, "18456789");
        assert_eq!(c.comentarios.as_deref(), Some("Llamar el lunes"));
    }

    #[test]
    fn test_parse_datetime_formats() {
        assert!(parse_datetime("2026-01-05T10:00:00Z").is_some());
        assert!(parse_datetime("2026-01-05T10:00:00-04:00").is_some());
        assert!(parse_datetime("2026-01-05").is_some());
        assert!(parse_datetime("05/01/2026").is_none());
    }
}
