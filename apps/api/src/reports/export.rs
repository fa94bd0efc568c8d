//! CSV export of candidate rows. Enum columns carry display labels.

use chrono::{DateTime, Utc};

use crate::catalog::CatalogEnum;
use crate::models::candidate::Candidate;

const HEADER: &[&str] = &[
    "id",
    "nombres_apellidos",
    "cedula",
    "sexo",
    "edad",
    "num_hijos",
    "canal_recepcion",
    "fuente",
    "referido",
    "tipo_contacto",
    "fecha_contacto",
    "telefonos",
    "citado_entrevista",
    "fecha_entrevista",
    "entrevistador_telefonico",
    "entrevistador_presencial",
    "solicitud_empleo",
    "guia_entrevista",
    "ubicacion",
    "zona_reside",
    "direccion",
    "area_interes",
    "expectativa_salarial",
    "experiencia",
    "estatus",
    "pds_asignado",
    "comentarios",
    "created_at",
    "updated_at",
];

/// Quotes a field when it holds a delimiter, quote or line break (RFC 4180).
fn escape_field(value: &str) -> String {
    if value.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn yes_no(value: bool) -> String {
    if value { "Sí" } else { "No" }.to_string()
}

fn date(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

fn row(c: &Candidate) -> Vec<String> {
    vec![
        c.id.to_string(),
        c.nombres_apellidos.clone(),
        c.cedula.clone(),
        c.sexo.label().to_string(),
        opt(&c.edad),
        opt(&c.num_hijos),
        c.canal_recepcion.label().to_string(),
        opt(&c.fuente),
        opt(&c.referido),
        c.tipo_contacto.label().to_string(),
        date(c.fecha_contacto),
        c.telefonos.clone(),
        yes_no(c.citado_entrevista),
        c.fecha_entrevista.map(date).unwrap_or_default(),
        opt(&c.entrevistador_telefonico),
        opt(&c.entrevistador_presencial),
        yes_no(c.solicitud_empleo),
        yes_no(c.guia_entrevista),
        c.ubicacion.clone(),
        c.zona_reside.clone(),
        c.direccion.clone(),
        c.area_interes.label().to_string(),
        opt(&c.expectativa_salarial),
        c.experiencia.clone(),
        c.estatus.label().to_string(),
        opt(&c.pds_asignado),
        opt(&c.comentarios),
        date(c.created_at),
        date(c.updated_at),
    ]
}

/// Header plus one CRLF-terminated line per candidate. Banking fields are never exported.
pub fn candidates_to_csv(candidates: &[Candidate]) -> String {
    let mut out = String::new();
    let mut push_line = |fields: Vec<String>| {
        let line: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
        out.push_str(&line.join(","));
        out.push_str("\r\n");
    };
    push_line(HEADER.iter().map(|h| h.to_string()).collect());
    for c in candidates {
        push_line(row(c));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("simple"), "simple");
        assert_eq!(escape_field("Calle 3, Casa 12"), "\"Calle 3, Casa 12\"");
        assert_eq!(escape_field("dijo \"sí\""), "\"dijo \"\"sí\"\"\"");
        assert_eq!(escape_field("a\nb"), "\"a\nb\"");
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let csv = candidates_to_csv(&[]);
        assert_eq!(csv, format!("{}\r\n", HEADER.join(",")));
        assert!(!csv.contains("cuenta_bancaria"));
    }
}
