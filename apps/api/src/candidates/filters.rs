//! List filters for `GET /api/candidates`.
//!
//! Dropdown sentinels (`Todos`, `Todas`) and empty strings mean "no filter".
//! Enum filters accept the persisted key or the display label; anything else
//! is rejected rather than silently matching nothing.

use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite};

use crate::catalog::enums::{edad_range_bounds, ALL_LOCATIONS_OPTION, ALL_OPTION};
use crate::catalog::{AreaInteres, CanalRecepcion, CatalogEnum, EstatusCandidato, Sexo, TipoContacto};
use crate::errors::FieldError;
use crate::pagination::PageRequest;

/// Columns matched by the free-text search.
const SEARCH_COLUMNS: &[&str] = &[
    "nombres_apellidos",
    "cedula",
    "experiencia",
    "comentarios",
    "telefonos",
    "direccion",
    "pds_asignado",
];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CandidateQuery {
    pub search: Option<String>,
    pub sexo: Option<String>,
    pub estatus: Option<String>,
    pub area_interes: Option<String>,
    pub canal_recepcion: Option<String>,
    pub tipo_contacto: Option<String>,
    pub ubicacion: Option<String>,
    pub zona: Option<String>,
    pub edad_min: Option<String>,
    pub edad_max: Option<String>,
    pub edad_rango: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CandidateFilter {
    pub search: Option<String>,
    pub sexo: Option<Sexo>,
    pub estatus: Option<EstatusCandidato>,
    pub area_interes: Option<AreaInteres>,
    pub canal_recepcion: Option<CanalRecepcion>,
    pub tipo_contacto: Option<TipoContacto>,
    pub ubicacion: Option<String>,
    pub zona: Option<String>,
    pub edad_min: Option<i64>,
    pub edad_max: Option<i64>,
}

fn active(value: Option<&str>, sentinel: &str) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != sentinel)
        .map(String::from)
}

/// Blank means absent; anything else must be an integer.
fn int_param(field: &str, value: Option<&str>, errors: &mut Vec<FieldError>) -> Option<i64> {
    let raw = value.map(str::trim).filter(|v| !v.is_empty())?;
    match raw.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            errors.push(FieldError::new(field, format!("Debe ser un número entero: \"{raw}\".")));
            None
        }
    }
}

fn enum_filter<T: CatalogEnum>(field: &str, value: Option<&str>, errors: &mut Vec<FieldError>) -> Option<T> {
    let raw = active(value, ALL_OPTION)?;
    let parsed = T::normalize(&raw);
    if parsed.is_none() {
        errors.push(FieldError::new(field, format!("Valor de filtro no reconocido: \"{raw}\".")));
    }
    parsed
}

impl CandidateQuery {
    pub fn into_filter(self) -> Result<(CandidateFilter, Option<PageRequest>), Vec<FieldError>> {
        let mut errors = Vec::new();

        let sexo = enum_filter("sexo", self.sexo.as_deref(), &mut errors);
        let estatus = enum_filter("estatus", self.estatus.as_deref(), &mut errors);
        let area_interes = enum_filter("area_interes", self.area_interes.as_deref(), &mut errors);
        let canal_recepcion = enum_filter("canal_recepcion", self.canal_recepcion.as_deref(), &mut errors);
        let tipo_contacto = enum_filter("tipo_contacto", self.tipo_contacto.as_deref(), &mut errors);

        let (range_min, range_max) = match self.edad_rango.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            None => (None, None),
            Some(option) => edad_range_bounds(option).unwrap_or_else(|| {
                errors.push(FieldError::new("edad_rango", format!("Rango de edad no reconocido: \"{option}\".")));
                (None, None)
            }),
        };
        let edad_min = tighter(int_param("edad_min", self.edad_min.as_deref(), &mut errors), range_min, i64::max);
        let edad_max = tighter(int_param("edad_max", self.edad_max.as_deref(), &mut errors), range_max, i64::min);
        let page = int_param("page", self.page.as_deref(), &mut errors);
        let per_page = int_param("per_page", self.per_page.as_deref(), &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        let filter = CandidateFilter {
            search: self.search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            sexo,
            estatus,
            area_interes,
            canal_recepcion,
            tipo_contacto,
            ubicacion: active(self.ubicacion.as_deref(), ALL_LOCATIONS_OPTION),
            zona: active(self.zona.as_deref(), ALL_LOCATIONS_OPTION),
            edad_min,
            edad_max,
        };
        Ok((filter, PageRequest::from_query(page, per_page)))
    }
}

fn tighter(a: Option<i64>, b: Option<i64>, pick: fn(i64, i64) -> i64) -> Option<i64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, b) => a.or(b),
    }
}

/// Escapes `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'` pattern.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

impl CandidateFilter {
    /// Appends ` WHERE ...` (always present) to `qb`.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" WHERE 1 = 1");

        if let Some(search) = &self.search {
            let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
            qb.push(" AND (");
            for (i, column) in SEARCH_COLUMNS.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push(format!("LOWER(COALESCE({column}, '')) LIKE "));
                qb.push_bind(pattern.clone());
                qb.push(" ESCAPE '\\'");
            }
            qb.push(")");
        }

        push_key(qb, "sexo", self.sexo);
        push_key(qb, "estatus", self.estatus);
        push_key(qb, "area_interes", self.area_interes);
        push_key(qb, "canal_recepcion", self.canal_recepcion);
        push_key(qb, "tipo_contacto", self.tipo_contacto);

        if let Some(ubicacion) = &self.ubicacion {
            qb.push(" AND ubicacion = ").push_bind(ubicacion.clone());
        }
        if let Some(zona) = &self.zona {
            qb.push(" AND zona_reside = ").push_bind(zona.clone());
        }
        if let Some(min) = self.edad_min {
            qb.push(" AND edad >= ").push_bind(min);
        }
        if let Some(max) = self.edad_max {
            qb.push(" AND edad <= ").push_bind(max);
        }
    }
}

fn push_key<T: CatalogEnum>(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, value: Option<T>) {
    if let Some(v) = value {
        qb.push(format!(" AND {column} = ")).push_bind(v.key());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Parses pairs the same way axum's `Query` extractor does.
    fn query(pairs: &[(&str, &str)]) -> CandidateQuery {
        let raw = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let uri: axum::http::Uri = format!("/api/candidates?{raw}").parse().unwrap();
        axum::extract::Query::<CandidateQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_sentinels_mean_no_filter() {
        let (filter, page) = query(&[("estatus", "Todos"), ("ubicacion", "Todas"), ("sexo", "")])
            .into_filter()
            .unwrap();
        assert_eq!(filter, CandidateFilter::default());
        assert_eq!(page, None);
    }

    #[test]
    fn test_labels_and_keys_normalize() {
        let (filter, _) = query(&[("estatus", "No%20Elegible"), ("area_interes", "Ventas")])
            .into_filter()
            .unwrap();
        assert_eq!(filter.estatus, Some(EstatusCandidato::NoElegible));
        assert_eq!(filter.area_interes, Some(AreaInteres::Ventas));
    }

    #[test]
    fn test_unknown_enum_value_is_rejected() {
        let errors = query(&[("estatus", "Archivado")]).into_filter().unwrap_err();
        assert_eq!(errors[0].field, "estatus");
    }

    #[test]
    fn test_age_range_intersects_explicit_bounds() {
        let (filter, _) = query(&[("edad_rango", "26-30"), ("edad_min", "28")]).into_filter().unwrap();
        assert_eq!((filter.edad_min, filter.edad_max), (Some(28), Some(30)));

        let (filter, _) = query(&[("edad_rango", "51%2B"), ("edad_max", "60")]).into_filter().unwrap();
        assert_eq!((filter.edad_min, filter.edad_max), (Some(51), Some(60)));
    }

    #[test]
    fn test_page_request_only_when_page_given() {
        let (_, page) = query(&[("page", "2"), ("per_page", "10")]).into_filter().unwrap();
        assert_eq!(page, Some(PageRequest { page: 2, per_page: 10 }));
    }

    #[test]
    fn test_blank_numbers_mean_no_filter() {
        let (filter, page) = query(&[("estatus", "Todos"), ("edad_min", ""), ("edad_max", ""), ("page", "1"), ("per_page", "")])
            .into_filter()
            .unwrap();
        assert_eq!((filter.edad_min, filter.edad_max), (None, None));
        assert_eq!(page.map(|p| p.page), Some(1));
    }

    #[test]
    fn test_non_numeric_bounds_are_field_errors() {
        let errors = query(&[("edad_min", "veinte"), ("page", "x")]).into_filter().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["edad_min", "page"]);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
    }

    #[test]
    fn test_where_clause_binds_keys() {
        let filter = CandidateFilter {
            estatus: Some(EstatusCandidato::EnProceso),
            search: Some("ana".into()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM candidates");
        filter.push_where(&mut qb);
        let sql = qb.sql();
        assert!(sql.contains("AND estatus = ?"));
        assert_eq!(sql.matches("LIKE ?").count(), SEARCH_COLUMNS.len());
    }
}
