//! Recruitment report aggregation over a set of candidates.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogEnum, EstatusCandidato};
use crate::models::candidate::Candidate;

const MESES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Weekly,
    #[default]
    Monthly,
    Quarterly,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ReportSummary {
    pub total_candidates: usize,
    pub hired: usize,
    /// Percentage of hired candidates, two decimals.
    pub conversion_rate: f64,
    pub avg_process_days: i64,
    pub period: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SourceCount {
    pub source: &'static str,
    pub count: usize,
    pub percentage: u32,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PositionCount {
    pub position: &'static str,
    pub candidates: usize,
    pub hired: usize,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct StatusCount {
    pub status: &'static str,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub summary: ReportSummary,
    pub candidates_by_source: Vec<SourceCount>,
    pub candidates_by_position: Vec<PositionCount>,
    pub candidates_by_status: Vec<StatusCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<Vec<Candidate>>,
}

fn format_date(d: DateTime<Utc>) -> String {
    d.format("%d/%m/%Y").to_string()
}

/// Spanish label for the reported period. Explicit bounds win over `report_type`.
pub fn period_label(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    report_type: ReportType,
    now: DateTime<Utc>,
) -> String {
    if let (Some(start), Some(end)) = (start, end) {
        return format!("{} - {}", format_date(start), format_date(end));
    }
    match report_type {
        ReportType::Weekly => format!("Semana del {}", format_date(now)),
        ReportType::Quarterly => format!("Q{} {}", now.month0() / 3 + 1, now.year()),
        ReportType::Monthly => format!("{} de {}", MESES[now.month0() as usize], now.year()),
    }
}

/// Mean whole days between creation and last update of closed candidates, rounded.
pub fn avg_process_days(candidates: &[Candidate]) -> i64 {
    let closed: Vec<i64> = candidates
        .iter()
        .filter(|c| c.estatus.is_terminal())
        .map(|c| (c.updated_at - c.created_at).num_days().max(0))
        .collect();
    if closed.is_empty() {
        return 0;
    }
    (closed.iter().sum::<i64>() as f64 / closed.len() as f64).round() as i64
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Groups by key, largest group first; ties keep catalog declaration order.
fn grouped<T, V>(candidates: &[Candidate], key: impl Fn(&Candidate) -> T, init: V, mut add: impl FnMut(&mut V, &Candidate)) -> Vec<(T, V)>
where
    T: CatalogEnum + Eq + std::hash::Hash,
    V: Clone,
{
    let mut groups: HashMap<T, V> = HashMap::new();
    for c in candidates {
        add(groups.entry(key(c)).or_insert_with(|| init.clone()), c);
    }
    T::ALL
        .iter()
        .filter_map(|k| groups.remove(k).map(|v| (*k, v)))
        .collect()
}

pub fn build_report(
    candidates: Vec<Candidate>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    report_type: ReportType,
    include_raw: bool,
    now: DateTime<Utc>,
) -> Report {
    let total = candidates.len();
    let hired = candidates
        .iter()
        .filter(|c| c.estatus == EstatusCandidato::Contratado)
        .count();

    let mut candidates_by_source: Vec<SourceCount> =
        grouped(&candidates, |c| c.canal_recepcion, 0usize, |n, _| *n += 1)
            .into_iter()
            .map(|(canal, count)| SourceCount {
                source: canal.label(),
                count,
                percentage: percentage(count, total).round() as u32,
            })
            .collect();
    candidates_by_source.sort_by(|a, b| b.count.cmp(&a.count));

    let mut candidates_by_position: Vec<PositionCount> = grouped(
        &candidates,
        |c| c.area_interes,
        (0usize, 0usize),
        |(n, h), c| {
            *n += 1;
            if c.estatus == EstatusCandidato::Contratado {
                *h += 1;
            }
        },
    )
    .into_iter()
    .map(|(area, (candidates, hired))| PositionCount {
        position: area.label(),
        candidates,
        hired,
    })
    .collect();
    candidates_by_position.sort_by(|a, b| b.candidates.cmp(&a.candidates));

    let mut candidates_by_status: Vec<StatusCount> = grouped(&candidates, |c| c.estatus, 0usize, |n, _| *n += 1)
        .into_iter()
        .map(|(estatus, count)| StatusCount {
            status: estatus.label(),
            count,
        })
        .collect();
    candidates_by_status.sort_by(|a, b| b.count.cmp(&a.count));

    let summary = ReportSummary {
        total_candidates: total,
        hired,
        conversion_rate: (percentage(hired, total) * 100.0).round() / 100.0,
        avg_process_days: avg_process_days(&candidates),
        period: period_label(start, end, report_type, now),
    };

    Report {
        summary,
        candidates_by_source,
        candidates_by_position,
        candidates_by_status,
        raw_data: include_raw.then_some(candidates),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::repository::tests::new_candidate;
    use crate::catalog::{AreaInteres, CanalRecepcion};
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn candidate(estatus: EstatusCandidato, canal: CanalRecepcion, area: AreaInteres, days: i64) -> Candidate {
        let n = new_candidate("1234567", estatus);
        let created = Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap();
        Candidate {
            id: Uuid::new_v4(),
            nombres_apellidos: n.nombres_apellidos,
            cedula: n.cedula,
            sexo: n.sexo,
            edad: n.edad,
            num_hijos: n.num_hijos,
            canal_recepcion: canal,
            fuente: None,
            referido: None,
            tipo_contacto: n.tipo_contacto,
            fecha_contacto: n.fecha_contacto,
            telefonos: n.telefonos,
            citado_entrevista: false,
            fecha_entrevista: None,
            entrevistador_telefonico: None,
            entrevistador_presencial: None,
            solicitud_empleo: false,
            guia_entrevista: false,
            ubicacion: n.ubicacion,
            zona_reside: n.zona_reside,
            direccion: n.direccion,
            area_interes: area,
            expectativa_salarial: None,
            experiencia: n.experiencia,
            cuenta_bancaria: None,
            seguridad_bancaria: None,
            estatus,
            pds_asignado: None,
            comentarios: None,
            created_at: created,
            updated_at: created + Duration::days(days) + Duration::hours(3),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_period_labels() {
        let start = Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 31, 0, 0, 0).unwrap();
        assert_eq!(period_label(Some(start), Some(end), ReportType::Weekly, now()), "05/01/2026 - 31/03/2026");
        assert_eq!(period_label(Some(start), None, ReportType::Monthly, now()), "octubre de 2026");
        assert_eq!(period_label(None, None, ReportType::Quarterly, now()), "Q4 2026");
        assert_eq!(period_label(None, None, ReportType::Weekly, now()), "Semana del 16/10/2026");
    }

    #[test]
    fn test_empty_report_is_all_zero() {
        let report = build_report(Vec::new(), None, None, ReportType::Monthly, false, now());
        assert_eq!(report.summary.total_candidates, 0);
        assert_eq!(report.summary.conversion_rate, 0.0);
        assert_eq!(report.summary.avg_process_days, 0);
        assert!(report.candidates_by_source.is_empty());
        assert!(report.raw_data.is_none());
    }

    #[test]
    fn test_report_aggregates() {
        use AreaInteres::*;
        use CanalRecepcion::*;
        use EstatusCandidato::*;
        let candidates = vec![
            candidate(Contratado, Web, Ventas, 10),
            candidate(Rechazado, Web, Ventas, 4),
            candidate(Nuevo, Facebook, Logistica, 40),
        ];
        let report = build_report(candidates, None, None, ReportType::Monthly, true, now());

        assert_eq!(report.summary.hired, 1);
        assert_eq!(report.summary.conversion_rate, 33.33);
        // Only closed candidates count: (10 + 4) / 2.
        assert_eq!(report.summary.avg_process_days, 7);

        assert_eq!(
            report.candidates_by_source,
            vec![
                SourceCount { source: "Web", count: 2, percentage: 67 },
                SourceCount { source: "Facebook", count: 1, percentage: 33 },
            ]
        );
        assert_eq!(
            report.candidates_by_position[0],
            PositionCount { position: "Ventas", candidates: 2, hired: 1 }
        );
        assert_eq!(report.candidates_by_status.len(), 3);
        assert_eq!(report.raw_data.map(|r| r.len()), Some(3));
    }
}
