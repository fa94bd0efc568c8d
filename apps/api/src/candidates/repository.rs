use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::query::QueryAs;
use sqlx::sqlite::SqliteArguments;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::candidates::filters::CandidateFilter;
use crate::catalog::{AreaInteres, CatalogEnum, EstatusCandidato, Sexo};
use crate::errors::AppError;
use crate::models::candidate::{Candidate, NewCandidate};
use crate::pagination::{calculate_pagination, PageRequest, Pagination};

pub struct CandidatePage {
    pub candidates: Vec<Candidate>,
    /// Total matches across all pages.
    pub count: i64,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct GroupCount {
    pub value: &'static str,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct CandidateStats {
    pub total: i64,
    pub nuevos: i64,
    pub entrevistados: i64,
    pub contratados: i64,
    pub por_sexo: Vec<GroupCount>,
    pub por_estatus: Vec<GroupCount>,
    pub por_area_interes: Vec<GroupCount>,
}

/// Binds every writable column in the order used by INSERT and UPDATE below.
fn bind_fields<'q, O>(
    query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    c: &'q NewCandidate,
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
    query
        .bind(&c.nombres_apellidos)
        .bind(&c.cedula)
        .bind(c.sexo)
        .bind(c.edad)
        .bind(c.num_hijos)
        .bind(c.canal_recepcion)
        .bind(&c.fuente)
        .bind(&c.referido)
        .bind(c.tipo_contacto)
        .bind(c.fecha_contacto)
        .bind(&c.telefonos)
        .bind(c.citado_entrevista)
        .bind(c.fecha_entrevista)
        .bind(&c.entrevistador_telefonico)
        .bind(&c.entrevistador_presencial)
        .bind(c.solicitud_empleo)
        .bind(c.guia_entrevista)
        .bind(&c.ubicacion)
        .bind(&c.zona_reside)
        .bind(&c.direccion)
        .bind(c.area_interes)
        .bind(c.expectativa_salarial)
        .bind(&c.experiencia)
        .bind(&c.cuenta_bancaria)
        .bind(&c.seguridad_bancaria)
        .bind(c.estatus)
        .bind(&c.pds_asignado)
        .bind(&c.comentarios)
}

/// A unique-index violation on `cedula` becomes a 409.
fn map_write_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("Ya existe un candidato con esta cédula".into())
        }
        _ => AppError::Database(err),
    }
}

pub async fn list_candidates(
    pool: &SqlitePool,
    filter: &CandidateFilter,
    page: Option<PageRequest>,
) -> Result<CandidatePage, sqlx::Error> {
    let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM candidates");
    filter.push_where(&mut count_qb);
    let count: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM candidates");
    filter.push_where(&mut qb);
    qb.push(" ORDER BY created_at DESC");

    let pagination = page.map(|p| calculate_pagination(count, p));
    if let Some(p) = pagination {
        qb.push(" LIMIT ").push_bind(p.limit);
        qb.push(" OFFSET ").push_bind(p.offset);
    }

    let candidates = qb.build_query_as::<Candidate>().fetch_all(pool).await?;
    Ok(CandidatePage {
        candidates,
        count,
        pagination,
    })
}

pub async fn get_candidate(pool: &SqlitePool, id: Uuid) -> Result<Option<Candidate>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM candidates WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn exists_by_cedula(pool: &SqlitePool, cedula: &str, exclude_id: Option<Uuid>) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM candidates WHERE cedula = ? AND (? IS NULL OR id != ?)")
        .bind(cedula.trim())
        .bind(exclude_id)
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn insert_candidate(pool: &SqlitePool, new: &NewCandidate, now: DateTime<Utc>) -> Result<Candidate, AppError> {
    if exists_by_cedula(pool, &new.cedula, None).await? {
        return Err(AppError::Conflict("Ya existe un candidato con esta cédula".into()));
    }

    let id = Uuid::new_v4();
    let query = sqlx::query_as::<_, Candidate>(
        r#"
        INSERT INTO candidates (
            id,
            nombres_apellidos, cedula, sexo, edad, num_hijos,
            canal_recepcion, fuente, referido, tipo_contacto, fecha_contacto, telefonos,
            citado_entrevista, fecha_entrevista, entrevistador_telefonico, entrevistador_presencial,
            solicitud_empleo, guia_entrevista,
            ubicacion, zona_reside, direccion,
            area_interes, expectativa_salarial, experiencia,
            cuenta_bancaria, seguridad_bancaria,
            estatus, pds_asignado, comentarios,
            created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    );

    let candidate = bind_fields(query.bind(id), new)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(map_write_error)?;

    info!("Created candidate {id}");
    Ok(candidate)
}

pub async fn update_candidate(
    pool: &SqlitePool,
    id: Uuid,
    changes: &NewCandidate,
    now: DateTime<Utc>,
) -> Result<Option<Candidate>, AppError> {
    if exists_by_cedula(pool, &changes.cedula, Some(id)).await? {
        return Err(AppError::Conflict("Ya existe un candidato con esta cédula".into()));
    }

    let query = sqlx::query_as::<_, Candidate>(
        r#"
        UPDATE candidates SET
            nombres_apellidos = ?, cedula = ?, sexo = ?, edad = ?, num_hijos = ?,
            canal_recepcion = ?, fuente = ?, referido = ?, tipo_contacto = ?, fecha_contacto = ?, telefonos = ?,
            citado_entrevista = ?, fecha_entrevista = ?, entrevistador_telefonico = ?, entrevistador_presencial = ?,
            solicitud_empleo = ?, guia_entrevista = ?,
            ubicacion = ?, zona_reside = ?, direccion = ?,
            area_interes = ?, expectativa_salarial = ?, experiencia = ?,
            cuenta_bancaria = ?, seguridad_bancaria = ?,
            estatus = ?, pds_asignado = ?, comentarios = ?,
            updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    );

    let updated = bind_fields(query, changes)
        .bind(now)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(map_write_error)?;

    if updated.is_some() {
        info!("Updated candidate {id}");
    }
    Ok(updated)
}

/// Returns `false` when no row matched.
pub async fn delete_candidate(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM candidates WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Candidates created within `[start, end]`, newest first. Open bounds are unbounded.
pub async fn list_created_between(
    pool: &SqlitePool,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<Vec<Candidate>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM candidates WHERE 1 = 1");
    if let Some(start) = start {
        qb.push(" AND created_at >= ").push_bind(start);
    }
    if let Some(end) = end {
        qb.push(" AND created_at <= ").push_bind(end);
    }
    qb.push(" ORDER BY created_at DESC");
    qb.build_query_as::<Candidate>().fetch_all(pool).await
}

pub async fn count_candidates(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM candidates").fetch_one(pool).await
}

async fn count_with_status(pool: &SqlitePool, estatus: EstatusCandidato) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM candidates WHERE estatus = ?")
        .bind(estatus)
        .fetch_one(pool)
        .await
}

/// Grouped counts for one enum column, largest group first.
async fn group_counts<T>(pool: &SqlitePool, column: &str) -> Result<Vec<GroupCount>, sqlx::Error>
where
    T: CatalogEnum + Send + Unpin + for<'r> sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
    let sql = format!("SELECT {column}, COUNT(*) FROM candidates GROUP BY {column} ORDER BY COUNT(*) DESC, {column}");
    let rows: Vec<(T, i64)> = sqlx::query_as(&sql).fetch_all(pool).await?;
    Ok(rows
        .into_iter()
        .map(|(value, count)| GroupCount {
            value: value.label(),
            count,
        })
        .collect())
}

pub async fn candidate_stats(pool: &SqlitePool) -> Result<CandidateStats, sqlx::Error> {
    Ok(CandidateStats {
        total: count_candidates(pool).await?,
        nuevos: count_with_status(pool, EstatusCandidato::Nuevo).await?,
        entrevistados: count_with_status(pool, EstatusCandidato::Entrevistado).await?,
        contratados: count_with_status(pool, EstatusCandidato::Contratado).await?,
        por_sexo: group_counts::<Sexo>(pool, "sexo").await?,
        por_estatus: group_counts::<EstatusCandidato>(pool, "estatus").await?,
        por_area_interes: group_counts::<AreaInteres>(pool, "area_interes").await?,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::candidates::validation::{tests::valid_input, validate_candidate};
    use crate::db::test_pool;
    use chrono::Duration;

    pub(crate) fn new_candidate(cedula: &str, estatus: EstatusCandidato) -> NewCandidate {
        let mut c = validate_candidate(&valid_input(), Utc::now()).unwrap();
        c.cedula = cedula.to_string();
        c.estatus = estatus;
        c
    }

    #[tokio::test]
    async fn test_insert_and_get_roundtrip_typed_fields() {
        let pool = test_pool().await;
        let created = insert_candidate(&pool, &new_candidate("1000001", EstatusCandidato::Nuevo), Utc::now())
            .await
            .unwrap();
        let fetched = get_candidate(&pool, created.id).await.unwrap().unwrap();
        assert_eq!(fetched.cedula, "1000001");
        assert_eq!(fetched.area_interes, AreaInteres::AtencionCliente);
        assert_eq!(fetched.num_hijos, Some(1));

        let key: String = sqlx::query_scalar("SELECT canal_recepcion FROM candidates WHERE id = ?")
            .bind(created.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(key, "RedesSociales");
    }

    #[tokio::test]
    async fn test_duplicate_cedula_conflicts() {
        let pool = test_pool().await;
        let c = new_candidate("2000002", EstatusCandidato::Nuevo);
        insert_candidate(&pool, &c, Utc::now()).await.unwrap();
        let err = insert_candidate(&pool, &c, Utc::now()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_rejects_cedula_of_another_candidate() {
        let pool = test_pool().await;
        insert_candidate(&pool, &new_candidate("3000001", EstatusCandidato::Nuevo), Utc::now())
            .await
            .unwrap();
        let second = insert_candidate(&pool, &new_candidate("3000002", EstatusCandidato::Nuevo), Utc::now())
            .await
            .unwrap();

        let clash = new_candidate("3000001", EstatusCandidato::Nuevo);
        let err = update_candidate(&pool, second.id, &clash, Utc::now()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Keeping its own cédula is fine.
        let later = Utc::now() + Duration::seconds(5);
        let same = new_candidate("3000002", EstatusCandidato::Contratado);
        let updated = update_candidate(&pool, second.id, &same, later).await.unwrap().unwrap();
        assert_eq!(updated.estatus, EstatusCandidato::Contratado);
        assert!(updated.updated_at > updated.created_at);
    }

    #[tokio::test]
    async fn test_filter_and_paginate() {
        let pool = test_pool().await;
        for i in 0..7 {
            let estatus = if i % 2 == 0 { EstatusCandidato::Nuevo } else { EstatusCandidato::EnProceso };
            let at = Utc::now() + Duration::seconds(i);
            insert_candidate(&pool, &new_candidate(&format!("40000{i:02}"), estatus), at)
                .await
                .unwrap();
        }

        let filter = CandidateFilter {
            estatus: Some(EstatusCandidato::Nuevo),
            ..Default::default()
        };
        let page = list_candidates(&pool, &filter, Some(PageRequest { page: 9, per_page: 3 }))
            .await
            .unwrap();
        assert_eq!(page.count, 4);
        let pagination = page.pagination.unwrap();
        assert_eq!((pagination.page, pagination.total_pages), (2, 2));
        assert_eq!(page.candidates.len(), 1);

        let all = list_candidates(&pool, &CandidateFilter::default(), None).await.unwrap();
        assert_eq!(all.candidates.len(), 7);
        assert_eq!(all.candidates[0].cedula, "4000006");
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let pool = test_pool().await;
        let mut c = new_candidate("5000001", EstatusCandidato::Nuevo);
        c.comentarios = Some("Disponible 100% fines de semana".into());
        insert_candidate(&pool, &c, Utc::now()).await.unwrap();
        insert_candidate(&pool, &new_candidate("5000002", EstatusCandidato::Nuevo), Utc::now())
            .await
            .unwrap();

        let search = |s: &str| CandidateFilter {
            search: Some(s.to_string()),
            ..Default::default()
        };
        assert_eq!(list_candidates(&pool, &search("100%"), None).await.unwrap().count, 1);
        assert_eq!(list_candidates(&pool, &search("%"), None).await.unwrap().count, 1);
        assert_eq!(list_candidates(&pool, &search("MARÍA fernanda"), None).await.unwrap().count, 2);
        assert_eq!(list_candidates(&pool, &search("nadie"), None).await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_stats_groups_by_label() {
        let pool = test_pool().await;
        for (i, estatus) in [EstatusCandidato::Nuevo, EstatusCandidato::Nuevo, EstatusCandidato::Contratado]
            .into_iter()
            .enumerate()
        {
            insert_candidate(&pool, &new_candidate(&format!("600000{i}"), estatus), Utc::now())
                .await
                .unwrap();
        }
        let stats = candidate_stats(&pool).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.nuevos, 2);
        assert_eq!(stats.contratados, 1);
        assert_eq!(stats.por_estatus[0], GroupCount { value: "Nuevo", count: 2 });
        assert_eq!(stats.por_sexo, vec![GroupCount { value: "Femenino", count: 3 }]);
    }
}
