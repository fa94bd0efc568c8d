//! Bulk actions over a selection of candidates, applied in one transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::catalog::EstatusCandidato;
use crate::errors::{AppError, FieldError};

pub const MAX_BULK_IDS: usize = 500;

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    #[serde(default)]
    pub ids: Vec<Uuid>,
    #[serde(flatten)]
    pub action: BulkAction,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum BulkAction {
    ChangeStatus {
        estatus: EstatusCandidato,
        comment: Option<String>,
    },
    AssignPds {
        pds: String,
    },
    AddComment {
        comment: String,
    },
    Delete {
        reason: Option<String>,
    },
}

impl BulkAction {
    pub fn name(&self) -> &'static str {
        match self {
            BulkAction::ChangeStatus { .. } => "change-status",
            BulkAction::AssignPds { .. } => "assign-pds",
            BulkAction::AddComment { .. } => "add-comment",
            BulkAction::Delete { .. } => "delete",
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct BulkResult {
    pub action: &'static str,
    pub requested: usize,
    pub affected: u64,
}

impl BulkRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = Vec::new();
        if self.ids.is_empty() {
            errors.push(FieldError::new("ids", "Seleccione al menos un candidato."));
        } else if self.ids.len() > MAX_BULK_IDS {
            errors.push(FieldError::new(
                "ids",
                format!("No se pueden procesar más de {MAX_BULK_IDS} candidatos a la vez."),
            ));
        }
        match &self.action {
            BulkAction::AssignPds { pds } if pds.trim().is_empty() => {
                errors.push(FieldError::new("pds", "El PDS es requerido."));
            }
            BulkAction::AddComment { comment } if comment.trim().is_empty() => {
                errors.push(FieldError::new("comment", "El comentario es requerido."));
            }
            _ => {}
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidInput(errors))
        }
    }
}

async fn append_comment(
    tx: &mut Transaction<'_, Sqlite>,
    id: Uuid,
    comment: &str,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE candidates SET
            comentarios = CASE
                WHEN comentarios IS NULL OR comentarios = '' THEN ?
                ELSE comentarios || char(10) || ?
            END,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(comment)
    .bind(comment)
    .bind(now)
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected())
}

/// Applies `action` to every id. Unknown ids are skipped and simply not counted.
pub async fn execute_bulk(
    pool: &SqlitePool,
    ids: &[Uuid],
    action: &BulkAction,
    now: DateTime<Utc>,
) -> Result<BulkResult, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut affected = 0u64;

    for &id in ids {
        affected += match action {
            BulkAction::ChangeStatus { estatus, comment } => {
                let changed = sqlx::query("UPDATE candidates SET estatus = ?, updated_at = ? WHERE id = ?")
                    .bind(*estatus)
                    .bind(now)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();
                if let Some(comment) = comment.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
                    append_comment(&mut tx, id, comment, now).await?;
                }
                changed
            }
            BulkAction::AssignPds { pds } => sqlx::query("UPDATE candidates SET pds_asignado = ?, updated_at = ? WHERE id = ?")
                .bind(pds.trim())
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected(),
            BulkAction::AddComment { comment } => append_comment(&mut tx, id, comment.trim(), now).await?,
            BulkAction::Delete { .. } => sqlx::query("DELETE FROM candidates WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected(),
        };
    }

    tx.commit().await?;

    if let BulkAction::Delete { reason: Some(reason) } = action {
        info!("Bulk delete of {affected} candidate(s), reason: {reason}");
    }
    info!("Bulk {} applied: requested={}, affected={affected}", action.name(), ids.len());

    Ok(BulkResult {
        action: action.name(),
        requested: ids.len(),
        affected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::repository::{get_candidate, insert_candidate, tests::new_candidate};
    use crate::db::test_pool;
    use serde_json::json;

    #[test]
    fn test_request_parses_flattened_action() {
        let req: BulkRequest = serde_json::from_value(json!({
            "ids": [Uuid::new_v4()],
            "action": "change-status",
            "estatus": "En Proceso"
        }))
        .unwrap();
        assert!(matches!(
            req.action,
            BulkAction::ChangeStatus { estatus: EstatusCandidato::EnProceso, comment: None }
        ));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_empty_selection_rejected() {
        let req: BulkRequest = serde_json::from_value(json!({"ids": [], "action": "delete"})).unwrap();
        assert!(matches!(req.validate(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_oversized_selection_and_blank_fields_rejected() {
        let ids: Vec<Uuid> = (0..=MAX_BULK_IDS).map(|_| Uuid::new_v4()).collect();
        let req: BulkRequest = serde_json::from_value(json!({"ids": ids, "action": "assign-pds", "pds": " "})).unwrap();
        let Err(AppError::InvalidInput(errors)) = req.validate() else {
            panic!("expected field errors");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["ids", "pds"]);
    }

    #[tokio::test]
    async fn test_assign_pds_and_add_comment() {
        let pool = test_pool().await;
        let a = insert_candidate(&pool, &new_candidate("7200001", EstatusCandidato::Nuevo), Utc::now())
            .await
            .unwrap();

        let assign = BulkAction::AssignPds { pds: "  PDS Chacao ".into() };
        let result = execute_bulk(&pool, &[a.id], &assign, Utc::now()).await.unwrap();
        assert_eq!(result.affected, 1);
        let comment = BulkAction::AddComment { comment: "Citar el lunes".into() };
        execute_bulk(&pool, &[a.id], &comment, Utc::now()).await.unwrap();
        execute_bulk(&pool, &[a.id], &comment, Utc::now()).await.unwrap();

        let a = get_candidate(&pool, a.id).await.unwrap().unwrap();
        assert_eq!(a.pds_asignado.as_deref(), Some("PDS Chacao"));
        assert_eq!(a.comentarios.as_deref(), Some("Citar el lunes\nCitar el lunes"));
    }

    #[tokio::test]
    async fn test_change_status_appends_comment_and_skips_unknown_ids() {
        let pool = test_pool().await;
        let mut c = new_candidate("7000001", EstatusCandidato::Nuevo);
        c.comentarios = Some("Primera llamada".into());
        let a = insert_candidate(&pool, &c, Utc::now()).await.unwrap();
        let b = insert_candidate(&pool, &new_candidate("7000002", EstatusCandidato::Nuevo), Utc::now())
            .await
            .unwrap();

        let action = BulkAction::ChangeStatus {
            estatus: EstatusCandidato::Entrevistado,
            comment: Some("Entrevista grupal".into()),
        };
        let result = execute_bulk(&pool, &[a.id, b.id, Uuid::new_v4()], &action, Utc::now())
            .await
            .unwrap();
        assert_eq!(result, BulkResult { action: "change-status", requested: 3, affected: 2 });

        let a = get_candidate(&pool, a.id).await.unwrap().unwrap();
        assert_eq!(a.estatus, EstatusCandidato::Entrevistado);
        assert_eq!(a.comentarios.as_deref(), Some("Primera llamada\nEntrevista grupal"));
        let b = get_candidate(&pool, b.id).await.unwrap().unwrap();
        assert_eq!(b.comentarios.as_deref(), Some("Entrevista grupal"));
    }

    #[tokio::test]
    async fn test_bulk_delete() {
        let pool = test_pool().await;
        let a = insert_candidate(&pool, &new_candidate("7100001", EstatusCandidato::Nuevo), Utc::now())
            .await
            .unwrap();
        let action = BulkAction::Delete { reason: Some("Duplicado".into()) };
        let result = execute_bulk(&pool, &[a.id], &action, Utc::now()).await.unwrap();
        assert_eq!(result.affected, 1);
        assert!(get_candidate(&pool, a.id).await.unwrap().is_none());
    }
}
