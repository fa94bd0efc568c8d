use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::info;

use crate::candidates::repository::{count_candidates, insert_candidate};
use crate::candidates::validation::{validate_candidate, CandidateInput};

fn demo_candidates() -> Vec<Value> {
    vec![
        json!({
            "nombres_apellidos": "Ana Sofía Gómez", "cedula": "12345678", "sexo": "Femenino",
            "edad": 28, "num_hijos": 1, "canal_recepcion": "PortalWeb", "fuente": "Computrabajo",
            "tipo_contacto": "Correo", "fecha_contacto": "2023-10-15", "telefonos": "0412-3456789",
            "citado_entrevista": true, "fecha_entrevista": "2023-10-20",
            "entrevistador_telefonico": "Laura Páez", "entrevistador_presencial": "Carlos Ruiz",
            "solicitud_empleo": true, "guia_entrevista": true, "ubicacion": "Caracas",
            "zona_reside": "Libertador", "direccion": "Av. Principal, Edif. Sol, Apto 5, Caracas",
            "area_interes": "Administracion", "expectativa_salarial": 600,
            "experiencia": "5 años en administración de empresas, manejo de personal y procesos administrativos.",
            "estatus": "Entrevistado", "pds_asignado": "María González",
            "comentarios": "Candidata muy prometedora con excelente actitud."
        }),
        json!({
            "nombres_apellidos": "Carlos Eduardo Martínez", "cedula": "87654321", "sexo": "Masculino",
            "edad": 32, "num_hijos": 2, "canal_recepcion": "BolsaEmpleo", "fuente": "LinkedIn",
            "referido": "Juan Pérez", "tipo_contacto": "EntrevistaTelefonica", "fecha_contacto": "2023-10-18",
            "telefonos": "0424-9876543", "citado_entrevista": false, "solicitud_empleo": true,
            "ubicacion": "Los Teques (Altos Mirandinos)", "zona_reside": "Carrizal",
            "direccion": "Calle 5, Casa 123, Carrizal", "area_interes": "OperarioMantenimiento",
            "expectativa_salarial": 800,
            "experiencia": "Operario de mantenimiento con 7 años en equipos industriales y sistemas eléctricos.",
            "estatus": "AConsiderar", "comentarios": "Perfil técnico sólido, pendiente por contactar."
        }),
        json!({
            "nombres_apellidos": "María Fernanda López", "cedula": "11223344", "sexo": "Femenino",
            "edad": 25, "num_hijos": 0, "canal_recepcion": "EntregaCVPresencial", "referido": "Ana Gómez",
            "tipo_contacto": "Llamada", "fecha_contacto": "2023-10-20", "telefonos": "0416-5555555",
            "citado_entrevista": true, "fecha_entrevista": "2023-10-25",
            "entrevistador_telefonico": "Pedro Ramírez", "entrevistador_presencial": "Laura Páez",
            "solicitud_empleo": true, "guia_entrevista": true, "ubicacion": "Caracas",
            "zona_reside": "El Hatillo", "direccion": "Urb. Los Naranjos, Casa 45, El Hatillo",
            "area_interes": "ServiciosGenerales", "expectativa_salarial": 550,
            "experiencia": "3 años en limpieza y mantenimiento de oficinas.",
            "estatus": "Elegible", "pds_asignado": "Carlos Ruiz"
        }),
        json!({
            "nombres_apellidos": "José Antonio Rodríguez", "cedula": "55667788", "sexo": "Masculino",
            "edad": 35, "num_hijos": 3, "canal_recepcion": "Facebook", "fuente": "Facebook Jobs",
            "tipo_contacto": "Mensaje", "fecha_contacto": "2023-10-22", "telefonos": "0426-7777777",
            "ubicacion": "Caracas", "zona_reside": "Catia", "direccion": "Sector 5, Manzana 12, Casa 8, Catia",
            "area_interes": "EncargadaDePDS", "expectativa_salarial": 700,
            "experiencia": "Encargado de PDS con 8 años en gestión de personal y supervisión de equipos.",
            "estatus": "NoContesta", "comentarios": "No ha respondido a las llamadas."
        }),
        json!({
            "nombres_apellidos": "Carmen Elena Vásquez", "cedula": "99887766", "sexo": "Femenino",
            "edad": 29, "num_hijos": 1, "canal_recepcion": "WhatsApp", "fuente": "Referido interno",
            "referido": "María López", "tipo_contacto": "Entrevista", "fecha_contacto": "2023-10-25",
            "telefonos": "0414-8888888", "citado_entrevista": true, "fecha_entrevista": "2023-10-30",
            "solicitud_empleo": true, "guia_entrevista": true,
            "ubicacion": "Los Teques (Altos Mirandinos)", "zona_reside": "San Antonio de los Altos",
            "direccion": "Calle Los Pinos, Casa 25, San Antonio",
            "area_interes": "OperarioMantenimientoServiciosGenerales", "expectativa_salarial": 650,
            "experiencia": "4 años mixtos en mantenimiento y servicios generales en manufactura.",
            "estatus": "Contratado", "pds_asignado": "Luis Hernández"
        }),
    ]
}

/// Inserts sample candidates into an empty table. Returns how many were written.
pub async fn seed_demo_candidates(pool: &SqlitePool) -> Result<usize> {
    if count_candidates(pool).await? > 0 {
        return Ok(0);
    }

    let now = Utc::now();
    let mut inserted = 0;
    for raw in demo_candidates() {
        let input: CandidateInput = serde_json::from_value(raw).context("Malformed demo candidate")?;
        let new = validate_candidate(&input, now)
            .map_err(|errors| anyhow::anyhow!("Demo candidate failed validation: {errors:?}"))?;
        insert_candidate(pool, &new, now).await.map_err(|e| anyhow::anyhow!("{e}"))?;
        inserted += 1;
    }

    info!("Seeded {inserted} demo candidates");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_seed_is_valid_and_idempotent() {
        let pool = test_pool().await;
        assert_eq!(seed_demo_candidates(&pool).await.unwrap(), 5);
        assert_eq!(seed_demo_candidates(&pool).await.unwrap(), 0);
        assert_eq!(count_candidates(&pool).await.unwrap(), 5);
    }
}
