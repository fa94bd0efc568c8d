use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::catalog::{AreaInteres, CanalRecepcion, EstatusCandidato, Sexo, TipoContacto};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Candidate {
    pub id: Uuid,
    // Información personal
    pub nombres_apellidos: String,
    pub cedula: String,
    pub sexo: Sexo,
    pub edad: Option<i64>,
    pub num_hijos: Option<i64>,
    // Contacto
    pub canal_recepcion: CanalRecepcion,
    pub fuente: Option<String>,
    pub referido: Option<String>,
    pub tipo_contacto: TipoContacto,
    pub fecha_contacto: DateTime<Utc>,
    pub telefonos: String,
    // Proceso de entrevista
    pub citado_entrevista: bool,
    pub fecha_entrevista: Option<DateTime<Utc>>,
    pub entrevistador_telefonico: Option<String>,
    pub entrevistador_presencial: Option<String>,
    pub solicitud_empleo: bool,
    pub guia_entrevista: bool,
    // Ubicación
    pub ubicacion: String,
    pub zona_reside: String,
    pub direccion: String,
    // Perfil profesional
    pub area_interes: AreaInteres,
    pub expectativa_salarial: Option<f64>,
    pub experiencia: String,
    // Datos bancarios
    pub cuenta_bancaria: Option<String>,
    pub seguridad_bancaria: Option<String>,
    // Seguimiento
    pub estatus: EstatusCandidato,
    pub pds_asignado: Option<String>,
    pub comentarios: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated candidate payload, ready to be written. Carries no identity or timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCandidate {
    pub nombres_apellidos: String,
    pub cedula: String,
    pub sexo: Sexo,
    pub edad: Option<i64>,
    pub num_hijos: Option<i64>,
    pub canal_recepcion: CanalRecepcion,
    pub fuente: Option<String>,
    pub referido: Option<String>,
    pub tipo_contacto: TipoContacto,
    pub fecha_contacto: DateTime<Utc>,
    pub telefonos: String,
    pub citado_entrevista: bool,
    pub fecha_entrevista: Option<DateTime<Utc>>,
    pub entrevistador_telefonico: Option<String>,
    pub entrevistador_presencial: Option<String>,
    pub solicitud_empleo: bool,
    pub guia_entrevista: bool,
    pub ubicacion: String,
    pub zona_reside: String,
    pub direccion: String,
    pub area_interes: AreaInteres,
    pub expectativa_salarial: Option<f64>,
    pub experiencia: String,
    pub cuenta_bancaria: Option<String>,
    pub seguridad_bancaria: Option<String>,
    pub estatus: EstatusCandidato,
    pub pds_asignado: Option<String>,
    pub comentarios: Option<String>,
}
