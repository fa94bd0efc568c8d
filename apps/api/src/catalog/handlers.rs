use axum::{extract::Path, Json};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::catalog::enums::{BOOLEAN_OPTIONS, EDAD_FILTER_OPTIONS};
use crate::catalog::locations::{ubicaciones, zonas};
use crate::catalog::{AreaInteres, CanalRecepcion, CatalogEnum, EstatusCandidato, Sexo, TipoContacto};

#[derive(Debug, Serialize)]
pub struct LocationOption {
    pub ubicacion: &'static str,
    pub zonas: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub sexo: Vec<&'static str>,
    pub canal_recepcion: Vec<&'static str>,
    pub tipo_contacto: Vec<&'static str>,
    pub estatus: Vec<&'static str>,
    pub area_interes: Vec<&'static str>,
    pub boolean: &'static [&'static str],
    pub edad: &'static [&'static str],
    pub ubicaciones: Vec<LocationOption>,
}

/// GET /api/catalog
pub async fn handle_get_catalog(_user: AuthUser) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        sexo: Sexo::labels(),
        canal_recepcion: CanalRecepcion::labels(),
        tipo_contacto: TipoContacto::labels(),
        estatus: EstatusCandidato::labels(),
        area_interes: AreaInteres::labels(),
        boolean: BOOLEAN_OPTIONS,
        edad: EDAD_FILTER_OPTIONS,
        ubicaciones: ubicaciones()
            .into_iter()
            .map(|ubicacion| LocationOption {
                ubicacion,
                zonas: zonas(ubicacion),
            })
            .collect(),
    })
}

/// GET /api/catalog/locations/:ubicacion/zones
pub async fn handle_get_zones(
    _user: AuthUser,
    Path(ubicacion): Path<String>,
) -> Json<&'static [&'static str]> {
    Json(zonas(&ubicacion))
}
