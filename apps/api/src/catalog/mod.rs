//! Option lists shared by forms and filters: enumerations and locations.

pub mod enums;
pub mod handlers;
pub mod locations;

pub use enums::{
    AreaInteres, CanalRecepcion, CatalogEnum, EstatusCandidato, Sexo, TipoContacto,
};
