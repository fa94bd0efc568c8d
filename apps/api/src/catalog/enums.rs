//! Closed enumerations of the candidate domain.
//!
//! Every variant has two spellings: the persisted **key** (the variant name,
//! stored as TEXT) and the Spanish **label** shown to recruiters. JSON output
//! uses the label; JSON input and query filters accept either spelling.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

/// Shared behaviour of every catalog enumeration.
pub trait CatalogEnum: Copy + Sized + 'static {
    /// Human-readable name of the enumeration, used in log lines.
    const NAME: &'static str;
    const ALL: &'static [Self];

    fn key(self) -> &'static str;
    fn label(self) -> &'static str;

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.key() == key)
    }

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.label() == label)
    }

    /// Accepts a key or a display label and resolves the variant.
    fn normalize(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(v) = Self::from_key(value) {
            return Some(v);
        }
        if let Some(v) = Self::from_label(value) {
            tracing::debug!("[{}] Converted label \"{value}\" to key \"{}\"", Self::NAME, v.key());
            return Some(v);
        }
        warn!(
            "[{}] Could not normalize value \"{value}\". Keys: {:?}. Labels: {:?}",
            Self::NAME,
            Self::ALL.iter().map(|v| v.key()).collect::<Vec<_>>(),
            Self::ALL.iter().map(|v| v.label()).collect::<Vec<_>>(),
        );
        None
    }

    /// Display labels in declaration order.
    fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|v| v.label()).collect()
    }
}

macro_rules! catalog_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
        pub enum $name {
            $($variant),+
        }

        impl CatalogEnum for $name {
            const NAME: &'static str = stringify!($name);
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn key(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                <$name as CatalogEnum>::normalize(&raw).ok_or_else(|| {
                    de::Error::custom(format!(
                        "invalid {} value \"{raw}\"",
                        <$name as CatalogEnum>::NAME
                    ))
                })
            }
        }
    };
}

catalog_enum! {
    Sexo {
        Masculino => "Masculino",
        Femenino => "Femenino",
    }
}

catalog_enum! {
    CanalRecepcion {
        Web => "Web",
        Referido => "Referido",
        Oficina => "Oficina",
        RedesSociales => "Redes Sociales",
        BolsaEmpleo => "Bolsa de Empleo",
        EntregaCVPresencial => "Entrega CV Presencial",
        WhatsApp => "WhatsApp",
        PortalWeb => "Portal Web",
        LlamadaDirecta => "Llamada Directa",
        Facebook => "Facebook",
    }
}

catalog_enum! {
    TipoContacto {
        Llamada => "Llamada",
        Correo => "Email",
        Presencial => "Presencial",
        Mensaje => "Mensaje",
        Entrevista => "Entrevista",
        EntrevistaTelefonica => "Entrevista Telefónica",
        WhatsApp => "WhatsApp",
    }
}

catalog_enum! {
    /// Recruitment pipeline status.
    EstatusCandidato {
        Asignado => "Asignado",
        NoElegible => "No Elegible",
        Elegible => "Elegible",
        Renuncia => "Renuncia",
        NoAsistio => "No Asistió",
        AConsiderar => "A Considerar",
        NoInteresado => "No Interesado",
        NoContesta => "No Contesta",
        Rechazado => "Rechazado",
        Nuevo => "Nuevo",
        EnProceso => "En Proceso",
        Entrevistado => "Entrevistado",
        Contratado => "Contratado",
        Descartado => "Descartado",
        EnEspera => "En Espera",
    }
}

impl EstatusCandidato {
    /// Statuses that close the recruitment process for a candidate.
    pub fn is_terminal(self) -> bool {
        matches!(self, EstatusCandidato::Contratado | EstatusCandidato::Rechazado)
    }

    /// Statuses under which a candidate should not be put forward again.
    pub fn is_negative(self) -> bool {
        matches!(
            self,
            EstatusCandidato::NoElegible
                | EstatusCandidato::Rechazado
                | EstatusCandidato::Descartado
                | EstatusCandidato::NoInteresado
                | EstatusCandidato::Renuncia
        )
    }
}

catalog_enum! {
    AreaInteres {
        OperarioMantenimiento => "Operario de Mantenimiento",
        ServiciosGenerales => "Servicios Generales",
        EncargadaDePDS => "Encargada de PDS",
        OperarioMantenimientoServiciosGenerales => "Operario de Mantenimiento / Servicios Generales",
        Ventas => "Ventas",
        Administracion => "Administración",
        Marketing => "Marketing",
        TecnologiaInformacion => "Tecnología e Información",
        RecursosHumanos => "Recursos Humanos",
        Finanzas => "Finanzas",
        Operaciones => "Operaciones",
        AtencionCliente => "Atención al Cliente",
        Logistica => "Logística",
        Produccion => "Producción",
        Otro => "Otro",
    }
}

/// Sentinel used by filter dropdowns to mean "no filter" on enum columns.
pub const ALL_OPTION: &str = "Todos";
/// Sentinel used by location dropdowns to mean "no filter".
pub const ALL_LOCATIONS_OPTION: &str = "Todas";

pub const BOOLEAN_OPTIONS: &[&str] = &["Sí", "No"];

pub const EDAD_FILTER_OPTIONS: &[&str] = &["18-25", "26-30", "31-35", "36-40", "41-50", "51+", "Todos"];

/// Resolves an age-range option into inclusive bounds.
/// `Todos` yields `Some((None, None))`; unknown options yield `None`.
pub fn edad_range_bounds(option: &str) -> Option<(Option<i64>, Option<i64>)> {
    let option = option.trim();
    if option == ALL_OPTION {
        return Some((None, None));
    }
    if !EDAD_FILTER_OPTIONS.contains(&option) {
        return None;
    }
    if let Some(min) = option.strip_suffix('+') {
        return min.parse().ok().map(|m| (Some(m), None));
    }
    let (min, max) = option.split_once('-')?;
    Some((Some(min.parse().ok()?), Some(max.parse().ok()?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_roundtrips<T: CatalogEnum + PartialEq + fmt::Debug>() {
        for v in T::ALL {
            assert_eq!(T::from_key(v.key()), Some(*v));
            assert_eq!(T::from_label(v.label()), Some(*v));
            assert!(!v.key().contains(' '), "key {} has a space", v.key());
        }
    }

    #[test]
    fn test_every_enum_maps_keys_and_labels_both_ways() {
        assert_roundtrips::<Sexo>();
        assert_roundtrips::<CanalRecepcion>();
        assert_roundtrips::<TipoContacto>();
        assert_roundtrips::<EstatusCandidato>();
        assert_roundtrips::<AreaInteres>();
    }

    #[test]
    fn test_normalize_accepts_key_or_label() {
        assert_eq!(EstatusCandidato::normalize("NoElegible"), Some(EstatusCandidato::NoElegible));
        assert_eq!(EstatusCandidato::normalize("No Elegible"), Some(EstatusCandidato::NoElegible));
        assert_eq!(TipoContacto::normalize("Email"), Some(TipoContacto::Correo));
        assert_eq!(TipoContacto::normalize("Correo"), Some(TipoContacto::Correo));
        assert_eq!(AreaInteres::normalize(" Atención al Cliente "), Some(AreaInteres::AtencionCliente));
    }

    #[test]
    fn test_normalize_rejects_unknown_value() {
        assert_eq!(Sexo::normalize("Otro"), None);
        assert_eq!(EstatusCandidato::normalize("archivado"), None);
    }

    #[test]
    fn test_serializes_as_label_and_deserializes_either() {
        let json = serde_json::to_string(&AreaInteres::TecnologiaInformacion).unwrap();
        assert_eq!(json, "\"Tecnología e Información\"");
        let from_key: CanalRecepcion = serde_json::from_str("\"RedesSociales\"").unwrap();
        let from_label: CanalRecepcion = serde_json::from_str("\"Redes Sociales\"").unwrap();
        assert_eq!(from_key, from_label);
        assert!(serde_json::from_str::<Sexo>("\"X\"").is_err());
    }

    #[test]
    fn test_labels_keep_declaration_order() {
        let labels = Sexo::labels();
        assert_eq!(labels, vec!["Masculino", "Femenino"]);
        assert_eq!(EstatusCandidato::labels().len(), 15);
    }

    #[test]
    fn test_edad_range_bounds() {
        assert_eq!(edad_range_bounds("18-25"), Some((Some(18), Some(25))));
        assert_eq!(edad_range_bounds("51+"), Some((Some(51), None)));
        assert_eq!(edad_range_bounds("Todos"), Some((None, None)));
        assert_eq!(edad_range_bounds("10-12"), None);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(EstatusCandidato::Contratado.is_terminal());
        assert!(EstatusCandidato::Rechazado.is_terminal());
        assert!(!EstatusCandidato::EnProceso.is_terminal());
    }
}
