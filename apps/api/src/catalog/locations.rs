/// Residence areas (ubicación) and the zones inside each one.
/// `Otro` has no zones: the zone is entered as free text.
pub const UBICACIONES: &[(&str, &[&str])] = &[
    (
        "Caracas",
        &[
            "Petare",
            "El Paraíso",
            "Propatria",
            "Junquito",
            "El Hatillo",
            "Caricuao",
            "Altagracia",
            "El Junquito (Parroquia)",
            "Libertador",
            "Santa Rosalía",
            "Catia",
            "Otro",
        ],
    ),
    (
        "Los Teques (Altos Mirandinos)",
        &["Los Teques Centro", "Carrizal", "San Antonio de los Altos", "El Jarillo", "Otro"],
    ),
    (
        "Valles del Tuy",
        &["Charallave", "Ocumare del Tuy", "Santa Teresa del Tuy", "Cúa", "Otro"],
    ),
    ("Barlovento", &["Higuerote", "Río Chico", "Caucagua", "Tacarigua", "Otro"]),
    ("Guarenas-Guatire", &["Guarenas", "Guatire", "Araira", "Otro"]),
    (
        "La Guaira (Litoral Central)",
        &["Catia La Mar", "Caraballeda", "Macuto", "Naiguatá", "Maiquetía", "Otro"],
    ),
    ("Otro", &[]),
];

pub fn ubicaciones() -> Vec<&'static str> {
    UBICACIONES.iter().map(|(name, _)| *name).collect()
}

pub fn zonas(ubicacion: &str) -> &'static [&'static str] {
    UBICACIONES
        .iter()
        .find(|(name, _)| *name == ubicacion)
        .map(|(_, zonas)| *zonas)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ubicaciones_in_declaration_order() {
        let names = ubicaciones();
        assert_eq!(names.first(), Some(&"Caracas"));
        assert_eq!(names.last(), Some(&"Otro"));
        assert_eq!(names.len(), 7);
    }

    #[test]
    fn test_zonas_lookup() {
        assert!(zonas("Guarenas-Guatire").contains(&"Guatire"));
        assert!(zonas("Otro").is_empty());
        assert!(zonas("Maracaibo").is_empty());
    }
}
