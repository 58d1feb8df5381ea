use common_auth::Identity;
use serde::Serialize;

use crate::policy::{allows, Capability};

/// Sector information pages, in menu order.
pub const SECTORS: &[&str] = &[
    "Administracion",
    "Aereos",
    "Comercial",
    "Diseño - Marketing",
    "Documentacion",
    "Grupos",
    "Hotel Ya - Trenes",
    "Nacional",
    "Operaciones",
    "Producto",
    "Recepcion",
    "Sistemas",
    "Ventas Area 1",
    "Ventas Brasil",
    "Ventas Europa",
    "Ventas Exoticos",
    "Ventas Interior",
    "Ycix",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub label: String,
    pub path: String,
}

impl NavEntry {
    fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self { label: label.into(), path: path.into() }
    }
}

const MAIN_ENTRIES: &[(&str, &str)] = &[
    ("Agenda", "/index/agenda"),
    ("Novedades", "/index/novedades"),
    ("Cumpleaños", "/index/cumpleanos"),
    ("Buscador", "/index/buscador-personal"),
    ("Calendario", "/index/calendario-reuniones"),
    ("Eventos", "/index/eventos"),
];

/// Header links for the current identity. Without a session only the
/// sign-in and registration links are offered.
pub fn navigation(identity: Option<&Identity>) -> Vec<NavEntry> {
    let Some(identity) = identity else {
        return vec![
            NavEntry::new("Iniciar Sesión", "/login"),
            NavEntry::new("Registrarse", "/register"),
        ];
    };

    let mut entries: Vec<NavEntry> = MAIN_ENTRIES
        .iter()
        .map(|(label, path)| NavEntry::new(*label, *path))
        .collect();
    if allows(identity, Capability::AccessAdminPanel) {
        entries.push(NavEntry::new("Admin", "/index/admin"));
    }
    entries
}

pub fn sector_links() -> Vec<NavEntry> {
    SECTORS
        .iter()
        .map(|sector| NavEntry::new(*sector, format!("/index/informacion/{sector}")))
        .collect()
}
