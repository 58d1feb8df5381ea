pub mod error;
pub mod navigation;
pub mod policy;
pub mod roles;

pub use error::SecurityError;
pub use navigation::{navigation, sector_links, NavEntry, SECTORS};
pub use policy::{allows, ensure_capability, Affordances, Capability, ADMINISTRATION_SECTOR};
pub use roles::{ensure_any_role, ensure_role, ADMIN_ROLES, MANAGE_ROLES};
