//! Advisory, UI-level permission checks. The backend enforces the real
//! authorization boundary; nothing here gates a request.

use common_auth::{Identity, Role};
use tracing::warn;

use crate::roles::{ADMIN_ROLES, MANAGE_ROLES};
use crate::SecurityError;

/// Sector whose editors run the news feed and guard-duty rotation.
pub const ADMINISTRATION_SECTOR: &str = "Administracion";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability<'a> {
    ManageAgenda,
    ManageMeetingRooms,
    ManageEvents,
    PublishNews,
    PublishSectorInfo { sector: &'a str },
    EditSectorPost { post_sector: &'a str },
    DeleteContent { author_id: i64 },
    ChangeBirthdayGif { user_id: i64 },
    AccessAdminPanel,
    ManageGuardDuty,
}

fn editor_of(identity: &Identity, sector: &str) -> bool {
    identity.role == Role::Editor && identity.in_sector(sector)
}

pub fn allows(identity: &Identity, cap: Capability<'_>) -> bool {
    use Capability::*;
    if identity.role == Role::Superuser {
        return true;
    }
    match cap {
        ManageAgenda | ManageMeetingRooms | ManageEvents => identity.has_any_role(MANAGE_ROLES),
        PublishNews | ManageGuardDuty => editor_of(identity, ADMINISTRATION_SECTOR),
        PublishSectorInfo { sector } => editor_of(identity, sector),
        EditSectorPost { post_sector } => editor_of(identity, post_sector),
        DeleteContent { author_id } => identity.id == author_id,
        ChangeBirthdayGif { user_id } => identity.id == user_id,
        AccessAdminPanel => identity.has_any_role(ADMIN_ROLES),
    }
}

pub fn ensure_capability(identity: Option<&Identity>, cap: Capability<'_>) -> Result<(), SecurityError> {
    let identity = identity.ok_or(SecurityError::Unauthenticated)?;
    if allows(identity, cap) { return Ok(()); }
    warn!(user_id = identity.id, role = %identity.role, ?cap, "capability_check_failed");
    Err(SecurityError::Forbidden)
}

/// Static management affordances of the current identity, for views that render
/// create/edit buttons up front.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Affordances {
    pub manage_agenda: bool,
    pub manage_meeting_rooms: bool,
    pub manage_events: bool,
    pub publish_news: bool,
    pub access_admin_panel: bool,
    pub manage_guard_duty: bool,
}

impl Affordances {
    pub fn for_identity(identity: Option<&Identity>) -> Self {
        let Some(identity) = identity else {
            return Self::default();
        };
        Self {
            manage_agenda: allows(identity, Capability::ManageAgenda),
            manage_meeting_rooms: allows(identity, Capability::ManageMeetingRooms),
            manage_events: allows(identity, Capability::ManageEvents),
            publish_news: allows(identity, Capability::PublishNews),
            access_admin_panel: allows(identity, Capability::AccessAdminPanel),
            manage_guard_duty: allows(identity, Capability::ManageGuardDuty),
        }
    }
}
