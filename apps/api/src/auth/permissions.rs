use serde::{Serialize, Serializer};

use crate::models::user::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    UsersCreate,
    UsersRead,
    UsersUpdate,
    UsersDelete,
    CandidatesCreate,
    CandidatesRead,
    CandidatesUpdate,
    CandidatesDelete,
    ReportsCreate,
    ReportsRead,
    SettingsUpdate,
    BulkActionsExecute,
    NotificationsSend,
    ChatAccessAll,
    ChatAccessDepartment,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::UsersCreate => "users.create",
            Permission::UsersRead => "users.read",
            Permission::UsersUpdate => "users.update",
            Permission::UsersDelete => "users.delete",
            Permission::CandidatesCreate => "candidates.create",
            Permission::CandidatesRead => "candidates.read",
            Permission::CandidatesUpdate => "candidates.update",
            Permission::CandidatesDelete => "candidates.delete",
            Permission::ReportsCreate => "reports.create",
            Permission::ReportsRead => "reports.read",
            Permission::SettingsUpdate => "settings.update",
            Permission::BulkActionsExecute => "bulk_actions.execute",
            Permission::NotificationsSend => "notifications.send",
            Permission::ChatAccessAll => "chat.access_all",
            Permission::ChatAccessDepartment => "chat.access_department",
        }
    }
}

impl Serialize for Permission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

use Permission::*;

const SUPER_ADMIN: &[Permission] = &[
    UsersCreate,
    UsersRead,
    UsersUpdate,
    UsersDelete,
    CandidatesCreate,
    CandidatesRead,
    CandidatesUpdate,
    CandidatesDelete,
    ReportsCreate,
    ReportsRead,
    SettingsUpdate,
    BulkActionsExecute,
    NotificationsSend,
    ChatAccessAll,
];

const ADMIN: &[Permission] = &[
    UsersRead,
    UsersUpdate,
    CandidatesCreate,
    CandidatesRead,
    CandidatesUpdate,
    CandidatesDelete,
    ReportsCreate,
    ReportsRead,
    BulkActionsExecute,
    NotificationsSend,
    ChatAccessDepartment,
];

const HR_MANAGER: &[Permission] = &[
    CandidatesCreate,
    CandidatesRead,
    CandidatesUpdate,
    ReportsRead,
    BulkActionsExecute,
    NotificationsSend,
    ChatAccessDepartment,
];

const RECRUITER: &[Permission] = &[
    CandidatesCreate,
    CandidatesRead,
    CandidatesUpdate,
    ReportsRead,
    ChatAccessDepartment,
];

const INTERVIEWER: &[Permission] = &[CandidatesRead, CandidatesUpdate, ReportsRead, ChatAccessDepartment];

pub fn permissions_for(role: Role) -> &'static [Permission] {
    match role {
        Role::SuperAdmin => SUPER_ADMIN,
        Role::Admin => ADMIN,
        Role::HrManager => HR_MANAGER,
        Role::Recruiter => RECRUITER,
        Role::Interviewer => INTERVIEWER,
    }
}

pub fn has_permission(role: Role, permission: Permission) -> bool {
    permissions_for(role).contains(&permission)
}
