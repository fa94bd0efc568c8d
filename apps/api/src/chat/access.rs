//! Which rooms a caller may read and write.
//!
//! Rooms named `dept:<department>` belong to that department; every other room
//! is shared. `chat.access_all` opens every room, `chat.access_department`
//! only shared rooms plus the caller's own department room.

use crate::auth::permissions::{has_permission, Permission};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::user::Department;

pub const DEPARTMENT_ROOM_PREFIX: &str = "dept:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatScope {
    All,
    Department(Department),
}

impl ChatScope {
    pub fn for_user(user: &AuthUser) -> Result<Self, AppError> {
        if has_permission(user.role, Permission::ChatAccessAll) {
            Ok(ChatScope::All)
        } else if has_permission(user.role, Permission::ChatAccessDepartment) {
            Ok(ChatScope::Department(user.department))
        } else {
            Err(AppError::Forbidden)
        }
    }

    pub fn can_access(self, room_id: &str) -> bool {
        match (self, room_id.strip_prefix(DEPARTMENT_ROOM_PREFIX)) {
            (ChatScope::All, _) | (_, None) => true,
            (ChatScope::Department(own), Some(department)) => department == own.as_str(),
        }
    }

    pub fn require(self, room_id: &str) -> Result<(), AppError> {
        if self.can_access(room_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_department_rooms_are_private() {
        let hr = ChatScope::Department(Department::Hr);
        assert!(hr.can_access("general"));
        assert!(hr.can_access("dept:hr"));
        assert!(!hr.can_access("dept:finance"));
        assert!(ChatScope::All.can_access("dept:finance"));
        assert!(hr.require("dept:it").is_err());
    }
}
