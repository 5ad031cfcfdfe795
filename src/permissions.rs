//! Roles, permissions and the acting user.
//!
//! Roles form a closed set with a fixed capability table. Actions are checked
//! once, where they are requested, through [`authorize`].

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackflowError};

/// Role of the acting user.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    #[default]
    Admin,
    Manager,
    User,
    Viewer,
}

impl Role {
    /// Human-readable role name.
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Manager => "Manager",
            Role::User => "Regular User",
            Role::Viewer => "Viewer",
        }
    }

    /// Permissions granted to this role.
    pub fn permissions(self) -> &'static [Permission] {
        use Permission::*;
        match self {
            Role::Admin => &[
                ViewDashboard, ViewUsers, CreateUsers, EditUsers, DeleteUsers, ManageSettings,
                ViewReports, ExportData, ViewProjects, CreateProjects, EditProjects,
                DeleteProjects, CreateTasks,
            ],
            Role::Manager => &[
                ViewDashboard, ViewUsers, CreateUsers, EditUsers, ViewReports, ViewProjects,
                CreateProjects, EditProjects, CreateTasks,
            ],
            Role::User => &[ViewDashboard, ViewUsers, ViewProjects, CreateTasks],
            Role::Viewer => &[ViewDashboard, ViewUsers, ViewProjects],
        }
    }

    pub fn has(self, permission: Permission) -> bool {
        self == Role::Admin || self.permissions().contains(&permission)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::User => "user",
            Role::Viewer => "viewer",
        })
    }
}

/// Capabilities a role may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ViewDashboard,
    ViewUsers,
    CreateUsers,
    EditUsers,
    DeleteUsers,
    ManageSettings,
    ViewReports,
    ExportData,
    ViewProjects,
    CreateProjects,
    EditProjects,
    DeleteProjects,
    CreateTasks,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Permission::ViewDashboard => "view:dashboard",
            Permission::ViewUsers => "view:users",
            Permission::CreateUsers => "create:users",
            Permission::EditUsers => "edit:users",
            Permission::DeleteUsers => "delete:users",
            Permission::ManageSettings => "manage:settings",
            Permission::ViewReports => "view:reports",
            Permission::ExportData => "export:data",
            Permission::ViewProjects => "view:projects",
            Permission::CreateProjects => "create:projects",
            Permission::EditProjects => "edit:projects",
            Permission::DeleteProjects => "delete:projects",
            Permission::CreateTasks => "create:tasks",
        })
    }
}

/// Board operations a user can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewBoards,
    CreateBoard,
    EditBoard,
    DeleteBoard,
    EditTasks,
    ViewSummary,
    Export,
}

impl Action {
    /// Permission required to perform the action.
    pub fn required_permission(self) -> Permission {
        match self {
            Action::ViewBoards => Permission::ViewProjects,
            Action::CreateBoard => Permission::CreateProjects,
            Action::EditBoard => Permission::EditProjects,
            Action::DeleteBoard => Permission::DeleteProjects,
            Action::EditTasks => Permission::CreateTasks,
            Action::ViewSummary => Permission::ViewReports,
            Action::Export => Permission::ExportData,
        }
    }
}

/// Identity supplied by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub name: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        CurrentUser { name: name.into(), role }
    }

    pub fn can(&self, action: Action) -> bool {
        self.role.has(action.required_permission())
    }
}

/// Check that `user` may perform `action`.
pub fn authorize(user: &CurrentUser, action: Action) -> Result<()> {
    if user.can(action) {
        Ok(())
    } else {
        Err(TrackflowError::Forbidden { role: user.role, permission: action.required_permission() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_holds_everything() {
        for action in [
            Action::ViewBoards,
            Action::CreateBoard,
            Action::EditBoard,
            Action::DeleteBoard,
            Action::EditTasks,
            Action::ViewSummary,
            Action::Export,
        ] {
            assert!(CurrentUser::new("root", Role::Admin).can(action));
        }
    }

    #[test]
    fn manager_cannot_delete_boards_or_export() {
        let manager = CurrentUser::new("m", Role::Manager);
        assert!(manager.can(Action::CreateBoard));
        assert!(manager.can(Action::EditBoard));
        assert!(manager.can(Action::ViewSummary));
        assert!(!manager.can(Action::DeleteBoard));
        assert!(!manager.can(Action::Export));
    }

    #[test]
    fn user_edits_tasks_only() {
        let user = CurrentUser::new("u", Role::User);
        assert!(user.can(Action::EditTasks));
        assert!(user.can(Action::ViewBoards));
        assert!(!user.can(Action::CreateBoard));
        assert!(!user.can(Action::EditBoard));
    }

    #[test]
    fn viewer_is_read_only() {
        let viewer = CurrentUser::new("v", Role::Viewer);
        assert!(viewer.can(Action::ViewBoards));
        let err = authorize(&viewer, Action::EditTasks).unwrap_err();
        assert_eq!(err.to_string(), "viewer role lacks the 'create:tasks' permission");
    }

    #[test]
    fn role_parses_from_config_text() {
        let role: Role = serde_json::from_str("\"manager\"").unwrap();
        assert_eq!(role, Role::Manager);
        assert_eq!(Role::User.label(), "Regular User");
    }
}
