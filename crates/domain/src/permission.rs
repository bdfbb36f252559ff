//! Permission decisions for admin actions.
//!
//! Every check is a pure function over the acting user, the target's current
//! state and the requested change. The same predicates gate single-row
//! actions, batch selection and the options a role picker offers, so the
//! console never offers a choice that submission would reject.

use serde::Serialize;
use warden_core::{AppError, AppResult};

use crate::{MemberRoster, SystemRole, UserId, UserStatus, Workspace, WorkspaceRole};

/// The signed-in administrator performing actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    user_id: UserId,
    system_role: SystemRole,
}

impl ActorContext {
    /// Creates an actor context from the session's user and role.
    #[must_use]
    pub fn new(user_id: UserId, system_role: SystemRole) -> Self {
        Self {
            user_id,
            system_role,
        }
    }

    /// Returns the acting user's identifier.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the acting user's system role.
    #[must_use]
    pub fn system_role(&self) -> SystemRole {
        self.system_role
    }

    /// Returns whether the target is the actor.
    #[must_use]
    pub fn is_self(&self, target: &UserId) -> bool {
        &self.user_id == target
    }

    /// Returns an evaluator bound to this actor.
    #[must_use]
    pub fn evaluator(&self) -> PermissionEvaluator<'_> {
        PermissionEvaluator { actor: self }
    }
}

/// Why an action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// Actors cannot change their own system role.
    CannotDemoteSelf,
    /// System admins are only demoted out of band.
    CannotDemoteSystemAdmin,
    /// Actors cannot ban themselves.
    CannotDisableSelf,
    /// System admins cannot be banned.
    CannotDisableSystemAdmin,
    /// Actors cannot delete their own account.
    CannotDeleteSelf,
    /// System admin accounts cannot be deleted.
    CannotDeleteSystemAdmin,
    /// The workspace would be left without an owner.
    LastOwner,
    /// Default workspaces are permanent.
    DefaultWorkspace,
    /// Workspaces with other members cannot be deleted.
    WorkspaceHasMembers,
}

impl DenialReason {
    /// Returns the human-readable reason.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CannotDemoteSelf => "cannot demote self",
            Self::CannotDemoteSystemAdmin => "cannot demote system admin",
            Self::CannotDisableSelf => "cannot disable self",
            Self::CannotDisableSystemAdmin => "cannot disable system admin",
            Self::CannotDeleteSelf => "cannot delete self",
            Self::CannotDeleteSystemAdmin => "cannot delete system admin",
            Self::LastOwner => "cannot modify last owner",
            Self::DefaultWorkspace => "cannot delete default workspace",
            Self::WorkspaceHasMembers => "cannot delete workspace with members",
        }
    }
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Outcome of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "reason")]
pub enum PermissionDecision {
    /// The action may proceed.
    Allowed,
    /// The action is refused.
    Denied(DenialReason),
}

impl PermissionDecision {
    /// Returns whether the action may proceed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Returns the refusal reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<DenialReason> {
        match self {
            Self::Allowed => None,
            Self::Denied(reason) => Some(*reason),
        }
    }

    /// Converts a refusal into [`AppError::Forbidden`].
    pub fn into_result(self) -> AppResult<()> {
        match self {
            Self::Allowed => Ok(()),
            Self::Denied(reason) => Err(AppError::Forbidden(reason.as_str().to_owned())),
        }
    }

    fn deny_if(condition: bool, reason: DenialReason) -> Option<Self> {
        condition.then_some(Self::Denied(reason))
    }
}

/// Actor-bound permission checks on user accounts.
#[derive(Debug, Clone, Copy)]
pub struct PermissionEvaluator<'a> {
    actor: &'a ActorContext,
}

impl PermissionEvaluator<'_> {
    /// Checks a system role change on a target account.
    #[must_use]
    pub fn can_change_role(
        &self,
        target_id: &UserId,
        target_role: SystemRole,
        new_role: SystemRole,
    ) -> PermissionDecision {
        self.role_option_disabled_reason(target_id, target_role, new_role)
            .map_or(PermissionDecision::Allowed, PermissionDecision::Denied)
    }

    /// Checks an account status change on a target account.
    #[must_use]
    pub fn can_change_status(
        &self,
        target_id: &UserId,
        target_role: SystemRole,
        new_status: UserStatus,
    ) -> PermissionDecision {
        let banning = new_status == UserStatus::Banned;

        PermissionDecision::deny_if(
            banning && self.actor.is_self(target_id),
            DenialReason::CannotDisableSelf,
        )
        .or_else(|| {
            PermissionDecision::deny_if(
                banning && target_role.is_system_admin(),
                DenialReason::CannotDisableSystemAdmin,
            )
        })
        .unwrap_or(PermissionDecision::Allowed)
    }

    /// Checks deletion of a target account.
    #[must_use]
    pub fn can_delete_user(&self, target_id: &UserId, target_role: SystemRole) -> PermissionDecision {
        PermissionDecision::deny_if(
            self.actor.is_self(target_id),
            DenialReason::CannotDeleteSelf,
        )
        .or_else(|| {
            PermissionDecision::deny_if(
                target_role.is_system_admin(),
                DenialReason::CannotDeleteSystemAdmin,
            )
        })
        .unwrap_or(PermissionDecision::Allowed)
    }

    /// Returns why a role picker option is disabled for a target, if it is.
    #[must_use]
    pub fn role_option_disabled_reason(
        &self,
        target_id: &UserId,
        target_role: SystemRole,
        option: SystemRole,
    ) -> Option<DenialReason> {
        if self.actor.is_self(target_id) {
            return Some(DenialReason::CannotDemoteSelf);
        }

        if target_role.is_system_admin() && !option.is_system_admin() {
            return Some(DenialReason::CannotDemoteSystemAdmin);
        }

        None
    }

    /// Returns whether a row may be picked for batch enable, disable or delete.
    #[must_use]
    pub fn is_selectable(&self, target_id: &UserId, target_role: SystemRole) -> bool {
        !self.actor.is_self(target_id) && !target_role.is_system_admin()
    }

    /// Returns whether the target is the actor.
    #[must_use]
    pub fn is_self(&self, target_id: &UserId) -> bool {
        self.actor.is_self(target_id)
    }
}

/// Checks a role change or removal on one membership against the owner floor.
///
/// Independent of who acts: an owner membership is frozen while the
/// workspace has at most one owner.
#[must_use]
pub fn can_modify_membership(owner_count: usize, member_role: WorkspaceRole) -> PermissionDecision {
    PermissionDecision::deny_if(
        member_role == WorkspaceRole::Owner && owner_count <= 1,
        DenialReason::LastOwner,
    )
    .unwrap_or(PermissionDecision::Allowed)
}

/// Per-member control state for a roster, in roster order.
#[must_use]
pub fn membership_controls(roster: &MemberRoster) -> Vec<(UserId, PermissionDecision)> {
    let owner_count = roster.owner_count();

    roster
        .members
        .iter()
        .map(|member| {
            (
                member.user_id.clone(),
                can_modify_membership(owner_count, member.role),
            )
        })
        .collect()
}

/// Checks workspace deletion.
#[must_use]
pub fn can_delete_workspace(workspace: &Workspace) -> PermissionDecision {
    PermissionDecision::deny_if(workspace.is_default, DenialReason::DefaultWorkspace)
        .or_else(|| {
            PermissionDecision::deny_if(
                workspace.member_count > 1,
                DenialReason::WorkspaceHasMembers,
            )
        })
        .unwrap_or(PermissionDecision::Allowed)
}
