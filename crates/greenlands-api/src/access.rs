//! Ownership/authorization gate.
//!
//! One table, one decision function. Controllers resolve the target document
//! first, so a missing resource is reported as not-found before ownership is
//! ever evaluated — non-owners cannot probe for the existence of documents
//! they may not touch.

use uuid::Uuid;

use greenlands_types::api::Claims;
use greenlands_types::models::Role;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Land,
    Equipment,
    Subsidy,
    Policy,
    Listing,
    Department,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Mutate,
}

impl ResourceKind {
    /// Roles permitted to act on a resource they do not own. Government
    /// oversees subsidies, policies and departments globally; nobody
    /// overrides a farmer's land, equipment or listings (government may
    /// still read land for oversight reports).
    pub fn override_roles(self, action: Action) -> &'static [Role] {
        match (self, action) {
            (ResourceKind::Land, Action::Read) => &[Role::Government],
            (ResourceKind::Land, Action::Mutate) => &[],
            (ResourceKind::Equipment, _) => &[],
            (ResourceKind::Listing, _) => &[],
            (ResourceKind::Subsidy, _) => &[Role::Government],
            (ResourceKind::Policy, _) => &[Role::Government],
            (ResourceKind::Department, _) => &[Role::Government],
        }
    }
}

/// Decide whether `claims` may perform `action` on a resource of `kind`
/// owned by `owner` (None for unassigned resources such as programme-level
/// subsidies). Pure: no storage access, no side effects.
pub fn authorize(
    claims: &Claims,
    kind: ResourceKind,
    action: Action,
    owner: Option<Uuid>,
) -> Result<(), ApiError> {
    if owner == Some(claims.sub) {
        return Ok(());
    }
    if kind.override_roles(action).contains(&claims.role) {
        return Ok(());
    }
    Err(ApiError::Forbidden)
}

/// Role gate for route groups (e.g. everything under /government).
pub fn require_role(claims: &Claims, role: Role) -> Result<(), ApiError> {
    if claims.role == role {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Roles the given role may address in messaging: farmers reach government
/// and other farmers; government and admin reach everyone.
pub fn messaging_candidate_roles(role: Role) -> &'static [Role] {
    match role {
        Role::Farmer => &[Role::Government, Role::Farmer],
        Role::Government | Role::Admin => &[Role::Farmer, Role::Government, Role::Admin],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: Uuid, role: Role) -> Claims {
        Claims {
            sub,
            name: "test".into(),
            role,
            exp: 0,
        }
    }

    #[test]
    fn owner_is_always_permitted() {
        let owner = Uuid::new_v4();
        let c = claims(owner, Role::Farmer);
        for kind in [
            ResourceKind::Land,
            ResourceKind::Equipment,
            ResourceKind::Subsidy,
            ResourceKind::Listing,
        ] {
            assert!(authorize(&c, kind, Action::Mutate, Some(owner)).is_ok());
            assert!(authorize(&c, kind, Action::Read, Some(owner)).is_ok());
        }
    }

    #[test]
    fn non_owner_without_override_is_denied() {
        let owner = Uuid::new_v4();
        let stranger = claims(Uuid::new_v4(), Role::Farmer);
        assert!(matches!(
            authorize(&stranger, ResourceKind::Land, Action::Mutate, Some(owner)),
            Err(ApiError::Forbidden)
        ));
        assert!(matches!(
            authorize(&stranger, ResourceKind::Equipment, Action::Read, Some(owner)),
            Err(ApiError::Forbidden)
        ));
    }

    #[test]
    fn government_has_no_override_on_land_mutation() {
        let owner = Uuid::new_v4();
        let gov = claims(Uuid::new_v4(), Role::Government);
        assert!(matches!(
            authorize(&gov, ResourceKind::Land, Action::Mutate, Some(owner)),
            Err(ApiError::Forbidden)
        ));
        // But government may read land for oversight
        assert!(authorize(&gov, ResourceKind::Land, Action::Read, Some(owner)).is_ok());
    }

    #[test]
    fn government_overrides_subsidies_and_policies() {
        let owner = Uuid::new_v4();
        let gov = claims(Uuid::new_v4(), Role::Government);
        assert!(authorize(&gov, ResourceKind::Subsidy, Action::Mutate, Some(owner)).is_ok());
        assert!(authorize(&gov, ResourceKind::Policy, Action::Mutate, Some(owner)).is_ok());
        // Unassigned subsidies are reachable only through the override set
        assert!(authorize(&gov, ResourceKind::Subsidy, Action::Mutate, None).is_ok());
        let farmer = claims(Uuid::new_v4(), Role::Farmer);
        assert!(matches!(
            authorize(&farmer, ResourceKind::Subsidy, Action::Mutate, None),
            Err(ApiError::Forbidden)
        ));
    }

    #[test]
    fn candidate_roles_by_sender() {
        assert_eq!(
            messaging_candidate_roles(Role::Farmer),
            &[Role::Government, Role::Farmer]
        );
        assert!(messaging_candidate_roles(Role::Government).contains(&Role::Admin));
        assert!(!messaging_candidate_roles(Role::Farmer).contains(&Role::Admin));
    }
}
