//! Role-based access policy.
//!
//! Every role-gated handler consults this table before touching the store;
//! handlers never compare role strings inline.

use serde::{Deserialize, Serialize};

/// Actions a token-bearing caller can attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    RouteCreate,
    RouteUpdate,
    RouteDelete,
    BusCreate,
    BusUpdate,
    BusDelete,
    TripCreate,
    TripUpdate,
    TripDelete,
    UserCreate,
    UserDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    Operator,
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "viewer" => Some(Role::Viewer),
            "operator" => Some(Role::Operator),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Operator => "operator",
            Role::Admin => "admin",
        }
    }
}

/// The (role, action) -> allowed table.
pub fn is_allowed(role: Role, action: Action) -> bool {
    use Action::*;
    match role {
        Role::Viewer => false,
        // operators drive trip lifecycle but do not touch fleet or accounts
        Role::Operator => matches!(action, TripCreate | TripUpdate | TripDelete),
        Role::Admin => matches!(
            action,
            RouteCreate
                | RouteUpdate
                | RouteDelete
                | BusCreate
                | BusUpdate
                | BusDelete
                | TripCreate
                | TripUpdate
                | TripDelete
                | UserCreate
                | UserDelete
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_is_allowed_everything() {
        for action in [
            Action::RouteCreate,
            Action::RouteUpdate,
            Action::RouteDelete,
            Action::BusCreate,
            Action::BusUpdate,
            Action::BusDelete,
            Action::TripCreate,
            Action::TripUpdate,
            Action::TripDelete,
            Action::UserCreate,
            Action::UserDelete,
        ] {
            assert!(is_allowed(Role::Admin, action), "{:?}", action);
        }
    }

    #[test]
    fn operator_is_limited_to_trips() {
        assert!(is_allowed(Role::Operator, Action::TripCreate));
        assert!(is_allowed(Role::Operator, Action::TripUpdate));
        assert!(!is_allowed(Role::Operator, Action::BusCreate));
        assert!(!is_allowed(Role::Operator, Action::UserDelete));
    }

    #[test]
    fn viewer_is_allowed_nothing() {
        assert!(!is_allowed(Role::Viewer, Action::TripCreate));
        assert!(!is_allowed(Role::Viewer, Action::RouteCreate));
    }

    #[test]
    fn unknown_role_string_does_not_parse() {
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
    }
}
