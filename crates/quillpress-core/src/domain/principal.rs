//! Authenticated principals and the permissions their roles grant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Post;
use crate::error::DomainError;

/// Capability role. Every principal holds exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Writer,
    Admin,
}

/// Operations gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    CreatePosts,
    EditPosts,
    DeletePosts,
    ApprovePosts,
    RejectPosts,
    SetPostPending,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Writer => "writer",
            Role::Admin => "admin",
        }
    }

    pub fn permissions(self) -> &'static [Permission] {
        match self {
            Role::Writer => &[
                Permission::CreatePosts,
                Permission::EditPosts,
                Permission::DeletePosts,
            ],
            Role::Admin => &[
                Permission::ApprovePosts,
                Permission::RejectPosts,
                Permission::SetPostPending,
                Permission::DeletePosts,
            ],
        }
    }

    pub fn grants(self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "writer" => Ok(Role::Writer),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Identity and role of whoever is acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

/// The two disjoint principal kinds. Authors and administrators live in
/// separate tables and authenticate against separate guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    Author(Actor),
    Administrator(Actor),
}

impl Principal {
    pub fn author(id: Uuid) -> Self {
        Principal::Author(Actor {
            id,
            role: Role::Writer,
        })
    }

    pub fn administrator(id: Uuid) -> Self {
        Principal::Administrator(Actor {
            id,
            role: Role::Admin,
        })
    }

    pub fn actor(&self) -> Actor {
        match self {
            Principal::Author(actor) | Principal::Administrator(actor) => *actor,
        }
    }

    pub fn id(&self) -> Uuid {
        self.actor().id
    }

    pub fn kind(&self) -> PrincipalKind {
        match self {
            Principal::Author(_) => PrincipalKind::Author,
            Principal::Administrator(_) => PrincipalKind::Admin,
        }
    }

    pub fn is_administrator(&self) -> bool {
        matches!(self, Principal::Administrator(_))
    }

    /// Fail unless the principal's role grants `permission`.
    pub fn require(&self, permission: Permission) -> Result<(), DomainError> {
        if self.actor().role.grants(permission) {
            Ok(())
        } else {
            Err(DomainError::forbidden(format!(
                "role '{}' may not perform {:?}",
                self.actor().role,
                permission
            )))
        }
    }

    /// Author-only operations (create, edit) on the principal's own content.
    pub fn require_author(&self, permission: Permission) -> Result<Uuid, DomainError> {
        match self {
            Principal::Author(actor) => {
                self.require(permission)?;
                Ok(actor.id)
            }
            Principal::Administrator(_) => Err(DomainError::forbidden(
                "administrators cannot author posts",
            )),
        }
    }

    /// Administrator-only moderation operations.
    pub fn require_administrator(&self, permission: Permission) -> Result<(), DomainError> {
        match self {
            Principal::Administrator(_) => self.require(permission),
            Principal::Author(_) => Err(DomainError::forbidden(
                "only administrators may moderate posts",
            )),
        }
    }

    /// Authors may only touch their own posts; administrators may touch any.
    pub fn require_access(&self, post: &Post, permission: Permission) -> Result<(), DomainError> {
        self.require(permission)?;
        match self {
            Principal::Administrator(_) => Ok(()),
            Principal::Author(actor) if post.is_owned_by(actor.id) => Ok(()),
            Principal::Author(_) => Err(DomainError::forbidden("post belongs to another author")),
        }
    }

    /// Read access: owners and administrators see everything.
    pub fn can_read(&self, post: &Post) -> bool {
        match self {
            Principal::Administrator(_) => true,
            Principal::Author(actor) => post.is_owned_by(actor.id) || post.is_publicly_readable(),
        }
    }
}

/// Which guard a principal authenticated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    Author,
    Admin,
}

impl PrincipalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PrincipalKind::Author => "author",
            PrincipalKind::Admin => "admin",
        }
    }
}

impl FromStr for PrincipalKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "author" => Ok(PrincipalKind::Author),
            "admin" => Ok(PrincipalKind::Admin),
            other => Err(format!("unknown principal kind '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PostContent, Visibility};
    use chrono::Utc;

    fn post_by(user_id: Uuid) -> Post {
        Post::submit(
            user_id,
            PostContent {
                title: "Hello".to_string(),
                content: "Body".to_string(),
                category_id: None,
                writer: "Ada".to_string(),
                visibility: Visibility::Public,
            },
            None,
            Utc::now(),
        )
    }

    #[test]
    fn test_author_cannot_moderate() {
        let author = Principal::author(Uuid::new_v4());
        for permission in [
            Permission::ApprovePosts,
            Permission::RejectPosts,
            Permission::SetPostPending,
        ] {
            assert!(matches!(
                author.require_administrator(permission),
                Err(DomainError::Forbidden(_))
            ));
        }
    }

    #[test]
    fn test_administrator_cannot_author() {
        let admin = Principal::administrator(Uuid::new_v4());
        assert!(admin.require_author(Permission::CreatePosts).is_err());
        assert!(admin.require_administrator(Permission::ApprovePosts).is_ok());
    }

    #[test]
    fn test_mismatched_role_is_rejected() {
        // An administrator variant carrying the writer role holds no moderation rights.
        let odd = Principal::Administrator(Actor {
            id: Uuid::new_v4(),
            role: Role::Writer,
        });
        assert!(odd.require_administrator(Permission::ApprovePosts).is_err());
    }

    #[test]
    fn test_ownership() {
        let owner_id = Uuid::new_v4();
        let post = post_by(owner_id);

        assert!(
            Principal::author(owner_id)
                .require_access(&post, Permission::EditPosts)
                .is_ok()
        );
        assert!(
            Principal::author(Uuid::new_v4())
                .require_access(&post, Permission::EditPosts)
                .is_err()
        );
        assert!(
            Principal::administrator(Uuid::new_v4())
                .require_access(&post, Permission::DeletePosts)
                .is_ok()
        );
        // Administrators hold no edit permission even though they may touch any post.
        assert!(
            Principal::administrator(Uuid::new_v4())
                .require_access(&post, Permission::EditPosts)
                .is_err()
        );
    }

    #[test]
    fn test_read_access() {
        let owner_id = Uuid::new_v4();
        let post = post_by(owner_id);
        let stranger = Principal::author(Uuid::new_v4());

        assert!(Principal::author(owner_id).can_read(&post));
        assert!(!stranger.can_read(&post));
        assert!(Principal::administrator(Uuid::new_v4()).can_read(&post));
    }
}
