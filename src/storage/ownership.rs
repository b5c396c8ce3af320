// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership filtering for leads, tasks and tickets.
//!
//! Every owned record carries a `created_by` identity ID. A non-admin caller
//! only ever sees or mutates records it created; an admin sees everything.
//! A record owned by someone else is reported exactly like a missing one, so
//! callers cannot probe for the existence of other users' data.

use crate::auth::AuthenticatedUser;

use super::{StorageError, StorageResult};

/// Trait for resources that have a single, immutable creator.
pub trait OwnedResource {
    /// Identity ID of the creator.
    fn created_by(&self) -> &str;

    /// Human-readable kind used in not-found errors ("Lead", "Task", ...).
    fn kind() -> &'static str;
}

/// A listing query that can be narrowed to a single creator.
pub trait ScopedQuery: Sized {
    fn restrict_to_owner(self, owner_id: &str) -> Self;
}

/// An update payload with fields only admins may set.
pub trait RestrictedFields {
    fn strip_restricted(&mut self);
}

/// Uniform ownership rule with an admin bypass.
pub struct OwnershipFilter;

impl OwnershipFilter {
    /// Narrow `base` to the caller's own records unless the caller is admin.
    pub fn scope_query<Q: ScopedQuery>(user: &AuthenticatedUser, base: Q) -> Q {
        if user.is_admin() {
            base
        } else {
            base.restrict_to_owner(&user.user_id)
        }
    }

    /// Whether the caller may read or change this record.
    pub fn authorize_mutation<R: OwnedResource>(user: &AuthenticatedUser, resource: &R) -> bool {
        user.is_admin() || resource.created_by() == user.user_id
    }

    /// Return the record if the caller may see it.
    ///
    /// A missing record and a foreign record both yield the same `NotFound`.
    pub fn visible<R: OwnedResource>(user: &AuthenticatedUser, resource: Option<R>) -> StorageResult<R> {
        match resource {
            Some(resource) if Self::authorize_mutation(user, &resource) => Ok(resource),
            Some(_) => {
                tracing::debug!(
                    user_id = %user.user_id,
                    kind = R::kind(),
                    "Hiding record owned by another identity"
                );
                Err(StorageError::NotFound(R::kind().to_string()))
            }
            None => Err(StorageError::NotFound(R::kind().to_string())),
        }
    }

    /// Silently drop admin-only fields from a non-admin caller's update.
    pub fn strip_restricted_fields<U: RestrictedFields>(user: &AuthenticatedUser, update: &mut U) {
        if !user.is_admin() {
            update.strip_restricted();
        }
    }
}

/// Extension trait applying the visibility rule to lookup results.
pub trait OwnershipCheck<T> {
    fn visible_to(self, user: &AuthenticatedUser) -> StorageResult<T>;
}

impl<T: OwnedResource> OwnershipCheck<T> for StorageResult<T> {
    fn visible_to(self, user: &AuthenticatedUser) -> StorageResult<T> {
        match self {
            Ok(resource) => OwnershipFilter::visible(user, Some(resource)),
            Err(StorageError::NotFound(_)) => OwnershipFilter::visible::<T>(user, None),
            Err(e) => Err(e),
        }
    }
}

impl<T: OwnedResource> OwnershipCheck<T> for Option<T> {
    fn visible_to(self, user: &AuthenticatedUser) -> StorageResult<T> {
        OwnershipFilter::visible(user, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    #[derive(Debug)]
    struct TestResource {
        owner: String,
    }

    impl OwnedResource for TestResource {
        fn created_by(&self) -> &str {
            &self.owner
        }

        fn kind() -> &'static str {
            "Resource"
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct TestQuery {
        status: Option<String>,
        owner: Option<String>,
    }

    impl ScopedQuery for TestQuery {
        fn restrict_to_owner(mut self, owner_id: &str) -> Self {
            self.owner = Some(owner_id.to_string());
            self
        }
    }

    #[derive(Debug, Default)]
    struct TestUpdate {
        title: Option<String>,
        status: Option<String>,
    }

    impl RestrictedFields for TestUpdate {
        fn strip_restricted(&mut self) {
            self.status = None;
        }
    }

    fn make_user(user_id: &str, role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: user_id.to_string(),
            username: user_id.to_string(),
            role,
        }
    }

    fn owned_by(owner: &str) -> TestResource {
        TestResource {
            owner: owner.to_string(),
        }
    }

    #[test]
    fn scope_query_is_identity_for_admin() {
        let base = TestQuery {
            status: Some("open".into()),
            owner: None,
        };
        let scoped = OwnershipFilter::scope_query(&make_user("admin", Role::Admin), base);
        assert_eq!(scoped.owner, None);
        assert_eq!(scoped.status.as_deref(), Some("open"));
    }

    #[test]
    fn scope_query_restricts_regular_user() {
        let base = TestQuery {
            status: Some("open".into()),
            owner: None,
        };
        let scoped = OwnershipFilter::scope_query(&make_user("user_1", Role::User), base);
        assert_eq!(scoped.owner.as_deref(), Some("user_1"));
        assert_eq!(scoped.status.as_deref(), Some("open"));
    }

    #[test]
    fn authorize_mutation_rules() {
        let resource = owned_by("user_1");
        assert!(OwnershipFilter::authorize_mutation(&make_user("user_1", Role::User), &resource));
        assert!(!OwnershipFilter::authorize_mutation(&make_user("user_2", Role::User), &resource));
        assert!(OwnershipFilter::authorize_mutation(&make_user("admin", Role::Admin), &resource));
    }

    #[test]
    fn foreign_and_missing_records_are_indistinguishable() {
        let user = make_user("user_2", Role::User);

        let foreign = OwnershipFilter::visible(&user, Some(owned_by("user_1"))).unwrap_err();
        let missing = OwnershipFilter::visible::<TestResource>(&user, None).unwrap_err();

        assert_eq!(foreign.to_string(), missing.to_string());
        assert!(matches!(foreign, StorageError::NotFound(_)));
    }

    #[test]
    fn ownership_check_on_result() {
        let user = make_user("user_1", Role::User);

        let found: StorageResult<TestResource> = Ok(owned_by("user_1"));
        assert!(found.visible_to(&user).is_ok());

        let missing: StorageResult<TestResource> = Err(StorageError::NotFound("/data/x.json".into()));
        let err = missing.visible_to(&user).unwrap_err();
        assert_eq!(err.to_string(), "Not found: Resource");

        let io: StorageResult<TestResource> = Err(StorageError::NotInitialized);
        assert!(matches!(io.visible_to(&user), Err(StorageError::NotInitialized)));
    }

    #[test]
    fn ownership_check_on_option() {
        let admin = make_user("admin", Role::Admin);
        assert!(Some(owned_by("user_1")).visible_to(&admin).is_ok());
        assert!(None::<TestResource>.visible_to(&admin).is_err());
    }

    #[test]
    fn restricted_fields_stripped_only_for_non_admin() {
        let mut update = TestUpdate {
            title: Some("t".into()),
            status: Some("closed".into()),
        };
        OwnershipFilter::strip_restricted_fields(&make_user("user_1", Role::User), &mut update);
        assert_eq!(update.status, None);
        assert_eq!(update.title.as_deref(), Some("t"));

        let mut update = TestUpdate {
            title: None,
            status: Some("closed".into()),
        };
        OwnershipFilter::strip_restricted_fields(&make_user("admin", Role::Admin), &mut update);
        assert_eq!(update.status.as_deref(), Some("closed"));
    }
}
