//! Role-dependent dashboard assembly.

use std::collections::HashMap;

use rentora_common::AppResult;
use rentora_db::{
    entities::{property, user, user::Role},
    repositories::{PropertyRepository, UserRepository},
};
use serde::Serialize;

/// What a user sees on their dashboard, decided by role.
#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DashboardView {
    /// Admins see everyone and everything.
    Admin {
        users: Vec<user::Model>,
        properties: Vec<property::Model>,
        owner_counts: Vec<OwnerCount>,
    },
    /// Owners see their own portfolio.
    Owner { properties: Vec<property::Model> },
    /// Plain users get an empty view; their bookings live under `/bookings`.
    User,
}

/// Number of properties per owner, labelled with the owner's username.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerCount {
    pub username: String,
    pub count: i64,
}

/// Builds the per-role dashboard views.
#[derive(Clone)]
pub struct DashboardService {
    user_repo: UserRepository,
    property_repo: PropertyRepository,
}

impl DashboardService {
    /// Create a new dashboard service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, property_repo: PropertyRepository) -> Self {
        Self {
            user_repo,
            property_repo,
        }
    }

    /// Assemble the dashboard for the authenticated user.
    pub async fn view(&self, user: &user::Model) -> AppResult<DashboardView> {
        match user.role {
            Role::Admin => self.admin_view().await,
            Role::Owner => {
                let properties = self.property_repo.find_by_owner(&user.id).await?;
                Ok(DashboardView::Owner { properties })
            }
            Role::User => Ok(DashboardView::User),
        }
    }

    async fn admin_view(&self) -> AppResult<DashboardView> {
        let users = self.user_repo.all().await?;
        let properties = self.property_repo.all().await?;
        let counts = self.property_repo.count_by_owner().await?;

        let names: HashMap<&str, &str> = users
            .iter()
            .map(|u| (u.id.as_str(), u.username.as_str()))
            .collect();

        let owner_counts = counts
            .into_iter()
            .map(|c| OwnerCount {
                // An owner deleted between the two queries keeps the raw id.
                username: names
                    .get(c.owner_id.as_str())
                    .map_or_else(|| c.owner_id.clone(), ToString::to_string),
                count: c.count,
            })
            .collect();

        Ok(DashboardView::Admin {
            users,
            properties,
            owner_counts,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rentora_db::repositories::OwnerPropertyCount;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_user(id: &str, role: Role) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: format!("user_{id}"),
            username_lower: format!("user_{id}"),
            email: format!("{id}@example.com"),
            password_hash: "$argon2id$test".to_string(),
            role,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_property(id: &str, owner_id: &str) -> property::Model {
        property::Model {
            id: id.to_string(),
            title: "Loft".to_string(),
            description: "d".to_string(),
            location: "NYC".to_string(),
            price: 100.0,
            latitude: None,
            longitude: None,
            owner_id: owner_id.to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> DashboardService {
        let db = Arc::new(db);
        DashboardService::new(UserRepository::new(db.clone()), PropertyRepository::new(db))
    }

    #[tokio::test]
    async fn test_user_view_is_empty() {
        // The mock has no results queued, so any query would fail the test.
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service_with(db);
        let user = test_user("u1", Role::User);

        let view = service.view(&user).await.unwrap();
        assert!(matches!(view, DashboardView::User));
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            serde_json::json!({ "view": "user" })
        );
    }

    #[tokio::test]
    async fn test_owner_view_lists_own_properties() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![test_property("p1", "u1"), test_property("p2", "u1")]])
            .into_connection();
        let service = service_with(db);
        let owner = test_user("u1", Role::Owner);

        match service.view(&owner).await.unwrap() {
            DashboardView::Owner { properties } => assert_eq!(properties.len(), 2),
            other => panic!("expected owner view, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_admin_view_resolves_owner_usernames() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                test_user("u1", Role::Owner),
                test_user("u2", Role::User),
            ]])
            .append_query_results([vec![test_property("p1", "u1")]])
            .append_query_results([vec![OwnerPropertyCount {
                owner_id: "u1".to_string(),
                count: 1,
            }]])
            .into_connection();
        let service = service_with(db);
        let admin = test_user("boss", Role::Admin);

        match service.view(&admin).await.unwrap() {
            DashboardView::Admin {
                users,
                properties,
                owner_counts,
            } => {
                assert_eq!(users.len(), 2);
                assert_eq!(properties.len(), 1);
                assert_eq!(owner_counts.len(), 1);
                assert_eq!(owner_counts[0].username, "user_u1");
                assert_eq!(owner_counts[0].count, 1);
            }
            other => panic!("expected admin view, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_admin_view_keeps_id_for_missing_owner() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([vec![test_property("p1", "ghost")]])
            .append_query_results([vec![OwnerPropertyCount {
                owner_id: "ghost".to_string(),
                count: 1,
            }]])
            .into_connection();
        let service = service_with(db);
        let admin = test_user("boss", Role::Admin);

        match service.view(&admin).await.unwrap() {
            DashboardView::Admin { owner_counts, .. } => {
                assert_eq!(owner_counts[0].username, "ghost");
            }
            other => panic!("expected admin view, got {other:?}"),
        }
    }
}
