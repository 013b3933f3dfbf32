//! Listing service: public browse and detail reads.

use rentora_common::AppResult;
use rentora_db::{
    entities::{photo, property},
    repositories::{PhotoRepository, PropertyFilter, PropertyRepository},
};

/// Read-only property browsing. No authentication involved.
#[derive(Clone)]
pub struct ListingService {
    property_repo: PropertyRepository,
    photo_repo: PhotoRepository,
}

impl ListingService {
    /// Create a new listing service.
    #[must_use]
    pub const fn new(property_repo: PropertyRepository, photo_repo: PhotoRepository) -> Self {
        Self {
            property_repo,
            photo_repo,
        }
    }

    /// List properties matching the filter, with photos attached.
    pub async fn list(
        &self,
        filter: PropertyFilter,
    ) -> AppResult<Vec<(property::Model, Vec<photo::Model>)>> {
        self.property_repo.list(filter).await
    }

    /// Fetch one property and its photos.
    pub async fn get(&self, id: &str) -> AppResult<(property::Model, Vec<photo::Model>)> {
        let property = self.property_repo.get_by_id(id).await?;
        let photos = self.photo_repo.find_by_property(id).await?;
        Ok((property, photos))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rentora_common::AppError;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_property(id: &str, price: f64) -> property::Model {
        property::Model {
            id: id.to_string(),
            title: format!("Property {id}"),
            description: "d".to_string(),
            location: "NYC".to_string(),
            price,
            latitude: None,
            longitude: None,
            owner_id: "owner".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_photo(id: &str, property_id: &str) -> photo::Model {
        photo::Model {
            id: id.to_string(),
            filename: format!("{id}.jpg"),
            original_name: "upload.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            size: 1024,
            property_id: property_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> ListingService {
        let db = Arc::new(db);
        ListingService::new(
            PropertyRepository::new(db.clone()),
            PhotoRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_list_attaches_photos_to_their_property() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![test_property("p1", 50.0), test_property("p2", 80.0)]])
            .append_query_results([vec![test_photo("ph1", "p2"), test_photo("ph2", "p2")]])
            .into_connection();
        let service = service_with(db);

        let listed = service.list(PropertyFilter::default()).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].1.is_empty());
        assert_eq!(listed[1].1.len(), 2);
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<property::Model>::new()])
            .into_connection();
        let service = service_with(db);

        assert!(service.list(PropertyFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_property() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<property::Model>::new()])
            .into_connection();
        let service = service_with(db);

        let err = service.get("nope").await.unwrap_err();
        assert!(matches!(err, AppError::PropertyNotFound(_)));
    }

    #[tokio::test]
    async fn test_get_returns_property_with_photos() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![test_property("p1", 50.0)]])
            .append_query_results([vec![test_photo("ph1", "p1")]])
            .into_connection();
        let service = service_with(db);

        let (property, photos) = service.get("p1").await.unwrap();
        assert_eq!(property.id, "p1");
        assert_eq!(photos.len(), 1);
    }
}
