//! Property management: create, edit, delete, with photo files.
//!
//! File bytes go to the [`StorageBackend`] first, then the database rows
//! are written; if the database write fails the stored files are removed
//! again. File removal after a successful row delete is best-effort and
//! only logged on failure.

use std::sync::Arc;

use rentora_common::{AppError, AppResult, IdGenerator, StorageBackend, generate_storage_key};
use rentora_db::{
    entities::{photo, property, user, user::Role},
    repositories::{PhotoRepository, PropertyRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::access::{require_owner_or_admin, require_role};

/// Content types accepted for photo uploads.
pub const ALLOWED_IMAGE_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Property management service.
#[derive(Clone)]
pub struct PropertyService {
    property_repo: PropertyRepository,
    photo_repo: PhotoRepository,
    storage: Arc<dyn StorageBackend>,
    id_gen: IdGenerator,
}

/// Scalar fields of a property, for create and update.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PropertyInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 10_000))]
    pub description: String,

    #[validate(length(min = 1, max = 200))]
    pub location: String,

    #[validate(range(min = 0.0))]
    pub price: f64,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// An uploaded photo: raw bytes plus what the client said about them.
pub struct PhotoUpload {
    pub original_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl PropertyService {
    /// Create a new property service.
    #[must_use]
    pub fn new(
        property_repo: PropertyRepository,
        photo_repo: PhotoRepository,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            property_repo,
            photo_repo,
            storage,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a property with its initial photos.
    ///
    /// Requires the owner or admin role; the created property always
    /// belongs to the caller.
    pub async fn create(
        &self,
        user: &user::Model,
        input: PropertyInput,
        photos: Vec<PhotoUpload>,
    ) -> AppResult<(property::Model, Vec<photo::Model>)> {
        require_role(user, &[Role::Owner, Role::Admin])?;
        input.validate()?;
        check_photo_types(&photos)?;

        let property_id = self.id_gen.generate();
        let stored = self.store_photos(&property_id, &photos).await?;

        let model = property::ActiveModel {
            id: Set(property_id.clone()),
            title: Set(input.title),
            description: Set(input.description),
            location: Set(input.location),
            price: Set(input.price),
            latitude: Set(input.latitude),
            longitude: Set(input.longitude),
            owner_id: Set(user.id.clone()),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let created = match self.property_repo.create(model).await {
            Ok(p) => p,
            Err(e) => {
                let keys: Vec<String> = stored.iter().map(|(_, s)| s.key.clone()).collect();
                self.remove_files(keys).await;
                return Err(e);
            }
        };

        let mut photo_models = Vec::with_capacity(stored.len());
        for (upload, file) in &stored {
            let active = self.photo_record(&property_id, upload, &file.key);
            match self.photo_repo.create(active).await {
                Ok(m) => photo_models.push(m),
                Err(e) => {
                    let keys: Vec<String> = stored.iter().map(|(_, s)| s.key.clone()).collect();
                    self.remove_files(keys).await;
                    return Err(e);
                }
            }
        }

        Ok((created, photo_models))
    }

    /// Edit a property: scalar fields, plus photos to add and photo records
    /// to remove. The row changes are applied in one transaction.
    pub async fn update(
        &self,
        user: &user::Model,
        property_id: &str,
        input: PropertyInput,
        new_photos: Vec<PhotoUpload>,
        delete_photo_ids: &[String],
    ) -> AppResult<property::Model> {
        let property = self.property_repo.get_by_id(property_id).await?;
        require_owner_or_admin(user, &property)?;
        input.validate()?;
        check_photo_types(&new_photos)?;

        // Photo ids to delete must belong to this property.
        let doomed = self.photo_repo.find_by_ids(delete_photo_ids).await?;
        if doomed.len() != delete_photo_ids.len() {
            return Err(AppError::NotFound("Photo not found".to_string()));
        }
        if doomed.iter().any(|p| p.property_id != property_id) {
            return Err(AppError::BadRequest(
                "Photo does not belong to this property".to_string(),
            ));
        }

        let stored = self.store_photos(property_id, &new_photos).await?;
        let photo_records = stored
            .iter()
            .map(|(upload, file)| self.photo_record(property_id, upload, &file.key))
            .collect();

        let mut active: property::ActiveModel = property.into();
        active.title = Set(input.title);
        active.description = Set(input.description);
        active.location = Set(input.location);
        active.price = Set(input.price);
        active.latitude = Set(input.latitude);
        active.longitude = Set(input.longitude);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = match self
            .property_repo
            .update_with_photos(active, delete_photo_ids, photo_records)
            .await
        {
            Ok(p) => p,
            Err(e) => {
                let keys: Vec<String> = stored.iter().map(|(_, s)| s.key.clone()).collect();
                self.remove_files(keys).await;
                return Err(e);
            }
        };

        // Row deletes are committed; removing the files is best-effort.
        self.remove_files(doomed.into_iter().map(|p| p.filename)).await;

        Ok(updated)
    }

    /// Delete a property, its photos, and its bookings. Admin only; owners
    /// cannot delete their own listings.
    pub async fn delete(&self, user: &user::Model, property_id: &str) -> AppResult<()> {
        require_role(user, &[Role::Admin])?;
        self.property_repo.get_by_id(property_id).await?;

        let photos = self.property_repo.delete_with_children(property_id).await?;
        self.remove_files(photos.into_iter().map(|p| p.filename)).await;

        Ok(())
    }

    async fn store_photos(
        &self,
        property_id: &str,
        photos: &[PhotoUpload],
    ) -> AppResult<Vec<(PhotoMeta, rentora_common::StoredFile)>> {
        let mut stored = Vec::with_capacity(photos.len());
        for photo in photos {
            let key = generate_storage_key(property_id, &photo.original_name);
            match self
                .storage
                .store(&key, &photo.data, &photo.content_type)
                .await
            {
                Ok(file) => stored.push((PhotoMeta::from(photo), file)),
                Err(e) => {
                    let keys: Vec<String> = stored.iter().map(|(_, s)| s.key.clone()).collect();
                    self.remove_files(keys).await;
                    return Err(e);
                }
            }
        }
        Ok(stored)
    }

    fn photo_record(&self, property_id: &str, meta: &PhotoMeta, key: &str) -> photo::ActiveModel {
        photo::ActiveModel {
            id: Set(self.id_gen.generate()),
            filename: Set(key.to_string()),
            original_name: Set(meta.original_name.clone()),
            content_type: Set(meta.content_type.clone()),
            size: Set(meta.size),
            property_id: Set(property_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        }
    }

    async fn remove_files<I: IntoIterator<Item = String>>(&self, keys: I) {
        for key in keys {
            if let Err(e) = self.storage.delete(&key).await {
                tracing::warn!(key = %key, error = %e, "failed to remove stored file");
            }
        }
    }
}

/// Metadata of an upload, kept after the bytes have gone to storage.
struct PhotoMeta {
    original_name: String,
    content_type: String,
    size: i64,
}

impl From<&PhotoUpload> for PhotoMeta {
    fn from(upload: &PhotoUpload) -> Self {
        Self {
            original_name: upload.original_name.clone(),
            content_type: upload.content_type.clone(),
            size: upload.data.len() as i64,
        }
    }
}

fn check_photo_types(photos: &[PhotoUpload]) -> AppResult<()> {
    for photo in photos {
        if !ALLOWED_IMAGE_TYPES.contains(&photo.content_type.as_str()) {
            return Err(AppError::Validation(format!(
                "Unsupported photo content type: {}",
                photo.content_type
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rentora_common::StoredFile;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
    use std::sync::Mutex;

    /// Records stores and deletes instead of touching a filesystem.
    #[derive(Default)]
    struct RecordingStorage {
        stored: Mutex<Vec<String>>,
        deleted: Mutex<Vec<String>>,
        fail_stores_after: Option<usize>,
    }

    #[async_trait::async_trait]
    impl StorageBackend for RecordingStorage {
        async fn store(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<StoredFile> {
            let mut stored = self.stored.lock().unwrap();
            if let Some(limit) = self.fail_stores_after {
                if stored.len() >= limit {
                    return Err(AppError::Storage("disk full".to_string()));
                }
            }
            stored.push(key.to_string());
            Ok(StoredFile {
                key: key.to_string(),
                url: format!("/files/{key}"),
                size: data.len() as u64,
                content_type: content_type.to_string(),
            })
        }

        async fn delete(&self, key: &str) -> AppResult<()> {
            self.deleted.lock().unwrap().push(key.to_string());
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("/files/{key}")
        }

        async fn exists(&self, key: &str) -> AppResult<bool> {
            Ok(self.stored.lock().unwrap().contains(&key.to_string()))
        }
    }

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

    fn test_photo(id: &str, property_id: &str) -> photo::Model {
        photo::Model {
            id: id.to_string(),
            filename: format!("2025/01/01/{property_id}/{id}.jpg"),
            original_name: "upload.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            size: 1024,
            property_id: property_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn input() -> PropertyInput {
        PropertyInput {
            title: "Loft".to_string(),
            description: "Nice loft".to_string(),
            location: "NYC".to_string(),
            price: 100.0,
            latitude: None,
            longitude: None,
        }
    }

    fn upload(name: &str, content_type: &str) -> PhotoUpload {
        PhotoUpload {
            original_name: name.to_string(),
            content_type: content_type.to_string(),
            data: vec![0_u8; 16],
        }
    }

    fn service_with(
        db: sea_orm::DatabaseConnection,
        storage: Arc<RecordingStorage>,
    ) -> PropertyService {
        let db = Arc::new(db);
        PropertyService::new(
            PropertyRepository::new(db.clone()),
            PhotoRepository::new(db),
            storage,
        )
    }

    #[tokio::test]
    async fn test_create_forbidden_for_plain_user() {
        let storage = Arc::new(RecordingStorage::default());
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            storage,
        );
        let user = test_user("u1", Role::User);

        let err = service.create(&user, input(), Vec::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let storage = Arc::new(RecordingStorage::default());
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            storage,
        );
        let owner = test_user("u1", Role::Owner);

        let mut bad = input();
        bad.title = String::new();

        let err = service.create(&owner, bad, Vec::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_non_image_upload() {
        let storage = Arc::new(RecordingStorage::default());
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            storage.clone(),
        );
        let owner = test_user("u1", Role::Owner);

        let err = service
            .create(&owner, input(), vec![upload("evil.html", "text/html")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        // Rejected before anything touched storage
        assert!(storage.stored.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_success_stores_files_and_rows() {
        let storage = Arc::new(RecordingStorage::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![test_property("p1", "u1")]])
            .append_query_results([vec![test_photo("ph1", "p1")]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();
        let service = service_with(db, storage.clone());
        let owner = test_user("u1", Role::Owner);

        let (property, photos) = service
            .create(&owner, input(), vec![upload("a.jpg", "image/jpeg")])
            .await
            .unwrap();

        assert_eq!(property.owner_id, "u1");
        assert_eq!(photos.len(), 1);
        assert_eq!(storage.stored.lock().unwrap().len(), 1);
        assert!(storage.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_removes_files_when_insert_fails() {
        let storage = Arc::new(RecordingStorage::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("insert failed".to_string())])
            .into_connection();
        let service = service_with(db, storage.clone());
        let owner = test_user("u1", Role::Owner);

        let err = service
            .create(&owner, input(), vec![upload("a.jpg", "image/jpeg")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        let stored = storage.stored.lock().unwrap().clone();
        let deleted = storage.deleted.lock().unwrap().clone();
        assert_eq!(stored, deleted);
    }

    #[tokio::test]
    async fn test_create_compensates_partial_store_failure() {
        let storage = Arc::new(RecordingStorage {
            fail_stores_after: Some(1),
            ..RecordingStorage::default()
        });
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            storage.clone(),
        );
        let owner = test_user("u1", Role::Owner);

        let err = service
            .create(
                &owner,
                input(),
                vec![upload("a.jpg", "image/jpeg"), upload("b.png", "image/png")],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));

        // The one file that made it in was removed again
        assert_eq!(storage.deleted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_forbidden_for_foreign_owner() {
        let storage = Arc::new(RecordingStorage::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![test_property("p1", "someone_else")]])
            .into_connection();
        let service = service_with(db, storage);
        let owner = test_user("u1", Role::Owner);

        let err = service
            .update(&owner, "p1", input(), Vec::new(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_update_rejects_foreign_photo_id() {
        let storage = Arc::new(RecordingStorage::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![test_property("p1", "u1")]])
            .append_query_results([vec![test_photo("ph1", "other_property")]])
            .into_connection();
        let service = service_with(db, storage);
        let owner = test_user("u1", Role::Owner);

        let err = service
            .update(&owner, "p1", input(), Vec::new(), &["ph1".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_update_unknown_photo_id() {
        let storage = Arc::new(RecordingStorage::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![test_property("p1", "u1")]])
            .append_query_results([Vec::<photo::Model>::new()])
            .into_connection();
        let service = service_with(db, storage);
        let owner = test_user("u1", Role::Owner);

        let err = service
            .update(&owner, "p1", input(), Vec::new(), &["ghost".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_stored_files() {
        let storage = Arc::new(RecordingStorage::default());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![test_property("p1", "u1")]])
            .append_query_results([vec![test_photo("ph1", "p1"), test_photo("ph2", "p1")]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();
        let service = service_with(db, storage.clone());
        let admin = test_user("boss", Role::Admin);

        service.delete(&admin, "p1").await.unwrap();

        let deleted = storage.deleted.lock().unwrap().clone();
        assert_eq!(deleted.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_forbidden_for_owner() {
        // Owners can edit but not delete their own listings
        let storage = Arc::new(RecordingStorage::default());
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            storage,
        );
        let owner = test_user("u1", Role::Owner);

        let err = service.delete(&owner, "p1").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
