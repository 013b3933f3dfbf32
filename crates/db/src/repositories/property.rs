//! Property repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{Booking, Photo, Property, booking, photo, property};
use rentora_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
    sea_query::Query,
};

/// Filter options for listing properties. All predicates are AND-combined;
/// an empty filter matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PropertyFilter {
    /// Inclusive lower price bound.
    pub min_price: Option<f64>,
    /// Inclusive upper price bound.
    pub max_price: Option<f64>,
    /// Restrict to properties with (or without) at least one photo.
    pub has_photos: Option<bool>,
}

/// Per-owner property count (admin dashboard aggregation).
#[derive(Debug, Clone, sea_orm::FromQueryResult)]
pub struct OwnerPropertyCount {
    /// Owner user ID.
    pub owner_id: String,
    /// Number of properties owned.
    pub count: i64,
}

#[cfg(feature = "test-utils")]
impl sea_orm::IntoMockRow for OwnerPropertyCount {
    fn into_mock_row(self) -> sea_orm::MockRow {
        std::collections::BTreeMap::from([
            ("owner_id", sea_orm::Value::from(self.owner_id)),
            ("count", sea_orm::Value::from(self.count)),
        ])
        .into_mock_row()
    }
}

/// Property repository for database operations.
#[derive(Clone)]
pub struct PropertyRepository {
    db: Arc<DatabaseConnection>,
}

impl PropertyRepository {
    /// Create a new property repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a property by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<property::Model>> {
        Property::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a property by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<property::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PropertyNotFound(id.to_string()))
    }

    /// Find properties by IDs (store's natural order).
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<property::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Property::find()
            .filter(property::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List properties matching the filter, each with its photos eagerly
    /// loaded.
    pub async fn list(
        &self,
        filter: PropertyFilter,
    ) -> AppResult<Vec<(property::Model, Vec<photo::Model>)>> {
        let mut query = Property::find().order_by_asc(property::Column::Id);

        if let Some(min) = filter.min_price {
            query = query.filter(property::Column::Price.gte(min));
        }
        if let Some(max) = filter.max_price {
            query = query.filter(property::Column::Price.lte(max));
        }
        if let Some(has_photos) = filter.has_photos {
            let sub = Query::select()
                .column(photo::Column::PropertyId)
                .from(Photo)
                .to_owned();
            query = if has_photos {
                query.filter(property::Column::Id.in_subquery(sub))
            } else {
                query.filter(property::Column::Id.not_in_subquery(sub))
            };
        }

        let properties = query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if properties.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = properties.iter().map(|p| p.id.clone()).collect();
        let photos = Photo::find()
            .filter(photo::Column::PropertyId.is_in(ids))
            .order_by_asc(photo::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut by_property: HashMap<String, Vec<photo::Model>> = HashMap::new();
        for p in photos {
            by_property.entry(p.property_id.clone()).or_default().push(p);
        }

        Ok(properties
            .into_iter()
            .map(|p| {
                let photos = by_property.remove(&p.id).unwrap_or_default();
                (p, photos)
            })
            .collect())
    }

    /// Get properties owned by a user.
    pub async fn find_by_owner(&self, owner_id: &str) -> AppResult<Vec<property::Model>> {
        Property::find()
            .filter(property::Column::OwnerId.eq(owner_id))
            .order_by_asc(property::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all properties (admin dashboard).
    pub async fn all(&self) -> AppResult<Vec<property::Model>> {
        Property::find()
            .order_by_asc(property::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count properties per owner (grouped aggregation).
    pub async fn count_by_owner(&self) -> AppResult<Vec<OwnerPropertyCount>> {
        use sea_orm::QuerySelect;

        Property::find()
            .select_only()
            .column(property::Column::OwnerId)
            .column_as(property::Column::Id.count(), "count")
            .group_by(property::Column::OwnerId)
            .into_model::<OwnerPropertyCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new property.
    pub async fn create(&self, model: property::ActiveModel) -> AppResult<property::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply a property edit atomically: remove the given photo records,
    /// update scalar fields, and insert the new photo records in one
    /// transaction.
    pub async fn update_with_photos(
        &self,
        model: property::ActiveModel,
        delete_photo_ids: &[String],
        new_photos: Vec<photo::ActiveModel>,
    ) -> AppResult<property::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !delete_photo_ids.is_empty() {
            Photo::delete_many()
                .filter(photo::Column::Id.is_in(delete_photo_ids.to_vec()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        let updated = model
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        for new_photo in new_photos {
            new_photo
                .insert(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated)
    }

    /// Delete a property and everything it owns in one transaction: photo
    /// records, bookings, then the property row. Returns the deleted photo
    /// records so the caller can remove the stored files.
    ///
    /// The schema's FK cascades would cover the children too; the explicit
    /// routine keeps the deletion order and the photo list in one place.
    pub async fn delete_with_children(&self, id: &str) -> AppResult<Vec<photo::Model>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let photos = Photo::find()
            .filter(photo::Column::PropertyId.eq(id))
            .all(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Photo::delete_many()
            .filter(photo::Column::PropertyId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Booking::delete_many()
            .filter(booking::Column::PropertyId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Property::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(photos)
    }
}
