use sea_orm::{DatabaseConnection, TransactionTrait};
use serde_json::json;
use tracing::info;

use crate::{
    auth::{CurrentUser, Permission},
    db::{
        dao::{DaoBase, DollDao, EventDao, PhotoDao},
        entities::{event::EventType, photo},
    },
    error::AppError,
    storage::{PhotoStorage, is_valid_image},
};

/// Raw upload as received from the client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct PhotoList {
    pub doll_id: i64,
    pub primary_photo_id: Option<i64>,
    pub photos: Vec<photo::Model>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimarySwap {
    pub doll_id: i64,
    pub primary_photo_id: i64,
    pub photo_id: i64,
}

#[derive(Clone)]
pub struct PhotoService {
    db: DatabaseConnection,
    dolls: DollDao,
    photos: PhotoDao,
    events: EventDao,
    storage: PhotoStorage,
}

impl PhotoService {
    pub fn new(
        db: DatabaseConnection,
        dolls: DollDao,
        photos: PhotoDao,
        events: EventDao,
        storage: PhotoStorage,
    ) -> Self {
        Self {
            db,
            dolls,
            photos,
            events,
            storage,
        }
    }

    /// Stores the file, then records it. The file is removed again if the
    /// database work fails.
    pub async fn upload(
        &self,
        user: &CurrentUser,
        doll_id: i64,
        file: UploadedFile,
        make_primary: bool,
    ) -> Result<photo::Model, AppError> {
        user.require(Permission::PhotoAdd)?;
        self.dolls.find_live(self.dolls.db(), doll_id).await?;

        if !is_valid_image(&file.filename, file.content_type.as_deref()) {
            return Err(AppError::bad_request(
                "File must be an image (jpg, jpeg, png, webp, gif)",
            ));
        }
        if file.bytes.is_empty() {
            return Err(AppError::bad_request("Uploaded file is empty"));
        }

        let relative = self
            .storage
            .save(doll_id, &file.filename, file.content_type.as_deref(), &file.bytes)
            .await?;
        match self.record_upload(user, doll_id, &relative, make_primary).await {
            Ok(photo) => Ok(photo),
            Err(err) => {
                self.storage.remove(&relative).await;
                Err(err)
            }
        }
    }

    async fn record_upload(
        &self,
        user: &CurrentUser,
        doll_id: i64,
        path: &str,
        make_primary: bool,
    ) -> Result<photo::Model, AppError> {
        let txn = self.db.begin().await?;
        self.dolls.find_live(&txn, doll_id).await?;

        let previous = self.photos.find_primary(&txn, doll_id).await?;
        let replaces_primary = make_primary && previous.is_some();
        if replaces_primary {
            self.photos.clear_primary(&txn, doll_id).await?;
        }
        let is_primary = previous.is_none() || make_primary;
        let photo = self
            .photos
            .create_photo(&txn, doll_id, path, is_primary, &user.email)
            .await?;

        let payload = json!({ "photo_id": photo.id, "path": photo.path });
        self.events
            .append(&txn, doll_id, EventType::PhotoAdded, &payload, &user.email)
            .await?;
        if replaces_primary {
            let payload = json!({
                "photo_id": photo.id,
                "previous_photo_id": previous.as_ref().map(|p| p.id),
            });
            self.events
                .append(&txn, doll_id, EventType::PhotoSetPrimary, &payload, &user.email)
                .await?;
        }
        txn.commit().await?;

        info!(doll_id, photo_id = photo.id, is_primary, "photo added");
        Ok(photo)
    }

    pub async fn list(&self, user: &CurrentUser, doll_id: i64) -> Result<PhotoList, AppError> {
        user.require(Permission::DollRead)?;
        self.dolls.find_live(self.dolls.db(), doll_id).await?;

        let photos = self.photos.list_for_doll(doll_id).await?;
        let primary_photo_id = photos.iter().find(|photo| photo.is_primary).map(|photo| photo.id);
        Ok(PhotoList {
            doll_id,
            primary_photo_id,
            photos,
        })
    }

    /// Demotes the doll's current primary and promotes `photo_id`.
    pub async fn set_primary(
        &self,
        user: &CurrentUser,
        photo_id: i64,
    ) -> Result<PrimarySwap, AppError> {
        user.require(Permission::PhotoSetPrimary)?;

        let txn = self.db.begin().await?;
        let photo = self.photos.find_by_id(&txn, photo_id).await?;
        self.dolls.find_live(&txn, photo.doll_id).await?;

        let previous = self.photos.find_primary(&txn, photo.doll_id).await?;
        self.photos.clear_primary(&txn, photo.doll_id).await?;
        let promoted = self.photos.mark_primary(&txn, photo_id).await?;

        let payload = json!({
            "photo_id": promoted.id,
            "previous_photo_id": previous.as_ref().map(|p| p.id),
        });
        self.events
            .append(&txn, promoted.doll_id, EventType::PhotoSetPrimary, &payload, &user.email)
            .await?;
        txn.commit().await?;

        info!(doll_id = promoted.doll_id, photo_id, "primary photo set");
        Ok(PrimarySwap {
            doll_id: promoted.doll_id,
            primary_photo_id: promoted.id,
            photo_id: promoted.id,
        })
    }
}
