//! Admin-gated mutating actions shared by all three content types.
//!
//! Every action re-resolves the caller against the identity provider and
//! re-checks the admin flag, even though the route guard already screened
//! the request: mutations may be reached through other entry points, so the
//! check is repeated per action. All failures come back as a structured
//! [`ActionResult`] so the caller can surface a message without a crash.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{AuthUser, IdentityProvider};
use crate::cache::Revalidator;
use crate::database::content::{AssetRef, ContentDraft, ContentRecords};
use crate::database::profiles::ProfileStore;
use crate::storage::{delete_image, upload_image, ImageFile, ObjectStorage};

/// Structured outcome of a mutating action. Never thrown across the action
/// boundary; the HTTP layer returns it verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Collaborators every mutating action needs, passed explicitly instead of
/// reached through globals.
pub struct ActionDeps<'a> {
    pub identity: &'a dyn IdentityProvider,
    pub profiles: &'a dyn ProfileStore,
    pub storage: &'a dyn ObjectStorage,
    pub cache: &'a dyn Revalidator,
}

/// Resolve the caller and confirm admin rights. Checked in order: a user is
/// resolvable at all, then the matching profile exists with `is_admin` set.
/// Any lookup failure denies, with the content type's denial wording.
pub async fn authorize_admin(
    deps: &ActionDeps<'_>,
    token: Option<&str>,
    access_denied: &str,
) -> Result<AuthUser, ActionResult> {
    let token = token.ok_or_else(|| ActionResult::fail("Not authenticated."))?;

    let user = match deps.identity.get_user(token).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("Action auth: could not resolve user: {}", e);
            return Err(ActionResult::fail("Not authenticated."));
        }
    };

    match deps.profiles.is_admin(user.id).await {
        Ok(Some(true)) => Ok(user),
        Ok(_) => {
            tracing::warn!("Action auth: user {} is not admin", user.id);
            Err(ActionResult::fail(access_denied))
        }
        Err(e) => {
            tracing::warn!("Action auth: profile lookup failed for {}: {}", user.id, e);
            Err(ActionResult::fail(access_denied))
        }
    }
}

fn invalidate<T: ContentRecords + ?Sized>(deps: &ActionDeps<'_>, records: &T, slug: Option<&str>) {
    for path in records.revalidate_paths(slug) {
        deps.cache.revalidate(&path);
    }
}

/// Create a new content item. A fresh image upload is required: there is no
/// existing asset to fall back to.
pub async fn create_item<T: ContentRecords + ?Sized>(
    deps: &ActionDeps<'_>,
    records: &T,
    token: Option<&str>,
    draft: T::Draft,
    image: Option<ImageFile>,
) -> ActionResult {
    let messages = records.messages();
    if let Err(result) = authorize_admin(deps, token, messages.access_denied).await {
        return result;
    }

    if let Err(message) = draft.validate() {
        tracing::warn!("create {}: validation failed: {}", records.label(), message);
        return ActionResult::fail(message);
    }

    let image = match image {
        Some(image) => image,
        None => return ActionResult::fail(messages.image_required),
    };

    let image_url = match upload_image(deps.storage, records.bucket(), &image).await {
        Ok(url) => url,
        Err(e) => return ActionResult::fail(format!("{}: {}", messages.upload_failed, e)),
    };

    if let Err(e) = records.insert(&draft, &image_url).await {
        tracing::error!("create {}: insert failed: {}", records.label(), e);
        return ActionResult::fail(format!("{}: {}", messages.create_failed, e));
    }

    invalidate(deps, records, Some(draft.slug()));
    ActionResult::ok(messages.created)
}

/// Update an existing content item by id. A newly supplied file replaces the
/// stored asset URL (the old object is left in storage); without one, the
/// current row's `image_url` is re-read and written back.
pub async fn update_item<T: ContentRecords + ?Sized>(
    deps: &ActionDeps<'_>,
    records: &T,
    token: Option<&str>,
    id: Option<Uuid>,
    draft: T::Draft,
    image: Option<ImageFile>,
) -> ActionResult {
    let messages = records.messages();
    let id = match id {
        Some(id) => id,
        None => return ActionResult::fail(messages.id_missing),
    };

    if let Err(result) = authorize_admin(deps, token, messages.access_denied).await {
        return result;
    }

    if let Err(message) = draft.validate() {
        tracing::warn!("update {}: validation failed: {}", records.label(), message);
        return ActionResult::fail(message);
    }

    let final_image_url = if let Some(image) = image {
        match upload_image(deps.storage, records.bucket(), &image).await {
            Ok(url) => Some(url),
            Err(e) => return ActionResult::fail(format!("Failed to upload new image: {}", e)),
        }
    } else {
        match records.asset_ref(id).await {
            Ok(asset) => asset.image_url,
            Err(e) => {
                tracing::error!("update {}: error fetching existing image URL: {}", records.label(), e);
                None
            }
        }
    };

    if let Err(e) = records.update(id, &draft, final_image_url.as_deref()).await {
        tracing::error!("update {}: update failed: {}", records.label(), e);
        return ActionResult::fail(format!("{}: {}", messages.update_failed, e));
    }

    invalidate(deps, records, Some(draft.slug()));
    ActionResult::ok(messages.updated)
}

/// Delete a content item by id, attempting best-effort removal of its stored
/// asset first. A failed asset removal never blocks the row delete.
pub async fn delete_item<T: ContentRecords + ?Sized>(
    deps: &ActionDeps<'_>,
    records: &T,
    token: Option<&str>,
    id: Uuid,
) -> ActionResult {
    let messages = records.messages();
    if let Err(result) = authorize_admin(deps, token, messages.access_denied).await {
        return result;
    }

    let asset = match records.asset_ref(id).await {
        Ok(asset) => asset,
        Err(e) => {
            tracing::error!("delete {}: error fetching row for asset cleanup: {}", records.label(), e);
            AssetRef::default()
        }
    };

    if let Some(image_url) = &asset.image_url {
        delete_image(deps.storage, records.bucket(), image_url).await;
    }

    if let Err(e) = records.delete(id).await {
        tracing::error!("delete {}: delete failed: {}", records.label(), e);
        return ActionResult::fail(format!("{}: {}", messages.delete_failed, e));
    }

    invalidate(deps, records, asset.slug.as_deref());
    ActionResult::ok(messages.deleted)
}
