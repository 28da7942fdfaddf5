//! In-memory fakes for the collaborator traits, used across the test suite.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{AuthError, AuthUser, IdentityProvider, SessionTokens};
use crate::cache::Revalidator;
use crate::config::{AppConfig, DatabaseConfig, Environment, PlatformConfig};
use crate::database::contact::{ContactStore, NewContactMessage};
use crate::database::content::{ActionMessages, AssetRef, ContentRecords, ListFilter};
use crate::database::portfolio::{PortfolioDraft, PortfolioRecord};
use crate::database::profiles::ProfileStore;
use crate::database::templates::{TemplateDraft, TemplateRecord};
use crate::database::tutorials::{BlogPostDraft, BlogPostRecord};
use crate::database::{HealthProbe, PersistError};
use crate::state::AppState;
use crate::storage::{ImageFile, ObjectStorage, StorageError};

// ---------------------------------------------------------------------------
// Identity provider

#[derive(Default)]
pub struct FakeIdentity {
    tokens: HashMap<String, AuthUser>,
    passwords: HashMap<(String, String), String>,
    codes: HashMap<String, String>,
}

impl FakeIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: &str, user_id: Uuid) -> Self {
        self.tokens.insert(token.to_string(), AuthUser { id: user_id, email: None });
        self
    }

    pub fn with_password(mut self, email: &str, password: &str, token: &str) -> Self {
        self.passwords
            .insert((email.to_string(), password.to_string()), token.to_string());
        self
    }

    pub fn with_code(mut self, code: &str, token: &str) -> Self {
        self.codes.insert(code.to_string(), token.to_string());
        self
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        self.tokens.get(access_token).cloned().ok_or(AuthError::NotAuthenticated)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<SessionTokens, AuthError> {
        let token = self
            .passwords
            .get(&(email.to_string(), password.to_string()))
            .ok_or_else(|| AuthError::Provider("Invalid login credentials".into()))?;
        Ok(SessionTokens {
            access_token: token.clone(),
            refresh_token: None,
            expires_in: Some(3600),
        })
    }

    async fn exchange_code_for_session(&self, code: &str) -> Result<SessionTokens, AuthError> {
        let token = self
            .codes
            .get(code)
            .ok_or_else(|| AuthError::Provider("invalid flow state".into()))?;
        Ok(SessionTokens {
            access_token: token.clone(),
            refresh_token: None,
            expires_in: Some(3600),
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Profiles

#[derive(Default)]
pub struct FakeProfiles {
    admins: HashMap<Uuid, bool>,
    fail: bool,
}

impl FakeProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_admin(mut self, user_id: Uuid) -> Self {
        self.admins.insert(user_id, true);
        self
    }

    pub fn with_member(mut self, user_id: Uuid) -> Self {
        self.admins.insert(user_id, false);
        self
    }

    /// Every lookup errors; exercises fail-closed paths.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl ProfileStore for FakeProfiles {
    async fn is_admin(&self, user_id: Uuid) -> Result<Option<bool>, PersistError> {
        if self.fail {
            return Err(PersistError::NotFound);
        }
        Ok(self.admins.get(&user_id).copied())
    }
}

// ---------------------------------------------------------------------------
// Object storage

#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<(String, String), Bytes>>,
    fail_uploads: AtomicBool,
    fail_removes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .lock()
            .unwrap()
            .contains_key(&(bucket.to_string(), key.to_string()))
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        _content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::Provider("upload rejected by storage".into()));
        }
        let mut objects = self.objects.lock().unwrap();
        let slot = (bucket.to_string(), key.to_string());
        if objects.contains_key(&slot) {
            return Err(StorageError::Provider("The resource already exists".into()));
        }
        objects.insert(slot, bytes);
        Ok(())
    }

    async fn remove(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(StorageError::Provider("remove rejected by storage".into()));
        }
        let mut objects = self.objects.lock().unwrap();
        objects
            .remove(&(bucket.to_string(), key.to_string()))
            .map(|_| ())
            .ok_or_else(|| StorageError::Provider("Object not found".into()))
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("https://storage.test/object/public/{}/{}", bucket, key)
    }
}

// ---------------------------------------------------------------------------
// Cache + contact + health

#[derive(Default)]
pub struct RecordingRevalidator {
    paths: Mutex<Vec<String>>,
}

impl RecordingRevalidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl Revalidator for RecordingRevalidator {
    fn revalidate(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }
}

#[derive(Default)]
pub struct MemoryContact {
    messages: Mutex<Vec<NewContactMessage>>,
    fail: AtomicBool,
}

impl MemoryContact {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ContactStore for MemoryContact {
    async fn insert(&self, message: &NewContactMessage) -> Result<(), PersistError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PersistError::NotFound);
        }
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub struct AlwaysHealthy;

#[async_trait]
impl HealthProbe for AlwaysHealthy {
    async fn ping(&self) -> Result<(), PersistError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Content stores

fn matches_search(search: &Option<String>, haystacks: &[&str], tags: &[String]) -> bool {
    match search {
        None => true,
        Some(q) => {
            let needle = q.to_lowercase();
            haystacks.iter().any(|h| h.to_lowercase().contains(&needle))
                || tags.iter().any(|t| t == q)
        }
    }
}

#[derive(Default)]
pub struct MemoryPortfolio {
    rows: Mutex<HashMap<Uuid, PortfolioRecord>>,
}

impl MemoryPortfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, record: PortfolioRecord) -> Uuid {
        let id = record.id;
        self.rows.lock().unwrap().insert(id, record);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<PortfolioRecord> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ContentRecords for MemoryPortfolio {
    type Draft = PortfolioDraft;
    type Record = PortfolioRecord;

    fn bucket(&self) -> &'static str {
        "portimages"
    }

    fn label(&self) -> &'static str {
        "Portfolio item"
    }

    fn messages(&self) -> &'static ActionMessages {
        &crate::database::portfolio::MESSAGES
    }

    fn revalidate_paths(&self, slug: Option<&str>) -> Vec<String> {
        let mut paths = vec!["/portfolio".to_string()];
        if let Some(slug) = slug {
            paths.push(format!("/portfolio/{}", slug));
        }
        paths
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<PortfolioRecord>, PersistError> {
        let rows = self.rows.lock().unwrap();
        let mut items: Vec<_> = rows
            .values()
            .filter(|r| !filter.published_only || r.is_published)
            .filter(|r| matches_search(&filter.search, &[&r.title, &r.description], &r.technologies))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PortfolioRecord>, PersistError> {
        Ok(self.rows.lock().unwrap().values().find(|r| r.slug == slug).cloned())
    }

    async fn related(&self, exclude: Uuid, limit: i64) -> Result<Vec<PortfolioRecord>, PersistError> {
        let rows = self.rows.lock().unwrap();
        let mut items: Vec<_> = rows.values().filter(|r| r.id != exclude).cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(limit as usize);
        Ok(items)
    }

    async fn count(&self) -> Result<i64, PersistError> {
        Ok(self.rows.lock().unwrap().len() as i64)
    }

    async fn insert(&self, draft: &PortfolioDraft, image_url: &str) -> Result<(), PersistError> {
        let record = PortfolioRecord {
            id: Uuid::new_v4(),
            title: draft.title.clone(),
            slug: draft.slug.clone(),
            description: draft.description.clone(),
            image_url: Some(image_url.to_string()),
            live_url: draft.live_url.clone(),
            github_url: draft.github_url.clone(),
            technologies: draft.technologies.clone(),
            is_published: draft.is_published,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().insert(record.id, record);
        Ok(())
    }

    async fn update(&self, id: Uuid, draft: &PortfolioDraft, image_url: Option<&str>) -> Result<(), PersistError> {
        if let Some(record) = self.rows.lock().unwrap().get_mut(&id) {
            record.title = draft.title.clone();
            record.slug = draft.slug.clone();
            record.description = draft.description.clone();
            record.image_url = image_url.map(String::from);
            record.live_url = draft.live_url.clone();
            record.github_url = draft.github_url.clone();
            record.technologies = draft.technologies.clone();
            record.is_published = draft.is_published;
        }
        Ok(())
    }

    async fn asset_ref(&self, id: Uuid) -> Result<AssetRef, PersistError> {
        let rows = self.rows.lock().unwrap();
        let record = rows.get(&id).ok_or(PersistError::NotFound)?;
        Ok(AssetRef {
            image_url: record.image_url.clone(),
            slug: Some(record.slug.clone()),
        })
    }

    async fn delete(&self, id: Uuid) -> Result<(), PersistError> {
        self.rows.lock().unwrap().remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTemplates {
    rows: Mutex<HashMap<Uuid, TemplateRecord>>,
}

impl MemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, record: TemplateRecord) -> Uuid {
        let id = record.id;
        self.rows.lock().unwrap().insert(id, record);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<TemplateRecord> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ContentRecords for MemoryTemplates {
    type Draft = TemplateDraft;
    type Record = TemplateRecord;

    fn bucket(&self) -> &'static str {
        "images"
    }

    fn label(&self) -> &'static str {
        "Template"
    }

    fn messages(&self) -> &'static ActionMessages {
        &crate::database::templates::MESSAGES
    }

    fn revalidate_paths(&self, slug: Option<&str>) -> Vec<String> {
        let mut paths = vec!["/templates".to_string()];
        if let Some(slug) = slug {
            paths.push(format!("/templates/{}", slug));
        }
        paths
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<TemplateRecord>, PersistError> {
        let rows = self.rows.lock().unwrap();
        let mut items: Vec<_> = rows
            .values()
            .filter(|r| !filter.published_only || r.is_published)
            .filter(|r| matches_search(&filter.search, &[&r.name, &r.description], &r.tags))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<TemplateRecord>, PersistError> {
        Ok(self.rows.lock().unwrap().values().find(|r| r.slug == slug).cloned())
    }

    async fn count(&self) -> Result<i64, PersistError> {
        Ok(self.rows.lock().unwrap().len() as i64)
    }

    async fn insert(&self, draft: &TemplateDraft, image_url: &str) -> Result<(), PersistError> {
        let record = TemplateRecord {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            slug: draft.slug.clone(),
            description: draft.description.clone(),
            image_url: Some(image_url.to_string()),
            live_demo_url: draft.live_demo_url.clone(),
            download_url: draft.download_url.clone(),
            gumroad_url: draft.gumroad_url.clone(),
            lynkid_url: draft.lynkid_url.clone(),
            payhip_url: draft.payhip_url.clone(),
            tags: draft.tags.clone(),
            price: draft.price,
            is_free: draft.is_free,
            is_published: draft.is_published,
            kind: draft.kind.clone(),
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().insert(record.id, record);
        Ok(())
    }

    async fn update(&self, id: Uuid, draft: &TemplateDraft, image_url: Option<&str>) -> Result<(), PersistError> {
        if let Some(record) = self.rows.lock().unwrap().get_mut(&id) {
            record.name = draft.name.clone();
            record.slug = draft.slug.clone();
            record.description = draft.description.clone();
            record.image_url = image_url.map(String::from);
            record.live_demo_url = draft.live_demo_url.clone();
            record.download_url = draft.download_url.clone();
            record.gumroad_url = draft.gumroad_url.clone();
            record.lynkid_url = draft.lynkid_url.clone();
            record.payhip_url = draft.payhip_url.clone();
            record.tags = draft.tags.clone();
            record.price = draft.price;
            record.is_free = draft.is_free;
            record.is_published = draft.is_published;
            record.kind = draft.kind.clone();
        }
        Ok(())
    }

    async fn asset_ref(&self, id: Uuid) -> Result<AssetRef, PersistError> {
        let rows = self.rows.lock().unwrap();
        let record = rows.get(&id).ok_or(PersistError::NotFound)?;
        Ok(AssetRef {
            image_url: record.image_url.clone(),
            slug: Some(record.slug.clone()),
        })
    }

    async fn delete(&self, id: Uuid) -> Result<(), PersistError> {
        self.rows.lock().unwrap().remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTutorials {
    rows: Mutex<HashMap<Uuid, BlogPostRecord>>,
}

impl MemoryTutorials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, record: BlogPostRecord) -> Uuid {
        let id = record.id;
        self.rows.lock().unwrap().insert(id, record);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<BlogPostRecord> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ContentRecords for MemoryTutorials {
    type Draft = BlogPostDraft;
    type Record = BlogPostRecord;

    fn bucket(&self) -> &'static str {
        "blogimages"
    }

    fn label(&self) -> &'static str {
        "Post"
    }

    fn messages(&self) -> &'static ActionMessages {
        &crate::database::tutorials::MESSAGES
    }

    fn revalidate_paths(&self, slug: Option<&str>) -> Vec<String> {
        let mut paths = vec!["/tutorials".to_string()];
        if let Some(slug) = slug {
            paths.push(format!("/tutorials/{}", slug));
        }
        paths
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<BlogPostRecord>, PersistError> {
        let rows = self.rows.lock().unwrap();
        let mut items: Vec<_> = rows
            .values()
            .filter(|r| !filter.published_only || r.is_published)
            .filter(|r| matches_search(&filter.search, &[&r.title], &[]))
            .filter(|r| filter.tags.iter().all(|t| r.tags.contains(t)))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<BlogPostRecord>, PersistError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|r| r.slug == slug && r.is_published)
            .cloned())
    }

    async fn count(&self) -> Result<i64, PersistError> {
        Ok(self.rows.lock().unwrap().len() as i64)
    }

    async fn insert(&self, draft: &BlogPostDraft, image_url: &str) -> Result<(), PersistError> {
        let now = Utc::now();
        let record = BlogPostRecord {
            id: Uuid::new_v4(),
            title: draft.title.clone(),
            slug: draft.slug.clone(),
            content: draft.content.clone(),
            excerpt: draft.excerpt.clone(),
            image_url: Some(image_url.to_string()),
            author: draft.author.clone(),
            tags: draft.tags.clone(),
            is_published: draft.is_published,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().insert(record.id, record);
        Ok(())
    }

    async fn update(&self, id: Uuid, draft: &BlogPostDraft, image_url: Option<&str>) -> Result<(), PersistError> {
        if let Some(record) = self.rows.lock().unwrap().get_mut(&id) {
            record.title = draft.title.clone();
            record.slug = draft.slug.clone();
            record.content = draft.content.clone();
            record.excerpt = draft.excerpt.clone();
            record.image_url = image_url.map(String::from);
            record.author = draft.author.clone();
            record.tags = draft.tags.clone();
            record.is_published = draft.is_published;
            record.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn asset_ref(&self, id: Uuid) -> Result<AssetRef, PersistError> {
        let rows = self.rows.lock().unwrap();
        let record = rows.get(&id).ok_or(PersistError::NotFound)?;
        Ok(AssetRef {
            image_url: record.image_url.clone(),
            slug: Some(record.slug.clone()),
        })
    }

    async fn delete(&self, id: Uuid) -> Result<(), PersistError> {
        self.rows.lock().unwrap().remove(&id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures and state wiring

pub fn test_config() -> AppConfig {
    AppConfig {
        environment: Environment::Development,
        database: DatabaseConfig {
            url: "postgres://localhost/folio_test".into(),
            max_connections: 2,
            connect_timeout_secs: 5,
        },
        platform: PlatformConfig {
            url: "https://platform.test".into(),
            anon_key: "anon".into(),
            service_role_key: "service".into(),
        },
        site_url: "http://site.test".into(),
        port: 0,
    }
}

pub fn portfolio_draft() -> PortfolioDraft {
    PortfolioDraft {
        title: "X".into(),
        slug: "x".into(),
        description: "d".into(),
        live_url: None,
        github_url: None,
        technologies: vec!["Go".into()],
        is_published: true,
    }
}

pub fn png_file() -> ImageFile {
    ImageFile {
        filename: "file.png".into(),
        content_type: Some("image/png".into()),
        bytes: Bytes::from_static(b"\x89PNG\r\n\x1a\nfakedata"),
    }
}

/// Fully faked application wiring, with handles kept on every fake for
/// post-request inspection.
pub struct TestWorld {
    pub state: AppState,
    pub storage: Arc<MemoryStorage>,
    pub cache: Arc<RecordingRevalidator>,
    pub contact: Arc<MemoryContact>,
    pub portfolio: Arc<MemoryPortfolio>,
    pub templates: Arc<MemoryTemplates>,
    pub tutorials: Arc<MemoryTutorials>,
}

pub fn test_world(identity: FakeIdentity, profiles: FakeProfiles) -> TestWorld {
    let storage = Arc::new(MemoryStorage::new());
    let cache = Arc::new(RecordingRevalidator::new());
    let contact = Arc::new(MemoryContact::new());
    let portfolio = Arc::new(MemoryPortfolio::new());
    let templates = Arc::new(MemoryTemplates::new());
    let tutorials = Arc::new(MemoryTutorials::new());

    let state = AppState {
        config: Arc::new(test_config()),
        identity: Arc::new(identity),
        profiles: Arc::new(profiles),
        storage: storage.clone(),
        cache: cache.clone(),
        health: Arc::new(AlwaysHealthy),
        contact: contact.clone(),
        portfolio: portfolio.clone(),
        templates: templates.clone(),
        tutorials: tutorials.clone(),
    };

    TestWorld {
        state,
        storage,
        cache,
        contact,
        portfolio,
        templates,
        tutorials,
    }
}
