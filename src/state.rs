use std::sync::Arc;

use crate::actions::ActionDeps;
use crate::auth::IdentityProvider;
use crate::cache::Revalidator;
use crate::config::AppConfig;
use crate::database::contact::ContactStore;
use crate::database::content::ContentRecords;
use crate::database::portfolio::{PortfolioDraft, PortfolioRecord};
use crate::database::profiles::ProfileStore;
use crate::database::templates::{TemplateDraft, TemplateRecord};
use crate::database::tutorials::{BlogPostDraft, BlogPostRecord};
use crate::database::HealthProbe;
use crate::storage::ObjectStorage;

pub type DynContent<D, R> = Arc<dyn ContentRecords<Draft = D, Record = R>>;

/// Everything the handlers need, built once in `main` (or from fakes in
/// tests) and cloned per request. No hidden globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub identity: Arc<dyn IdentityProvider>,
    pub profiles: Arc<dyn ProfileStore>,
    pub storage: Arc<dyn ObjectStorage>,
    pub cache: Arc<dyn Revalidator>,
    pub health: Arc<dyn HealthProbe>,
    pub contact: Arc<dyn ContactStore>,
    pub portfolio: DynContent<PortfolioDraft, PortfolioRecord>,
    pub templates: DynContent<TemplateDraft, TemplateRecord>,
    pub tutorials: DynContent<BlogPostDraft, BlogPostRecord>,
}

impl AppState {
    pub fn action_deps(&self) -> ActionDeps<'_> {
        ActionDeps {
            identity: self.identity.as_ref(),
            profiles: self.profiles.as_ref(),
            storage: self.storage.as_ref(),
            cache: self.cache.as_ref(),
        }
    }
}
