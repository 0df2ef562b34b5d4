use std::sync::Arc;

use crate::rate_limit::RateLimiter;
use crate::services::identity::IdentityProvider;
use crate::services::mailer::Mailer;
use crate::services::store::ProfileStore;

/// Shared handles every handler works through. The traits keep handlers off
/// concrete HTTP clients, which is what the integration tests lean on.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub store: Arc<dyn ProfileStore>,
    /// `None` when the Resend variables are unset; the endpoints that need
    /// mail answer with a configuration error instead of panicking.
    pub mailer: Option<Arc<dyn Mailer>>,
    pub rate_limits: Arc<RateLimiter>,
    /// Frontend origin used to build the post-verification redirect.
    pub app_url: String,
}
