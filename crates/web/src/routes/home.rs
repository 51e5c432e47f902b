//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};

use seeklit_core::MetadataProvider;

use crate::middleware::{RequestContext, RequireUser};
use crate::state::AppState;

/// A provider choice in the search box.
pub struct ProviderOption {
    pub segment: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

impl ProviderOption {
    fn list(default: MetadataProvider) -> Vec<Self> {
        MetadataProvider::ALL
            .iter()
            .map(|&provider| Self {
                segment: provider.path_segment(),
                label: match provider {
                    MetadataProvider::Google => "Google Books",
                    MetadataProvider::OpenLibrary => "Open Library",
                    MetadataProvider::Hardcover => "Hardcover",
                    MetadataProvider::Readarr => "Readarr",
                },
                selected: provider == default,
            })
            .collect()
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub display_name: String,
    pub is_admin: bool,
    pub providers: Vec<ProviderOption>,
    pub version: String,
}

/// Display the home page with the search box.
pub async fn home(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ctx: RequestContext,
) -> impl IntoResponse {
    let (provider, version) = match state.seeklit().settings(ctx.origin()).await {
        Ok(settings) => (settings.metadata_provider, settings.version),
        Err(err) => {
            tracing::warn!(error = %err, "Failed to load server settings");
            (MetadataProvider::Google, String::new())
        }
    };

    HomeTemplate {
        display_name: user.display_name().to_string(),
        is_admin: user.role.is_admin(),
        providers: ProviderOption::list(provider),
        version,
    }
}
