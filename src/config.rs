use anyhow::Context;

/// Environment-backed settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    /// Mail stays optional so the service can boot without a Resend account;
    /// the endpoints that need it answer with a configuration error.
    pub resend_api_key: Option<String>,
    pub resend_from_email: Option<String>,
    pub app_url: String,
    pub allowed_origins: String,
    pub port: u16,
}

fn required(name: &str) -> anyhow::Result<String> {
    let value = std::env::var(name).with_context(|| format!("{} must be set", name))?;
    Ok(value.trim().to_string())
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            supabase_url: required("SUPABASE_URL")?,
            supabase_anon_key: required("SUPABASE_ANON_KEY")?,
            supabase_service_role_key: required("SUPABASE_SERVICE_ROLE_KEY")?,
            resend_api_key: optional("RESEND_API_KEY"),
            resend_from_email: optional("RESEND_FROM_EMAIL"),
            app_url: optional("APP_URL").unwrap_or_else(|| "http://localhost:3000".to_string()),
            allowed_origins: optional("ALLOWED_ORIGINS")
                .unwrap_or_else(|| "http://localhost:3000,http://127.0.0.1:3000".to_string()),
            port: optional("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("PORT must be a number")?,
        })
    }
}
