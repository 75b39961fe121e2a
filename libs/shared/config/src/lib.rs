use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub google_credentials_path: String,
    pub google_token_path: String,
    pub calendar_timezone: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            openai_api_key: env::var("OPENAI_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("OPENAI_API_KEY not set, NLP parsing will fail");
                    String::new()
                }),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            google_credentials_path: env::var("GOOGLE_CREDENTIALS_PATH")
                .unwrap_or_else(|_| "credentials.json".to_string()),
            google_token_path: env::var("GOOGLE_TOKEN_PATH")
                .unwrap_or_else(|_| "token.json".to_string()),
            calendar_timezone: env::var("CALENDAR_TIMEZONE")
                .unwrap_or_else(|_| "Asia/Kolkata".to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    pub fn is_parser_configured(&self) -> bool {
        !self.openai_api_key.is_empty()
    }

    pub fn is_calendar_configured(&self) -> bool {
        !self.google_credentials_path.is_empty() && !self.google_token_path.is_empty()
    }
}
