use aidlink_core::crypto::BankCipher;
use aidlink_core::types::DbId;
use aidlink_events::EmailConfig;
use aidlink_paymongo::PaymongoConfig;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub jwt: JwtConfig,
    /// Cipher for project bank details, built from `BANK_ENCRYPTION_KEY`.
    pub bank_cipher: BankCipher,
    pub paymongo: PaymongoConfig,
    /// Shared secret for webhook signatures. Webhooks are refused when unset.
    pub paymongo_webhook_secret: Option<String>,
    /// Where PayMongo sends donors after 3-D Secure or e-wallet authorization.
    pub payment_return_url: String,
    /// Frontend origin used to build links in notification emails.
    pub app_base_url: String,
    /// SMTP settings; email delivery is disabled when `None`.
    pub email: Option<EmailConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                                    |
    /// |---------------------------|--------------------------------------------|
    /// | `HOST`                    | `0.0.0.0`                                  |
    /// | `PORT`                    | `3000`                                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`                    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                                       |
    /// | `BANK_ENCRYPTION_KEY`     | required, 64 hex characters                |
    /// | `PAYMONGO_WEBHOOK_SECRET` | unset                                      |
    /// | `PAYMENT_RETURN_URL`      | `http://localhost:5173/donations/return`   |
    /// | `APP_BASE_URL`            | `http://localhost:5173`                    |
    ///
    /// JWT, PayMongo and SMTP variables are read by their own config types.
    ///
    /// # Panics
    ///
    /// Panics on any missing required variable or malformed value.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let bank_key = std::env::var("BANK_ENCRYPTION_KEY")
            .expect("BANK_ENCRYPTION_KEY must be set in the environment");
        let bank_cipher = BankCipher::from_hex_key(&bank_key)
            .unwrap_or_else(|e| panic!("BANK_ENCRYPTION_KEY is invalid: {e}"));

        let paymongo_webhook_secret = std::env::var("PAYMONGO_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        let payment_return_url = std::env::var("PAYMENT_RETURN_URL")
            .unwrap_or_else(|_| "http://localhost:5173/donations/return".into());

        let app_base_url = std::env::var("APP_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .trim_end_matches('/')
            .to_string();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            bank_cipher,
            paymongo: PaymongoConfig::from_env(),
            paymongo_webhook_secret,
            payment_return_url,
            app_base_url,
            email: EmailConfig::from_env(),
        }
    }

    /// Frontend link to a project page.
    pub fn project_link(&self, project_id: DbId) -> String {
        format!("{}/projects/{project_id}", self.app_base_url)
    }

    /// Return URL handed to PayMongo for a donation. The frontend landing
    /// page reads `donation_id` and re-syncs the donation status.
    pub fn donation_return_url(&self, fund_id: DbId) -> String {
        let sep = if self.payment_return_url.contains('?') { '&' } else { '?' };
        format!("{}{sep}donation_id={fund_id}", self.payment_return_url)
    }
}
