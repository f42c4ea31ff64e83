use std::path::PathBuf;

use crate::usecase::review::ReviewDeletePolicy;

/// Marketplace service configuration loaded from environment variables.
#[derive(Debug)]
pub struct MarketplaceConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 5000). Env var: `MARKETPLACE_PORT`.
    pub port: u16,
    /// HMAC secret for session tokens.
    pub jwt_secret: String,
    /// Optional `Domain` attribute of the session cookie.
    pub cookie_domain: Option<String>,
    /// `Secure` attribute of the session cookie (default true).
    pub cookie_secure: bool,
    /// bcrypt work factor (default 10).
    pub bcrypt_cost: u32,
    /// Directory for staged multipart files (default: system temp dir).
    pub upload_dir: PathBuf,
    /// Request body ceiling for multipart routes (default 50 MiB).
    pub max_upload_bytes: usize,
    pub stripe_secret_key: String,
    /// Absent means the webhook endpoint rejects every notification.
    pub stripe_webhook_secret: Option<String>,
    pub stripe_api_base: String,
    /// Frontend page the checkout returns to after payment.
    pub frontend_success_url: String,
    /// Externally reachable base URL of this service, used for the cancel URL.
    pub public_base_url: String,
    pub cloudinary_cloud_name: String,
    pub cloudinary_api_key: String,
    pub cloudinary_api_secret: String,
    pub cloudinary_api_base: String,
    /// Who may delete a review: `any` (default) or `owner`.
    pub review_delete_policy: ReviewDeletePolicy,
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl MarketplaceConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            port: parsed_or("MARKETPLACE_PORT", 5000),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            cookie_domain: std::env::var("COOKIE_DOMAIN").ok().filter(|d| !d.is_empty()),
            cookie_secure: parsed_or("COOKIE_SECURE", true),
            bcrypt_cost: parsed_or("BCRYPT_COST", 10),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
            max_upload_bytes: parsed_or("MAX_UPLOAD_BYTES", 50 * 1024 * 1024),
            stripe_secret_key: std::env::var("STRIPE_SECRET_KEY").expect("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET").ok(),
            stripe_api_base: var_or("STRIPE_API_BASE", "https://api.stripe.com"),
            frontend_success_url: std::env::var("FRONTEND_SUCCESS_URL")
                .expect("FRONTEND_SUCCESS_URL"),
            public_base_url: std::env::var("PUBLIC_BASE_URL").expect("PUBLIC_BASE_URL"),
            cloudinary_cloud_name: std::env::var("CLOUDINARY_CLOUD_NAME")
                .expect("CLOUDINARY_CLOUD_NAME"),
            cloudinary_api_key: std::env::var("CLOUDINARY_API_KEY").expect("CLOUDINARY_API_KEY"),
            cloudinary_api_secret: std::env::var("CLOUDINARY_API_SECRET")
                .expect("CLOUDINARY_API_SECRET"),
            cloudinary_api_base: var_or("CLOUDINARY_API_BASE", "https://api.cloudinary.com"),
            review_delete_policy: std::env::var("REVIEW_DELETE_POLICY")
                .map(|v| {
                    v.parse()
                        .expect("REVIEW_DELETE_POLICY must be `any` or `owner`")
                })
                .unwrap_or_default(),
        }
    }
}
