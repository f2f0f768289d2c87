use std::env;

/// Environment configuration
/// Loads and validates environment variables
pub struct Config {
    pub database_url: String,
    pub auth: AuthConfig,
    pub mail: Option<MailConfig>,
}

/// Token signing settings, constructed once at startup and handed by value to
/// the services that need them. Nothing reads the environment after this
/// point.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub access_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_secret: String,
    pub refresh_ttl_secs: i64,
}

/// Outbound mail API settings. Absent in development; verification codes are
/// logged instead of delivered.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set".to_string())?;

        let access_secret = env::var("JWT_ACCESS_SECRET")
            .map_err(|_| "JWT_ACCESS_SECRET must be set".to_string())?;

        let refresh_secret = env::var("JWT_REFRESH_SECRET")
            .map_err(|_| "JWT_REFRESH_SECRET must be set".to_string())?;

        if access_secret == refresh_secret {
            return Err("JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must differ".to_string());
        }

        let access_ttl_secs = parse_ttl("JWT_ACCESS_TTL_SECS", 900)?;
        let refresh_ttl_secs = parse_ttl("JWT_REFRESH_TTL_SECS", 604_800)?;

        let mail = match env::var("MAIL_API_URL") {
            Ok(api_url) => Some(MailConfig {
                api_url,
                api_key: env::var("MAIL_API_KEY")
                    .map_err(|_| "MAIL_API_KEY must be set when MAIL_API_URL is".to_string())?,
                from: env::var("MAIL_FROM")
                    .unwrap_or_else(|_| "odin.noreply@example.com".to_string()),
            }),
            Err(_) => None,
        };

        Ok(Self {
            database_url,
            auth: AuthConfig {
                access_secret,
                access_ttl_secs,
                refresh_secret,
                refresh_ttl_secs,
            },
            mail,
        })
    }
}

fn parse_ttl(name: &str, default: i64) -> Result<i64, String> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<i64>()
            .map_err(|_| format!("{} must be an integer number of seconds", name)),
        Err(_) => Ok(default),
    }
}
