use std::env;
use std::path::PathBuf;

/// Runtime configuration for the Palaver service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the two JSON document collections.
    pub data_dir: PathBuf,
    /// Root of the per-conversation upload tree.
    pub uploads_dir: PathBuf,
    /// Root of the per-user profile image tree.
    pub user_images_dir: PathBuf,
    /// Static assets served at the site root.
    pub public_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);
        Ok(Self {
            host,
            port,
            data_dir: env_path("PALAVER_DATA_DIR", "data"),
            uploads_dir: env_path("PALAVER_UPLOADS_DIR", "uploads"),
            user_images_dir: env_path("PALAVER_USER_IMAGES_DIR", "user_account_images"),
            public_dir: env_path("PALAVER_PUBLIC_DIR", "public"),
        })
    }

    pub fn users_file(&self) -> PathBuf {
        self.data_dir.join("users.json")
    }

    pub fn messages_file(&self) -> PathBuf {
        self.data_dir.join("messages.json")
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
