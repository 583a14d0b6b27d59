use std::env;

/// Default request body cap (5 MiB). Clients compress photos to about 1 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Cloudinary folder every report photo is stored under.
pub const DEFAULT_MEDIA_FOLDER: &str = "lost-found";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub cors_origin: Option<String>,
    pub max_upload_bytes: usize,
    pub cloudinary: Option<CloudinaryConfig>,
}

/// Cloudinary credentials, handed to the media backend at construction.
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .field("folder", &self.folder)
            .finish()
    }
}

impl CloudinaryConfig {
    pub fn from_env() -> Option<Self> {
        let cloud_name = non_empty_var("CLOUDINARY_CLOUD_NAME")?;
        let api_key = non_empty_var("CLOUDINARY_API_KEY")?;
        let api_secret = non_empty_var("CLOUDINARY_API_SECRET")?;

        Some(Self {
            cloud_name,
            api_key,
            api_secret,
            folder: DEFAULT_MEDIA_FOLDER.to_string(),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: None,
            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
            cors_origin: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cloudinary: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let server_port = env::var("PORT")
            .or_else(|_| env::var("SERVER_PORT"))
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        Config {
            database_url: non_empty_var("DATABASE_URL"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port,
            cors_origin: non_empty_var("CORS_ORIGIN"),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            cloudinary: CloudinaryConfig::from_env(),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
