use std::path::PathBuf;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub upload_folder: PathBuf,
    pub full_paper_folder: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://ponencia.db".to_string());

        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let upload_folder = base_dir.join(
            std::env::var("UPLOAD_FOLDER").unwrap_or_else(|_| "uploads/abstracts".to_string()),
        );
        let full_paper_folder = base_dir.join(
            std::env::var("FULL_PAPER_FOLDER")
                .unwrap_or_else(|_| "uploads/full_papers".to_string()),
        );

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .unwrap_or(5000);

        Ok(Self {
            database_url,
            upload_folder,
            full_paper_folder,
            host,
            port,
        })
    }
}
