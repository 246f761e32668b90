use async_trait::async_trait;
use log::{error, info};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tokio::fs;

use crate::utils::error::JudoError;

#[async_trait]
pub trait DataSender: Send + Sync {
    async fn send(&self, data: &str) -> Result<(), JudoError>;
    fn sender_type(&self) -> &str;
    fn destination(&self) -> &str;
}

pub struct ConsoleSender;

#[async_trait]
impl DataSender for ConsoleSender {
    async fn send(&self, data: &str) -> Result<(), JudoError> {
        println!("{}", data);
        Ok(())
    }

    fn sender_type(&self) -> &str {
        "console"
    }

    fn destination(&self) -> &str {
        "stdout"
    }
}

pub struct FileSender {
    file_path: String,
    append: bool,
}

impl FileSender {
    pub fn new<P: AsRef<Path>>(file_path: P, append: bool) -> Self {
        Self {
            file_path: file_path.as_ref().to_string_lossy().to_string(),
            append,
        }
    }
}

#[async_trait]
impl DataSender for FileSender {
    async fn send(&self, data: &str) -> Result<(), JudoError> {
        if let Some(parent) = Path::new(&self.file_path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        if self.append {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.file_path)
                .map_err(|e| {
                    error!("❌ Failed to open file {}: {}", self.file_path, e);
                    JudoError::IoError(format!("File open error: {}", e))
                })?;

            writeln!(file, "{}", data).map_err(|e| {
                error!("❌ Failed to write to file {}: {}", self.file_path, e);
                JudoError::IoError(format!("File write error: {}", e))
            })?;
        } else {
            fs::write(&self.file_path, format!("{}\n", data)).await.map_err(|e| {
                error!("❌ Failed to write to file {}: {}", self.file_path, e);
                JudoError::IoError(format!("File write error: {}", e))
            })?;
        }

        info!("📝 {} bytes written to {}", data.len(), self.file_path);
        Ok(())
    }

    fn sender_type(&self) -> &str {
        "file"
    }

    fn destination(&self) -> &str {
        &self.file_path
    }
}
