// Media storage abstraction for Cloudinary and in-process backends

pub mod cloudinary;
pub mod memory;

pub use cloudinary::CloudinaryBackend;
pub use memory::MemoryMediaStore;

use crate::error::AppResult;
use crate::models::UploadedMedia;

/// Remote host for report photos.
#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    /// Uploads one image in a single attempt. Empty input is an error.
    async fn upload(&self, data: &[u8], content_type: &str) -> AppResult<UploadedMedia>;

    /// Deletes a previously uploaded image by its public id.
    async fn delete(&self, public_id: &str) -> AppResult<()>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}
