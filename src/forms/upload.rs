use actix_multipart::form::MultipartForm;
use actix_multipart::form::bytes::Bytes;

use crate::api::UploadFile;
use crate::forms::FormError;

#[derive(MultipartForm)]
pub struct UploadImageForm {
    #[multipart(limit = "10MB")]
    pub image: Bytes,
}

impl UploadImageForm {
    /// The file to forward; only non-empty images are accepted.
    pub fn into_upload(self) -> Result<UploadFile, FormError> {
        let image = self.image;
        let content_type = image
            .content_type
            .map(|mime| mime.to_string())
            .filter(|mime| mime.starts_with("image/"))
            .ok_or_else(|| FormError::InvalidData("Please choose an image file.".to_string()))?;
        if image.data.is_empty() {
            return Err(FormError::InvalidData("The chosen file is empty.".to_string()));
        }

        Ok(UploadFile {
            file_name: image.file_name.unwrap_or_else(|| "image".to_string()),
            content_type,
            bytes: image.data.to_vec(),
        })
    }
}
