use std::path::Path;

use storefront_api::{Product, ProductDraft};

use crate::error::Result;
use crate::http::{ApiClient, ApiRequest, FormPart};

pub const PRODUCTS_PATH: &str = "/api/products";
pub const PRODUCT_PATH: &str = "/api/product";

/// Image file attached to a product create/update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reads an image from disk, guessing its type from the extension
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(file_name, content_type_for(path), bytes))
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Product endpoints. Reads are public; mutations need an admin session,
/// which the backend checks through the bearer token.
#[derive(Clone)]
pub struct ProductService {
    client: ApiClient,
}

impl ProductService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Product>> {
        let request = ApiRequest::get(PRODUCTS_PATH).failure_message("Failed to fetch products");
        self.client.request(request).await
    }

    pub async fn get(&self, id: i64) -> Result<Product> {
        let request = ApiRequest::get(format!("{PRODUCTS_PATH}/{id}"))
            .failure_message("Failed to fetch product");
        self.client.request(request).await
    }

    pub async fn create(&self, draft: &ProductDraft) -> Result<Product> {
        let request = ApiRequest::post(PRODUCT_PATH)
            .json(draft)?
            .failure_message("Failed to add product");
        self.client.request(request).await
    }

    pub async fn create_with_image(
        &self,
        draft: &ProductDraft,
        image: ImageUpload,
    ) -> Result<Product> {
        let request = ApiRequest::post(format!("{PRODUCT_PATH}/with-image"))
            .multipart(product_parts(draft, image)?)
            .failure_message("Failed to add product");
        self.client.request(request).await
    }

    pub async fn update(&self, id: i64, draft: &ProductDraft) -> Result<Product> {
        let request = ApiRequest::put(format!("{PRODUCTS_PATH}/{id}"))
            .json(draft)?
            .failure_message("Failed to update product");
        self.client.request(request).await
    }

    pub async fn update_with_image(
        &self,
        id: i64,
        draft: &ProductDraft,
        image: ImageUpload,
    ) -> Result<Product> {
        let request = ApiRequest::put(format!("{PRODUCTS_PATH}/{id}/with-image"))
            .multipart(product_parts(draft, image)?)
            .failure_message("Failed to update product");
        self.client.request(request).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let request = ApiRequest::delete(format!("{PRODUCTS_PATH}/{id}"))
            .failure_message("Failed to delete product");
        self.client.request(request).await
    }

    /// Where the product image is served; fetched directly, not through the envelope
    pub fn image_url(&self, id: i64) -> String {
        self.client.url(&format!("{PRODUCTS_PATH}/{id}/image"))
    }
}

/// `product` as a JSON part, `image` as a file part
fn product_parts(draft: &ProductDraft, image: ImageUpload) -> Result<Vec<FormPart>> {
    Ok(vec![
        FormPart::Text {
            name: "product".to_string(),
            value: serde_json::to_string(draft)?,
            content_type: Some("application/json".to_string()),
        },
        FormPart::File {
            name: "image".to_string(),
            file_name: image.file_name,
            content_type: image.content_type,
            bytes: image.bytes,
        },
    ])
}
