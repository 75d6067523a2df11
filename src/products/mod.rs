//! Product catalog access and list helpers.

pub mod catalog;
pub mod service;

pub use catalog::{SortOrder, categories, filter_by_category, sort_by_price};
pub use service::{ImageUpload, ProductService};
