pub mod code_generator;
pub mod contact;
pub mod slug;

pub use code_generator::{generate_receipt_number, random_code};
pub use contact::{normalize_id_phone, validate_email};
pub use slug::{slug_candidate, slugify};
