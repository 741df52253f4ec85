pub mod client;
pub mod error;
pub mod types;

pub use client::{HttpStore, DEFAULT_API_URL};
pub use error::ApiError;
pub use types::{ApplicationRecord, CreateSessionRequest, NotesRequest, SessionRecord};
