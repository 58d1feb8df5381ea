pub mod claims;
pub mod config;
pub mod decoder;
pub mod error;
pub mod roles;
pub mod store;

pub use claims::Identity;
pub use config::DecoderConfig;
pub use decoder::TokenDecoder;
pub use error::{DecodeError, DecodeResult};
pub use roles::{Role, ROLE_EDITOR, ROLE_HIERARCHY, ROLE_SUPERUSER, ROLE_VIEWER};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_STORAGE_KEY};
