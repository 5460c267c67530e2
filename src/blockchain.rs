// Thin re-export module: implementation is in `blockchain/core.rs` so that
// block shapes, validation, chain management and stake state stay separate.

pub mod core;
pub use self::core::*;
