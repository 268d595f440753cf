//! Request-scoped authentication result.
//!
//! - `AuthCtx`: filter が request extensions に入れる (匿名 or Identity)
//! - `CurrentIdentity`: handler 用 extractor。gate を通った route でのみ使う

mod core;
mod types;

pub use core::CurrentIdentity;
pub use types::AuthCtx;
