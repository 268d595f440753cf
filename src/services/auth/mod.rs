pub mod claims;
pub mod cookie;
pub mod factory;
pub mod identity;
pub mod jwt;
pub mod password;
pub mod token_service;

pub use cookie::CookiePolicy;
pub use factory::{build_cookie_policy, build_token_service};
pub use identity::{Capability, Identity, IdentityLookup, Role};
pub use jwt::{TokenCodec, TokenError};
pub use token_service::TokenService;
