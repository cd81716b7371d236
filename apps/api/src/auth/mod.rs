// Authorization for report downloads. A sharing token or a session grants
// access; `resolver` decides which one applies.

pub mod resolver;
pub mod session;
pub mod token;

pub use session::{IdentityProviderClient, SessionResolver};
pub use token::TokenSigner;
