// =============================================================================
// Entity Module
// =============================================================================
//
// Entity resolution for ticker-filed articles:
// - Profile DB (names, aliases, keywords, exclusions, sector indicators)
// - Validator with hard vetoes and a positive-evidence ladder

pub mod profile;
pub mod validator;

pub use profile::EntityDb;
pub use validator::{EntityValidator, ValidationReason};
