//! Shared data model for Rolodex.
//!
//! The entity graph is deliberately small: an [`Identity`] owns exactly one
//! [`ProfileDetails`] record and one or more [`Grant`]s. The closed value
//! sets ([`Role`], [`Gender`]) implement [`Choice`], which gives every member
//! a stable storage key and an external label.

pub mod choice;
pub mod error;
pub mod gender;
pub mod identity;
pub mod role;
pub mod token;

pub use choice::Choice;
pub use error::ModelError;
pub use gender::Gender;
pub use identity::{Credential, Grant, Identity, ProfileDetails};
pub use role::Role;
pub use token::AccessToken;
