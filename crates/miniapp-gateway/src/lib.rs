//! Telegram Mini App gateway for the Leadteh CRM.
//!
//! Serves two stateless endpoints to the registration Mini App:
//! - `GET /api/contact` prefills the form from the CRM contact list
//! - `POST /api/submit` validates a registration, optionally checks the
//!   Telegram initData signature, and forwards it to a Leadteh inner webhook

pub mod api;
pub mod config;
pub mod contact;
pub mod error;
pub mod init_data;
pub mod registration;

pub use config::{Config, Credentials};
pub use contact::{ContactLookup, NormalizedContact};
pub use error::ApiError;
pub use init_data::{verify_init_data, InitData, InitDataError};
pub use registration::{Registration, RegistrationRequest, ValidationError};
