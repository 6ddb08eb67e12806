//! Two-tier settings: a global document that always exists and a project
//! document that exists while a project is open. Reads see the merge of
//! both; writes go to exactly one of them.

pub mod document;
pub mod error;
pub mod patch;
pub mod persistence;
pub mod schema;
pub mod service;
pub mod store;

pub use document::SettingsDocument;
pub use error::{SettingsError, SettingsResult};
pub use patch::SettingsPatch;
pub use schema::{SettingKey, SettingValue};
pub use service::SettingsService;
pub use store::{SettingsScope, SettingsStore};
