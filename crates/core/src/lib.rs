pub mod config;
pub mod failure;
pub mod record;

pub use config::{parse_languages, EngineKind, RotationMode};
pub use failure::{FailureKind, RunFailure};
pub use record::{NameplateRecord, PREFERRED_COLUMNS};
