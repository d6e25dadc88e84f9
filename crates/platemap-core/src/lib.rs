pub mod app_config;
pub mod config;
pub mod error;
pub mod notice;
pub mod position;
pub mod profile;
pub mod session;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use notice::{LookupKind, Notice};
pub use position::{Position, Suggestion};
pub use profile::{ImageUpload, LocationRef, LocationUpdate, ProfileDraft, RestaurantProfile};
pub use session::SessionContext;
