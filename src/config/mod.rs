//! Configuration for bound commands and the console host.
//!
//! # Example
//!
//! ```no_run
//! use cmdbind::config::{CommandMetadata, HostSettings};
//!
//! // Field metadata kept next to the binary
//! let metadata = CommandMetadata::from_toml_file("config/greet.toml").unwrap();
//! let name = metadata.field("name").unwrap();
//! println!("primary alias: {:?}", name.primary_alias());
//!
//! // Host-level settings from the environment
//! let settings = HostSettings::from_env(None);
//! println!("log filter: {}", settings.log_filter);
//! ```

pub mod environment;
pub mod metadata;

// Re-export main types for convenience
pub use self::environment::HostSettings;
pub use self::metadata::CommandMetadata;
