//! Tiered configuration.
//!
//! Tiers, lowest priority first, merged field by field:
//! 1. **Defaults** built into the binary
//! 2. **Project** `$CWD/taskflow/config.yaml`
//! 3. **User** `~/.taskflow/config.yaml`
//! 4. **Environment** variables
//!
//! ## Environment Variables
//! - `TASKFLOW_CONFIG_PATH` - Explicit config file (replaces project and user tiers)
//! - `TASKFLOW_PROJECT_DIR` - Project config dir (default: `./taskflow`)
//! - `TASKFLOW_USER_DIR` - User config dir (default: `~/.taskflow`)
//! - `TASKFLOW_API_URL` - Gateway base URL
//! - `TASKFLOW_SESSION_PATH` - Session file
//! - `TASKFLOW_PROBE_DELAY_MS` - Readiness probe retry delay

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::deep_merge;
pub use types::*;
