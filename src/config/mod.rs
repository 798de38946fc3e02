pub mod policy;

pub use policy::*;

use std::path::{Path, PathBuf};

/// Project-level config path: `<root>/.fixture-scrub/policy.yml`
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".fixture-scrub").join("policy.yml")
}
