/// File name of a definition; one per directory.
pub const DEFINITION_FILE_NAME: &str = "config.toml";

/// Directory under the run root holding repository working trees.
pub const REPOSITORIES_DIR_NAME: &str = "repositories";

/// Directory under the run root receiving collected artifacts.
pub const ARTIFACTS_DIR_NAME: &str = "artifacts";

/// Directory under the run root reserved for installed toolchains.
pub const TOOLCHAINS_DIR_NAME: &str = "toolchains";

/// Top-level directories never searched for definitions.
pub const RESERVED_DIRS: [&str; 3] = [TOOLCHAINS_DIR_NAME, ARTIFACTS_DIR_NAME, REPOSITORIES_DIR_NAME];

/// Environment variable overriding the run root (defaults to the current directory).
pub const ROOT_ENV_VAR: &str = "REPRODUCE_ROOT";
