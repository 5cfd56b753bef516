/// Application name
pub const APP_NAME: &str = "Tessera";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Current plugin API version
pub const API_VERSION: &str = "0.1.0";

/// Config key holding the resolved render mode
pub const MODE_CONFIG_KEY: &str = "mode";

/// Schema key holding the component tree
pub const COMPONENTS_TREE_KEY: &str = "componentsTree";
