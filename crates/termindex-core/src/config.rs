//! Centralized configuration for the term index.
//!
//! Column bounds, database pragmas, file names and the names used by the
//! seeding migration live here.

/// Bounds of the `content_item_by_term_index` table.
pub struct IndexConfig;

impl IndexConfig {
    pub const TABLE_NAME: &'static str = "content_item_by_term_index";
    /// Length of generated content item identifiers.
    pub const CONTENT_ITEM_ID_LENGTH: usize = 26;
    pub const URL_MAX_LENGTH: usize = 1024;
    pub const DISPLAY_TEXT_MAX_LENGTH: usize = 255;
    pub const PUBLISHED_DEFAULT: bool = true;
    pub const LATEST_DEFAULT: bool = false;
}

/// SQLite connection settings.
pub struct DatabaseConfig;

impl DatabaseConfig {
    pub const BUSY_TIMEOUT_MS: u64 = 30_000;
    pub const MIGRATIONS_TABLE: &'static str = "data_migrations";
}

/// File and directory names under the data directory.
pub struct PathsConfig;

impl PathsConfig {
    pub const INDEX_DB_FILENAME: &'static str = "term-index.sqlite";
    pub const DEFINITIONS_FILENAME: &'static str = "content-definitions.json";
    pub const LAYERS_FILENAME: &'static str = "layers.json";
}

/// Names used when seeding the site.
pub struct SeedConfig;

impl SeedConfig {
    /// Feature name under which the theme migration version is recorded.
    pub const FEATURE_NAME: &'static str = "TermIndex.Theme";
    pub const HOMEPAGE_LAYER_NAME: &'static str = "Homepage";
    pub const HOMEPAGE_LAYER_DESCRIPTION: &'static str =
        "Widgets in this layer are only displayed on the homepage.";
    pub const HOME_PAGE_TYPE: &'static str = "HomePage";
    pub const HOME_PAGE_DISPLAY_TEXT: &'static str = "Home page";
    pub const HOME_PAGE_PATH: &'static str = "home";
    pub const MAIN_MENU_NAME: &'static str = "Main Menu";
    pub const MAIN_MENU_ALIAS: &'static str = "main-menu";
    pub const MENU_TYPE: &'static str = "Menu";
    pub const LINK_MENU_ITEM_TYPE: &'static str = "LinkMenuItem";
    pub const POST_TYPE: &'static str = "Post";
}

/// Well-known field type names.
pub struct FieldTypes;

impl FieldTypes {
    pub const TAXONOMY_FIELD: &'static str = "TaxonomyField";
    pub const TEXT_FIELD: &'static str = "TextField";
}
