//! Data migration that seeds the site and creates the term index table.

use crate::config::{DatabaseConfig, FieldTypes, SeedConfig};
use crate::content::{
    AliasPart, AutoroutePart, CommonPart, ContentItem, ContentManager, ContentPart,
    LinkMenuItemPart, MarkdownBodyPart, MenuItemsListPart, TitlePart, VersionOptions,
};
use crate::definitions::{AutoroutePartSettings, ContentDefinitionStore, TaxonomyFieldSettings};
use crate::index::TermIndexStore;
use crate::layers::{create_homepage_layer_if_not_exist, ConditionIdGenerator, LayerService};
use crate::{Result, TermIndexError};
use chrono::Utc;
use regex::Regex;
use rusqlite::{params, OptionalExtension};
use std::sync::{Arc, LazyLock};
use tracing::info;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex must compile"));

/// Liquid pattern for post URLs: `categories/{category}/{title}`.
const POST_URL_PATTERN: [&str; 2] = [
    "{% assign category = ContentItem.Content.Post.Category | taxonomy_terms | first %}",
    "{{ 'categories' }}/{{ category | display_text | slugify }}/{{ ContentItem | display_text | slugify }}",
];

/// Seeds the home page, the homepage layer and the main menu, and creates the
/// term index table.
pub struct ThemeMigration {
    content: Arc<ContentManager>,
    definitions: Arc<ContentDefinitionStore>,
    layers: Arc<dyn LayerService>,
    ids: ConditionIdGenerator,
    index: Arc<TermIndexStore>,
}

impl ThemeMigration {
    pub fn new(
        content: Arc<ContentManager>,
        definitions: Arc<ContentDefinitionStore>,
        layers: Arc<dyn LayerService>,
        ids: ConditionIdGenerator,
        index: Arc<TermIndexStore>,
    ) -> Self {
        Self {
            content,
            definitions,
            layers,
            ids,
            index,
        }
    }

    /// Run `create` unless its version is already recorded.
    ///
    /// Returns the version now applied.
    pub fn migrate(&self) -> Result<u32> {
        ensure_migrations_table(&self.index)?;
        if let Some(version) = applied_version(&self.index, SeedConfig::FEATURE_NAME)? {
            info!("{} already at version {}", SeedConfig::FEATURE_NAME, version);
            return Ok(version);
        }

        let version = self.create()?;
        record_version(&self.index, SeedConfig::FEATURE_NAME, version)?;
        info!("Migrated {} to version {}", SeedConfig::FEATURE_NAME, version);
        Ok(version)
    }

    /// Initial migration step.
    pub fn create(&self) -> Result<u32> {
        self.create_home_page()
            .map_err(|e| step_failed("home page", e))?;
        create_homepage_layer_if_not_exist(self.layers.as_ref(), &self.ids)
            .map_err(|e| step_failed("homepage layer", e))?;
        self.create_menu().map_err(|e| step_failed("main menu", e))?;
        self.create_term_index_table()
            .map_err(|e| step_failed("term index table", e))?;
        Ok(1)
    }

    pub fn create_term_index_table(&self) -> Result<()> {
        self.index.create_table()
    }

    /// Define the `HomePage` type and create the published home page.
    pub fn create_home_page(&self) -> Result<ContentItem> {
        self.definitions
            .alter_type_definition(SeedConfig::HOME_PAGE_TYPE, |ty| {
                ty.with_part(CommonPart::NAME)
                    .with_part(AutoroutePart::NAME)
                    .versionable(false)
                    .listable(true);
            })?;

        let mut home = self
            .content
            .new_item(SeedConfig::HOME_PAGE_TYPE)
            .with_display_text(SeedConfig::HOME_PAGE_DISPLAY_TEXT);
        // Keep a path so the page stays reachable once another page becomes the homepage.
        home.alter::<AutoroutePart>(|p| {
            p.set_homepage = true;
            p.path = Some(SeedConfig::HOME_PAGE_PATH.to_string());
        })?;

        self.content.create(home, VersionOptions::Published)
    }

    /// Create the `Home` link and the published main menu holding it.
    pub fn create_menu(&self) -> Result<ContentItem> {
        let mut home_link = self
            .content
            .new_item(SeedConfig::LINK_MENU_ITEM_TYPE)
            .with_display_text("Home");
        home_link.alter::<LinkMenuItemPart>(|p| p.url = Some("~/".to_string()))?;
        let home_link = self.content.create(home_link, VersionOptions::Published)?;

        let mut menu = self
            .content
            .new_item(SeedConfig::MENU_TYPE)
            .with_display_text(SeedConfig::MAIN_MENU_NAME);
        menu.alter::<TitlePart>(|p| p.title = Some(SeedConfig::MAIN_MENU_NAME.to_string()))?
            .alter::<AliasPart>(|p| p.alias = Some(SeedConfig::MAIN_MENU_ALIAS.to_string()))?
            .alter::<MenuItemsListPart>(|p| p.menu_items.push(home_link))?;

        self.content.create(menu, VersionOptions::Published)
    }

    /// Define the `Post` type, whose `Post` part holds a single-term
    /// `Category` taxonomy field drawing from `categories_taxonomy`.
    pub fn define_post_type(&self, categories_taxonomy: &ContentItem) -> Result<()> {
        let post = SeedConfig::POST_TYPE;

        self.definitions.alter_part_definition(post, |part| {
            part.attachable(false).with_field("Category", |field| {
                field
                    .of_type(FieldTypes::TAXONOMY_FIELD)
                    .with_display_name("Category")
                    .with_position("0")
                    .with_settings(&TaxonomyFieldSettings {
                        taxonomy_content_item_id: Some(
                            categories_taxonomy.content_item_id.clone(),
                        ),
                        unique: true,
                        leaves_only: true,
                        ..Default::default()
                    });
            });
        })?;

        self.definitions.alter_type_definition(post, |ty| {
            ty.with_part(TitlePart::NAME)
                .with_part_configured(MarkdownBodyPart::NAME, |part| {
                    part.with_editor("Wysiwyg");
                })
                .with_part_configured(AutoroutePart::NAME, |part| {
                    part.with_settings(&AutoroutePartSettings {
                        pattern: Some(POST_URL_PATTERN.join("\n")),
                        allow_custom_path: true,
                        allow_update_path: true,
                    });
                })
                .with_part(post)
                .creatable(true)
                .listable(true)
                .versionable(false);
        })
    }
}

/// An unsaved link menu item pointing at `~/{base_url}/{slug}`.
///
/// The slug is the trimmed display text with whitespace runs replaced by `-`,
/// lowercased.
pub fn create_menu_item(
    content: &ContentManager,
    display_text: &str,
    base_url: Option<&str>,
) -> Result<ContentItem> {
    let slug = WHITESPACE
        .replace_all(display_text.trim(), "-")
        .to_lowercase();
    let segments: Vec<&str> = [base_url.unwrap_or(""), slug.as_str()]
        .into_iter()
        .filter(|segment| !segment.is_empty())
        .collect();
    let url = format!("~/{}", segments.join("/"));

    let mut item = content
        .new_item(SeedConfig::LINK_MENU_ITEM_TYPE)
        .with_display_text(display_text);
    item.alter::<LinkMenuItemPart>(|p| p.url = Some(url))?;
    Ok(item)
}

fn step_failed(step: &str, err: TermIndexError) -> TermIndexError {
    TermIndexError::Migration {
        step: step.to_string(),
        message: err.to_string(),
    }
}

fn ensure_migrations_table(store: &TermIndexStore) -> Result<()> {
    let conn = store.lock()?;
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {} (
            feature TEXT PRIMARY KEY,
            version INTEGER NOT NULL,
            applied_utc TEXT NOT NULL
        );",
        DatabaseConfig::MIGRATIONS_TABLE
    ))?;
    Ok(())
}

fn applied_version(store: &TermIndexStore, feature: &str) -> Result<Option<u32>> {
    let conn = store.lock()?;
    let version = conn
        .query_row(
            &format!(
                "SELECT version FROM {} WHERE feature = ?1",
                DatabaseConfig::MIGRATIONS_TABLE
            ),
            params![feature],
            |row| row.get(0),
        )
        .optional()?;
    Ok(version)
}

fn record_version(store: &TermIndexStore, feature: &str, version: u32) -> Result<()> {
    let conn = store.lock()?;
    conn.execute(
        &format!(
            "INSERT INTO {} (feature, version, applied_utc) VALUES (?1, ?2, ?3)
             ON CONFLICT(feature) DO UPDATE SET version = excluded.version,
                                                applied_utc = excluded.applied_utc",
            DatabaseConfig::MIGRATIONS_TABLE
        ),
        params![feature, version, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}
