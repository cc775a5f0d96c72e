//! # Settings Data Transfer Objects
//!
//! The flat key-value preferences shared by the popup and the content script.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Every key the settings store knows about, in popup order.
pub const SETTINGS_KEYS: [&str; 13] = [
    "outOfStock",
    "preorder",
    "frontPage",
    "enableSort",
    "sortBy",
    "sortOrder",
    "darkMode",
    "enableBorder",
    "borderStyle",
    "borderWidth",
    "borderColor",
    "enableConversion",
    "currency",
];

/// Product property used as the sort key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Price,
    Name,
    Rating,
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// User preferences.
///
/// Missing keys deserialize to their type default (`false`, `""`, `0`), which is
/// how an unset key reads before the install defaults have landed. Use
/// [`Settings::install_defaults`] for the values written on first install.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Hide items marked out of stock
    pub out_of_stock: bool,
    /// Hide items marked as preorder
    pub preorder: bool,
    /// Also hide items on the front page
    pub front_page: bool,
    pub enable_sort: bool,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub dark_mode: bool,
    pub enable_border: bool,
    /// CSS border style keyword (`solid`, `dashed`, ...)
    pub border_style: String,
    /// Border width in pixels
    pub border_width: u32,
    /// CSS color value
    pub border_color: String,
    pub enable_conversion: bool,
    /// Target currency code; empty when not yet initialized
    pub currency: String,
}

impl Settings {
    /// Values written to the store the first time the extension is installed.
    pub fn install_defaults() -> Self {
        Self {
            out_of_stock: false,
            preorder: false,
            front_page: false,
            enable_sort: false,
            sort_by: SortBy::Price,
            sort_order: SortOrder::Ascending,
            dark_mode: false,
            enable_border: false,
            border_style: "solid".to_string(),
            border_width: 5,
            border_color: "red".to_string(),
            enable_conversion: false,
            currency: "EUR".to_string(),
        }
    }

    /// Build settings from a raw store snapshot.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(map.clone()))
    }

    /// Flatten into the key-value form the store persists.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // A struct of plain fields always serializes to an object
            _ => Map::new(),
        }
    }
}
