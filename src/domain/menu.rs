use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MiniWaffle,
    BelgianWaffle,
    BubbleWaffle,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Category::MiniWaffle => "mini_waffle",
            Category::BelgianWaffle => "belgian_waffle",
            Category::BubbleWaffle => "bubble_waffle",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Size {
    Regular,
    Semi,
    Large,
}

/// A catalog entry, independently lived from any order.
///
/// Deleting a menu item never cascades into historical order items; those
/// carry their own denormalized name and price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub item_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: Category,
    pub size: Size,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a new menu item.
#[derive(Debug, Clone)]
pub struct MenuItemCreate {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: Category,
    pub size: Size,
}

impl MenuItemCreate {
    pub fn new(name: impl Into<String>, price: f64, category: Category, size: Size) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            price,
            category,
            size,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
