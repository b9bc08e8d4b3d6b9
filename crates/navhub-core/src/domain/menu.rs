//! Menu domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Top-level navigation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Menu {
    pub id: Uuid,
    /// Assigned by the store from the menu sequence counter.
    pub sequence_number: i64,

    #[validate(length(min = 1, max = 100, message = "Menu name must be between 1 and 100 characters"))]
    pub name: String,

    pub display_order: i32,

    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl Menu {
    pub fn rename(&mut self, name: &str) -> Result<(), validator::ValidationErrors> {
        self.name = name.trim().to_string();
        self.validate()
    }

    pub fn touch(&mut self) {
        self.modified_at = Some(Utc::now());
    }
}

/// A menu that has not been persisted yet and so has no sequence number.
#[derive(Debug, Clone, Validate)]
pub struct NewMenu {
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Menu name must be between 1 and 100 characters"))]
    pub name: String,

    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

impl NewMenu {
    pub fn new(name: &str, display_order: Option<i32>) -> Result<Self, validator::ValidationErrors> {
        let menu = Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            display_order: display_order.unwrap_or(0),
            created_at: Utc::now(),
        };

        menu.validate()?;
        Ok(menu)
    }

    pub fn into_menu(self, sequence_number: i64) -> Menu {
        Menu {
            id: self.id,
            sequence_number,
            name: self.name,
            display_order: self.display_order,
            created_at: self.created_at,
            modified_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_menu_defaults_order() {
        let menu = NewMenu::new("  Products ", None).unwrap();
        assert_eq!(menu.name, "Products");
        assert_eq!(menu.display_order, 0);

        let menu = menu.into_menu(7);
        assert_eq!(menu.sequence_number, 7);
        assert!(menu.modified_at.is_none());
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(NewMenu::new("   ", Some(1)).is_err());

        let mut menu = NewMenu::new("About", None).unwrap().into_menu(1);
        assert!(menu.rename(" ").is_err());
        assert!(menu.rename("About us").is_ok());
        assert_eq!(menu.name, "About us");
    }
}
