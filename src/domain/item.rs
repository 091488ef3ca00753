//! Item Entity
//!
//! A physical asset issued to a department, optionally filed under a
//! category. `category_id = None` is the permanent "unassigned" state.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::attribute::Attributes;
use super::category::Category;
use super::entity::{DomainError, DomainResult, Entity};
use super::id::{CategoryId, ItemId};

/// Message shown when the item form is missing a mandatory field
pub const MISSING_FIELDS_MESSAGE: &str =
    "Please fill all mandatory fields (Name, Department, Issued Date).";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A catalogued asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier
    pub id: ItemId,
    pub name: String,
    /// Department the asset was issued to
    pub department: String,
    #[serde(deserialize_with = "deserialize_issued_date")]
    pub issued_date: NaiveDate,
    /// Owning category (None = unassigned)
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub serial_number: String,
    /// Any extra fields beyond the fixed schema
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Item {
    pub fn new(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        department: impl Into<String>,
        issued_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            department: department.into(),
            issued_date,
            category_id: None,
            serial_number: String::new(),
            attributes: Attributes::new(),
        }
    }

    pub fn in_category(mut self, category_id: impl Into<CategoryId>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn with_serial(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = serial_number.into();
        self
    }

    pub fn is_unassigned(&self) -> bool {
        self.category_id.is_none()
    }

    pub fn belongs_to(&self, category_id: &CategoryId) -> bool {
        self.category_id.as_ref() == Some(category_id)
    }
}

/// Item fields minus the id, as sent on create
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub name: String,
    pub department: String,
    pub issued_date: NaiveDate,
    pub category_id: Option<CategoryId>,
    pub serial_number: String,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Entity for Item {
    type Id = ItemId;
    type Draft = ItemDraft;

    const KIND: &'static str = "item";
    const COLLECTION: &'static str = "items";

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn from_draft(id: Self::Id, draft: Self::Draft) -> Self {
        Self {
            id,
            name: draft.name,
            department: draft.department,
            issued_date: draft.issued_date,
            category_id: draft.category_id,
            serial_number: draft.serial_number,
            attributes: draft.attributes,
        }
    }
}

/// Raw add/edit form input, validated into an [`ItemDraft`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemForm {
    pub name: String,
    pub department: String,
    /// `YYYY-MM-DD`
    pub issued_date: String,
    pub category_id: Option<CategoryId>,
    pub serial_number: String,
    pub attributes: Attributes,
}

impl ItemForm {
    /// Empty form: today's date, first category preselected
    pub fn blank(categories: &[Category]) -> Self {
        Self {
            issued_date: chrono::Local::now().date_naive().format(DATE_FORMAT).to_string(),
            category_id: categories.first().map(|c| c.id.clone()),
            ..Default::default()
        }
    }

    /// Form prefilled from an existing item for editing
    pub fn from_item(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            department: item.department.clone(),
            issued_date: item.issued_date.format(DATE_FORMAT).to_string(),
            category_id: item.category_id.clone(),
            serial_number: item.serial_number.clone(),
            attributes: item.attributes.clone(),
        }
    }

    /// Check mandatory fields and the date format
    pub fn validate(&self) -> DomainResult<ItemDraft> {
        let name = self.name.trim();
        let department = self.department.trim();
        let issued_date = self.issued_date.trim();
        if name.is_empty() || department.is_empty() || issued_date.is_empty() {
            return Err(DomainError::InvalidInput(MISSING_FIELDS_MESSAGE.to_string()));
        }

        let issued_date = NaiveDate::parse_from_str(issued_date, DATE_FORMAT).map_err(|_| {
            DomainError::InvalidInput(format!("Issued date '{}' is not a YYYY-MM-DD date", issued_date))
        })?;

        Ok(ItemDraft {
            name: name.to_string(),
            department: department.to_string(),
            issued_date,
            category_id: self.category_id.clone(),
            serial_number: self.serial_number.trim().to_string(),
            attributes: self.attributes.clone(),
        })
    }
}

/// Accepts a plain date or a full timestamp and keeps the calendar date
fn deserialize_issued_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let date_part = raw.split('T').next().unwrap_or(&raw);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AttributeValue;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_item_creation() {
        let item = Item::new("item-101", "Blue Pen (Gel)", "HR", date("2025-11-01"));
        assert_eq!(item.id().as_str(), "item-101");
        assert!(item.is_unassigned());

        let item = item.in_category("cat-1");
        assert!(item.belongs_to(&CategoryId::new("cat-1")));
    }

    #[test]
    fn test_item_wire_format() {
        let json = r#"{
            "id": 7,
            "name": "A4 Ruled Pad",
            "department": "IT",
            "issuedDate": "2025-11-20T00:00:00.000Z",
            "categoryId": "cat-2",
            "serialNumber": "SN002",
            "warranty": "2y"
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.id.as_str(), "7");
        assert_eq!(item.issued_date, date("2025-11-20"));
        assert_eq!(item.category_id, Some(CategoryId::new("cat-2")));
        assert_eq!(item.attributes.get("warranty"), Some(&AttributeValue::Text("2y".into())));

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["issuedDate"], "2025-11-20");
        assert_eq!(back["categoryId"], "cat-2");
        assert_eq!(back["warranty"], "2y");
    }

    #[test]
    fn test_attributes_never_duplicate_fixed_fields() {
        let mut item = Item::new("item-1", "Stapler", "Finance", date("2025-12-05")).in_category("cat-3");
        assert!(item.attributes.insert("categoryId", "cat-9").is_err());
        item.attributes.insert("color", "red").unwrap();

        let body = serde_json::to_string(&item).unwrap();
        assert_eq!(body.matches("\"categoryId\"").count(), 1);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["categoryId"], "cat-3");
        assert_eq!(value["color"], "red");
    }

    #[test]
    fn test_unassigned_serializes_null() {
        let item = Item::new("item-1", "Stapler", "Finance", date("2025-12-05"));
        let value = serde_json::to_value(&item).unwrap();
        assert!(value["categoryId"].is_null());

        let missing: Item = serde_json::from_str(
            r#"{"id": "item-1", "name": "Stapler", "department": "Finance", "issuedDate": "2025-12-05"}"#,
        )
        .unwrap();
        assert!(missing.is_unassigned());
    }

    #[test]
    fn test_form_requires_mandatory_fields() {
        let form = ItemForm {
            name: "Stapler".to_string(),
            department: "   ".to_string(),
            issued_date: "2025-12-05".to_string(),
            ..Default::default()
        };
        assert_eq!(
            form.validate().unwrap_err(),
            DomainError::InvalidInput(MISSING_FIELDS_MESSAGE.to_string())
        );
    }

    #[test]
    fn test_form_rejects_bad_date() {
        let form = ItemForm {
            name: "Stapler".to_string(),
            department: "Finance".to_string(),
            issued_date: "05/12/2025".to_string(),
            ..Default::default()
        };
        assert!(matches!(form.validate(), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_form_round_trips_existing_item() {
        let item = Item::new("item-1", "Stapler", "Finance", date("2025-12-05"))
            .in_category("cat-3")
            .with_serial("SN003");
        let draft = ItemForm::from_item(&item).validate().unwrap();
        assert_eq!(Item::from_draft(item.id.clone(), draft), item);
    }

    #[test]
    fn test_blank_form_preselects_first_category() {
        let categories = vec![Category::new("cat-1", "Writing Tools"), Category::new("cat-2", "Paper")];
        let form = ItemForm::blank(&categories);
        assert_eq!(form.category_id, Some(CategoryId::new("cat-1")));
        assert!(NaiveDate::parse_from_str(&form.issued_date, DATE_FORMAT).is_ok());
    }
}
