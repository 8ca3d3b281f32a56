use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{blank_to_none, Attachment};

#[derive(Debug, Clone, FromRow)]
pub struct Bill {
    pub id: i32,
    pub user_id: i32,
    pub original_amount: Decimal,
    pub discount_amount: Decimal,
    pub actual_amount: Decimal,
    pub discount_type: Option<String>,
    pub payment_method: String,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub related_diary_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    pub original_amount: Decimal,
    #[serde(default)]
    pub discount_amount: Decimal,
    pub actual_amount: Decimal,
}

/// Client-supplied fields for creating or replacing a bill.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBill {
    pub amount: Amount,
    pub payment_method: String,
    #[serde(default)]
    pub discount_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub related_diary_id: Option<i32>,
}

impl NewBill {
    /// Collapses empty strings and non-positive ids to absent values.
    pub fn normalized(mut self) -> Self {
        self.payment_method = self.payment_method.trim().to_string();
        self.discount_type = blank_to_none(self.discount_type);
        self.category = blank_to_none(self.category);
        self.notes = blank_to_none(self.notes);
        self.related_diary_id = self.related_diary_id.filter(|id| *id > 0);
        self
    }

    pub fn validate(&self) -> Result<(), HashMap<String, String>> {
        let mut errors = HashMap::new();
        let amounts = [
            ("amount.original_amount", self.amount.original_amount),
            ("amount.discount_amount", self.amount.discount_amount),
            ("amount.actual_amount", self.amount.actual_amount),
        ];
        for (field, value) in amounts {
            if value < Decimal::ZERO {
                errors.insert(field.to_string(), "Must not be negative".to_string());
            }
        }
        if self.payment_method.is_empty() {
            errors.insert("payment_method".to_string(), "This field is required".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Optional list filters; all present filters must match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillFilter {
    pub category: Option<String>,
    pub payment_method: Option<String>,
    /// Calendar month of creation, `YYYY-MM`.
    pub month: Option<String>,
}

impl BillFilter {
    pub fn normalized(self) -> Self {
        Self {
            category: blank_to_none(self.category),
            payment_method: blank_to_none(self.payment_method),
            month: blank_to_none(self.month),
        }
    }

    pub fn validate(&self) -> Result<(), HashMap<String, String>> {
        match &self.month {
            Some(month) if !is_valid_month(month) => {
                let mut errors = HashMap::new();
                errors.insert("month".to_string(), "Expected format YYYY-MM".to_string());
                Err(errors)
            }
            _ => Ok(()),
        }
    }
}

fn is_valid_month(month: &str) -> bool {
    month.len() == 7 && NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d").is_ok()
}

#[derive(Debug, Clone, Serialize)]
pub struct BillView {
    pub id: i32,
    pub amount: Amount,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_diary_id: Option<i32>,
    pub files: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BillView {
    pub fn new(bill: Bill, files: Vec<Attachment>) -> Self {
        Self {
            id: bill.id,
            amount: Amount {
                original_amount: bill.original_amount,
                discount_amount: bill.discount_amount,
                actual_amount: bill.actual_amount,
            },
            payment_method: bill.payment_method,
            discount_type: bill.discount_type,
            category: bill.category,
            notes: bill.notes,
            related_diary_id: bill.related_diary_id,
            files,
            created_at: bill.created_at,
            updated_at: bill.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> NewBill {
        serde_json::from_value::<NewBill>(value).unwrap().normalized()
    }

    #[test]
    fn normalizes_blank_optionals() {
        let bill = parse(json!({
            "amount": { "original_amount": "12.50", "actual_amount": "12.50" },
            "payment_method": " card ",
            "category": "",
            "notes": "  ",
            "related_diary_id": 0
        }));
        assert_eq!(bill.payment_method, "card");
        assert_eq!(bill.amount.discount_amount, Decimal::ZERO);
        assert!(bill.category.is_none());
        assert!(bill.notes.is_none());
        assert!(bill.related_diary_id.is_none());
        assert!(bill.validate().is_ok());
    }

    #[test]
    fn rejects_negative_amounts_and_missing_method() {
        let bill = parse(json!({
            "amount": { "original_amount": "-1", "actual_amount": "3" },
            "payment_method": ""
        }));
        let errors = bill.validate().unwrap_err();
        assert!(errors.contains_key("amount.original_amount"));
        assert!(errors.contains_key("payment_method"));
        assert!(!errors.contains_key("amount.actual_amount"));
    }

    #[test]
    fn month_filter_format() {
        let filter = |m: &str| BillFilter {
            month: Some(m.to_string()),
            ..Default::default()
        };
        assert!(filter("2025-10").validate().is_ok());
        assert!(filter("2025-13").validate().is_err());
        assert!(filter("2025-1").validate().is_err());
        assert!(filter("October").validate().is_err());
        assert!(BillFilter::default().validate().is_ok());
    }
}
