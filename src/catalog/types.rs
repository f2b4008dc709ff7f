use serde::{Deserialize, Serialize};

/// Server-assigned product identifier
pub type ProductId = i64;

/// A product as stored by the inventory service and mirrored locally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub id: ProductId,
  pub name: String,
  pub price: f64,
  pub quantity: i64,
  /// UI-only flag; the service may not track it
  #[serde(default)]
  pub selected: bool,
}

/// Product fields without an id, as sent when creating
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
  pub name: String,
  pub price: f64,
  pub quantity: i64,
  #[serde(default)]
  pub selected: bool,
}

impl ProductDraft {
  /// Attach an id, producing a full product record.
  pub fn with_id(self, id: ProductId) -> Product {
    Product {
      id,
      name: self.name,
      price: self.price,
      quantity: self.quantity,
      selected: self.selected,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_selected_defaults_when_missing() {
    let product: Product =
      serde_json::from_str(r#"{"id":4,"name":"Ink","price":2.25,"quantity":3}"#).unwrap();
    assert_eq!(product.id, 4);
    assert!(!product.selected);
  }

  #[test]
  fn test_negative_ids_decode() {
    let products: Vec<Product> = serde_json::from_str(
      r#"[{"id":-1,"name":"Returned","price":0.5,"quantity":-2},{"id":2,"name":"Pen","price":1.5,"quantity":10,"selected":true}]"#,
    )
    .unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].id, -1);
    assert_eq!(products[0].quantity, -2);
    assert_eq!(products[1].id, 2);
  }

  #[test]
  fn test_draft_serializes_without_id() {
    let draft = ProductDraft {
      name: "Pen".to_string(),
      price: 1.5,
      quantity: 10,
      selected: false,
    };
    let value = serde_json::to_value(&draft).unwrap();
    assert!(value.get("id").is_none());
    assert_eq!(value["name"], "Pen");
  }

  #[test]
  fn test_with_id_keeps_fields() {
    let product = ProductDraft {
      name: "Pen".to_string(),
      price: 1.5,
      quantity: 10,
      selected: true,
    }
    .with_id(7);
    assert_eq!(product.id, 7);
    assert_eq!(product.name, "Pen");
    assert!(product.selected);
  }
}
