//! Available commands and the edits they carry.

use clap::{Args, Subcommand};

use crate::catalog::{Product, ProductDraft, ProductId};

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
  /// List all products
  #[command(visible_alias = "ls")]
  List,

  /// Show one product
  Get {
    #[arg(allow_negative_numbers = true)]
    id: ProductId,
  },

  /// Add a product
  #[command(visible_alias = "new")]
  Create(DraftArgs),

  /// Load a product, change some fields and save it
  Edit {
    #[arg(allow_negative_numbers = true)]
    id: ProductId,
    #[command(flatten)]
    edits: ProductEdits,
  },

  /// Remove a product
  #[command(visible_alias = "rm")]
  Delete {
    #[arg(allow_negative_numbers = true)]
    id: ProductId,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
  },

  /// Show where the local mirror lives and what it holds
  Status,
}

/// Fields of a new product; omitted numbers start at zero
#[derive(Args, Debug, Clone, PartialEq)]
pub struct DraftArgs {
  #[arg(long)]
  pub name: String,
  #[arg(long, default_value_t = 0.0, value_parser = parse_price)]
  pub price: f64,
  #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
  pub quantity: i64,
  #[arg(long)]
  pub selected: bool,
}

impl From<DraftArgs> for ProductDraft {
  fn from(args: DraftArgs) -> Self {
    Self {
      name: args.name,
      price: args.price,
      quantity: args.quantity,
      selected: args.selected,
    }
  }
}

/// Field changes for `edit`; anything omitted keeps its current value
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ProductEdits {
  #[arg(long)]
  pub name: Option<String>,
  #[arg(long, value_parser = parse_price)]
  pub price: Option<f64>,
  #[arg(long, allow_negative_numbers = true)]
  pub quantity: Option<i64>,
  #[arg(long)]
  pub selected: Option<bool>,
}

impl ProductEdits {
  pub fn is_empty(&self) -> bool {
    self == &Self::default()
  }

  pub fn apply(self, product: Product) -> Product {
    Product {
      id: product.id,
      name: self.name.unwrap_or(product.name),
      price: self.price.unwrap_or(product.price),
      quantity: self.quantity.unwrap_or(product.quantity),
      selected: self.selected.unwrap_or(product.selected),
    }
  }
}

/// Parse a price, rejecting NaN and infinities.
fn parse_price(s: &str) -> Result<f64, String> {
  let price: f64 = s.parse().map_err(|e| format!("invalid price '{}': {}", s, e))?;
  if price.is_finite() {
    Ok(price)
  } else {
    Err(format!("price must be a finite number, got '{}'", s))
  }
}

/// Interpret a confirmation prompt answer. Only an explicit yes counts.
pub fn is_confirmation(answer: &str) -> bool {
  matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
