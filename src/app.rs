use crate::catalog::{CatalogRemote, Product, ProductId};
use crate::commands::{self, Command};
use crate::mirror::SlotStorage;
use crate::store::{CatalogStore, Outcome, StoreError};
use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};

/// What `status` reports about the local mirror
#[derive(Debug, Serialize)]
pub struct MirrorStatus {
  pub path: PathBuf,
  pub slot: String,
  pub products: usize,
  pub last_saved: Option<DateTime<Utc>>,
}

/// Command-line front end over the catalog store
pub struct App<R: CatalogRemote, S: SlotStorage> {
  store: CatalogStore<R, S>,

  /// Print JSON instead of tables
  json: bool,

  /// Location of the mirror database, for `status`
  mirror_path: PathBuf,
}

impl<R: CatalogRemote, S: SlotStorage> App<R, S> {
  pub fn new(store: CatalogStore<R, S>, json: bool, mirror_path: PathBuf) -> Self {
    Self {
      store,
      json,
      mirror_path,
    }
  }

  pub async fn run(&self, command: Command) -> Result<()> {
    match command {
      Command::List => {
        let outcome = self.store.list().await;
        self.show_products(&outcome)
      }
      Command::Get { id } => {
        let outcome = self.load(id).await?;
        self.show_product(&outcome)
      }
      Command::Create(args) => {
        let outcome = self.store.create(args.into()).await;
        info!(id = outcome.value.id, "created product");
        self.show_product(&outcome)
      }
      Command::Edit { id, edits } => {
        let current = self.load(id).await?;
        if edits.is_empty() {
          eprintln!("Nothing to change");
          return self.show_product(&current);
        }
        let outcome = self.store.update(edits.apply(current.into_value())).await;
        self.show_product(&outcome)
      }
      Command::Delete { id, yes } => {
        if !yes && !confirm(&format!("Delete product {}? [y/N] ", id)).await? {
          eprintln!("Cancelled");
          return Ok(());
        }
        let outcome = self.store.delete(id).await;
        notice(&outcome);

        let remaining = self.store.list().await;
        self.show_products(&remaining)
      }
      Command::Status => self.show_status(),
    }
  }

  pub fn status(&self) -> MirrorStatus {
    let mirror = self.store.mirror();
    MirrorStatus {
      path: self.mirror_path.clone(),
      slot: mirror.slot().to_string(),
      products: self.store.products().len(),
      last_saved: mirror.last_saved(),
    }
  }

  /// Load a product for display or editing. A miss becomes a generic message.
  async fn load(&self, id: ProductId) -> Result<Outcome<Product>> {
    self.store.get(id).await.map_err(|e| {
      error!(error = %e, "failed to load product");
      match e {
        StoreError::NotFound(_) => eyre!("Product not found"),
      }
    })
  }

  fn show_products(&self, outcome: &Outcome<Vec<Product>>) -> Result<()> {
    notice(outcome);
    if self.json {
      println!("{}", to_json(&outcome.value)?);
    } else {
      print!("{}", render_table(&outcome.value));
    }
    Ok(())
  }

  fn show_product(&self, outcome: &Outcome<Product>) -> Result<()> {
    notice(outcome);
    if self.json {
      println!("{}", to_json(&outcome.value)?);
    } else {
      print!("{}", render_product(&outcome.value));
    }
    Ok(())
  }

  fn show_status(&self) -> Result<()> {
    let status = self.status();
    if self.json {
      println!("{}", to_json(&status)?);
      return Ok(());
    }

    println!("Mirror:     {}", status.path.display());
    println!("Slot:       {}", status.slot);
    println!("Products:   {}", status.products);
    match status.last_saved {
      Some(at) => println!("Last saved: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
      None => println!("Last saved: never"),
    }
    Ok(())
  }
}

fn notice<T>(outcome: &Outcome<T>) {
  if outcome.is_fallback() {
    eprintln!("Inventory service unavailable, showing local data");
  }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
  serde_json::to_string_pretty(value).map_err(|e| eyre!("Failed to encode output: {}", e))
}

/// Ask a yes/no question on the terminal.
async fn confirm(prompt: &str) -> Result<bool> {
  let mut stderr = tokio::io::stderr();
  stderr.write_all(prompt.as_bytes()).await?;
  stderr.flush().await?;

  let mut answer = String::new();
  BufReader::new(tokio::io::stdin())
    .read_line(&mut answer)
    .await?;

  Ok(commands::is_confirmation(&answer))
}

fn render_table(products: &[Product]) -> String {
  if products.is_empty() {
    return "No products\n".to_string();
  }

  let mut out = format!(
    "{:>6}  {:<30} {:>10} {:>8}  {}\n",
    "ID", "NAME", "PRICE", "QTY", "SEL"
  );
  for p in products {
    out.push_str(&format!(
      "{:>6}  {:<30} {:>10.2} {:>8}  {}\n",
      p.id,
      truncate(&p.name, 30),
      p.price,
      p.quantity,
      if p.selected { "*" } else { "" }
    ));
  }
  out
}

fn render_product(product: &Product) -> String {
  format!(
    "ID:       {}\nName:     {}\nPrice:    {:.2}\nQuantity: {}\nSelected: {}\n",
    product.id,
    product.name,
    product.price,
    product.quantity,
    if product.selected { "yes" } else { "no" }
  )
}

fn truncate(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let head: String = s.chars().take(max - 1).collect();
    format!("{}…", head)
  }
}
