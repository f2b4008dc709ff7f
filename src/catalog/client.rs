use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use tracing::debug;
use url::Url;

use crate::config::RemoteConfig;

use super::remote::{CatalogRemote, RemoteError};
use super::types::{Product, ProductDraft, ProductId};

/// HTTP client for the inventory service's `/products` collection
#[derive(Debug, Clone)]
pub struct HttpRemote {
  client: reqwest::Client,
  endpoint: String,
}

impl HttpRemote {
  pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = config.timeout_secs {
      builder = builder.timeout(Duration::from_secs(secs));
    }

    Ok(Self {
      client: builder.build()?,
      endpoint: products_endpoint(&Url::parse(&config.url)?),
    })
  }

  /// URL of the resource collection, e.g. `http://localhost:8083/products`
  pub fn endpoint(&self) -> &str {
    &self.endpoint
  }

  fn item_url(&self, id: ProductId) -> String {
    format!("{}/{}", self.endpoint, id)
  }

  /// Send a request, turning any non-2xx status into an error
  async fn send(
    &self,
    method: &'static str,
    url: &str,
    request: RequestBuilder,
  ) -> Result<Response, RemoteError> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
      return Err(RemoteError::Status {
        method,
        url: url.to_string(),
        status,
      });
    }

    debug!(method, url, %status, "remote call succeeded");
    Ok(response)
  }
}

impl CatalogRemote for HttpRemote {
  async fn list(&self) -> Result<Vec<Product>, RemoteError> {
    let response = self
      .send("GET", &self.endpoint, self.client.get(&self.endpoint))
      .await?;
    Ok(response.json().await?)
  }

  async fn get(&self, id: ProductId) -> Result<Product, RemoteError> {
    let url = self.item_url(id);
    let response = self.send("GET", &url, self.client.get(&url)).await?;
    Ok(response.json().await?)
  }

  async fn create(&self, draft: &ProductDraft) -> Result<Product, RemoteError> {
    let response = self
      .send(
        "POST",
        &self.endpoint,
        self.client.post(&self.endpoint).json(draft),
      )
      .await?;
    Ok(response.json().await?)
  }

  async fn update(&self, product: &Product) -> Result<Product, RemoteError> {
    let url = self.item_url(product.id);
    let response = self
      .send("PUT", &url, self.client.put(&url).json(product))
      .await?;
    Ok(response.json().await?)
  }

  async fn delete(&self, id: ProductId) -> Result<(), RemoteError> {
    let url = self.item_url(id);
    self.send("DELETE", &url, self.client.delete(&url)).await?;
    Ok(())
  }
}

/// Append the collection path to the service base URL.
fn products_endpoint(base: &Url) -> String {
  format!("{}/products", base.as_str().trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;

  /// Accept one connection, read the request head and reply with a canned response.
  async fn serve_once(status_line: &'static str, body: &'static str) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let mut request = Vec::new();
      let mut buf = [0u8; 1024];
      while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
          break;
        }
        request.extend_from_slice(&buf[..n]);
      }
      let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
      );
      socket.write_all(response.as_bytes()).await.unwrap();
      socket.shutdown().await.unwrap();
    });

    Url::parse(&format!("http://{}", addr)).unwrap()
  }

  fn remote_for(url: Url) -> HttpRemote {
    HttpRemote::new(&RemoteConfig {
      url: url.to_string(),
      timeout_secs: Some(5),
    })
    .unwrap()
  }

  #[test]
  fn test_products_endpoint_trims_trailing_slash() {
    let base = Url::parse("http://localhost:8083/").unwrap();
    assert_eq!(products_endpoint(&base), "http://localhost:8083/products");

    let nested = Url::parse("http://inventory.local/api/").unwrap();
    assert_eq!(products_endpoint(&nested), "http://inventory.local/api/products");
  }

  #[test]
  fn test_invalid_base_url_is_rejected() {
    let err = HttpRemote::new(&RemoteConfig {
      url: "not a url".to_string(),
      timeout_secs: None,
    })
    .unwrap_err();
    assert!(matches!(err, RemoteError::InvalidUrl(_)));
  }

  #[test]
  fn test_item_url() {
    let remote = remote_for(Url::parse("http://localhost:8083").unwrap());
    assert_eq!(remote.item_url(12), "http://localhost:8083/products/12");
  }

  #[tokio::test]
  async fn test_list_decodes_products() {
    let url = serve_once(
      "200 OK",
      r#"[{"id":1,"name":"Pen","price":1.5,"quantity":10,"selected":false},{"id":2,"name":"Ink","price":3.0,"quantity":2}]"#,
    )
    .await;

    let products = remote_for(url).list().await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].name, "Pen");
    assert_eq!(products[1].id, 2);
  }

  #[tokio::test]
  async fn test_non_success_status_is_an_error() {
    let url = serve_once("404 Not Found", "{}").await;

    let err = remote_for(url).get(9).await.unwrap_err();
    match err {
      RemoteError::Status { method, status, url } => {
        assert_eq!(method, "GET");
        assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
        assert!(url.ends_with("/products/9"));
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[tokio::test]
  async fn test_connection_refused_is_an_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = Url::parse(&format!("http://{}", addr)).unwrap();
    let err = remote_for(url).list().await.unwrap_err();
    assert!(matches!(err, RemoteError::Http(_)));
  }
}
