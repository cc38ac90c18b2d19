use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::config::SiteConfig;
use crate::error::FetchError;

use super::api_types::decode_page;
use super::types::Post;
use super::RemoteSource;

const POSTS_PATH: &str = "wp-json/wp/v2/posts";

/// HTTP client for a WordPress REST posts endpoint.
#[derive(Clone)]
pub struct WpClient {
  http: reqwest::Client,
  endpoint: Url,
}

impl WpClient {
  pub fn new(site: &SiteConfig) -> Result<Self, FetchError> {
    let mut base = site.url.trim().to_string();
    if !base.ends_with('/') {
      base.push('/');
    }
    let endpoint = Url::parse(&base)?.join(POSTS_PATH)?;

    let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(site.timeout_secs));
    if let Some(agent) = &site.user_agent {
      builder = builder.user_agent(agent.clone());
    } else {
      builder = builder.user_agent(concat!("wpfeed/", env!("CARGO_PKG_VERSION")));
    }
    let http = builder.build()?;

    Ok(Self { http, endpoint })
  }

  pub fn endpoint(&self) -> &Url {
    &self.endpoint
  }
}

#[async_trait]
impl RemoteSource for WpClient {
  async fn fetch_page(&self, page: u32, per_page: u32) -> Result<Vec<Post>, FetchError> {
    debug!(page, per_page, endpoint = %self.endpoint, "fetching posts page");

    let response = self
      .http
      .get(self.endpoint.clone())
      .query(&[("per_page", per_page), ("page", page)])
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status { status });
    }

    let body = response.text().await?;
    let posts = decode_page(&body)?;
    debug!(page, count = posts.len(), "posts page decoded");
    Ok(posts)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use wiremock::matchers::{method, path, query_param};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn site(url: &str) -> SiteConfig {
    SiteConfig {
      url: url.to_string(),
      per_page: 10,
      timeout_secs: 5,
      user_agent: None,
    }
  }

  #[test]
  fn test_endpoint_joins_base_with_or_without_slash() {
    let a = WpClient::new(&site("https://blog.example.com")).unwrap();
    let b = WpClient::new(&site("https://blog.example.com/")).unwrap();
    assert_eq!(
      a.endpoint().as_str(),
      "https://blog.example.com/wp-json/wp/v2/posts"
    );
    assert_eq!(a.endpoint(), b.endpoint());
  }

  #[test]
  fn test_endpoint_keeps_subdirectory_install() {
    let client = WpClient::new(&site("https://example.com/news")).unwrap();
    assert_eq!(
      client.endpoint().as_str(),
      "https://example.com/news/wp-json/wp/v2/posts"
    );
  }

  #[test]
  fn test_invalid_url() {
    assert!(matches!(
      WpClient::new(&site("not a url")),
      Err(FetchError::Url(_))
    ));
  }

  #[tokio::test]
  async fn test_fetch_page_sends_paging_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/wp-json/wp/v2/posts"))
      .and(query_param("page", "2"))
      .and(query_param("per_page", "10"))
      .respond_with(ResponseTemplate::new(200).set_body_string(
        r#"[{"id": 11, "date": "2024-01-02T00:00:00", "title": {"rendered": "Eleven"}}]"#,
      ))
      .expect(1)
      .mount(&mock_server)
      .await;

    let client = WpClient::new(&site(&mock_server.uri())).unwrap();
    let posts = client.fetch_page(2, 10).await.unwrap();

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, 11);
    assert_eq!(posts[0].title.rendered, "Eleven");
  }

  #[tokio::test]
  async fn test_non_success_status_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/wp-json/wp/v2/posts"))
      .respond_with(ResponseTemplate::new(400).set_body_string(
        r#"{"code": "rest_post_invalid_page_number"}"#,
      ))
      .mount(&mock_server)
      .await;

    let client = WpClient::new(&site(&mock_server.uri())).unwrap();
    let err = client.fetch_page(99, 10).await.unwrap_err();

    match err {
      FetchError::Status { status } => assert_eq!(status.as_u16(), 400),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[tokio::test]
  async fn test_malformed_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
      .and(path("/wp-json/wp/v2/posts"))
      .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"not": "a list"}"#))
      .mount(&mock_server)
      .await;

    let client = WpClient::new(&site(&mock_server.uri())).unwrap();
    let err = client.fetch_page(1, 10).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
  }
}
