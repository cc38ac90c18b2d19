use serde::{Deserialize, Serialize};

/// A rich-text field as the site renders it (HTML is kept as-is).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedText {
  pub rendered: String,
}

impl RenderedText {
  pub fn new(rendered: impl Into<String>) -> Self {
    Self {
      rendered: rendered.into(),
    }
  }
}

/// A single post, identified by its site-wide id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
  pub id: i64,
  /// ISO-8601 publication timestamp, as sent by the site
  pub published_at: String,
  pub title: RenderedText,
  pub excerpt: RenderedText,
  pub link: String,
  /// Featured media reference, 0 when the post has none
  pub featured_media: i64,
  pub featured_media_url: Option<String>,
}
