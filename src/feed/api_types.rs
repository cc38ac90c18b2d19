//! Serde-deserializable types matching the `wp/v2/posts` response.
//!
//! Kept apart from the domain types so that missing or `null` fields can be
//! defaulted here without leaking wire quirks into `Post`.

use serde::{Deserialize, Deserializer};

use super::types::{Post, RenderedText};

/// Treat an explicit `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiRendered {
  #[serde(default, deserialize_with = "null_as_default")]
  pub rendered: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiPost {
  pub id: i64,
  #[serde(default, deserialize_with = "null_as_default")]
  pub date: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub title: ApiRendered,
  #[serde(default, deserialize_with = "null_as_default")]
  pub excerpt: ApiRendered,
  #[serde(default, deserialize_with = "null_as_default")]
  pub link: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub featured_media: i64,
  // Flattened by the Jetpack plugin; absent on plain installs
  #[serde(default)]
  pub jetpack_featured_media_url: Option<String>,
}

impl From<ApiPost> for Post {
  fn from(api: ApiPost) -> Self {
    Post {
      id: api.id,
      published_at: api.date,
      title: RenderedText::new(api.title.rendered),
      excerpt: RenderedText::new(api.excerpt.rendered),
      link: api.link,
      featured_media: api.featured_media,
      featured_media_url: api.jetpack_featured_media_url.filter(|u| !u.is_empty()),
    }
  }
}

/// Decode a whole page. Any malformed entry rejects the page.
pub fn decode_page(body: &str) -> serde_json::Result<Vec<Post>> {
  let posts: Vec<ApiPost> = serde_json::from_str(body)?;
  Ok(posts.into_iter().map(Post::from).collect())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_decode_full_post() {
    let body = r#"[{
      "id": 42,
      "date": "2024-03-01T09:30:00",
      "title": {"rendered": "Hello &amp; welcome"},
      "excerpt": {"rendered": "<p>Short</p>"},
      "link": "https://example.com/hello",
      "featured_media": 7,
      "jetpack_featured_media_url": "https://example.com/img.png",
      "status": "publish"
    }]"#;

    let posts = decode_page(body).unwrap();
    assert_eq!(posts.len(), 1);
    let post = &posts[0];
    assert_eq!(post.id, 42);
    assert_eq!(post.published_at, "2024-03-01T09:30:00");
    assert_eq!(post.title.rendered, "Hello &amp; welcome");
    assert_eq!(post.excerpt.rendered, "<p>Short</p>");
    assert_eq!(post.featured_media, 7);
    assert_eq!(
      post.featured_media_url.as_deref(),
      Some("https://example.com/img.png")
    );
  }

  #[test]
  fn test_missing_and_null_fields_default() {
    let body = r#"[
      {"id": 1},
      {"id": 2, "title": null, "excerpt": {"rendered": null}, "featured_media": null,
       "jetpack_featured_media_url": null, "link": null, "date": null}
    ]"#;

    let posts = decode_page(body).unwrap();
    for post in &posts {
      assert_eq!(post.title.rendered, "");
      assert_eq!(post.excerpt.rendered, "");
      assert_eq!(post.link, "");
      assert_eq!(post.featured_media, 0);
      assert_eq!(post.featured_media_url, None);
    }
  }

  #[test]
  fn test_empty_media_url_is_absent() {
    let posts = decode_page(r#"[{"id": 3, "jetpack_featured_media_url": ""}]"#).unwrap();
    assert_eq!(posts[0].featured_media_url, None);
  }

  #[test]
  fn test_one_bad_entry_rejects_page() {
    let body = r#"[{"id": 1}, {"title": {"rendered": "no id"}}]"#;
    assert!(decode_page(body).is_err());
  }

  #[test]
  fn test_empty_page() {
    assert!(decode_page("[]").unwrap().is_empty());
  }
}
