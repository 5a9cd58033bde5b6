use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use microapi_core::serializer::{decode_field, encode_field};
use microapi_core::{ApiResult, FieldDescriptor, Model, ModelMeta};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct BlogPost {
    /// Assigned by the store on first save.
    pub id: Option<i64>,
    pub title: String,
    /// Filled from the title on save when left empty.
    pub slug: String,
    pub content: String,
    /// Name of the publishing user.
    pub published_by: Option<String>,
    pub published_on: DateTime<Utc>,
}

impl Default for BlogPost {
    fn default() -> Self {
        Self {
            id: None,
            title: String::new(),
            slug: String::new(),
            content: String::new(),
            published_by: None,
            published_on: Utc::now(),
        }
    }
}

static BLOG_POST_META: LazyLock<ModelMeta> = LazyLock::new(|| {
    ModelMeta::new(
        "BlogPost",
        &[
            FieldDescriptor::scalar("id"),
            FieldDescriptor::scalar("title"),
            FieldDescriptor::scalar("slug"),
            FieldDescriptor::scalar("content"),
            FieldDescriptor::relation("published_by"),
            FieldDescriptor::scalar("published_on"),
        ],
    )
});

impl Model for BlogPost {
    fn meta() -> &'static ModelMeta {
        &BLOG_POST_META
    }

    fn field_value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(encode_field(&self.id)),
            "title" => Some(encode_field(&self.title)),
            "slug" => Some(encode_field(&self.slug)),
            "content" => Some(encode_field(&self.content)),
            "published_on" => Some(encode_field(&self.published_on)),
            _ => None,
        }
    }

    fn set_field_value(&mut self, field: &str, value: Value) -> ApiResult<()> {
        match field {
            "id" => self.id = decode_field::<Self, _>(field, value)?,
            "title" => self.title = decode_field::<Self, _>(field, value)?,
            "slug" => self.slug = decode_field::<Self, _>(field, value)?,
            "content" => self.content = decode_field::<Self, _>(field, value)?,
            "published_on" => self.published_on = decode_field::<Self, _>(field, value)?,
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};
    use microapi_core::ModelSerializer;
    use serde_json::json;

    use super::*;

    #[test]
    fn published_by_is_not_serialized() {
        let names = ModelSerializer.collect_field_names::<BlogPost>();
        assert_eq!(names, ["content", "id", "published_on", "slug", "title"]);
    }

    #[test]
    fn published_on_accepts_offsets() {
        let data = json!({ "published_on": "2023-12-05T11:45:45-06:00" });
        let mut post = BlogPost::default();
        ModelSerializer
            .from_dict(&mut post, data.as_object().unwrap(), true)
            .unwrap();

        assert_eq!(post.published_on.year(), 2023);
        assert_eq!(post.published_on.month(), 12);
        assert_eq!(post.published_on.day(), 5);
        assert_eq!(post.published_on.hour(), 17);
    }

    #[test]
    fn unsaved_post_has_null_id() {
        let data = ModelSerializer.to_dict(&BlogPost::default(), &[]);
        assert_eq!(data["id"], Value::Null);
    }
}
