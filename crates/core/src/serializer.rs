//! Model <-> record conversion.
//!
//! A [`Model`] declares its fields once through a [`ModelMeta`]; only
//! [`FieldKind::Scalar`] fields take part in serialization. Relations,
//! generated columns and virtual fields are never read or written here.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Ordered field-name -> value mapping produced by [`ModelSerializer::to_dict`].
pub type Record = IndexMap<String, Value>;

/// Decoded JSON object, as returned by `ApiView::read_json`.
pub type JsonMap = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A concretely stored primitive column.
    Scalar,
    /// A reference to another model.
    Relation,
    /// A value computed by the storage layer.
    Generated,
    /// A field with no storage column of its own.
    Virtual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub const fn scalar(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Scalar,
        }
    }

    pub const fn relation(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Relation,
        }
    }

    pub const fn generated(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Generated,
        }
    }

    pub const fn virtual_field(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Virtual,
        }
    }

    pub fn is_serializable(&self) -> bool {
        self.kind == FieldKind::Scalar
    }
}

/// Per-type field metadata, built once at registration time.
///
/// Implementors typically keep it in a `static` [`std::sync::LazyLock`]:
///
/// ```
/// use std::sync::LazyLock;
/// use microapi_core::serializer::{FieldDescriptor, ModelMeta};
///
/// static META: LazyLock<ModelMeta> = LazyLock::new(|| {
///     ModelMeta::new(
///         "Tag",
///         &[FieldDescriptor::scalar("name"), FieldDescriptor::scalar("id")],
///     )
/// });
///
/// assert_eq!(META.field_names(), ["id", "name"]);
/// ```
#[derive(Debug, Clone)]
pub struct ModelMeta {
    name: &'static str,
    field_names: Vec<&'static str>,
}

impl ModelMeta {
    /// Collect the serializable field names from `fields`.
    ///
    /// Descriptors may repeat a name (fields declared again by an inherited
    /// block); repeats collapse into one entry. The result is sorted.
    pub fn new(name: &'static str, fields: &[FieldDescriptor]) -> Self {
        let field_names: BTreeSet<&'static str> = fields
            .iter()
            .filter(|f| f.is_serializable())
            .map(|f| f.name)
            .collect();

        Self {
            name,
            field_names: field_names.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn field_names(&self) -> &[&'static str] {
        &self.field_names
    }

    pub fn contains(&self, field: &str) -> bool {
        self.field_names.binary_search(&field).is_ok()
    }
}

/// A record type whose scalar fields can be read and written by name.
pub trait Model: Clone {
    fn meta() -> &'static ModelMeta;

    /// Current value of a serializable field, `None` for unknown names.
    fn field_value(&self, field: &str) -> Option<Value>;

    /// Assign a serializable field from a JSON value.
    ///
    /// Only called with names from [`ModelMeta::field_names`]. Fails with
    /// [`ApiError::DataValidation`] when the value has the wrong shape.
    fn set_field_value(&mut self, field: &str, value: Value) -> ApiResult<()>;
}

/// Encode a typed field for [`Model::field_value`].
pub fn encode_field<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Decode a JSON value for [`Model::set_field_value`].
pub fn decode_field<M: Model, T: DeserializeOwned>(field: &str, value: Value) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| {
        ApiError::DataValidation(format!(
            "Invalid value for {}.{field}: {e}",
            M::meta().name()
        ))
    })
}

/// Stateless serializer for [`Model`] types.
///
/// Anything beyond copying flat scalar fields (nested objects, renamed keys,
/// computed output) belongs in the view's own `serialize` override.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelSerializer;

impl ModelSerializer {
    /// Sorted, deduplicated names of every serializable field of `M`.
    pub fn collect_field_names<M: Model>(&self) -> &'static [&'static str] {
        M::meta().field_names()
    }

    /// Read the model's serializable fields into a [`Record`], in field-name
    /// order, leaving out any key listed in `exclude`.
    pub fn to_dict<M: Model>(&self, model: &M, exclude: &[&str]) -> Record {
        let mut data: Record = self
            .collect_field_names::<M>()
            .iter()
            .map(|&name| {
                let value = model.field_value(name).unwrap_or(Value::Null);
                (name.to_string(), value)
            })
            .collect();

        for name in exclude {
            data.shift_remove(*name);
        }

        data
    }

    /// Copy `data` onto `model` without saving it.
    ///
    /// With `strict`, any key that is not a serializable field fails the whole
    /// call with [`ApiError::InvalidField`]; otherwise such keys are skipped.
    /// Either every assignment lands or none does: on error `model` is left
    /// exactly as it was.
    pub fn from_dict<'m, M: Model>(
        &self,
        model: &'m mut M,
        data: &JsonMap,
        strict: bool,
    ) -> ApiResult<&'m mut M> {
        let meta = M::meta();

        if strict {
            if let Some(key) = data.keys().find(|key| !meta.contains(key)) {
                return Err(ApiError::InvalidField {
                    field: key.clone(),
                    model: meta.name(),
                });
            }
        }

        let mut staged = model.clone();
        for (key, value) in data {
            if !meta.contains(key) {
                tracing::debug!(model = meta.name(), field = %key, "Skipping unknown field");
                continue;
            }
            staged.set_field_value(key, value.clone())?;
        }

        *model = staged;
        Ok(model)
    }
}
