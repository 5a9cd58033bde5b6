//! Sugar for writing JSON APIs on top of a host web framework.
//!
//! - [`serializer`]: model <-> ordered record conversion.
//! - [`view`]: the [`ApiView`] trait (dispatch with JSON error envelopes,
//!   body decoding, rendering).
//! - [`request`] / [`response`]: the small surface a host adapter fills in.
//! - [`status`]: named status codes.
//!
//! The library never persists anything and holds no state between requests.

pub mod error;
pub mod request;
pub mod response;
pub mod serializer;
pub mod status;
pub mod view;

pub use error::{ApiError, ApiResult};
pub use request::{ApiRequest, RequestSource, Verb};
pub use response::{ErrorMessages, JsonResponse, ResponseWriter};
pub use serializer::{
    FieldDescriptor, FieldKind, JsonMap, Model, ModelMeta, ModelSerializer, Record,
};
pub use view::{ApiView, Unmodeled, ViewResult};
