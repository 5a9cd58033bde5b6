//! Named HTTP status codes used by views and the test helpers.

pub const OK: u16 = 200;
pub const CREATED: u16 = 201;
pub const ACCEPTED: u16 = 202;
pub const NO_CONTENT: u16 = 204;

pub const BAD_REQUEST: u16 = 400;
pub const UNAUTHORIZED: u16 = 401;
pub const FORBIDDEN: u16 = 403;
pub const NOT_FOUND: u16 = 404;
pub const NOT_ALLOWED: u16 = 405;

/// Default status for errors caught by `ApiView::dispatch`.
pub const APP_ERROR: u16 = 500;
