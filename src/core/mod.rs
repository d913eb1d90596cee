//! Core infrastructure: placeholder resolution, HTTP transport, env files.

pub mod env_files;
pub mod placeholder;
pub mod transport;

pub use env_files::{load_env_files, ENV_FILE_NAMES};
pub use placeholder::{
    resolve, resolve_credentials, resolve_credentials_with, resolve_with, Resolution,
};
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, MockHttpTransport, ReqwestHttpTransport,
    DEFAULT_TIMEOUT,
};
