//! Token acquisition flows. Only the client-credentials grant is supported.

pub mod client_credentials;

pub use client_credentials::{
    build_token_request, ClientCredentialsFlow, MockTokenFlow, TokenFlow, TokenRequest,
};
