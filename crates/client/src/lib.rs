//! appctl client library
//!
//! Typed access to the three remote services behind the `appctl` tool:
//!
//! - the **management API** (organizations and stacks),
//! - the **developer hub** (app manifests, installations, hosting),
//! - **Launch** (hosted projects, via GraphQL).
//!
//! The command-line tool depends only on the [`MarketplaceApi`] and
//! [`LaunchApi`] traits; [`Client`] is their HTTP implementation.
//!
//! ```rust,no_run
//! use appctl_client::{Client, Endpoints, MarketplaceApi};
//!
//! # async fn run() -> eyre::Result<()> {
//! let client = Client::new(
//!     Endpoints {
//!         management: "https://api.example.com".parse()?,
//!         developer_hub: "https://developerhub-api.example.com".parse()?,
//!         launch: "https://launch-api.example.com".parse()?,
//!     },
//!     Some("my-token".to_owned()),
//! );
//!
//! let first_page = client.list_organizations(0, 100).await?;
//! println!("{} organizations", first_page.items.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod connection;
pub mod errors;
mod launch;
pub mod traits;

pub use client::{Client, Endpoints};
pub use connection::ConnectionInfo;
pub use errors::ApiError;
pub use eyre::Result;
pub use traits::{LaunchApi, MarketplaceApi};
pub use url::Url;
