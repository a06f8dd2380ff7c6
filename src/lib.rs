//! # issabel-client - Issabel PBX API client for Rust
//!
//! A Rust client for the REST-style administrative API exposed by
//! Issabel PBX servers. This library handles authentication, transparent
//! bearer token renewal, and CRUD calls against arbitrarily named PBX
//! resources (extensions, trunks, ring groups, and whatever else the
//! server offers).
//!
//! ## Features
//!
//! - Generic CRUD interface over dynamically named resources - new PBX
//!   resource types work without code changes
//! - Username/password authentication with automatic recovery from
//!   token expiry (one renew-and-resend per call)
//! - Per-request failures returned as inspectable values, so batch
//!   callers can keep going
//! - Scoped TLS settings suited to self-signed PBX deployments
//!
//! ## Basic Usage
//!
//! ```no_run
//! use issabel_client::Session;
//! use serde_json::{Map, Value};
//!
//! fn main() -> Result<(), issabel_client::ApiError> {
//!     let mut session = Session::new("192.168.1.100");
//!     session.authenticate("admin", "password")?;
//!
//!     // List every extension
//!     let extensions = session.get("extensions", None, &[])?;
//!     if let Some(error) = extensions.error() {
//!         eprintln!("listing failed: {}", error);
//!     }
//!
//!     // Create one, applying the change on the PBX immediately
//!     let mut data = Map::new();
//!     data.insert("name".to_string(), Value::String("John Doe".to_string()));
//!     data.insert("extension".to_string(), Value::String("2000".to_string()));
//!     let created = session.create("extensions", &data, true)?;
//!     println!("created: {:?}", created.value());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Dynamic operation names
//!
//! Operation names in the `get_`/`create_`/`update_`/`delete_` family
//! resolve at call time against any resource the server knows:
//!
//! ```no_run
//! use issabel_client::{Call, Session};
//!
//! let mut session = Session::new("192.168.1.100");
//! session.authenticate("admin", "password")?;
//!
//! let trunks = session.invoke("get_trunks", Call::new())?;
//! let gone = session.invoke("delete_extensions", Call::new().ids(["100", "101"]))?;
//! # Ok::<(), issabel_client::ApiError>(())
//! ```

pub mod client;
pub mod error;
pub mod operation;
pub mod response;
pub mod session;
pub mod token;

// Re-export main types for convenience
pub use client::Config;
pub use error::{ApiError, Result};
pub use operation::{Call, Operation, Verb};
pub use response::ApiResponse;
pub use session::Session;
pub use token::Token;

// Re-export serde_json for convenience
pub use serde_json::json;
