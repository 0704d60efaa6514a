//! Submission server (crowdmsg-sv) library
//!
//! Owns the collection-window state machine and submission store,
//! exposes the HTTP surface (window control, snapshot read, ingestion
//! webhook, synthesis proxy), and talks to the generative service.

pub mod api;
pub mod error;
pub mod service;
pub mod store;
pub mod synthesis;

pub use api::server::{build_router, AppContext};
pub use error::{Error, Result};
pub use service::CollectionService;
