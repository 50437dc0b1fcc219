#![forbid(unsafe_code)]

//! Host-agnostic presentation logic for a static marketing site.
//!
//! Everything with real state or ordering lives here: the singleton
//! notification overlay, the ephemeral (tab-lifetime) session indicator, and
//! the small stateless listeners around them (scroll reveal, header chrome,
//! form acknowledgement, anchor smooth-scroll).
//!
//! Design goals:
//! - **Host-driven**: the embedding environment implements [`host::Host`] and
//!   [`store::KeyValueStore`]; nothing here touches a browser API directly.
//! - **Injected load signal**: reload detection arrives as a
//!   [`navigation::PageLoad`] captured once at boot.
//! - **No blocking / no threads**: every handler runs to completion on the
//!   host's event loop.
//!
//! `pagekit-web` wraps this crate with `wasm-bindgen` bindings.

pub mod anchors;
pub mod chrome;
pub mod config;
pub mod forms;
pub mod host;
pub mod logging;
pub mod markup;
pub mod navigation;
pub mod overlay;
pub mod page;
pub mod reveal;
pub mod session;
pub mod store;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, info, trace, warn};

pub use config::{ConfigError, Features, SiteConfig};
pub use host::{DomEvent, EventKind, Host, IntersectionEntry};
pub use markup::{Markup, Selector};
pub use navigation::{LoadKind, PageLoad};
pub use overlay::{DismissCallback, OverlayController, OverlayState};
pub use page::Page;
pub use session::{RenderChange, SessionPhase, SessionRecord, SessionStateSync, SyncReport};
pub use store::{KeyValueStore, MemoryStore, StoreError, StoreResult};
