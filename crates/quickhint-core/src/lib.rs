//! Core types and logic for quickhint.
//!
//! quickhint overlays short typeable labels on the clickable elements of
//! a hosted page and lets the user select one by typing its label,
//! optionally synthesizing a context-menu interaction instead of a
//! primary click. This crate is the in-page engine: candidate
//! discovery, collision-free label generation, the activation/typing
//! state machine, overlay bookkeeping, and click synthesis. Packaging,
//! persisted settings, and the settings UI live outside and reach the
//! engine only through [`config::OverrideStore`].
//!
//! # Modules
//!
//! - [`surface`]: capability traits for the host document (queries,
//!   layout, overlay markers, synthetic events)
//! - [`page`]: an in-memory document implementing those traits, used by
//!   tests and the CLI harness
//! - [`config`]: per-site configuration and resolution precedence
//! - [`label`]: prefix-free hint label generation
//! - [`scan`]: candidate element discovery with popup scoping
//! - [`overlay`]: marker mounting and typed-prefix highlighting
//! - [`session`]: the Active/Inactive hint state machine
//! - [`dispatch`]: the single key-event entry point and binding table
//! - [`click`]: primary/secondary click synthesis
//! - [`error`]: typed selector and click errors
//!
//! # Typical embedding
//!
//! ```ignore
//! let config = config::resolve_config(page.url(), &store);
//! let mut dispatcher = dispatch::InputDispatcher::new(config);
//! // From the host's capturing key listener:
//! match dispatcher.on_key(&mut page, &event) {
//!     dispatch::KeyDisposition::Intercepted => event.suppress(),
//!     dispatch::KeyDisposition::PassThrough => {}
//! }
//! ```
//!
//! Resolve the configuration to completion before constructing the
//! dispatcher; that ordering is what keeps activation from racing an
//! in-flight resolution.

pub mod click;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod label;
pub mod overlay;
pub mod page;
pub mod scan;
pub mod session;
pub mod surface;

pub use click::ClickMode;
pub use config::{resolve_config, Scope, SiteConfig, SiteOverride};
pub use dispatch::{InputDispatcher, KeyDisposition, KeyEvent, Modifiers};
pub use session::HintSession;
pub use surface::{NodeId, Point, Rect, Size};
