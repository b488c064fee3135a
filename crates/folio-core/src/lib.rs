//! folio core library
//!
//! Configuration, error handling, front matter and post records shared by the
//! rest of the workspace.

pub mod config;
pub mod date;
pub mod error;
pub mod frontmatter;
pub mod post;
pub mod prefs;

pub use config::Config;
pub use error::{CoreError, Result};
pub use frontmatter::Frontmatter;
pub use post::{PostPath, PostRecord};
pub use prefs::Preferences;
