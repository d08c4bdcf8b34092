//! Viewer state for pdf-clip, independent of any UI toolkit.
//!
//! A [`Session`] owns the open document, the current page, the drawn
//! rectangle, and the text extracted from it. Front ends translate user
//! actions into session calls and show [`SessionError`] messages verbatim.

pub mod config;
pub mod error;
pub mod extraction;
pub mod navigation;
pub mod search;
pub mod selection;
pub mod session;
#[cfg(test)]
mod test_support;

pub use config::{ConfigError, ViewerConfig};
pub use error::SessionError;
pub use extraction::{extract_region, ExtractedText};
pub use navigation::{parse_page_entry, Navigator};
pub use search::{contains_case_insensitive, filter_pages, find_case_insensitive, TextView};
pub use selection::{CanvasPoint, RegionSelector, SelectionRect, SelectorState};
pub use session::{LoadedDocument, SearchSummary, Session};
