#![doc = "Massifveg public API"]
mod atlas;
mod common;
mod compose;
mod config;
mod error;
#[cfg(feature = "download")]
mod fetch;
mod geometry;
mod layer;
mod selection;

#[doc(inline)]
pub use atlas::{Atlas, ViewMode};

#[doc(inline)]
pub use compose::{Composition, CompositionRow, composition};

#[doc(inline)]
pub use config::ColumnSpec;

#[doc(inline)]
pub use error::DataError;

#[doc(inline)]
pub use layer::{LayerStyle, LayerSummary, VectorLayer};

#[doc(inline)]
pub use selection::Selection;

#[cfg(feature = "download")]
#[doc(inline)]
pub use fetch::{FetchManifest, fetch_archive};
