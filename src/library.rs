//! Track records and the upload boundary that turns files into tracks.

mod model;
mod upload;

pub use model::Track;
pub use upload::{accepted_mime, declared_mime, upload};
