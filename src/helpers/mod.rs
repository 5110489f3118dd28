//! Helper functions shared by the generator and the server

mod url;
mod xml;

pub use url::*;
pub use xml::*;
