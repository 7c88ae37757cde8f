pub mod bundle;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod registry;
pub mod sections;
pub mod store;
pub mod tabtext;
pub mod validate;

pub use bundle::{Bundle, BundleFile, INVESTIGATION_FILE_NAME, encode};
pub use error::IsaTabError;
