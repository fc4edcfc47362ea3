pub mod analysis;
pub mod config;
pub mod error;
pub mod handlers;
pub mod history;
pub mod middleware;
pub mod record;
pub mod response;
pub mod server;
pub mod store;

pub use analysis::AnalysisResult;
pub use config::Config;
pub use error::{AnalyzerError, Result};
pub use record::{AnalysisRecord, StoredEntity};
pub use server::create_app;
pub use store::{StoreHandle, TableStore};
