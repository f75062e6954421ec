pub mod config;
pub mod error;
pub mod extract;
pub mod form;
pub mod frame;
pub mod history;
pub mod http_client;
pub mod normalize;
pub mod pipeline;
pub mod publish;
pub mod retry;
pub mod schema;
pub mod score;
pub mod snapshot;

pub use error::{PipelineError, Result};
