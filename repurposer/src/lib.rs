// Library interface for repurposer modules
// This allows tests and other binaries to import modules

pub mod error;
pub mod llm;
pub mod processing;
pub mod scraping;
pub mod server;

pub use error::PipelineError;
pub use llm::repurpose::RepurposedContent;
pub use processing::Repurposer;
