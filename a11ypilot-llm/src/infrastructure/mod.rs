pub mod prompts;
pub mod providers;
pub mod registry;
pub mod response_parser;

pub use providers::{OpenAIProvider, ResilientProvider};
pub use registry::{ProviderRegistry, ProviderType};
pub use response_parser::ResponseParser;
