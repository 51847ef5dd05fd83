pub mod content_store;
pub mod image_gen;
pub mod prompt_llm;
pub mod record_store;

pub use content_store::FsContentStore;
pub use image_gen::HttpImageAdapter;
pub use prompt_llm::OpenAiPromptAdapter;
pub use record_store::FileRecordStore;
