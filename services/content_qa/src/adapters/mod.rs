pub mod qa_llm;

pub use qa_llm::OpenAiQaAdapter;
