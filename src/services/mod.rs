pub mod generate;
pub mod prompts;
