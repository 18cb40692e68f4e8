/// Intelligence module
///
/// Query interpretation through a generative-language model, relevance
/// ranking, and the AI-assisted local search built on both.

pub mod interpreter;
pub mod scorer;
pub mod smart_search;

pub use interpreter::{
    parse_interpretation, GeminiInterpreter, QueryInterpretation, QueryInterpreter,
};
pub use scorer::RelevanceScorer;
pub use smart_search::{SmartSearch, SmartSearchResponse};
