pub mod aggression;
pub mod brief;
pub mod contract;
pub mod detector;
pub mod interrogator;
pub mod llm;
pub mod objection;
pub mod scoring;

pub use brief::{BriefError, BriefGenerator};
pub use detector::{DetectorError, InconsistencyDetector};
pub use interrogator::{GenerationError, Interrogator, QuestionEvents, QuestionStream};
pub use llm::{ChatClient, ChatCompletion, ChatError, TokenStream};
pub use objection::{ObjectionScreener, ScreeningError};
pub use scoring::{ContradictionScorer, FallbackScorer, NemotronScorer, ScoringError};
