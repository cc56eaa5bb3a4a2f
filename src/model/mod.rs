pub mod brief;
pub mod config;
pub mod detection;
pub mod event;
pub mod objection;
pub mod session;

pub use brief::{AlertSummary, BriefRequest, CoachingBrief, TranscriptEntry, WeaknessMap};
pub use config::{ChatConfig, Config, DetectionThresholds, NemotronConfig, NiaConfig};
pub use detection::{
    ContradictionVerdict, DetectionRequest, ImpeachmentRisk, InconsistencyResult,
    StatementCandidate, StatementMetadata,
};
pub use event::SessionEvent;
pub use objection::{ObjectionCategory, ObjectionVerdict};
pub use session::{
    AggressionAssessment, AggressionLevel, CaseSide, QuestionContext, WitnessProfile,
};
