mod fsm;
mod orchestrator;
mod types;

pub use fsm::{PipelineEvent, PipelineState, PipelineStateMachine};
pub use orchestrator::PredictionService;
pub use types::{PredictionEnvelope, PredictionOutcome, PredictionResult};
