use crate::{Error, Result};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Started,
    Aligning,
    Invoking,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent {
    BeginAlignment,
    Aligned,
    Predicted,
    Failed,
}

/// Lifecycle of one prediction request. Any non-terminal state may fail
/// straight to `Completed`.
#[derive(Debug)]
pub struct PipelineStateMachine {
    state: PipelineState,
}

impl Default for PipelineStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStateMachine {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Started,
        }
    }

    pub fn current_state(&self) -> PipelineState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state == PipelineState::Completed
    }

    pub fn transition(&mut self, event: PipelineEvent) -> Result<()> {
        let new_state = match (self.state, event) {
            (PipelineState::Started, PipelineEvent::BeginAlignment) => PipelineState::Aligning,
            (PipelineState::Aligning, PipelineEvent::Aligned) => PipelineState::Invoking,
            (PipelineState::Invoking, PipelineEvent::Predicted) => PipelineState::Completed,
            (
                PipelineState::Started | PipelineState::Aligning | PipelineState::Invoking,
                PipelineEvent::Failed,
            ) => PipelineState::Completed,
            _ => {
                warn!(
                    "Invalid pipeline transition from {:?} with event {:?}",
                    self.state, event
                );
                return Err(Error::InvalidTransition {
                    current: format!("{:?}", self.state),
                    requested: format!("{:?}", event),
                });
            }
        };

        debug!(
            "Pipeline state transition: {:?} -> {:?} (event: {:?})",
            self.state, new_state, event
        );
        self.state = new_state;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_happy_path() {
        let mut fsm = PipelineStateMachine::new();
        fsm.transition(PipelineEvent::BeginAlignment).unwrap();
        assert_eq!(fsm.current_state(), PipelineState::Aligning);
        fsm.transition(PipelineEvent::Aligned).unwrap();
        assert_eq!(fsm.current_state(), PipelineState::Invoking);
        fsm.transition(PipelineEvent::Predicted).unwrap();
        assert!(fsm.is_terminal());
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    fn test_failure_short_circuits_from_any_open_state(#[case] steps: usize) {
        let mut fsm = PipelineStateMachine::new();
        let path = [PipelineEvent::BeginAlignment, PipelineEvent::Aligned];
        for event in path.iter().take(steps) {
            fsm.transition(*event).unwrap();
        }

        fsm.transition(PipelineEvent::Failed).unwrap();
        assert_eq!(fsm.current_state(), PipelineState::Completed);
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut fsm = PipelineStateMachine::new();
        fsm.transition(PipelineEvent::Failed).unwrap();

        let err = fsm.transition(PipelineEvent::BeginAlignment).unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
        assert!(fsm.transition(PipelineEvent::Failed).is_err());
    }

    #[test]
    fn test_cannot_skip_alignment() {
        let mut fsm = PipelineStateMachine::new();
        assert!(fsm.transition(PipelineEvent::Predicted).is_err());
        assert_eq!(fsm.current_state(), PipelineState::Started);
    }
}
