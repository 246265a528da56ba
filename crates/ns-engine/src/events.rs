//! Outbound collaborator interface
//!
//! Rendering and audio layers observe the engine through [`EventSink`];
//! the engine never calls into them otherwise. All methods default to
//! no-ops so a sink implements only what it cares about.

use crate::bonus::BonusEvent;
use crate::session::{SessionState, SpinOutcome};

/// Observer for engine-emitted events
pub trait EventSink {
    /// A spin finished evaluating
    fn on_outcome(&mut self, _outcome: &SpinOutcome) {}

    /// Session state changed (debit, credit, phase transition)
    fn on_state_changed(&mut self, _state: &SessionState) {}

    /// A bonus was foregrounded this spin
    fn on_bonus_triggered(&mut self, _event: BonusEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::session::SlotSession;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        outcomes: u32,
        state_changes: u32,
        bonuses: Vec<BonusEvent>,
    }

    struct SharedSink(Rc<RefCell<Recorder>>);

    impl EventSink for SharedSink {
        fn on_outcome(&mut self, _outcome: &SpinOutcome) {
            self.0.borrow_mut().outcomes += 1;
        }
        fn on_state_changed(&mut self, _state: &SessionState) {
            self.0.borrow_mut().state_changes += 1;
        }
        fn on_bonus_triggered(&mut self, event: BonusEvent) {
            self.0.borrow_mut().bonuses.push(event);
        }
    }

    #[test]
    fn test_sinks_observe_spins() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut session = SlotSession::new(EngineConfig::default()).unwrap();
        session.seed(3);
        session.add_sink(Box::new(SharedSink(recorder.clone())));

        session.spin(10).unwrap();
        if session.phase() == crate::session::SpinPhase::BonusActive {
            session.resolve_bonus_reward(0).unwrap();
        }

        let rec = recorder.borrow();
        assert_eq!(rec.outcomes, 1);
        // request debit + settlement at minimum
        assert!(rec.state_changes >= 2);
    }
}
