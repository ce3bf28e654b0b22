use refdel_api::prelude::{AffectedRecord, EngineError, Outcome, RecordId};

/// Terminal state of a delete operation, as reached by the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalState {
    /// All staged mutations were committed.
    Committed {
        parent: RecordId,
        cascaded: Vec<AffectedRecord>,
    },
    /// Existing dependents blocked the deletion; nothing was mutated.
    Blocked {
        parent: RecordId,
        blocking: Vec<AffectedRecord>,
    },
    /// The operation aborted before commit; nothing was mutated.
    Aborted {
        parent: RecordId,
        error: EngineError,
    },
}

/// Maps a terminal state and the records it affected to the caller-facing
/// [`Outcome`]. Pure function, no side effects.
pub fn report(state: FinalState) -> Outcome {
    match state {
        FinalState::Committed { parent, cascaded } if cascaded.is_empty() => {
            Outcome::Deleted { parent }
        }
        FinalState::Committed { parent, cascaded } => Outcome::DeletedCascaded {
            parent,
            dependents: cascaded,
        },
        FinalState::Blocked { parent, blocking } => Outcome::Blocked { parent, blocking },
        FinalState::Aborted { parent, error } => Outcome::Failed { parent, error },
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_should_report_plain_delete_without_cascaded_records() {
        let outcome = report(FinalState::Committed {
            parent: RecordId(1),
            cascaded: vec![],
        });
        assert_eq!(outcome, Outcome::Deleted { parent: RecordId(1) });
    }

    #[test]
    fn test_should_report_cascaded_delete() {
        let cascaded = vec![("orders".to_string(), RecordId(10))];
        let outcome = report(FinalState::Committed {
            parent: RecordId(1),
            cascaded: cascaded.clone(),
        });
        assert_eq!(
            outcome,
            Outcome::DeletedCascaded {
                parent: RecordId(1),
                dependents: cascaded,
            }
        );
    }

    #[test]
    fn test_should_report_blocked_and_aborted_states() {
        let blocking = vec![("orders".to_string(), RecordId(10))];
        assert_eq!(
            report(FinalState::Blocked {
                parent: RecordId(1),
                blocking: blocking.clone(),
            }),
            Outcome::Blocked {
                parent: RecordId(1),
                blocking,
            }
        );
        assert_eq!(
            report(FinalState::Aborted {
                parent: RecordId(1),
                error: EngineError::Cancelled,
            }),
            Outcome::Failed {
                parent: RecordId(1),
                error: EngineError::Cancelled,
            }
        );
    }
}
