use refdel_api::prelude::RecordId;

/// Phases a delete operation moves through.
///
/// `Committed`, `Blocked` and `Aborted` are terminal; mutations become
/// observable only when `Committed` is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePhase {
    Requested,
    PolicyResolved,
    DependentsFetched,
    ActionApplied,
    Committed,
    Blocked,
    Aborted,
}

/// Tracks a single delete operation through its phases.
#[derive(Debug)]
pub struct DeleteOperation {
    table: String,
    parent: RecordId,
    phase: DeletePhase,
}

impl DeleteOperation {
    pub fn new(table: &str, parent: RecordId) -> Self {
        tracing::debug!(table, parent = %parent, "delete operation requested");
        Self {
            table: table.to_string(),
            parent,
            phase: DeletePhase::Requested,
        }
    }

    pub fn phase(&self) -> DeletePhase {
        self.phase
    }

    /// Moves the operation to the next phase.
    pub fn advance(&mut self, next: DeletePhase) {
        tracing::debug!(
            table = %self.table,
            parent = %self.parent,
            from = ?self.phase,
            to = ?next,
            "delete operation advanced"
        );
        self.phase = next;
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_should_track_phases() {
        let mut op = DeleteOperation::new("customers", RecordId(1));
        assert_eq!(op.phase(), DeletePhase::Requested);

        op.advance(DeletePhase::PolicyResolved);
        op.advance(DeletePhase::DependentsFetched);
        op.advance(DeletePhase::ActionApplied);
        op.advance(DeletePhase::Committed);
        assert_eq!(op.phase(), DeletePhase::Committed);
    }
}
