/// Run phase. `Done` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Init,
    MarketResearch,
    Collection,
    Analysis,
    Done,
    Cancelled,
}

impl Phase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Cancelled)
    }

    /// Whether `self -> next` is a legal step of the run state machine.
    #[must_use]
    pub fn can_advance_to(self, next: Phase) -> bool {
        use Phase::{Analysis, Cancelled, Collection, Done, Init, MarketResearch};
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (_, Cancelled)
                | (Init, MarketResearch | Collection)
                | (MarketResearch, Collection)
                | (Collection, Analysis | Done)
                | (Analysis, Done)
        )
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Init => "Initialization",
            Phase::MarketResearch => "Market Research",
            Phase::Collection => "Product Research",
            Phase::Analysis => "Analysis",
            Phase::Done => "Done",
            Phase::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions_are_legal() {
        assert!(Phase::Init.can_advance_to(Phase::MarketResearch));
        assert!(Phase::Init.can_advance_to(Phase::Collection));
        assert!(Phase::MarketResearch.can_advance_to(Phase::Collection));
        assert!(Phase::Collection.can_advance_to(Phase::Analysis));
        assert!(Phase::Collection.can_advance_to(Phase::Done));
        assert!(Phase::Analysis.can_advance_to(Phase::Done));
    }

    #[test]
    fn cancelled_is_reachable_from_every_live_phase() {
        for phase in [
            Phase::Init,
            Phase::MarketResearch,
            Phase::Collection,
            Phase::Analysis,
        ] {
            assert!(phase.can_advance_to(Phase::Cancelled), "{phase}");
        }
    }

    #[test]
    fn terminal_phases_are_absorbing() {
        for next in [Phase::Init, Phase::Collection, Phase::Done, Phase::Cancelled] {
            assert!(!Phase::Done.can_advance_to(next));
            assert!(!Phase::Cancelled.can_advance_to(next));
        }
    }

    #[test]
    fn phases_cannot_be_skipped_backwards() {
        assert!(!Phase::Collection.can_advance_to(Phase::Init));
        assert!(!Phase::Analysis.can_advance_to(Phase::Collection));
        assert!(!Phase::Init.can_advance_to(Phase::Analysis));
    }
}
