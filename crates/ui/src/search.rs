/// What the caller should do after a query edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceAction {
    /// The query was cleared and applies right away.
    ApplyNow,
    /// Start a timer and report back with this generation.
    Wait { generation: u64 },
}

/// Trailing-edge debounce for the search field.
///
/// Every edit bumps a generation counter; a timer only applies the query if
/// no newer edit arrived meanwhile.
#[derive(Debug, Clone, Default)]
pub struct SearchDebouncer {
    input: String,
    applied: String,
    generation: u64,
}

impl SearchDebouncer {
    /// Text currently in the search field.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Query the result list reflects.
    pub fn applied(&self) -> &str {
        &self.applied
    }

    pub fn edit(&mut self, input: String) -> DebounceAction {
        self.generation += 1;
        self.input = input;
        if self.input.is_empty() {
            self.applied.clear();
            DebounceAction::ApplyNow
        } else {
            DebounceAction::Wait {
                generation: self.generation,
            }
        }
    }

    /// Handles an expired timer. Returns `true` when the applied query changed.
    pub fn elapsed(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.applied == self.input {
            return false;
        }
        self.applied.clone_from(&self.input);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{DebounceAction, SearchDebouncer};

    #[test]
    fn only_latest_timer_applies() {
        let mut debouncer = SearchDebouncer::default();
        let DebounceAction::Wait { generation: first } = debouncer.edit("ru".to_owned()) else {
            panic!("expected a timer");
        };
        let DebounceAction::Wait { generation: second } = debouncer.edit("rust".to_owned())
        else {
            panic!("expected a timer");
        };

        assert!(!debouncer.elapsed(first));
        assert_eq!(debouncer.applied(), "");
        assert!(debouncer.elapsed(second));
        assert_eq!(debouncer.applied(), "rust");
    }

    #[test]
    fn clearing_applies_immediately_and_cancels_pending_timer() {
        let mut debouncer = SearchDebouncer::default();
        let DebounceAction::Wait { generation } = debouncer.edit("cat".to_owned()) else {
            panic!("expected a timer");
        };
        assert!(debouncer.elapsed(generation));

        let DebounceAction::Wait { generation } = debouncer.edit("cats".to_owned()) else {
            panic!("expected a timer");
        };
        assert_eq!(debouncer.edit(String::new()), DebounceAction::ApplyNow);
        assert_eq!(debouncer.applied(), "");
        assert!(!debouncer.elapsed(generation));
    }

    #[test]
    fn unchanged_query_does_not_reapply() {
        let mut debouncer = SearchDebouncer::default();
        let DebounceAction::Wait { generation } = debouncer.edit("a".to_owned()) else {
            panic!("expected a timer");
        };
        assert!(debouncer.elapsed(generation));
        let DebounceAction::Wait { generation } = debouncer.edit("a".to_owned()) else {
            panic!("expected a timer");
        };
        assert!(!debouncer.elapsed(generation));
    }
}
