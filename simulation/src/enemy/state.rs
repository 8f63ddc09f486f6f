#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyState {
    Idle,
    Patrolling,
    Hunting,
    Fleeing,
    Attacking,
    Falling,
    Dead,
}

/// Current and previous [`EnemyState`], plus what each state allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyStateMachine {
    current: EnemyState,
    previous: EnemyState,
}

impl Default for EnemyStateMachine {
    fn default() -> Self {
        Self {
            current: EnemyState::Idle,
            previous: EnemyState::Idle,
        }
    }
}

impl EnemyStateMachine {
    pub fn current(&self) -> EnemyState {
        self.current
    }

    pub fn previous(&self) -> EnemyState {
        self.previous
    }

    pub fn is(&self, state: EnemyState) -> bool {
        self.current == state
    }

    /// Move to `next`. Dead is final.
    pub fn set(&mut self, next: EnemyState) {
        if self.current == EnemyState::Dead || self.current == next {
            return;
        }
        self.previous = self.current;
        self.current = next;
    }

    pub fn is_dead(&self) -> bool {
        self.current == EnemyState::Dead
    }

    pub fn can_move(&self) -> bool {
        !matches!(self.current, EnemyState::Dead | EnemyState::Attacking)
    }

    pub fn can_attack(&self) -> bool {
        !matches!(self.current, EnemyState::Dead | EnemyState::Fleeing)
    }

    pub fn can_flee(&self) -> bool {
        !matches!(
            self.current,
            EnemyState::Dead | EnemyState::Fleeing | EnemyState::Falling | EnemyState::Attacking
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_previous_state() {
        let mut state = EnemyStateMachine::default();
        state.set(EnemyState::Patrolling);
        state.set(EnemyState::Hunting);
        assert_eq!(state.current(), EnemyState::Hunting);
        assert_eq!(state.previous(), EnemyState::Patrolling);
        // Re-entering the same state keeps the history.
        state.set(EnemyState::Hunting);
        assert_eq!(state.previous(), EnemyState::Patrolling);
    }

    #[test]
    fn dead_is_final() {
        let mut state = EnemyStateMachine::default();
        state.set(EnemyState::Dead);
        state.set(EnemyState::Idle);
        assert!(state.is_dead());
        assert!(!state.can_move());
        assert!(!state.can_attack());
        assert!(!state.can_flee());
    }

    #[test]
    fn capabilities() {
        let mut state = EnemyStateMachine::default();
        state.set(EnemyState::Attacking);
        assert!(!state.can_move());
        assert!(state.can_attack());
        state.set(EnemyState::Fleeing);
        assert!(state.can_move());
        assert!(!state.can_attack());
        assert!(!state.can_flee());
    }
}
