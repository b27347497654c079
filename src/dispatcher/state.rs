/// Progress of one dispatch call through the model list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    /// `attempt` counts from 0 within this call; `index` is the model position.
    Attempting { attempt: usize, index: usize },
    Success { index: usize },
    Exhausted,
}

/// Walks `len` models once each, starting at `start` and wrapping.
#[derive(Debug, Clone, Copy)]
pub struct ModelCursor {
    start: usize,
    len: usize,
}

impl ModelCursor {
    pub fn new(start: usize, len: usize) -> Self {
        let start = if len == 0 { 0 } else { start % len };
        Self { start, len }
    }

    /// Leave `Idle`. An empty model list is exhausted immediately.
    pub fn begin(&self) -> DispatchState {
        if self.len == 0 {
            DispatchState::Exhausted
        } else {
            DispatchState::Attempting {
                attempt: 0,
                index: self.start,
            }
        }
    }

    pub fn succeed(&self, state: DispatchState) -> DispatchState {
        match state {
            DispatchState::Attempting { index, .. } => DispatchState::Success { index },
            other => other,
        }
    }

    pub fn fail(&self, state: DispatchState) -> DispatchState {
        match state {
            DispatchState::Attempting { attempt, .. } if attempt + 1 < self.len => {
                let next = attempt + 1;
                DispatchState::Attempting {
                    attempt: next,
                    index: (self.start + next) % self.len,
                }
            }
            DispatchState::Attempting { .. } => DispatchState::Exhausted,
            other => other,
        }
    }
}
