use std::sync::{Arc, Mutex};

use tracing::warn;

use super::levels::{ScoreLevel, ScoreLevelSet};

/// Where score-level configuration comes from (the backend in production, a
/// seeded stub in tests and the demo service).
pub trait ScoreLevelSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<ScoreLevel>, SourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("score level source unavailable: {0}")]
    Unavailable(String),
}

struct StoreState {
    levels: ScoreLevelSet,
    has_fetched: bool,
}

/// Process-wide cache of the configured score levels.
///
/// Starts from the canonical defaults so every consumer classifies sanely
/// before the first load resolves. A failed fetch keeps the last known good
/// set and logs a warning; the dashboard stays usable either way.
pub struct ScoreLevelStore<S> {
    source: Arc<S>,
    state: Mutex<StoreState>,
}

impl<S: ScoreLevelSource> ScoreLevelStore<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            state: Mutex::new(StoreState {
                levels: ScoreLevelSet::canonical(),
                has_fetched: false,
            }),
        }
    }

    /// Lazily populate the cache; repeat calls after a successful fetch are
    /// no-ops.
    pub fn load(&self) -> ScoreLevelSet {
        {
            let state = self.state.lock().expect("score level mutex poisoned");
            if state.has_fetched && !state.levels.is_empty() {
                return state.levels.clone();
            }
        }
        self.refresh()
    }

    /// Force a refetch, e.g. after a save or reset elsewhere.
    pub fn refresh(&self) -> ScoreLevelSet {
        match self.source.fetch() {
            Ok(levels) => {
                let set = if levels.is_empty() {
                    ScoreLevelSet::canonical()
                } else {
                    ScoreLevelSet::new(levels)
                };
                let mut state = self.state.lock().expect("score level mutex poisoned");
                state.levels = set.clone();
                state.has_fetched = true;
                set
            }
            Err(err) => {
                warn!(%err, "score level fetch failed, keeping last known good set");
                self.current()
            }
        }
    }

    /// The last known good set, without touching the source.
    pub fn current(&self) -> ScoreLevelSet {
        self.state
            .lock()
            .expect("score level mutex poisoned")
            .levels
            .clone()
    }

    /// Install a wholesale replacement (the PUT path) without a refetch.
    pub fn replace(&self, levels: Vec<ScoreLevel>) -> ScoreLevelSet {
        let set = if levels.is_empty() {
            ScoreLevelSet::canonical()
        } else {
            ScoreLevelSet::new(levels)
        };
        let mut state = self.state.lock().expect("score level mutex poisoned");
        state.levels = set.clone();
        state.has_fetched = true;
        set
    }

    /// Drop back to the canonical defaults (the reset path).
    pub fn reset(&self) -> ScoreLevelSet {
        self.replace(Vec::new())
    }
}
