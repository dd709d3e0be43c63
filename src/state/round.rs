//! Round controller shared by the drill-style games.
//!
//! `loading -> ready <-> transitioning -> finished | lost | error`. The
//! controller never performs I/O: it returns [`RoundEffect`]s that the caller
//! turns into fetches and timers, and fetch results come back as events
//! tagged with the generation they were requested under.

use std::time::Duration;

use rand::{Rng, seq::SliceRandom};
use thiserror::Error;

use crate::state::{
    Delayed,
    progress::{AskedLog, Tracked},
};

/// Message shown when the source returned no rows.
pub const NO_QUESTIONS_MESSAGE: &str = "No questions found.";

/// Lifecycle phase of a round.
///
/// Without lives every grade moves on to the next item. With lives a wrong
/// answer keeps the round in `Ready` on the same item until lives run out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundPhase {
    /// Waiting for the question set.
    Loading,
    /// Current item accepts a grade.
    Ready,
    /// Graded; waiting for the advance timer.
    Transitioning,
    /// Advanced past the last item.
    Finished,
    /// Lives exhausted.
    Lost,
    /// Fetch failed or returned nothing; retry with a new load.
    Error {
        /// User-facing explanation.
        message: String,
    },
}

impl RoundPhase {
    /// Short machine-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            RoundPhase::Loading => "loading",
            RoundPhase::Ready => "ready",
            RoundPhase::Transitioning => "transitioning",
            RoundPhase::Finished => "finished",
            RoundPhase::Lost => "lost",
            RoundPhase::Error { .. } => "error",
        }
    }
}

/// Inputs accepted by [`RoundController::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum RoundEvent<Q> {
    /// Re-fetch the question set (explicit retry or restart).
    Load,
    /// Fetch completed.
    Loaded {
        /// Generation the fetch was requested under.
        generation: u64,
        /// Rows decoded into items, or a user-facing failure message.
        result: Result<Vec<Q>, String>,
    },
    /// Grade the current item.
    Grade {
        /// Whether the player's response was right.
        correct: bool,
    },
    /// Move past the graded item.
    Advance {
        /// Ticket of the grade this advance belongs to.
        ticket: u64,
    },
    /// Restart on the in-memory deck without fetching.
    Reshuffle,
}

impl<Q> RoundEvent<Q> {
    fn name(&self) -> &'static str {
        match self {
            RoundEvent::Load => "load",
            RoundEvent::Loaded { .. } => "loaded",
            RoundEvent::Grade { .. } => "grade",
            RoundEvent::Advance { .. } => "advance",
            RoundEvent::Reshuffle => "reshuffle",
        }
    }
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundEffect<Q> {
    /// Fetch the question set and answer with [`RoundEvent::Loaded`].
    Fetch {
        /// Generation to echo back.
        generation: u64,
    },
    /// Deliver an event after a delay.
    Schedule(Delayed<RoundEvent<Q>>),
}

/// Delays between a grade and the advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeDelays {
    /// After a correct answer.
    pub correct: Duration,
    /// After a wrong answer.
    pub wrong: Duration,
}

impl Default for GradeDelays {
    fn default() -> Self {
        Self {
            correct: Duration::from_millis(350),
            wrong: Duration::from_millis(450),
        }
    }
}

/// Error returned when an event is not valid in the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event} cannot be applied while {}", .from.name())]
pub struct InvalidTransition {
    /// Phase the controller was in.
    pub from: RoundPhase,
    /// Name of the rejected event.
    pub event: &'static str,
}

/// Rejected round events. State is untouched in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    /// Event not valid in the current phase.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    /// Result of a superseded fetch.
    #[error("discarding fetch result of generation {got}, expected {expected}")]
    StaleFetch {
        /// Generation currently awaited.
        expected: u64,
        /// Generation carried by the result.
        got: u64,
    },
    /// Advance scheduled for a grade that was superseded.
    #[error("discarding stale advance timer")]
    StaleTimer,
}

/// Round state: canonical model of a drill session.
#[derive(Debug, Clone)]
pub struct RoundController<Q> {
    phase: RoundPhase,
    items: Vec<Q>,
    current_index: usize,
    score: u32,
    lives: Option<u32>,
    max_lives: Option<u32>,
    asked: AskedLog<Q>,
    last_correct: Option<bool>,
    generation: u64,
    ticket: u64,
    delays: GradeDelays,
}

impl<Q: Tracked + Clone> RoundController<Q> {
    /// Create a controller in `loading`, returning the initial fetch.
    pub fn start(lives: Option<u32>, delays: GradeDelays) -> (Self, RoundEffect<Q>) {
        let controller = Self {
            phase: RoundPhase::Loading,
            items: Vec::new(),
            current_index: 0,
            score: 0,
            lives,
            max_lives: lives,
            asked: AskedLog::new(),
            last_correct: None,
            generation: 1,
            ticket: 0,
            delays,
        };
        (controller, RoundEffect::Fetch { generation: 1 })
    }

    /// Current phase.
    pub fn phase(&self) -> &RoundPhase {
        &self.phase
    }

    /// Item under play, if any.
    pub fn current(&self) -> Option<&Q> {
        match self.phase {
            RoundPhase::Ready | RoundPhase::Transitioning => self.items.get(self.current_index),
            _ => None,
        }
    }

    /// Index of the current item.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Number of items in the deck.
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Correct answers so far.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Lives left, when the round has lives.
    pub fn lives(&self) -> Option<u32> {
        self.lives
    }

    /// Outcome of the last grade.
    pub fn last_correct(&self) -> Option<bool> {
        self.last_correct
    }

    /// Graded items, newest first.
    pub fn asked(&self) -> &AskedLog<Q> {
        &self.asked
    }

    /// Fetch generation currently awaited.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply an event. Returns the effects to run, or an error leaving the state untouched.
    pub fn apply<R: Rng + ?Sized>(
        &mut self,
        event: RoundEvent<Q>,
        rng: &mut R,
    ) -> Result<Vec<RoundEffect<Q>>, RoundError> {
        let name = event.name();
        match (self.phase.clone(), event) {
            (_, RoundEvent::Load) => {
                self.generation += 1;
                self.ticket += 1;
                self.phase = RoundPhase::Loading;
                Ok(vec![RoundEffect::Fetch {
                    generation: self.generation,
                }])
            }
            (RoundPhase::Loading, RoundEvent::Loaded { generation, result }) => {
                if generation != self.generation {
                    return Err(RoundError::StaleFetch {
                        expected: self.generation,
                        got: generation,
                    });
                }
                match result {
                    Ok(items) if items.is_empty() => {
                        self.items.clear();
                        self.phase = RoundPhase::Error {
                            message: NO_QUESTIONS_MESSAGE.to_string(),
                        };
                    }
                    Ok(items) => {
                        self.items = items;
                        self.restart(rng);
                    }
                    Err(message) => {
                        self.items.clear();
                        self.phase = RoundPhase::Error { message };
                    }
                }
                Ok(Vec::new())
            }
            (_, RoundEvent::Loaded { generation, .. }) => Err(RoundError::StaleFetch {
                expected: self.generation,
                got: generation,
            }),
            (RoundPhase::Ready, RoundEvent::Grade { correct }) => {
                if let Some(item) = self.items.get(self.current_index) {
                    self.asked.mark(item);
                }
                self.last_correct = Some(correct);
                self.ticket += 1;

                if correct {
                    self.score += 1;
                } else if let Some(lives) = self.lives.as_mut() {
                    // With lives, a miss costs one and the same item stays up.
                    *lives = lives.saturating_sub(1);
                    if *lives == 0 {
                        self.phase = RoundPhase::Lost;
                    }
                    return Ok(Vec::new());
                }

                self.phase = RoundPhase::Transitioning;
                let after = if correct {
                    self.delays.correct
                } else {
                    self.delays.wrong
                };
                Ok(vec![RoundEffect::Schedule(Delayed {
                    after,
                    event: RoundEvent::Advance {
                        ticket: self.ticket,
                    },
                })])
            }
            (RoundPhase::Transitioning, RoundEvent::Advance { ticket }) => {
                if ticket != self.ticket {
                    return Err(RoundError::StaleTimer);
                }
                if self.current_index + 1 < self.items.len() {
                    self.current_index += 1;
                    self.phase = RoundPhase::Ready;
                } else {
                    self.phase = RoundPhase::Finished;
                }
                Ok(Vec::new())
            }
            (_, RoundEvent::Advance { .. }) => Err(RoundError::StaleTimer),
            (
                RoundPhase::Ready
                | RoundPhase::Transitioning
                | RoundPhase::Finished
                | RoundPhase::Lost,
                RoundEvent::Reshuffle,
            ) => {
                self.restart(rng);
                Ok(Vec::new())
            }
            (from, _) => Err(InvalidTransition {
                from,
                event: name,
            }
            .into()),
        }
    }

    fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.items.shuffle(rng);
        self.current_index = 0;
        self.score = 0;
        self.lives = self.max_lives;
        self.asked.clear();
        self.last_correct = None;
        self.ticket += 1;
        self.phase = RoundPhase::Ready;
    }
}
