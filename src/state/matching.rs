//! Two-lane word matching round.

use std::time::Duration;

use thiserror::Error;

use crate::state::{
    Delayed,
    deck::{Card, Lang},
};

/// Overall outcome of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStatus {
    /// Cards left to match and lives left.
    Playing,
    /// Every pair matched.
    Won,
    /// Lives exhausted.
    Lost,
}

/// Transient result of the last evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// The selected cards formed a pair.
    Correct,
    /// The selected cards did not form a pair; they stay selected until the delay elapses.
    Wrong,
}

/// Inputs accepted by [`MatchingRound::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchingEvent {
    /// Toggle the selection of a card in its lane.
    Select {
        /// Card identifier (`"<pair_id>-<lang>"`).
        card_id: String,
    },
    /// Evaluate the current pair of selections.
    Match,
    /// Feedback delay elapsed; ignored unless `token` is still current.
    FeedbackElapsed {
        /// Token of the feedback the timer was scheduled for.
        token: u64,
    },
    /// Replace the deck and reset lives, score and status.
    NewRound {
        /// Freshly built deck.
        deck: Vec<Card>,
    },
}

/// Delays before feedback is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackDelays {
    /// After a correct match.
    pub correct: Duration,
    /// After a wrong match; selections are cleared at the same time.
    pub wrong: Duration,
}

impl Default for FeedbackDelays {
    fn default() -> Self {
        Self {
            correct: Duration::from_millis(250),
            wrong: Duration::from_millis(400),
        }
    }
}

/// Rejected matching inputs. The round is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchingError {
    /// No card with this identifier in the deck.
    #[error("unknown card `{0}`")]
    UnknownCard(String),
    /// Matched cards cannot be selected again.
    #[error("card `{0}` is already matched")]
    AlreadyMatched(String),
    /// The round reached a terminal status.
    #[error("round is over ({0:?})")]
    RoundOver(RoundStatus),
}

/// State of one matching round.
#[derive(Debug, Clone)]
pub struct MatchingRound {
    cards: Vec<Card>,
    selected_ar: Option<String>,
    selected_en: Option<String>,
    lives: u32,
    max_lives: u32,
    score: u32,
    streak: u32,
    best_streak: u32,
    status: RoundStatus,
    feedback: Option<Feedback>,
    feedback_token: u64,
    delays: FeedbackDelays,
}

impl MatchingRound {
    /// Start a round on `deck` with `lives` lives.
    pub fn new(deck: Vec<Card>, lives: u32, delays: FeedbackDelays) -> Self {
        let mut round = Self {
            cards: Vec::new(),
            selected_ar: None,
            selected_en: None,
            lives,
            max_lives: lives,
            score: 0,
            streak: 0,
            best_streak: 0,
            status: RoundStatus::Playing,
            feedback: None,
            feedback_token: 0,
            delays,
        };
        round.reset(deck);
        round
    }

    /// Cards in render order (Arabic lane first).
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Selected card of a lane.
    pub fn selected(&self, lang: Lang) -> Option<&str> {
        match lang {
            Lang::Ar => self.selected_ar.as_deref(),
            Lang::En => self.selected_en.as_deref(),
        }
    }

    /// Lives left.
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Correct matches so far.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Consecutive correct matches.
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Longest streak of the round.
    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    /// Current status.
    pub fn status(&self) -> RoundStatus {
        self.status
    }

    /// Pending feedback, if any.
    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    /// Pairs still to be found.
    pub fn remaining_pairs(&self) -> usize {
        self.cards
            .iter()
            .filter(|card| card.lang == Lang::Ar && !card.matched)
            .count()
    }

    /// Apply an event, returning the delayed event to schedule, if any.
    pub fn apply(
        &mut self,
        event: MatchingEvent,
    ) -> Result<Option<Delayed<MatchingEvent>>, MatchingError> {
        match event {
            MatchingEvent::Select { card_id } => self.select(&card_id).map(|()| None),
            MatchingEvent::Match => self.evaluate(),
            MatchingEvent::FeedbackElapsed { token } => {
                if token == self.feedback_token {
                    self.clear_feedback();
                }
                Ok(None)
            }
            MatchingEvent::NewRound { deck } => {
                self.reset(deck);
                Ok(None)
            }
        }
    }

    fn reset(&mut self, deck: Vec<Card>) {
        self.status = if deck.iter().all(|card| card.matched) {
            RoundStatus::Won
        } else {
            RoundStatus::Playing
        };
        self.cards = deck;
        self.selected_ar = None;
        self.selected_en = None;
        self.lives = self.max_lives;
        self.score = 0;
        self.streak = 0;
        self.best_streak = 0;
        self.feedback = None;
        self.feedback_token += 1;
    }

    fn ensure_playing(&self) -> Result<(), MatchingError> {
        match self.status {
            RoundStatus::Playing => Ok(()),
            other => Err(MatchingError::RoundOver(other)),
        }
    }

    fn select(&mut self, card_id: &str) -> Result<(), MatchingError> {
        self.ensure_playing()?;
        let card = self
            .cards
            .iter()
            .find(|card| card.id == card_id)
            .ok_or_else(|| MatchingError::UnknownCard(card_id.to_string()))?;
        if card.matched {
            return Err(MatchingError::AlreadyMatched(card_id.to_string()));
        }
        let lang = card.lang;

        // Acting before the wrong-feedback timer fires applies its effect early.
        if self.feedback.is_some() {
            self.clear_feedback();
        }

        let slot = match lang {
            Lang::Ar => &mut self.selected_ar,
            Lang::En => &mut self.selected_en,
        };
        if slot.as_deref() == Some(card_id) {
            *slot = None;
        } else {
            *slot = Some(card_id.to_string());
        }
        Ok(())
    }

    fn evaluate(&mut self) -> Result<Option<Delayed<MatchingEvent>>, MatchingError> {
        self.ensure_playing()?;
        if self.feedback == Some(Feedback::Wrong) {
            return Ok(None);
        }
        let (Some(ar_id), Some(en_id)) = (self.selected_ar.clone(), self.selected_en.clone())
        else {
            return Ok(None);
        };

        let pair_of = |id: &str| {
            self.cards
                .iter()
                .find(|card| card.id == id)
                .map(|card| card.pair_id.clone())
        };
        let correct = matches!((pair_of(&ar_id), pair_of(&en_id)), (Some(a), Some(b)) if a == b);

        self.feedback_token += 1;
        let token = self.feedback_token;

        if correct {
            for card in self
                .cards
                .iter_mut()
                .filter(|card| card.id == ar_id || card.id == en_id)
            {
                card.matched = true;
            }
            self.selected_ar = None;
            self.selected_en = None;
            self.score += 1;
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
            self.feedback = Some(Feedback::Correct);
            if self.remaining_pairs() == 0 {
                self.status = RoundStatus::Won;
            }
            Ok(Some(Delayed {
                after: self.delays.correct,
                event: MatchingEvent::FeedbackElapsed { token },
            }))
        } else {
            self.lives = self.lives.saturating_sub(1);
            self.streak = 0;
            self.feedback = Some(Feedback::Wrong);
            if self.lives == 0 {
                self.status = RoundStatus::Lost;
            }
            Ok(Some(Delayed {
                after: self.delays.wrong,
                event: MatchingEvent::FeedbackElapsed { token },
            }))
        }
    }

    fn clear_feedback(&mut self) {
        if self.feedback == Some(Feedback::Wrong) {
            self.selected_ar = None;
            self.selected_en = None;
        }
        self.feedback = None;
        self.feedback_token += 1;
    }
}
