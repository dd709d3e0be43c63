//! Randomised presentation order for matching decks and trivia boards.
//!
//! Every builder takes the RNG as a parameter so callers decide between the
//! thread RNG and a seeded one.

use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;
use rand::{
    Rng,
    seq::{IndexedRandom, SliceRandom},
};

use crate::{
    dao::models::VocabPairEntity,
    state::trivia::{Board, Clue},
};

/// Lane a matching card is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    /// Arabic lane, rendered first.
    Ar,
    /// English lane.
    En,
}

impl Lang {
    /// Suffix used in card identifiers.
    pub fn as_str(self) -> &'static str {
        match self {
            Lang::Ar => "ar",
            Lang::En => "en",
        }
    }
}

/// One face-up card of a matching round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// `"<pair_id>-<lang>"`.
    pub id: String,
    /// Pairing key shared with exactly one card of the other lane.
    pub pair_id: String,
    /// Lane the card belongs to.
    pub lang: Lang,
    /// Text shown on the card.
    pub label: String,
    /// One-way flag, set once the pair was found.
    pub matched: bool,
}

impl Card {
    fn new(pair: &VocabPairEntity, lang: Lang) -> Self {
        let label = match lang {
            Lang::Ar => pair.ar.clone(),
            Lang::En => pair.en.clone(),
        };
        Self {
            id: format!("{}-{}", pair.id, lang.as_str()),
            pair_id: pair.id.clone(),
            lang,
            label,
            matched: false,
        }
    }
}

/// Keep the first occurrence of every key.
pub fn dedup_by_key<T, K, F>(items: impl IntoIterator<Item = T>, mut key: F) -> Vec<T>
where
    K: Eq + std::hash::Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// Uniformly sample `size` items without replacement.
///
/// With fewer items than requested every item is returned (in random order).
pub fn sample<T: Clone, R: Rng + ?Sized>(items: &[T], size: usize, rng: &mut R) -> Vec<T> {
    let mut pool = items.to_vec();
    pool.shuffle(rng);
    pool.truncate(size);
    pool
}

/// Build a two-lane deck of `size` pairs, each lane shuffled independently.
///
/// The Arabic lane comes first in the returned vector.
pub fn build_matching_deck<R: Rng + ?Sized>(
    pairs: &[VocabPairEntity],
    size: usize,
    rng: &mut R,
) -> Vec<Card> {
    let unique = dedup_by_key(pairs.iter().cloned(), |pair| pair.id.clone());
    let chosen = sample(&unique, size, rng);

    let mut ar = chosen
        .iter()
        .map(|pair| Card::new(pair, Lang::Ar))
        .collect::<Vec<_>>();
    let mut en = chosen
        .iter()
        .map(|pair| Card::new(pair, Lang::En))
        .collect::<Vec<_>>();
    ar.shuffle(rng);
    en.shuffle(rng);

    ar.extend(en);
    ar
}

/// Fill a category x tier grid with one random clue per cell.
///
/// Cells without a candidate are left absent.
pub fn build_board<R: Rng + ?Sized>(
    categories: &[String],
    tiers: &[u32],
    clues: &[Clue],
    rng: &mut R,
) -> Board {
    let mut board: Board = IndexMap::new();
    for category in categories {
        let mut column = BTreeMap::new();
        for &points in tiers {
            let candidates = clues
                .iter()
                .filter(|clue| &clue.category == category && clue.points == points)
                .collect::<Vec<_>>();
            if let Some(clue) = candidates.choose(rng) {
                column.insert(points, (*clue).clone());
            }
        }
        board.insert(category.clone(), column);
    }
    board
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn vocab(count: usize) -> Vec<VocabPairEntity> {
        (1..=count)
            .map(|i| VocabPairEntity {
                id: i.to_string(),
                en: format!("word {i}"),
                ar: format!("كلمة {i}"),
            })
            .collect()
    }

    fn clue(id: &str, category: &str, points: u32) -> Clue {
        Clue {
            id: id.into(),
            category: category.into(),
            points,
            question: format!("question {id}"),
            answer: format!("answer {id}"),
        }
    }

    #[test]
    fn every_deck_is_a_perfect_bipartite_pairing() {
        let pool = vocab(12);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let deck = build_matching_deck(&pool, 8, &mut rng);
            assert_eq!(deck.len(), 16);

            let (ar, en): (Vec<_>, Vec<_>) = deck.iter().partition(|card| card.lang == Lang::Ar);
            assert_eq!(ar.len(), 8);
            assert_eq!(en.len(), 8);
            assert!(deck[..8].iter().all(|card| card.lang == Lang::Ar));

            let mut ar_ids = ar.iter().map(|card| card.pair_id.clone()).collect::<Vec<_>>();
            let mut en_ids = en.iter().map(|card| card.pair_id.clone()).collect::<Vec<_>>();
            ar_ids.sort();
            en_ids.sort();
            assert_eq!(ar_ids, en_ids);
            ar_ids.dedup();
            assert_eq!(ar_ids.len(), 8);
            assert!(deck.iter().all(|card| !card.matched));
        }
    }

    #[test]
    fn small_pool_takes_everything() {
        let mut rng = StdRng::seed_from_u64(7);
        let deck = build_matching_deck(&vocab(3), 8, &mut rng);
        assert_eq!(deck.len(), 6);

        assert!(build_matching_deck(&[], 8, &mut rng).is_empty());
    }

    #[test]
    fn duplicate_pairs_are_dropped() {
        let mut pool = vocab(2);
        pool.push(VocabPairEntity {
            id: "1".into(),
            en: "dupe".into(),
            ar: "dupe".into(),
        });
        let mut rng = StdRng::seed_from_u64(1);
        let deck = build_matching_deck(&pool, 8, &mut rng);
        assert_eq!(deck.len(), 4);
        assert!(deck.iter().all(|card| card.label != "dupe"));
    }

    #[test]
    fn card_ids_follow_pair_and_lane() {
        let mut rng = StdRng::seed_from_u64(3);
        let deck = build_matching_deck(&vocab(1), 1, &mut rng);
        assert_eq!(deck[0].id, "1-ar");
        assert_eq!(deck[0].label, "كلمة 1");
        assert_eq!(deck[1].id, "1-en");
        assert_eq!(deck[1].label, "word 1");
    }

    #[test]
    fn sample_is_a_permutation_of_a_subset() {
        let items = (0..10).collect::<Vec<_>>();
        let mut rng = StdRng::seed_from_u64(11);

        let mut all = sample(&items, 10, &mut rng);
        all.sort();
        assert_eq!(all, items);

        let some = sample(&items, 4, &mut rng);
        assert_eq!(some.len(), 4);
        let unique = some.iter().collect::<HashSet<_>>();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn shuffle_has_no_positional_bias() {
        const RUNS: usize = 8000;
        const SLOTS: usize = 4;
        let items = (0..SLOTS).collect::<Vec<_>>();
        let mut rng = StdRng::seed_from_u64(2024);
        let mut counts = [[0usize; SLOTS]; SLOTS];

        for _ in 0..RUNS {
            let shuffled = sample(&items, SLOTS, &mut rng);
            for (position, item) in shuffled.iter().enumerate() {
                counts[*item][position] += 1;
            }
        }

        let expected = RUNS as f64 / SLOTS as f64;
        for row in counts {
            let chi_square = row
                .iter()
                .map(|&observed| {
                    let delta = observed as f64 - expected;
                    delta * delta / expected
                })
                .sum::<f64>();
            // df = 3, p = 0.0005
            assert!(chi_square < 17.73, "biased slot counts {row:?} ({chi_square})");
        }
    }

    #[test]
    fn board_has_fixed_shape_and_absent_cells() {
        let categories = vec!["Prophets".to_string(), "Places".to_string()];
        let tiers = [100, 200, 300, 400, 500];
        let clues = vec![
            clue("1", "Prophets", 100),
            clue("2", "Prophets", 100),
            clue("3", "Prophets", 300),
            clue("4", "Places", 500),
            clue("5", "Other", 100),
        ];
        let mut rng = StdRng::seed_from_u64(5);

        let board = build_board(&categories, &tiers, &clues, &mut rng);

        assert_eq!(board.keys().collect::<Vec<_>>(), vec!["Prophets", "Places"]);
        let prophets = &board["Prophets"];
        assert_eq!(prophets.keys().copied().collect::<Vec<_>>(), vec![100, 300]);
        assert!(["1", "2"].contains(&prophets[&100].id.as_str()));
        assert_eq!(board["Places"].keys().copied().collect::<Vec<_>>(), vec![500]);
    }

    #[test]
    fn board_cells_pick_among_candidates() {
        let categories = vec!["Prophets".to_string()];
        let clues = vec![clue("1", "Prophets", 100), clue("2", "Prophets", 100)];
        let mut picked = HashMap::new();
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let board = build_board(&categories, &[100], &clues, &mut rng);
            *picked.entry(board["Prophets"][&100].id.clone()).or_insert(0) += 1;
        }
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let kept = dedup_by_key(vec![(1, "a"), (2, "b"), (1, "c")], |item| item.0);
        assert_eq!(kept, vec![(1, "a"), (2, "b")]);
    }
}
