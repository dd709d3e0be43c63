use rand::rng;
use tracing::debug;

use crate::{
    dto::memo::{AdjacentQuery, VerseQuery, VerseResponse},
    error::ServiceError,
    state::{SharedState, verse::VerseRange},
};

/// Pick a random verse inside the requested range.
pub fn random_verse(state: &SharedState, query: VerseQuery) -> Result<VerseResponse, ServiceError> {
    let range = VerseRange::new(query.mode.into(), query.start, query.end)?;
    let verse = state.verses().pick(&range, &mut rng())?;
    debug!(
        surah = verse.surah,
        ayah = verse.ayah,
        lower = range.lower(),
        upper = range.upper(),
        "verse picked"
    );
    Ok(VerseResponse::new(verse, query.preview_words))
}

/// Step from a verse to its neighbour inside the same range.
pub fn adjacent_verse(
    state: &SharedState,
    query: AdjacentQuery,
) -> Result<VerseResponse, ServiceError> {
    let range = VerseRange::new(query.mode.into(), query.start, query.end)?;
    let verse = state
        .verses()
        .adjacent(&range, query.surah, query.ayah, query.offset)?;
    Ok(VerseResponse::new(verse, query.preview_words))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            kv_store::MemoryKeyValueStore, models::VerseEntity,
            question_source::MemoryQuestionSource,
        },
        dto::memo::RangeModeDto,
        state::{AppState, verse::VerseCatalog},
    };

    fn verse(surah: u16, ayah: u16, juz: u8, text: &str) -> VerseEntity {
        VerseEntity {
            surah,
            ayah,
            juz,
            text: text.into(),
            surah_name: None,
        }
    }

    fn app() -> SharedState {
        AppState::new(
            AppConfig::in_memory(),
            Arc::new(MemoryKeyValueStore::new()),
            Arc::new(MemoryQuestionSource::new()),
            VerseCatalog::new(vec![
                verse(1, 1, 1, "بسم الله الرحمن الرحيم"),
                verse(1, 2, 1, "الحمد لله رب العالمين"),
                verse(112, 1, 30, "قل هو الله أحد"),
            ]),
        )
    }

    fn query(mode: RangeModeDto, start: u16, end: u16) -> VerseQuery {
        VerseQuery {
            mode,
            start,
            end,
            preview_words: Some(2),
        }
    }

    #[test]
    fn picks_inside_range_with_preview() {
        let state = app();
        let picked = random_verse(&state, query(RangeModeDto::Juz, 30, 30)).unwrap();
        assert_eq!((picked.surah, picked.ayah), (112, 1));
        assert_eq!(picked.preview, "قل هو");
        assert_eq!(picked.word_count, 4);
    }

    #[test]
    fn invalid_and_empty_ranges_are_rejected() {
        let state = app();
        let err = random_verse(&state, query(RangeModeDto::Surah, 0, 3)).unwrap_err();
        assert_eq!(err.to_string(), "invalid input: Invalid Surah range.");
        let err = random_verse(&state, query(RangeModeDto::Surah, 50, 60)).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn adjacent_stays_inside_range() {
        let state = app();
        let next = adjacent_verse(
            &state,
            AdjacentQuery {
                mode: RangeModeDto::Surah,
                start: 1,
                end: 1,
                surah: 1,
                ayah: 2,
                offset: 1,
                preview_words: None,
            },
        )
        .unwrap();
        assert_eq!((next.surah, next.ayah), (1, 2));
    }
}
