use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    dao::models::SavedGameEntity,
    dto::{
        format_system_time,
        validation::{validate_category_names, validate_game_name},
    },
    state::trivia::{Clue, TriviaGame},
};

/// Teams per game.
pub const TEAMS_MIN: usize = 2;
/// Teams per game.
pub const TEAMS_MAX: usize = 5;
/// Board columns per game.
pub const CATEGORIES_MIN: usize = 3;
/// Board columns per game.
pub const CATEGORIES_MAX: usize = 6;

fn count_error(
    code: &'static str,
    what: &str,
    min: usize,
    max: usize,
    got: usize,
) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(format!("Pick between {min} and {max} {what} (got {got})").into());
    err
}

fn validate_setup(
    errors: &mut ValidationErrors,
    name: &str,
    teams: usize,
    categories: &[String],
) {
    if let Err(err) = validate_game_name(name) {
        errors.add("name", err);
    }
    if !(TEAMS_MIN..=TEAMS_MAX).contains(&teams) {
        errors.add(
            "teams",
            count_error("teams_count", "teams", TEAMS_MIN, TEAMS_MAX, teams),
        );
    }
    if !(CATEGORIES_MIN..=CATEGORIES_MAX).contains(&categories.len()) {
        errors.add(
            "categories",
            count_error(
                "categories_count",
                "categories",
                CATEGORIES_MIN,
                CATEGORIES_MAX,
                categories.len(),
            ),
        );
    }
    if let Err(err) = validate_category_names(categories) {
        errors.add("categories", err);
    }
}

fn into_result(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Board built from the hosted clue table.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBoardRequest {
    pub name: String,
    /// Team names; blank names render as `Team <n>`.
    pub teams: Vec<String>,
    /// Categories in column order.
    pub categories: Vec<String>,
}

impl Validate for CreateBoardRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_setup(&mut errors, &self.name, self.teams.len(), &self.categories);
        into_result(errors)
    }
}

/// Hand-authored clue.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CustomClueInput {
    pub question: String,
    pub answer: String,
}

/// Hand-authored column; clues fill the point tiers in order.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CustomCategoryInput {
    pub name: String,
    pub clues: Vec<CustomClueInput>,
}

/// Board whose clues are typed in by the host.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CustomBoardRequest {
    pub name: String,
    pub teams: Vec<String>,
    pub categories: Vec<CustomCategoryInput>,
}

impl CustomBoardRequest {
    pub fn category_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|category| category.name.trim().to_string())
            .collect()
    }
}

impl Validate for CustomBoardRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_setup(
            &mut errors,
            &self.name,
            self.teams.len(),
            &self.category_names(),
        );

        let blank_clue = self.categories.iter().flat_map(|c| &c.clues).any(|clue| {
            clue.question.trim().is_empty() || clue.answer.trim().is_empty()
        });
        if blank_clue {
            let mut err = ValidationError::new("clue_blank");
            err.message = Some("Every clue needs a question and an answer".into());
            errors.add("categories", err);
        }
        if let Some(empty) = self.categories.iter().find(|c| c.clues.is_empty()) {
            let mut err = ValidationError::new("category_empty");
            err.message = Some(format!("Category `{}` has no clues", empty.name.trim()).into());
            errors.add("categories", err);
        }
        into_result(errors)
    }
}

/// New team names; accepted only before the first clue is asked.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RenameTeamsRequest {
    #[validate(length(min = 2, max = 5))]
    pub teams: Vec<String>,
}

/// Cell to open.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OpenClueRequest {
    pub category: String,
    pub points: u32,
}

/// Score adjustment for one team.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScoreRequest {
    /// Zero-based team index.
    pub team: usize,
    /// Points to add (negative to subtract); the configured step when omitted.
    #[serde(default)]
    pub delta: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamView {
    pub index: usize,
    pub name: String,
    pub score: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CellView {
    pub points: u32,
    /// False when the board has no clue for this tier.
    pub available: bool,
    pub asked: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ColumnView {
    pub category: String,
    pub cells: Vec<CellView>,
}

/// Clue with both sides visible, as listed in the history.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClueView {
    pub category: String,
    pub points: u32,
    pub question: String,
    pub answer: String,
}

impl From<&Clue> for ClueView {
    fn from(clue: &Clue) -> Self {
        Self {
            category: clue.category.clone(),
            points: clue.points,
            question: clue.question.clone(),
            answer: clue.answer.clone(),
        }
    }
}

/// Flashcard overlay. The answer is only sent once the card was flipped.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OpenClueView {
    pub category: String,
    pub points: u32,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub flipped: bool,
}

/// Full state of a trivia board.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TriviaSnapshot {
    pub id: Uuid,
    pub name: String,
    pub teams: Vec<TeamView>,
    pub columns: Vec<ColumnView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_clue: Option<OpenClueView>,
    /// Revealed clues, newest first.
    pub history: Vec<ClueView>,
    pub complete: bool,
}

impl TriviaSnapshot {
    /// Project a game onto the configured point tiers.
    pub fn from_game(game: &TriviaGame, tiers: &[u32]) -> Self {
        let teams = game
            .scores()
            .iter()
            .enumerate()
            .map(|(index, score)| TeamView {
                index,
                name: game.team_name(index),
                score: *score,
            })
            .collect();

        let columns = game
            .categories()
            .iter()
            .map(|category| {
                let column = game.board().get(category);
                let cells = tiers
                    .iter()
                    .map(|&points| {
                        let clue = column.and_then(|column| column.get(&points));
                        CellView {
                            points,
                            available: clue.is_some(),
                            asked: clue.is_some_and(|clue| game.asked().contains(&clue.key())),
                        }
                    })
                    .collect();
                ColumnView {
                    category: category.clone(),
                    cells,
                }
            })
            .collect();

        let open_clue = game.open_clue().map(|open| OpenClueView {
            category: open.clue.category.clone(),
            points: open.clue.points,
            question: open.clue.question.clone(),
            answer: open.flipped.then(|| open.clue.answer.clone()),
            flipped: open.flipped,
        });

        Self {
            id: game.id(),
            name: game.name().to_string(),
            teams,
            columns,
            open_clue,
            history: game.asked().history().iter().map(Into::into).collect(),
            complete: game.is_complete(),
        }
    }
}

/// Saved game as listed on the setup screen.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SavedGameSummary {
    pub id: Uuid,
    pub name: String,
    pub teams: Vec<String>,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// True once at least one clue was asked.
    pub can_resume: bool,
    pub asked_count: usize,
}

impl From<SavedGameEntity> for SavedGameSummary {
    fn from(value: SavedGameEntity) -> Self {
        let SavedGameEntity { record, can_resume } = value;
        Self {
            id: record.id,
            asked_count: record
                .progress
                .as_ref()
                .map_or(0, |progress| progress.asked_clues.len()),
            name: record.name,
            teams: record.teams,
            categories: record.categories,
            created_at: record.created_at.map(format_system_time),
            can_resume,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::state::trivia::{Board, ScoreFloor};

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn create_request_bounds() {
        let ok = CreateBoardRequest {
            name: "Friday".into(),
            teams: names(&["A", "B"]),
            categories: names(&["Prophets", "Places", "Surahs"]),
        };
        assert!(ok.validate().is_ok());

        let bad = CreateBoardRequest {
            name: "F".into(),
            teams: names(&["A"]),
            categories: names(&["Prophets", "prophets", "Surahs"]),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("teams"));
        assert!(fields.contains_key("categories"));
    }

    #[test]
    fn custom_request_rejects_blank_clues() {
        let category = |name: &str, answer: &str| CustomCategoryInput {
            name: name.into(),
            clues: vec![CustomClueInput {
                question: "Who?".into(),
                answer: answer.into(),
            }],
        };
        let request = CustomBoardRequest {
            name: "Custom".into(),
            teams: names(&["A", "B"]),
            categories: vec![category("One", "x"), category("Two", "y"), category("Three", " ")],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn snapshot_marks_absent_cells_and_hides_unflipped_answer() {
        let clue = Clue {
            id: "7".into(),
            category: "Prophets".into(),
            points: 100,
            question: "Who built the ark?".into(),
            answer: "Nuh".into(),
        };
        let mut board = Board::new();
        board.insert("Prophets".into(), BTreeMap::from([(100, clue)]));
        let mut game = TriviaGame::new(
            "Friday".into(),
            names(&["Red", ""]),
            names(&["Prophets"]),
            board,
            ScoreFloor::None,
        );
        game.open("Prophets", 100).unwrap();

        let snapshot = TriviaSnapshot::from_game(&game, &[100, 200]);
        let cells = &snapshot.columns[0].cells;
        assert!(cells[0].available);
        assert!(!cells[1].available);
        assert_eq!(snapshot.teams[1].name, "Team 2");
        assert!(snapshot.open_clue.as_ref().unwrap().answer.is_none());

        game.flip().unwrap();
        let snapshot = TriviaSnapshot::from_game(&game, &[100, 200]);
        assert_eq!(snapshot.open_clue.unwrap().answer.as_deref(), Some("Nuh"));
    }
}
