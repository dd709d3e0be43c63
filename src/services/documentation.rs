use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for AyahVault Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::matching::start_round,
        crate::routes::matching::get_round,
        crate::routes::matching::select_card,
        crate::routes::matching::evaluate,
        crate::routes::matching::new_round,
        crate::routes::matching::delete_round,
        crate::routes::quiz::create_session,
        crate::routes::quiz::get_session,
        crate::routes::quiz::answer,
        crate::routes::quiz::restart,
        crate::routes::quiz::delete_session,
        crate::routes::trivia::list_categories,
        crate::routes::trivia::list_games,
        crate::routes::trivia::create_game,
        crate::routes::trivia::create_custom_game,
        crate::routes::trivia::get_game,
        crate::routes::trivia::rename_teams,
        crate::routes::trivia::open_clue,
        crate::routes::trivia::flip_clue,
        crate::routes::trivia::close_clue,
        crate::routes::trivia::adjust_score,
        crate::routes::trivia::leave_game,
        crate::routes::trivia::delete_game,
        crate::routes::memo::random_verse,
        crate::routes::memo::adjacent_verse,
        crate::routes::input::press_key,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::common::ActionResponse,
            crate::dto::matching::StartMatchingRequest,
            crate::dto::matching::SelectCardRequest,
            crate::dto::matching::MatchingSnapshot,
            crate::dto::matching::CardView,
            crate::dto::matching::LaneDto,
            crate::dto::matching::RoundStatusDto,
            crate::dto::matching::FeedbackDto,
            crate::dto::quiz::StartQuizRequest,
            crate::dto::quiz::RestartRequest,
            crate::dto::quiz::AnswerRequest,
            crate::dto::quiz::AnswerOutcome,
            crate::dto::quiz::PairDto,
            crate::dto::quiz::SideDto,
            crate::dto::quiz::QuizSnapshot,
            crate::dto::quiz::QuizPhaseDto,
            crate::dto::quiz::QuestionView,
            crate::dto::quiz::QuestionContent,
            crate::dto::quiz::VerseOptionView,
            crate::dto::quiz::LocationOptionView,
            crate::dto::trivia::CreateBoardRequest,
            crate::dto::trivia::CustomBoardRequest,
            crate::dto::trivia::CustomCategoryInput,
            crate::dto::trivia::CustomClueInput,
            crate::dto::trivia::RenameTeamsRequest,
            crate::dto::trivia::OpenClueRequest,
            crate::dto::trivia::ScoreRequest,
            crate::dto::trivia::CategoriesResponse,
            crate::dto::trivia::TriviaSnapshot,
            crate::dto::trivia::TeamView,
            crate::dto::trivia::ColumnView,
            crate::dto::trivia::CellView,
            crate::dto::trivia::ClueView,
            crate::dto::trivia::OpenClueView,
            crate::dto::trivia::SavedGameSummary,
            crate::dto::memo::RangeModeDto,
            crate::dto::memo::VerseResponse,
            crate::dto::input::KeyPressRequest,
            crate::dto::input::KeyDto,
            crate::dto::input::InputOutcome,
            crate::dto::input::ViewDto,
            crate::dto::input::InputActionDto,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "matching", description = "AraBuddy word matching rounds"),
        (name = "quiz", description = "HifzBuddy verse drill sessions"),
        (name = "trivia", description = "TriviaBuddy boards and saved games"),
        (name = "memo", description = "MemoBuddy random verse picker"),
        (name = "input", description = "Key presses routed to live sessions"),
    )
)]
pub struct ApiDoc;
