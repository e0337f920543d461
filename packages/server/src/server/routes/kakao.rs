//! Kakao skill webhook. The platform expects 200 with a skill payload no
//! matter what happened, so failures answer with an apology message instead
//! of an error status.

use axum::extract::Extension;
use axum::Json;
use tracing::error;

use crate::common::{DomainError, SearchDate};
use crate::server::app::AppState;
use crate::server::kakao::{formatter, parser, Command, SkillPayload, SkillResponse};

pub async fn kakao_skill_handler(
    Extension(state): Extension<AppState>,
    Json(payload): Json<SkillPayload>,
) -> Json<SkillResponse> {
    let utterance = payload.utterance();
    let response = match answer(&state, utterance).await {
        Ok(response) => response,
        Err(e) => {
            error!(utterance, "kakao skill failed: {e}");
            formatter::failure_message()
        }
    };
    Json(response)
}

async fn answer(state: &AppState, utterance: &str) -> Result<SkillResponse, DomainError> {
    Ok(match parser::parse(utterance) {
        Command::Help => formatter::help_message(),
        Command::SearchByCode(code) => {
            formatter::format_routes(&state.search.by_line_code(&code).await?)
        }
        Command::SearchByCar(number) => {
            formatter::format_routes(&state.search.by_car_number(&number).await?)
        }
        Command::SearchByName(name) => {
            formatter::format_routes(&state.search.by_line_name(&name).await?)
        }
        Command::TodayStats => {
            let date = SearchDate::default_for_crawling().to_string();
            formatter::format_stats(&state.search.stats(&date).await?, &date)
        }
        Command::YesterdayStats => {
            let date = SearchDate::yesterday().to_string();
            formatter::format_stats(&state.search.stats(&date).await?, &date)
        }
        Command::Unknown(text) => formatter::error_message(&text),
    })
}
