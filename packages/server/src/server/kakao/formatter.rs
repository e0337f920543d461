//! Chat response formatting. All user-facing copy is Korean; the bot serves
//! dispatch operators at Korean freight terminals.

use crate::domains::routes::{Route, RouteStats};

use super::types::SkillResponse;

const LIST_LIMIT: usize = 10;

pub fn help_message() -> SkillResponse {
    SkillResponse::simple_text(
        "[물류 조회 도움말]\n\n\
         검색 명령어:\n\
         • 노선 101102 - 노선코드로 검색\n\
         • 차량 4536 - 차량번호로 검색\n\
         • 도착 연희동 - 노선명으로 검색\n\
         • 오늘 현황 - 오늘 전체 현황\n\
         • 어제 현황 - 어제 전체 현황\n\n\
         예시:\n\
         \"노선 101102\"\n\
         \"차량 충북80아4536\"\n\
         \"도착 마포\"",
    )
}

pub fn error_message(utterance: &str) -> SkillResponse {
    SkillResponse::simple_text(format!(
        "\"{utterance}\"를 이해하지 못했습니다.\n\n\"도움말\"을 입력하면 사용법을 볼 수 있습니다."
    ))
}

pub fn failure_message() -> SkillResponse {
    SkillResponse::simple_text("처리 중 오류가 발생했습니다.")
}

pub fn format_routes(routes: &[Route]) -> SkillResponse {
    if routes.is_empty() {
        return SkillResponse::simple_text("검색 결과가 없습니다.");
    }

    let mut text = format!("[검색 결과 {}건]\n", routes.len());
    for (i, route) in routes.iter().take(LIST_LIMIT).enumerate() {
        text.push_str(&format!(
            "\n{}. {}\n   차량: {}\n   건수: {} | 수량: {}\n   운임: {}원\n",
            i + 1,
            route.line_name.as_deref().unwrap_or("-"),
            route.car_number.as_deref().unwrap_or("-"),
            route.count,
            route.quantity,
            format_number(route.total_fare),
        ));
    }
    if routes.len() > LIST_LIMIT {
        text.push_str(&format!("\n... 외 {}건", routes.len() - LIST_LIMIT));
    }

    SkillResponse::simple_text(text)
}

pub fn format_stats(stats: &RouteStats, date: &str) -> SkillResponse {
    if stats.total_routes == 0 {
        return SkillResponse::simple_text(format!("{date} 데이터가 없습니다."));
    }

    let formatted_date = if date.len() == 8 {
        format!("{}-{}-{}", &date[..4], &date[4..6], &date[6..8])
    } else {
        date.to_string()
    };

    SkillResponse::text_card(
        format!("{formatted_date} 배차 현황"),
        format!(
            "총 노선: {}개\n총 건수: {}건\n총 수량: {}개\n총 운임: {}원",
            stats.total_routes,
            stats.total_count,
            stats.total_quantity,
            format_number(stats.total_fare),
        ),
    )
}

/// Thousands-separated decimal, e.g. 1250000 -> "1,250,000".
fn format_number(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    let offset = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - offset) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
