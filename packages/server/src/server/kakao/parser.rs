//! Utterance parsing for the chatbot. Commands are keyword-prefixed
//! ("노선 101102", "차량 4536", "도착 마포"); a bare 4-6 digit message is
//! treated as a line code search.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    SearchByCode(String),
    SearchByCar(String),
    SearchByName(String),
    TodayStats,
    YesterdayStats,
    Unknown(String),
}

pub fn parse(utterance: &str) -> Command {
    let text = utterance.trim();

    if text.contains("도움말") || text == "?" || text == "메뉴" {
        return Command::Help;
    }
    if let Some(code) = strip_keyword(text, &["노선코드", "노선"]) {
        return Command::SearchByCode(code);
    }
    if let Some(car) = strip_keyword(text, &["차량번호", "차량"]) {
        return Command::SearchByCar(car);
    }
    if let Some(name) = strip_keyword(text, &["도착", "노선명"]) {
        return Command::SearchByName(name);
    }
    if text.contains("오늘") && text.contains("현황") {
        return Command::TodayStats;
    }
    if text.contains("어제") && text.contains("현황") {
        return Command::YesterdayStats;
    }
    if (4..=6).contains(&text.len()) && text.bytes().all(|b| b.is_ascii_digit()) {
        return Command::SearchByCode(text.to_string());
    }

    Command::Unknown(text.to_string())
}

// Longer keywords must come first so "노선코드 X" is not read as "노선" + "코드 X".
// A keyword only counts when whitespace and an argument follow it.
fn strip_keyword(text: &str, keywords: &[&str]) -> Option<String> {
    for keyword in keywords {
        if let Some(rest) = text.strip_prefix(keyword) {
            let arg = rest.trim_start();
            if arg.len() < rest.len() && !arg.is_empty() {
                return Some(arg.to_string());
            }
        }
    }
    None
}
