//! Prompt text sent to the model.

/// Shape the model must answer with; mirrors `dinnerbot_core::Recommendation`.
const RESPONSE_FORMAT: &str = r#"다음 JSON 형식으로만 답하세요. 다른 텍스트는 쓰지 마세요.
{
  "title": "추천 제목",
  "dishes": [
    {
      "name": "요리 이름",
      "description": "추천 이유와 간단한 조리법",
      "ingredients": ["재료1", "재료2"],
      "cooking_minutes": 20
    }
  ],
  "tip": "체질 관련 한 줄 팁"
}"#;

const CONSTITUTION_GUIDE: &str = "토양체질(비장이 크고 신장이 약한 체질)에 맞는 음식을 기준으로 합니다. \
돼지고기, 소고기, 달걀, 두부, 해산물, 배추, 오이, 보리 등은 좋고, \
닭고기, 고추, 생강, 인삼, 꿀 등 열이 많은 음식은 피합니다.";

pub(crate) fn daily_dinner() -> String {
    format!(
        "당신은 한식 영양 전문가입니다. {CONSTITUTION_GUIDE}\n\
         오늘 저녁으로 단백질과 면역력 강화에 중점을 둔 요리 5가지를 추천해 주세요. \
         집에서 30분 안팎으로 만들 수 있는 메뉴를 우선합니다.\n\n{RESPONSE_FORMAT}"
    )
}

pub(crate) fn leftover_dinner(ingredients: &str) -> String {
    format!(
        "당신은 한식 영양 전문가입니다. {CONSTITUTION_GUIDE}\n\
         냉장고에 남은 재료: {ingredients}\n\
         이 재료를 최대한 활용한 저녁 요리 5가지를 추천해 주세요. \
         부족한 재료는 흔한 기본 양념 정도만 추가합니다.\n\n{RESPONSE_FORMAT}"
    )
}

/// Strips a surrounding Markdown code fence (```` ```json ... ``` ````) if present.
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening fence line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
