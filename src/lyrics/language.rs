/// 语言代码对应的显示名；未知代码原样返回
pub fn language_name(code: &str) -> &str {
    match code {
        "auto" => "Auto",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        "en" => "English",
        "es" => "Spanish",
        other => other,
    }
}
