use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct CodeReq<'a> {
    pub code: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenReq<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LyricsResp {
    #[serde(default)]
    pub lyrics: Vec<LyricLineDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricLineDto {
    #[serde(default)]
    pub original: String,
    #[serde(default, deserialize_with = "ms_from_number_or_string")]
    pub start_time_ms: u64,
    #[serde(default, deserialize_with = "ms_from_number_or_string")]
    pub end_time_ms: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateReq<'a> {
    pub text: &'a [String],
    pub source_lang: &'a str,
    pub target_lang: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResp {
    #[serde(default)]
    pub translated_text: Vec<String>,
}

// 歌词服务上游有时把毫秒数编码成字符串
fn ms_from_number_or_string<'de, D>(de: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Ms {
        Num(u64),
        Float(f64),
        Str(String),
    }

    Ok(match Ms::deserialize(de)? {
        Ms::Num(v) => v,
        Ms::Float(v) => v.max(0.0) as u64,
        Ms::Str(s) => s.trim().parse().unwrap_or(0),
    })
}
