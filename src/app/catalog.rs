use std::env;
use std::ffi::OsString;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use crate::http::{FetchConfig, get_text_no_store};

const DEFAULT_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/gymcard/training-data/main/training_data.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Exercise {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) tips: String,
    pub(crate) standard_reps: u32,
    pub(crate) standard_sets: u32,
    pub(crate) media: Option<String>,
    pub(crate) audio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AmbientClip {
    pub(crate) comment: String,
    pub(crate) audio: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Catalog {
    pub(crate) exercises: Vec<Exercise>,
    pub(crate) preparation_clips: Vec<AmbientClip>,
    pub(crate) rest_clips: Vec<AmbientClip>,
    pub(crate) end_clips: Vec<AmbientClip>,
}

pub(crate) fn catalog_url() -> String {
    catalog_url_from_env(env::var_os("GYMCARD_CATALOG_URL"))
}

pub(crate) fn catalog_url_from_env(env_value: Option<OsString>) -> String {
    match env_value.and_then(|value| value.into_string().ok()) {
        Some(url) if !url.trim().is_empty() => url,
        _ => DEFAULT_CATALOG_URL.to_string(),
    }
}

pub(crate) fn fetch_catalog(url: &str) -> Result<Catalog> {
    // Timestamp query defeats caches that ignore Cache-Control.
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let query = vec![("ts".to_string(), ts.to_string())];

    let body = get_text_no_store(url, &query, FetchConfig::default())
        .with_context(|| format!("catalog fetch from {url} failed"))?;

    let (catalog, skipped) = parse_catalog(&body)?;
    if skipped > 0 {
        eprintln!("Warning: skipped {skipped} malformed catalog entr(y/ies)");
    }
    Ok(catalog)
}

pub(crate) fn parse_catalog(raw: &str) -> Result<(Catalog, usize)> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| anyhow!("catalog is not valid JSON: {err}"))?;
    if !value.is_object() {
        return Err(anyhow!("catalog root is not a JSON object"));
    }

    let mut skipped = 0;
    let mut catalog = Catalog::default();

    for item in array_items(&value, "exercises") {
        match parse_exercise(item) {
            Some(exercise) => catalog.exercises.push(exercise),
            None => skipped += 1,
        }
    }
    for (field, target) in [
        ("preparationAudios", &mut catalog.preparation_clips),
        ("restAudios", &mut catalog.rest_clips),
        ("endAudios", &mut catalog.end_clips),
    ] {
        for item in array_items(&value, field) {
            match parse_clip(item) {
                Some(clip) => target.push(clip),
                None => skipped += 1,
            }
        }
    }

    Ok((catalog, skipped))
}

fn array_items<'a>(value: &'a Value, field: &str) -> std::slice::Iter<'a, Value> {
    value
        .get(field)
        .and_then(Value::as_array)
        .map(|items| items.iter())
        .unwrap_or_default()
}

fn parse_exercise(item: &Value) -> Option<Exercise> {
    let id = non_empty_string(item.get("id")?)?;
    let title = non_empty_string(item.get("title")?)?;
    Some(Exercise {
        id,
        title,
        tips: item
            .get("tips")
            .and_then(non_empty_string)
            .unwrap_or_default(),
        standard_reps: item.get("standardReps").and_then(value_as_u32).unwrap_or(0),
        standard_sets: item.get("standardSets").and_then(value_as_u32).unwrap_or(0),
        media: item
            .get("gif")
            .or_else(|| item.get("video"))
            .and_then(non_empty_string),
        audio: item.get("audio").and_then(non_empty_string),
    })
}

fn parse_clip(item: &Value) -> Option<AmbientClip> {
    let comment = item.get("comment").and_then(non_empty_string);
    let audio = item.get("audio").and_then(non_empty_string);
    if comment.is_none() && audio.is_none() {
        return None;
    }
    Some(AmbientClip {
        comment: comment.unwrap_or_default(),
        audio,
    })
}

fn non_empty_string(value: &Value) -> Option<String> {
    let text = value.as_str()?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn value_as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse::<u32>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "exercises": [
            {
                "id": "squat",
                "title": "スクワット",
                "tips": "膝をつま先より前に出さない",
                "standardReps": 10,
                "standardSets": 3,
                "gif": "https://cdn.example/squat.gif",
                "audio": "https://cdn.example/squat.wav"
            },
            {
                "id": "plank",
                "title": "プランク",
                "standardReps": "1",
                "standardSets": "2",
                "audio": "https://cdn.example/plank.wav"
            }
        ],
        "preparationAudios": [
            {"comment": "まずは準備体操から", "audio": "https://cdn.example/prep.wav"}
        ],
        "restAudios": [
            {"comment": "水分補給をしましょう", "audio": "https://cdn.example/rest.wav"}
        ],
        "endAudios": [
            {"comment": "お疲れさまでした", "audio": "https://cdn.example/end.wav"}
        ]
    }"#;

    #[test]
    fn parses_exercises_and_clip_pools() {
        let (catalog, skipped) = parse_catalog(SAMPLE).expect("catalog should parse");
        assert_eq!(skipped, 0);
        assert_eq!(catalog.exercises.len(), 2);
        assert_eq!(catalog.exercises[0].id, "squat");
        assert_eq!(catalog.exercises[0].standard_reps, 10);
        assert_eq!(catalog.exercises[0].standard_sets, 3);
        assert_eq!(
            catalog.exercises[0].media.as_deref(),
            Some("https://cdn.example/squat.gif")
        );
        // Numeric strings are tolerated.
        assert_eq!(catalog.exercises[1].standard_sets, 2);
        assert!(catalog.exercises[1].media.is_none());
        assert_eq!(catalog.preparation_clips.len(), 1);
        assert_eq!(catalog.rest_clips.len(), 1);
        assert_eq!(catalog.end_clips.len(), 1);
    }

    #[test]
    fn missing_pools_default_to_empty() {
        let raw = r#"{"exercises": []}"#;
        let (catalog, skipped) = parse_catalog(raw).expect("catalog should parse");
        assert_eq!(skipped, 0);
        assert!(catalog.exercises.is_empty());
        assert!(catalog.preparation_clips.is_empty());
        assert!(catalog.rest_clips.is_empty());
        assert!(catalog.end_clips.is_empty());
    }

    #[test]
    fn skips_malformed_entries_and_counts_them() {
        let raw = r#"{
            "exercises": [
                {"id": "ok", "title": "OK"},
                {"title": "no id"},
                {"id": "  ", "title": "blank id"}
            ],
            "restAudios": [{"comment": "valid"}, {}]
        }"#;
        let (catalog, skipped) = parse_catalog(raw).expect("catalog should parse");
        assert_eq!(catalog.exercises.len(), 1);
        assert_eq!(catalog.rest_clips.len(), 1);
        assert_eq!(skipped, 3);
    }

    #[test]
    fn rejects_non_object_root() {
        assert!(parse_catalog("[1, 2, 3]").is_err());
        assert!(parse_catalog("not json").is_err());
    }

    #[test]
    fn catalog_url_prefers_env_override() {
        assert_eq!(
            catalog_url_from_env(Some("https://example.test/data.json".into())),
            "https://example.test/data.json"
        );
        assert_eq!(catalog_url_from_env(Some("  ".into())), DEFAULT_CATALOG_URL);
        assert_eq!(catalog_url_from_env(None), DEFAULT_CATALOG_URL);
    }
}
