//! Feedback payload normalization.
//!
//! The backend has shipped several shapes for "interview feedback" over
//! time: per-section objects under `technical`/`behavioral`/`coding` (or the
//! older `tech`/`hr`/`code` keys), a unified metrics object under
//! `feedback`, and transcripts as structured arrays, loose objects, or one
//! `Q:`/`A:` text blob — sometimes wrapped in `{ "data": ... }`. Everything
//! is decoded here, once, into one sum type; callers never touch the raw
//! JSON again. Shapes we do not recognize land in the `Unknown` variant
//! instead of being guessed at.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;

/// Per-section scores and notes (`technical` / `behavioral` / `coding`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SectionFeedback {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default, alias = "areasToImprove")]
    pub areas_to_improve: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Unified metrics object used by the newer backend (`feedback` key).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OverallMetrics {
    #[serde(default)]
    pub relevance: Option<f64>,
    #[serde(default)]
    pub clarity: Option<f64>,
    #[serde(default)]
    pub depth: Option<f64>,
    #[serde(default)]
    pub overall: Option<f64>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Session-level fields present in every known shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackMeta {
    pub id: Option<String>,
    pub date: Option<String>,
    pub role: Option<String>,
    pub mode: Option<String>,
    pub average_confidence: Option<f64>,
    pub average_focus: Option<f64>,
    pub interview_duration: Option<String>,
    pub questions_asked: Option<u64>,
}

/// One question/answer pair of the normalized transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionedFeedback {
    pub technical: Option<SectionFeedback>,
    pub behavioral: Option<SectionFeedback>,
    pub coding: Option<SectionFeedback>,
    pub meta: FeedbackMeta,
    pub transcript: Vec<TranscriptEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedFeedback {
    pub metrics: OverallMetrics,
    pub meta: FeedbackMeta,
    pub transcript: Vec<TranscriptEntry>,
}

impl UnifiedFeedback {
    /// Section-oriented rendering wants a behavioral block; derive one from
    /// the unified metrics.
    pub fn as_behavioral_section(&self) -> SectionFeedback {
        SectionFeedback {
            score: self.metrics.overall,
            feedback: self.metrics.summary.clone().unwrap_or_default(),
            ..SectionFeedback::default()
        }
    }
}

/// Every response the feedback endpoints are known to produce, plus the
/// explicit fallback for shapes we have never seen.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackPayload {
    Sectioned(SectionedFeedback),
    Unified(UnifiedFeedback),
    Unknown(Value),
}

impl FeedbackPayload {
    /// Decode a raw backend response. Infallible by design: anything
    /// unrecognized becomes `Unknown` rather than an error or a guess.
    pub fn decode(payload: Value) -> Self {
        // Unwrap an accidental `{ "data": ... }` envelope.
        let payload = match payload {
            Value::Object(mut map) if map.contains_key("data") => {
                map.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        };

        let Value::Object(map) = &payload else {
            return FeedbackPayload::Unknown(payload);
        };

        let meta = decode_meta(map);
        let transcript = decode_transcript(map);

        let technical = section(map, "technical").or_else(|| section(map, "tech"));
        let behavioral = section(map, "behavioral").or_else(|| section(map, "hr"));
        let coding = section(map, "coding").or_else(|| section(map, "code"));

        if technical.is_some() || behavioral.is_some() || coding.is_some() {
            return FeedbackPayload::Sectioned(SectionedFeedback {
                technical,
                behavioral,
                coding,
                meta,
                transcript,
            });
        }

        if let Some(metrics) = map
            .get("feedback")
            .filter(|v| v.is_object())
            .and_then(|v| serde_json::from_value::<OverallMetrics>(v.clone()).ok())
        {
            return FeedbackPayload::Unified(UnifiedFeedback {
                metrics,
                meta,
                transcript,
            });
        }

        // A bare transcript/stats record still renders; a payload with no
        // recognizable key at all does not.
        if !transcript.is_empty() || meta != FeedbackMeta::default() {
            return FeedbackPayload::Sectioned(SectionedFeedback {
                technical: None,
                behavioral: None,
                coding: None,
                meta,
                transcript,
            });
        }

        FeedbackPayload::Unknown(payload)
    }

    pub fn meta(&self) -> Option<&FeedbackMeta> {
        match self {
            FeedbackPayload::Sectioned(s) => Some(&s.meta),
            FeedbackPayload::Unified(u) => Some(&u.meta),
            FeedbackPayload::Unknown(_) => None,
        }
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        match self {
            FeedbackPayload::Sectioned(s) => &s.transcript,
            FeedbackPayload::Unified(u) => &u.transcript,
            FeedbackPayload::Unknown(_) => &[],
        }
    }
}

fn section(map: &serde_json::Map<String, Value>, key: &str) -> Option<SectionFeedback> {
    map.get(key)
        .filter(|v| v.is_object())
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

fn string_field(map: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.get(*key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn number_field(map: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|key| map.get(*key).and_then(Value::as_f64))
}

fn decode_meta(map: &serde_json::Map<String, Value>) -> FeedbackMeta {
    FeedbackMeta {
        id: string_field(map, &["_id", "id"]),
        date: string_field(map, &["date", "createdAt", "created_at"]),
        role: string_field(map, &["role"]),
        mode: string_field(map, &["mode"]),
        average_confidence: number_field(map, &["average_confidence", "avg_confidence"]),
        average_focus: number_field(map, &["average_focus", "avg_focus"]),
        interview_duration: string_field(
            map,
            &["interview_duration", "duration", "duration_str", "duration_in_minutes"],
        ),
        questions_asked: number_field(map, &["questions_asked", "questions", "num_questions"])
            .map(|n| n as u64),
    }
}

fn decode_transcript(map: &serde_json::Map<String, Value>) -> Vec<TranscriptEntry> {
    match map.get("transcript") {
        Some(Value::Array(items)) => items.iter().map(transcript_entry).collect(),
        Some(Value::String(blob)) => parse_transcript_blob(blob),
        _ => match map.get("history") {
            Some(Value::Array(items)) => items.iter().map(transcript_entry).collect(),
            _ => Vec::new(),
        },
    }
}

fn transcript_entry(item: &Value) -> TranscriptEntry {
    match item {
        Value::String(line) => parse_transcript_line(line),
        Value::Object(entry) => TranscriptEntry {
            question: string_field(entry, &["question", "q", "questionText", "prompt"])
                .unwrap_or_default(),
            answer: string_field(entry, &["answer", "a", "answerText", "response"])
                .unwrap_or_default(),
        },
        other => TranscriptEntry {
            question: String::new(),
            answer: other.to_string(),
        },
    }
}

fn question_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^Q[:\s]+").expect("question regex should compile"))
}

fn answer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^A[:\s]+").expect("answer regex should compile"))
}

fn pair_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)Q[:\s]*(.*?)\s*A[:\s]*(.*)").expect("pair regex should compile")
    })
}

/// One `Q: ... A: ...` string; falls back to answer-only when no marker
/// matches.
fn parse_transcript_line(line: &str) -> TranscriptEntry {
    if let Some(caps) = pair_re().captures(line) {
        return TranscriptEntry {
            question: caps[1].trim().to_string(),
            answer: caps[2].trim().to_string(),
        };
    }
    TranscriptEntry {
        question: String::new(),
        answer: line.trim().to_string(),
    }
}

/// Multi-line `Q:`/`A:` text blob, one pair per marker run. Unmarked lines
/// fill whichever side is still empty, then extend the answer.
fn parse_transcript_blob(blob: &str) -> Vec<TranscriptEntry> {
    let mut entries = Vec::new();
    let mut current = TranscriptEntry::default();

    for line in blob.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if question_re().is_match(line) {
            if !current.question.is_empty() || !current.answer.is_empty() {
                entries.push(std::mem::take(&mut current));
            }
            current.question = question_re().replace(line, "").trim().to_string();
        } else if answer_re().is_match(line) {
            current.answer = answer_re().replace(line, "").trim().to_string();
        } else if current.question.is_empty() {
            current.question = line.to_string();
        } else if current.answer.is_empty() {
            current.answer = line.to_string();
        } else {
            current.answer.push(' ');
            current.answer.push_str(line);
        }
    }
    if !current.question.is_empty() || !current.answer.is_empty() {
        entries.push(current);
    }
    entries
}
