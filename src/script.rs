/*!
 * Scene scripts from a language-model response.
 *
 * The model answers with narration paragraphs, each followed by a fenced Python
 * block holding one animation scene. This module splits such a response into
 * scenes and holds the duration heuristics used to size the request.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// @const: Fenced code block, optionally tagged as python
static CODE_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```(?:python)?\r?\n([\s\S]*?)```").unwrap()
});

// @const: Animation scene class declaration
static SCENE_CLASS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"class\s+(\w+)\s*\(Scene\):").unwrap()
});

const COMPLEX_TOPICS: [&str; 8] = [
    "compiler",
    "operating system",
    "neural",
    "transformer",
    "fourier",
    "blockchain",
    "distributed",
    "encryption",
];

const MEDIUM_TOPICS: [&str; 6] = [
    "recursion",
    "dynamic programming",
    "graphs",
    "sorting",
    "binary tree",
    "hashing",
];

/// A narration paragraph and the code block that follows it
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptSection {
    pub explanation: String,
    pub code: Option<String>,
}

/// One renderable scene
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneScript {
    /// 1-based position in the response
    pub index: usize,
    pub narration: String,
    pub code: String,
    pub class_name: String,
}

/// Split a response into sections at fenced code blocks.
///
/// Text before a block narrates that block. Text after the last block is appended
/// to the last narration. A response without blocks is one narration-only section.
pub fn extract_sections(response: &str) -> Vec<ScriptSection> {
    let mut sections = Vec::new();
    let mut prev_end = 0;

    for caps in CODE_BLOCK_REGEX.captures_iter(response) {
        let (Some(whole), Some(code)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        sections.push(ScriptSection {
            explanation: response[prev_end..whole.start()].trim().to_string(),
            code: Some(code.as_str().trim().to_string()),
        });
        prev_end = whole.end();
    }

    if sections.is_empty() {
        return vec![ScriptSection {
            explanation: response.trim().to_string(),
            code: None,
        }];
    }

    let trailing = response[prev_end..].trim();
    if !trailing.is_empty() {
        if let Some(last) = sections.last_mut() {
            if last.explanation.is_empty() {
                last.explanation = trailing.to_string();
            } else {
                last.explanation.push_str("\n\n");
                last.explanation.push_str(trailing);
            }
        }
    }

    sections
}

/// Name of the first `Scene` subclass in the code, `Scene` if none is declared
pub fn extract_scene_class(code: &str) -> String {
    SCENE_CLASS_REGEX
        .captures(code)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| "Scene".to_string(), |m| m.as_str().to_string())
}

/// Turn a response into scenes; sections without code are skipped
pub fn scenes_from_response(response: &str) -> Vec<SceneScript> {
    let mut scenes = Vec::new();

    for (i, section) in extract_sections(response).into_iter().enumerate() {
        let index = i + 1;
        match section.code {
            Some(code) => {
                let class_name = extract_scene_class(&code);
                debug!("Section {} renders class {}", index, class_name);
                scenes.push(SceneScript {
                    index,
                    narration: section.explanation,
                    code,
                    class_name,
                });
            }
            None if !section.explanation.trim().is_empty() => {
                warn!("Skipping section {}: narration without animation code", index);
            }
            None => {}
        }
    }

    scenes
}

/// Target video length in seconds for a spoken topic
pub fn estimate_duration(topic: &str) -> u32 {
    let topic_lower = topic.to_lowercase();

    if COMPLEX_TOPICS.iter().any(|k| topic_lower.contains(k)) {
        return 180;
    }
    if MEDIUM_TOPICS.iter().any(|k| topic_lower.contains(k)) {
        return 120;
    }

    match topic.split_whitespace().count() {
        0..=5 => 30,
        6..=14 => 60,
        15..=29 => 120,
        _ => 180,
    }
}

/// How much detail and how many scenes to ask for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenePlan {
    pub target_secs: u32,
    pub detail: &'static str,
    pub min_scenes: u32,
    pub max_scenes: u32,
}

impl ScenePlan {
    pub fn for_duration(target_secs: u32) -> Self {
        let (detail, min_scenes, max_scenes) = match target_secs {
            0..=30 => ("very short and simple", 1, 2),
            31..=60 => ("short and simple", 3, 5),
            61..=120 => ("normal detail", 5, 8),
            121..=180 => ("detailed and thorough", 8, 12),
            _ => ("very detailed and extensive", 12, 16),
        };

        ScenePlan {
            target_secs,
            detail,
            min_scenes,
            max_scenes,
        }
    }
}
