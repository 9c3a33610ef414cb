use std::path::Path;

use serde::Deserialize;

use super::types::Question;
use crate::error::GameError;

#[derive(Debug, Deserialize)]
struct QuestionFile {
    #[serde(rename = "question", default)]
    questions: Vec<Question>,
}

fn unavailable(path: &Path, err: impl std::fmt::Display) -> GameError {
    GameError::DataUnavailable(format!("{}: {}", path.display(), err))
}

pub fn load_file(path: &Path) -> Result<Vec<Question>, GameError> {
    let content = std::fs::read_to_string(path).map_err(|e| unavailable(path, e))?;
    let file: QuestionFile = toml::from_str(&content).map_err(|e| unavailable(path, e))?;
    Ok(file.questions)
}

/// Loads every `*.toml` file in the question directory, in filename order.
pub fn load_dir(dir: &Path) -> Result<Vec<Question>, GameError> {
    let pattern = dir.join("*.toml");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| unavailable(dir, "non-utf8 path"))?;

    let mut paths: Vec<_> = glob::glob(pattern)
        .map_err(|e| unavailable(dir, e))?
        .filter_map(|p| p.ok())
        .collect();
    paths.sort();

    let mut questions = Vec::new();
    for path in paths {
        questions.extend(load_file(&path)?);
    }
    if questions.is_empty() {
        return Err(unavailable(dir, "no questions found"));
    }
    Ok(questions)
}
