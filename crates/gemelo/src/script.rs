//! Touch scripts: one JSON object per line, e.g.
//! `{"phase":"down","id":0,"x":10,"y":20}`. Blank lines and lines starting
//! with `#` are skipped.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use surface::TouchPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptPhase {
    Down,
    Move,
    Up,
    ReleaseAll,
    Cancel,
}

impl From<ScriptPhase> for TouchPhase {
    fn from(phase: ScriptPhase) -> Self {
        match phase {
            ScriptPhase::Down => TouchPhase::Down,
            ScriptPhase::Move => TouchPhase::Move,
            ScriptPhase::Up => TouchPhase::Up,
            ScriptPhase::ReleaseAll => TouchPhase::ReleaseAll,
            ScriptPhase::Cancel => TouchPhase::Cancel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TouchEvent {
    pub phase: ScriptPhase,
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
}

pub fn load_script(path: &Path) -> Result<Vec<TouchEvent>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read touch script at {}", path.display()))?;
    parse_script(&contents).with_context(|| format!("invalid touch script {}", path.display()))
}

pub fn parse_script(input: &str) -> Result<Vec<TouchEvent>> {
    let mut events = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event: TouchEvent = serde_json::from_str(line)
            .with_context(|| format!("line {}: malformed touch event", index + 1))?;
        events.push(event);
    }
    Ok(events)
}
