use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use surface::{InviteRef, SessionSnapshot};

/// What the host remembers between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostState {
    pub snapshot: Option<SessionSnapshot>,
    /// The invite that was folded into `snapshot`; redelivering it is stale.
    pub last_invite: Option<InviteRef>,
    pub player_name: Option<String>,
}

impl HostState {
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read state file at {}", path.display()))?;
            let state: Self = toml::from_str(&contents)
                .with_context(|| format!("failed to parse state file at {}", path.display()))?;
            Ok(state)
        } else {
            Ok(Self::default())
        }
    }

    pub fn persist(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("state path has no parent: {}", path.display()))?;
        fs::create_dir_all(dir).with_context(|| {
            format!(
                "failed to prepare directory for state file at {}",
                dir.display()
            )
        })?;
        let serialized = toml::to_string_pretty(self)
            .with_context(|| "failed to serialize state file to TOML".to_string())?;
        fs::write(path, serialized)
            .with_context(|| format!("failed to write state file to {}", path.display()))?;
        Ok(())
    }

    /// Returns whether there was anything to remove.
    pub fn clear(path: &Path) -> Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err)
                .with_context(|| format!("failed to remove state file at {}", path.display())),
        }
    }

    /// Nothing has ever been saved, so the engine should show its guide.
    pub fn is_first_run(&self) -> bool {
        self.snapshot.is_none() && self.last_invite.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/state.toml");
        let state = HostState {
            snapshot: Some(SessionSnapshot::new("person_id=cafecafecafecafe,invite_visible=n")),
            last_invite: Some(InviteRef::new("https://gemelo.org/j/yv7K_sr-yvO")),
            player_name: Some("Klara".into()),
        };
        state.persist(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("snapshot = \"person_id=cafecafecafecafe,invite_visible=n\""));
        assert_eq!(HostState::load_or_default(&path).unwrap(), state);
        assert!(!state.is_first_run());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.toml");
        let state = HostState::load_or_default(&path).unwrap();
        assert_eq!(state, HostState::default());
        assert!(state.is_first_run());
        assert!(!HostState::clear(&path).unwrap());
    }

    #[test]
    fn clear_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.toml");
        HostState::default().persist(&path).unwrap();
        assert!(HostState::clear(&path).unwrap());
        assert!(!path.exists());
    }
}
