use crate::session::SessionSnapshot;

/// State a host keeps across process restarts so the game can come back
/// where it was. Serialised as comma-separated `name=value` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceState {
    pub person_id: Option<u64>,
    pub invite_visible: bool,
}

impl Default for InstanceState {
    fn default() -> Self {
        Self {
            person_id: None,
            invite_visible: true,
        }
    }
}

impl InstanceState {
    pub fn save(&self) -> String {
        let mut pairs = Vec::with_capacity(2);
        if let Some(id) = self.person_id {
            pairs.push(format!("person_id={id:016x}"));
        }
        pairs.push(format!(
            "invite_visible={}",
            if self.invite_visible { 'y' } else { 'n' }
        ));
        pairs.join(",")
    }

    /// Starts from the defaults and applies every pair it understands.
    /// Unknown names and malformed values are skipped.
    pub fn load(text: &str) -> Self {
        let mut state = Self::default();
        for pair in text.split(',') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            match name {
                "person_id" => {
                    if let Some(id) = parse_person_id(value) {
                        state.person_id = Some(id);
                    }
                }
                "invite_visible" => match value {
                    "y" => state.invite_visible = true,
                    "n" => state.invite_visible = false,
                    _ => {}
                },
                _ => {}
            }
        }
        state
    }

    pub fn to_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::new(self.save())
    }

    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        Self::load(snapshot.as_str())
    }
}

// Lowercase hex only, at most 16 digits.
fn parse_person_id(value: &str) -> Option<u64> {
    if value.is_empty() || value.len() > 16 {
        return None;
    }
    if !value
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return None;
    }
    u64::from_str_radix(value, 16).ok()
}
