use serde::{Deserialize, Serialize};

/// Which single project, if any, has its detail panel open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "id", rename_all = "snake_case")]
pub enum Expansion {
    #[default]
    Collapsed,
    Expanded(String),
}

impl Expansion {
    /// Header click on `id`: collapses it when it is the open project,
    /// otherwise opens it (closing any other one in the same step).
    pub fn toggle(&self, id: &str) -> Expansion {
        match self {
            Expansion::Expanded(current) if current == id => Expansion::Collapsed,
            _ => Expansion::Expanded(id.to_string()),
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        matches!(self, Expansion::Expanded(current) if current == id)
    }

    pub fn expanded_id(&self) -> Option<&str> {
        match self {
            Expansion::Collapsed => None,
            Expansion::Expanded(id) => Some(id),
        }
    }

    /// Build from an optional query value; empty means collapsed.
    pub fn from_param(param: Option<&str>) -> Expansion {
        match param.map(str::trim) {
            Some(id) if !id.is_empty() => Expansion::Expanded(id.to_string()),
            _ => Expansion::Collapsed,
        }
    }
}
