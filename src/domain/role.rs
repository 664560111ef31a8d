use serde::{Deserialize, Serialize};

/// A player's hidden role, assigned once at game start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Merlin,
    Percival,
    Mordred,
    Morgana,
    Assassin,
    Oberon,
    Villager,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Merlin => "merlin",
            Role::Percival => "percival",
            Role::Mordred => "mordred",
            Role::Morgana => "morgana",
            Role::Assassin => "assassin",
            Role::Oberon => "oberon",
            Role::Villager => "villager",
        };
        write!(f, "{s}")
    }
}
