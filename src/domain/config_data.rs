//! Default configuration data: quest team sizes, role visibility, default
//! role composition, and default assassination attempts, keyed by player
//! count 5..10. Data, not code — `GameService::handle_start_game` only
//! falls back to these when the `StartGame` payload omits overrides.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::domain::role::Role;

/// quest_team_size[player_count][quest_number] = team size required.
pub static DEFAULT_QUEST_TEAM_SIZE: Lazy<HashMap<u8, HashMap<u8, u8>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(5, HashMap::from([(1, 2), (2, 3), (3, 2), (4, 3), (5, 3)]));
    m.insert(6, HashMap::from([(1, 2), (2, 3), (3, 4), (4, 3), (5, 4)]));
    m.insert(7, HashMap::from([(1, 2), (2, 3), (3, 3), (4, 4), (5, 4)]));
    m.insert(8, HashMap::from([(1, 3), (2, 4), (3, 4), (4, 5), (5, 5)]));
    m.insert(9, HashMap::from([(1, 3), (2, 4), (3, 4), (4, 5), (5, 5)]));
    m.insert(10, HashMap::from([(1, 3), (2, 4), (3, 4), (4, 5), (5, 5)]));
    m
});

/// role -> the roles whose holders are revealed to a player with that role
/// at game start.
pub static KNOWN_ROLES: Lazy<HashMap<Role, Vec<Role>>> = Lazy::new(|| {
    use Role::*;
    HashMap::from([
        (Merlin, vec![Morgana, Assassin, Oberon]),
        (Percival, vec![Merlin, Morgana]),
        (Mordred, vec![Morgana, Assassin, Oberon]),
        (Morgana, vec![Mordred, Assassin, Oberon]),
        (Assassin, vec![Mordred, Morgana, Oberon]),
        (Oberon, vec![]),
        (Villager, vec![]),
    ])
});

pub const DEFAULT_ASSASSINATION_ATTEMPTS: u32 = 1;

/// Default role composition by player count, used when `StartGame` omits
/// `payload.roles`. One Merlin and one Assassin always; evil seats beyond
/// the Assassin fill Morgana, then Mordred, then Oberon; the rest Villager.
pub fn default_roles(player_count: usize) -> Option<Vec<Role>> {
    let evil_count: usize = match player_count {
        5 => 2,
        6 => 2,
        7 => 3,
        8 => 3,
        9 => 3,
        10 => 4,
        _ => return None,
    };
    let mut roles = vec![Role::Merlin, Role::Assassin];
    let extra_evil = [Role::Morgana, Role::Mordred, Role::Oberon];
    for role in extra_evil.into_iter().take(evil_count.saturating_sub(1)) {
        roles.push(role);
    }
    while roles.len() < player_count {
        roles.push(Role::Villager);
    }
    Some(roles)
}

pub fn is_supported_player_count(player_count: usize) -> bool {
    (5..=10).contains(&player_count)
}
