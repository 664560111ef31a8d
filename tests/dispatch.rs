//! Black-box dispatch-loop scenarios, driven through the real
//! `StateMachine` against an `InMemoryRecordStore` + `RecordingMessenger`.
//! Each test plays a full game (or the relevant slice of one) exactly the
//! way a transport adapter would, one Action at a time.

mod common;

use avalon_core_be::domain::Role;
use avalon_core_be::state_machine::StateName;
use avalon_core_be::store::RecordStore;
use common::{join_players, Harness};
use serde_json::json;

/// Scenario 1: five-player happy path. Three Pass quests reach a Good
/// majority; the assassin finds Merlin and reverses the outcome.
#[tokio::test]
async fn five_player_happy_path_ends_in_assassination_success() {
    let harness = Harness::new(1).await;
    let players = join_players(&harness, 5).await;

    let roles = vec![
        Role::Merlin,
        Role::Assassin,
        Role::Villager,
        Role::Villager,
        Role::Villager,
    ];
    let state = harness.start_game(&players, Some(roles)).await;
    assert_eq!(state, StateName::TeamSelection);

    for quest_number in 1..=3u8 {
        let team_size = harness.team_size(quest_number).await;
        let leader = harness.leader_id().await;
        let team: Vec<_> = players.iter().take(team_size as usize).copied().collect();

        let state = harness.submit_team_proposal(leader, quest_number, 1, &team).await;
        assert_eq!(state, StateName::RoundVoting);

        let mut state = StateName::RoundVoting;
        for &player in &players {
            state = harness.cast_round_vote(player, quest_number, 1, true).await;
        }
        assert_eq!(state, StateName::QuestVoting);

        let mut state = StateName::QuestVoting;
        for &member in &team {
            state = harness.cast_quest_vote(member, quest_number, true).await;
        }

        if quest_number < 3 {
            assert_eq!(state, StateName::TeamSelection);
        } else {
            assert_eq!(state, StateName::EndGame);
        }
    }

    let assassin_id = harness.player_with_role(Role::Assassin).await;
    let merlin_id = harness.player_with_role(Role::Merlin).await;

    let state = harness
        .submit_assassination_target(assassin_id, merlin_id)
        .await
        .expect("assassin's target should be accepted");
    assert_eq!(state, StateName::EndGame);

    let game = harness.store.get_game(harness.game_id).await.unwrap();
    assert_eq!(game.status, avalon_core_be::domain::GameStatus::Finished);
    assert_eq!(game.result, Some(avalon_core_be::domain::GameResult::EvilWins));

    let events = harness.events().await;
    let types: Vec<String> = events
        .iter()
        .map(|e| e["type"].as_str().unwrap().to_string())
        .collect();
    assert!(types.contains(&"assassination_started".to_string()));
    assert!(types.contains(&"assassination_target_requested".to_string()));
    assert!(types.contains(&"assassination_succeeded".to_string()));
    assert!(types.contains(&"game_ended".to_string()));

    // AssassinationTargetRequested must be private to the assassin alone.
    let target_requested = events
        .iter()
        .find(|e| e["type"] == "assassination_target_requested")
        .unwrap();
    assert_eq!(target_requested["recipients"], json!([assassin_id]));
}

/// Scenario 2: five consecutive failed rounds within one quest auto-fail it
/// on the fifth round and start a fresh quest.
#[tokio::test]
async fn fifth_failed_round_auto_fails_the_quest() {
    let harness = Harness::new(2).await;
    let players = join_players(&harness, 5).await;
    harness.start_game(&players, None).await;

    let team_size = harness.team_size(1).await;
    let mut state = StateName::TeamSelection;
    for round_number in 1..=5u8 {
        let leader = harness.leader_id().await;
        let team: Vec<_> = players.iter().take(team_size as usize).copied().collect();
        state = harness.submit_team_proposal(leader, 1, round_number, &team).await;
        assert_eq!(state, StateName::RoundVoting);

        for &player in &players {
            state = harness.cast_round_vote(player, 1, round_number, false).await;
        }
        assert_eq!(state, StateName::TeamSelection);
    }

    let quest1 = harness.store.get_quest(harness.game_id, 1).await.unwrap();
    assert_eq!(quest1.result, Some(avalon_core_be::domain::VoteResult::Fail));

    let quests = harness.store.get_quests(harness.game_id).await.unwrap();
    assert_eq!(quests.len(), 2, "a fresh quest should have been created");
    assert!(quests[1].result.is_none());

    let rounds = harness.store.get_rounds(harness.game_id).await.unwrap();
    assert_eq!(rounds.iter().filter(|r| r.quest_number == 1).count(), 5);

    let events = harness.events().await;
    assert!(events
        .iter()
        .any(|e| e["type"] == "quest_completed" && e["payload"]["quest_number"] == 1));
}

/// Scenario 3: three Fail quests still run the assassination phase — entering
/// EndGame makes no good/evil distinction; a missed shot ends the game with
/// Good as the winner.
#[tokio::test]
async fn evil_quest_majority_then_failed_assassination_ends_good_wins() {
    let harness = Harness::new(3).await;
    let players = join_players(&harness, 5).await;
    let roles = vec![
        Role::Merlin,
        Role::Assassin,
        Role::Villager,
        Role::Villager,
        Role::Villager,
    ];
    harness.start_game(&players, Some(roles)).await;

    let mut state = StateName::TeamSelection;
    for quest_number in 1..=3u8 {
        let team_size = harness.team_size(quest_number).await;
        let leader = harness.leader_id().await;
        let team: Vec<_> = players.iter().take(team_size as usize).copied().collect();

        state = harness.submit_team_proposal(leader, quest_number, 1, &team).await;
        assert_eq!(state, StateName::RoundVoting);
        for &player in &players {
            state = harness.cast_round_vote(player, quest_number, 1, true).await;
        }
        assert_eq!(state, StateName::QuestVoting);

        for &member in &team {
            state = harness.cast_quest_vote(member, quest_number, false).await;
        }
    }
    assert_eq!(state, StateName::EndGame);

    let assassin_id = harness.player_with_role(Role::Assassin).await;
    let villager_id = harness.player_with_role(Role::Villager).await;

    let state = harness
        .submit_assassination_target(assassin_id, villager_id)
        .await
        .expect("assassin's target should be accepted even on a miss");
    assert_eq!(state, StateName::EndGame);

    let game = harness.store.get_game(harness.game_id).await.unwrap();
    assert_eq!(game.status, avalon_core_be::domain::GameStatus::Finished);
    assert_eq!(game.result, Some(avalon_core_be::domain::GameResult::GoodWins));
    assert_eq!(game.assassination_attempts, Some(0));

    let events = harness.events().await;
    assert!(events.iter().any(|e| e["type"] == "assassination_failed"));
}

/// Scenario 4: a CastQuestVote from a non-team-member, or a repeat vote
/// from a team member, is rejected as Invalid with no side effects.
#[tokio::test]
async fn duplicate_or_non_team_quest_vote_is_rejected() {
    let harness = Harness::new(4).await;
    let players = join_players(&harness, 5).await;
    harness.start_game(&players, None).await;

    let team_size = harness.team_size(1).await;
    let leader = harness.leader_id().await;
    let team: Vec<_> = players.iter().take(team_size as usize).copied().collect();
    harness.submit_team_proposal(leader, 1, 1, &team).await;
    for &player in &players {
        harness.cast_round_vote(player, 1, 1, true).await;
    }

    let non_member = players.iter().find(|p| !team.contains(p)).copied().unwrap();
    let result = harness.dispatch(avalon_core_be::domain::Action::new(
        harness.game_id,
        non_member,
        avalon_core_be::domain::ActionType::CastQuestVote,
        json!({ "quest_number": 1, "player_id": non_member, "is_approved": true }),
    ))
    .await;
    assert!(result.is_err(), "a non-team-member's quest vote must be rejected");

    let events_before = harness.events().await.len();

    harness.cast_quest_vote(team[0], 1, true).await;
    let events_after_first_vote = harness.events().await.len();
    assert!(events_after_first_vote > events_before);

    let result = harness
        .submit_assassination_target(team[0], team[0])
        .await;
    assert!(result.is_err(), "EndGame has not been reached yet");

    let duplicate = harness.dispatch(avalon_core_be::domain::Action::new(
        harness.game_id,
        team[0],
        avalon_core_be::domain::ActionType::CastQuestVote,
        json!({ "quest_number": 1, "player_id": team[0], "is_approved": true }),
    ))
    .await;
    assert!(duplicate.is_err(), "a repeat vote from a team member must be rejected");

    let events_after_duplicate = harness.events().await.len();
    assert_eq!(
        events_after_first_vote, events_after_duplicate,
        "a rejected duplicate vote must not emit any event"
    );
}
