//! Event Service: constructs events of known types with a frozen payload
//! schema per type, persists them via the Record Store, and hands them to
//! the Messenger. One constructor per event type, with the
//! `broadcast`/`notify` choice resolved uniformly in [`dispatch`] rather
//! than hardcoded per constructor — so a private event can never be
//! broadcast by mistake.

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::domain::{Event, EventType, Player};
use crate::errors::CoreError;
use crate::services::ServiceContext;

pub struct EventService;

impl EventService {
    fn build(
        game_id: Uuid,
        event_type: EventType,
        recipients: Vec<Uuid>,
        payload: serde_json::Value,
    ) -> Event {
        Event {
            game_id,
            event_id: Uuid::new_v4(),
            event_type,
            recipients,
            payload,
            timestamp: Utc::now(),
        }
    }

    /// Persists `event` then delivers it: `broadcast` when `recipients` is
    /// empty, otherwise `notify` once per recipient. Private-event recipient
    /// computation always happens here, never at the transport boundary.
    async fn dispatch(ctx: &ServiceContext, event: Event) -> Result<(), CoreError> {
        ctx.store.put_event(event.clone()).await?;
        tracing::debug!(game_id = %event.game_id, event_type = ?event.event_type, "event emitted");

        if event.is_public() {
            ctx.messenger.broadcast(&event).await;
        } else {
            for recipient in &event.recipients {
                ctx.messenger.notify(*recipient, &event).await;
            }
        }
        Ok(())
    }

    pub async fn player_joined(
        ctx: &ServiceContext,
        game_id: Uuid,
        player_id: Uuid,
        name: &str,
    ) -> Result<(), CoreError> {
        let event = Self::build(
            game_id,
            EventType::PlayerJoined,
            vec![],
            json!({ "player_id": player_id, "name": name }),
        );
        Self::dispatch(ctx, event).await
    }

    /// One event per player, carrying that player's role and the players
    /// known to them (`known_player_ids`).
    pub async fn game_started(ctx: &ServiceContext, game_id: Uuid, players: &[Player]) -> Result<(), CoreError> {
        let by_id: std::collections::HashMap<Uuid, &Player> =
            players.iter().map(|p| (p.id, p)).collect();

        for player in players {
            let known_players: Vec<serde_json::Value> = player
                .known_player_ids
                .iter()
                .filter_map(|id| by_id.get(id))
                .map(|p| json!({ "id": p.id, "name": p.name }))
                .collect();

            let event = Self::build(
                game_id,
                EventType::GameStarted,
                vec![player.id],
                json!({ "role": player.role, "known_players": known_players }),
            );
            Self::dispatch(ctx, event).await?;
        }
        Ok(())
    }

    pub async fn quest_started(ctx: &ServiceContext, game_id: Uuid, quest_number: u8) -> Result<(), CoreError> {
        let event = Self::build(
            game_id,
            EventType::QuestStarted,
            vec![],
            json!({ "quest_number": quest_number }),
        );
        Self::dispatch(ctx, event).await
    }

    pub async fn round_started(
        ctx: &ServiceContext,
        game_id: Uuid,
        quest_number: u8,
        round_number: u8,
        leader_id: Uuid,
    ) -> Result<(), CoreError> {
        let event = Self::build(
            game_id,
            EventType::RoundStarted,
            vec![],
            json!({
                "quest_number": quest_number,
                "round_number": round_number,
                "leader_id": leader_id,
            }),
        );
        Self::dispatch(ctx, event).await
    }

    pub async fn team_selection_requested(
        ctx: &ServiceContext,
        game_id: Uuid,
        quest_number: u8,
        round_number: u8,
        team_size: u8,
    ) -> Result<(), CoreError> {
        let event = Self::build(
            game_id,
            EventType::TeamSelectionRequested,
            vec![],
            json!({
                "quest_number": quest_number,
                "round_number": round_number,
                "team_size": team_size,
            }),
        );
        Self::dispatch(ctx, event).await
    }

    pub async fn team_proposal_submitted(
        ctx: &ServiceContext,
        game_id: Uuid,
        quest_number: u8,
        round_number: u8,
        team_member_ids: &[Uuid],
    ) -> Result<(), CoreError> {
        let event = Self::build(
            game_id,
            EventType::TeamProposalSubmitted,
            vec![],
            json!({
                "quest_number": quest_number,
                "round_number": round_number,
                "team_member_ids": team_member_ids,
            }),
        );
        Self::dispatch(ctx, event).await
    }

    pub async fn round_vote_cast(
        ctx: &ServiceContext,
        game_id: Uuid,
        quest_number: u8,
        round_number: u8,
        player_id: Uuid,
        result: crate::domain::VoteResult,
    ) -> Result<(), CoreError> {
        let event = Self::build(
            game_id,
            EventType::RoundVoteCast,
            vec![],
            json!({
                "quest_number": quest_number,
                "round_number": round_number,
                "player_id": player_id,
                "result": result,
            }),
        );
        Self::dispatch(ctx, event).await
    }

    pub async fn round_completed(
        ctx: &ServiceContext,
        game_id: Uuid,
        quest_number: u8,
        round_number: u8,
        result: crate::domain::VoteResult,
    ) -> Result<(), CoreError> {
        let event = Self::build(
            game_id,
            EventType::RoundCompleted,
            vec![],
            json!({ "quest_number": quest_number, "round_number": round_number, "result": result }),
        );
        Self::dispatch(ctx, event).await
    }

    pub async fn quest_vote_started(
        ctx: &ServiceContext,
        game_id: Uuid,
        quest_number: u8,
        team_member_ids: &[Uuid],
    ) -> Result<(), CoreError> {
        let event = Self::build(
            game_id,
            EventType::QuestVoteStarted,
            vec![],
            json!({ "quest_number": quest_number, "team_member_ids": team_member_ids }),
        );
        Self::dispatch(ctx, event).await
    }

    /// Recipients are the quest's team members: a private event delivered by
    /// `notify`, resolved through the same [`dispatch`] path as every other
    /// event rather than a special case.
    pub async fn quest_vote_requested(
        ctx: &ServiceContext,
        game_id: Uuid,
        quest_number: u8,
        team_member_ids: &[Uuid],
    ) -> Result<(), CoreError> {
        let event = Self::build(
            game_id,
            EventType::QuestVoteRequested,
            team_member_ids.to_vec(),
            json!({ "quest_number": quest_number, "team_member_ids": team_member_ids }),
        );
        Self::dispatch(ctx, event).await
    }

    pub async fn quest_vote_cast(
        ctx: &ServiceContext,
        game_id: Uuid,
        quest_number: u8,
        player_id: Uuid,
        result: crate::domain::VoteResult,
    ) -> Result<(), CoreError> {
        let event = Self::build(
            game_id,
            EventType::QuestVoteCast,
            vec![],
            json!({ "quest_number": quest_number, "player_id": player_id, "result": result }),
        );
        Self::dispatch(ctx, event).await
    }

    pub async fn quest_completed(
        ctx: &ServiceContext,
        game_id: Uuid,
        quest_number: u8,
        result: crate::domain::VoteResult,
    ) -> Result<(), CoreError> {
        let event = Self::build(
            game_id,
            EventType::QuestCompleted,
            vec![],
            json!({ "quest_number": quest_number, "result": result }),
        );
        Self::dispatch(ctx, event).await
    }

    pub async fn assassination_started(
        ctx: &ServiceContext,
        game_id: Uuid,
        assassination_attempts: u32,
    ) -> Result<(), CoreError> {
        let event = Self::build(
            game_id,
            EventType::AssassinationStarted,
            vec![],
            json!({ "assassination_attempts": assassination_attempts }),
        );
        Self::dispatch(ctx, event).await
    }

    /// Recipients are exactly the sole assassin: delivered by `notify`,
    /// not `broadcast`.
    pub async fn assassination_target_requested(
        ctx: &ServiceContext,
        game_id: Uuid,
        assassin_id: Uuid,
    ) -> Result<(), CoreError> {
        let event = Self::build(
            game_id,
            EventType::AssassinationTargetRequested,
            vec![assassin_id],
            json!({}),
        );
        Self::dispatch(ctx, event).await
    }

    pub async fn assassination_result(
        ctx: &ServiceContext,
        game_id: Uuid,
        target_id: Uuid,
        succeeded: bool,
    ) -> Result<(), CoreError> {
        let event_type = if succeeded {
            EventType::AssassinationSucceeded
        } else {
            EventType::AssassinationFailed
        };
        let event = Self::build(
            game_id,
            event_type,
            vec![],
            json!({ "target_id": target_id, "is_successful": succeeded }),
        );
        Self::dispatch(ctx, event).await
    }

    pub async fn game_ended(
        ctx: &ServiceContext,
        game_id: Uuid,
        player_roles: &std::collections::HashMap<Uuid, crate::domain::Role>,
    ) -> Result<(), CoreError> {
        let event = Self::build(
            game_id,
            EventType::GameEnded,
            vec![],
            json!({ "player_roles": player_roles }),
        );
        Self::dispatch(ctx, event).await
    }
}
