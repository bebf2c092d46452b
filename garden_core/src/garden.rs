//! The `Garden` facade: one object owning every store plus the scoring engine
//! and navigation machine, exposing the whole command/query surface.
//!
//! Stores are explicit injectable values with a defined lifecycle (create,
//! hydrate from snapshot, mutate, serialize) rather than ambient singletons,
//! so the core stays testable in isolation. Cross-store rules live here:
//! deleting a topic cascades to its conversations and exercises, and every
//! study interaction records first, then recomputes the topic's engagement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use garden_world::{
    step_player, InputState, Position, SquareId, StoreError, SubjectSquare, SubjectTheme, Topic,
    TopicId, TopicStore, TopicStoreSnapshot, WorldConfig,
};

use crate::engagement::{EngagementBreakdown, EngagementEngine};
use crate::error::GardenError;
use crate::graph;
use crate::navigation::{
    NavEvent, NavigationMachine, NavigationSnapshot, OnboardingStep, OrbMode, PlayerSnapshot,
    PlayerState,
};
use crate::study::{
    Conversation, ConversationId, ConversationStore, ConversationStoreSnapshot, Exercise,
    ExerciseId, ExerciseKind, ExerciseStore, ExerciseStoreSnapshot, MessageId, MessageRole,
};

/// Everything a running garden session owns.
#[derive(Debug)]
pub struct Garden {
    config: WorldConfig,
    engine: EngagementEngine,
    topics: TopicStore,
    conversations: ConversationStore,
    exercises: ExerciseStore,
    navigation: NavigationMachine,
    player: PlayerState,
}

/// The persisted form of a whole garden: every store's snapshot side by side.
/// Each member carries its own layout version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GardenSnapshot {
    pub topics: TopicStoreSnapshot,
    pub conversations: ConversationStoreSnapshot,
    pub exercises: ExerciseStoreSnapshot,
    pub navigation: NavigationSnapshot,
    pub player: PlayerSnapshot,
}

impl Default for Garden {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl Garden {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            engine: EngagementEngine::with_defaults(),
            topics: TopicStore::new(),
            conversations: ConversationStore::new(),
            exercises: ExerciseStore::new(),
            navigation: NavigationMachine::new(config.clone()),
            player: PlayerState::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn navigation(&self) -> &NavigationMachine {
        &self.navigation
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub fn exercises(&self) -> &ExerciseStore {
        &self.exercises
    }

    pub fn topics(&self) -> &TopicStore {
        &self.topics
    }

    // --- Topic commands ---

    /// Plant a topic in a square. The name is trimmed; blank names are
    /// rejected.
    pub fn add_topic(
        &mut self,
        name: &str,
        square_id: &SquareId,
        position: Position,
    ) -> Result<TopicId, GardenError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GardenError::EmptyTopicName);
        }
        Ok(self.topics.add_topic(name, square_id, position)?)
    }

    /// Rename a topic. Blank names are rejected.
    pub fn rename_topic(&mut self, id: TopicId, name: &str) -> Result<(), GardenError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GardenError::EmptyTopicName);
        }
        Ok(self.topics.rename_topic(id, name)?)
    }

    /// Delete a topic along with everything attached to it: its relationship
    /// edges, its conversations, and its exercises. Nothing is orphaned.
    pub fn delete_topic(&mut self, id: TopicId) -> Result<Topic, GardenError> {
        let topic = self.topics.delete_topic(id)?;
        let conversations = self.conversations.remove_by_topic(id);
        let exercises = self.exercises.remove_by_topic(id);
        info!(topic = %id, conversations, exercises, "topic deleted with cascade");
        Ok(topic)
    }

    pub fn update_topic_position(
        &mut self,
        id: TopicId,
        position: Position,
    ) -> Result<(), GardenError> {
        Ok(self.topics.update_position(id, position.clamped(&self.config))?)
    }

    /// Directly set a topic's engagement score (clamped to 0-100).
    pub fn update_engagement(&mut self, id: TopicId, score: i32) -> Result<(), GardenError> {
        Ok(self.topics.set_engagement(id, score)?)
    }

    pub fn add_relationship(&mut self, a: TopicId, b: TopicId) -> Result<(), GardenError> {
        Ok(self.topics.add_relationship(a, b)?)
    }

    pub fn remove_relationship(&mut self, a: TopicId, b: TopicId) -> Result<(), GardenError> {
        Ok(self.topics.remove_relationship(a, b)?)
    }

    pub fn add_subject_square(&mut self, name: &str, theme: SubjectTheme) -> SquareId {
        self.topics.add_subject_square(name, theme)
    }

    // --- Study commands ---

    /// Open a conversation under a topic. The topic must exist.
    pub fn create_conversation(
        &mut self,
        topic_id: TopicId,
        title: Option<&str>,
    ) -> Result<ConversationId, GardenError> {
        self.require_topic(topic_id)?;
        Ok(self.conversations.create(topic_id, title))
    }

    /// Delete a conversation, then rescore its topic: removed history
    /// changes the signals.
    pub fn delete_conversation(
        &mut self,
        id: ConversationId,
        now: DateTime<Utc>,
    ) -> Result<(), GardenError> {
        let conversation = self.conversations.delete(id)?;
        if self.topics.topic(conversation.topic_id).is_some() {
            self.recompute_engagement(conversation.topic_id, now)?;
        }
        Ok(())
    }

    /// Append a message, then recompute the topic's engagement from the
    /// updated history.
    pub fn add_message(
        &mut self,
        id: ConversationId,
        role: MessageRole,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<MessageId, GardenError> {
        let message_id = self.conversations.add_message(id, role, content, now)?;
        let topic_id = self
            .conversations
            .get(id)
            .map(|c| c.topic_id)
            .ok_or(GardenError::ConversationNotFound(id))?;
        self.recompute_engagement(topic_id, now)?;
        Ok(message_id)
    }

    pub fn set_conversation_title(
        &mut self,
        id: ConversationId,
        title: &str,
    ) -> Result<(), GardenError> {
        self.conversations.set_title(id, title)
    }

    /// Create an exercise under a topic. The topic must exist.
    pub fn create_exercise(
        &mut self,
        topic_id: TopicId,
        kind: ExerciseKind,
        prompt: &str,
    ) -> Result<ExerciseId, GardenError> {
        self.require_topic(topic_id)?;
        Ok(self.exercises.create(topic_id, kind, prompt))
    }

    /// Record the user's answer, then rescore the topic.
    pub fn submit_answer(
        &mut self,
        id: ExerciseId,
        answer: &str,
        now: DateTime<Utc>,
    ) -> Result<(), GardenError> {
        self.exercises.submit_answer(id, answer)?;
        self.rescore_exercise_topic(id, now)
    }

    /// Mark an exercise complete, then rescore the topic.
    pub fn mark_complete(&mut self, id: ExerciseId, now: DateTime<Utc>) -> Result<(), GardenError> {
        self.exercises.mark_complete(id)?;
        self.rescore_exercise_topic(id, now)
    }

    /// Clear an exercise's answer and completion, then rescore the topic.
    pub fn reset_exercise(&mut self, id: ExerciseId, now: DateTime<Utc>) -> Result<(), GardenError> {
        self.exercises.reset(id)?;
        self.rescore_exercise_topic(id, now)
    }

    /// Recompute a topic's engagement from its full study history and push
    /// the result into the topic store.
    pub fn recompute_engagement(
        &mut self,
        topic_id: TopicId,
        now: DateTime<Utc>,
    ) -> Result<u8, GardenError> {
        let conversations = self.conversations.by_topic(topic_id);
        let exercises = self.exercises.by_topic(topic_id);
        let score = self.engine.score(&conversations, &exercises, now);
        self.topics.set_engagement(topic_id, i32::from(score))?;
        Ok(score)
    }

    fn rescore_exercise_topic(&mut self, id: ExerciseId, now: DateTime<Utc>) -> Result<(), GardenError> {
        let topic_id = self
            .exercises
            .get(id)
            .map(|e| e.topic_id)
            .ok_or(GardenError::ExerciseNotFound(id))?;
        self.recompute_engagement(topic_id, now)?;
        Ok(())
    }

    fn require_topic(&self, id: TopicId) -> Result<(), GardenError> {
        if self.topics.topic(id).is_none() {
            return Err(GardenError::Store(StoreError::TopicNotFound(id)));
        }
        Ok(())
    }

    // --- Player commands ---

    pub fn set_player_position(&mut self, position: Position) {
        self.player.set_position(position, &self.config);
    }

    pub fn move_player(&mut self, dx: f32, dy: f32) {
        self.player.move_by(dx, dy, &self.config);
    }

    pub fn set_companion_style(&mut self, style: &str) {
        self.player.set_companion_style(style);
    }

    /// Put the player in a square directly, recentered. Used by the map
    /// overlay and by onboarding subject selection.
    pub fn teleport(&mut self, square_id: &SquareId) -> Result<(), GardenError> {
        if self.topics.square(square_id).is_none() {
            return Err(GardenError::Store(StoreError::ZoneNotFound(
                square_id.clone(),
            )));
        }
        self.player.enter_square(square_id.clone(), &self.config);
        Ok(())
    }

    // --- Navigation commands ---

    pub fn start_orb_carrying(&mut self, topic_name: &str) -> Result<(), GardenError> {
        self.navigation.start_orb_carrying(topic_name)
    }

    pub fn cancel_orb_carrying(&mut self) {
        self.navigation.cancel_orb_carrying();
    }

    /// Plant the carried orb as a topic at the player's position in the
    /// current square.
    ///
    /// Returns the new topic's id, or None when no orb is carried. Requires
    /// the player to be inside a square; the orb stays carried otherwise.
    /// During onboarding this is the final step: planting at
    /// `PlacingFirstTopic` completes the sequence.
    pub fn confirm_orb_placement(&mut self, now_ms: u64) -> Result<Option<TopicId>, GardenError> {
        if self.navigation.orb_mode() != OrbMode::Carrying {
            return Ok(None);
        }
        let Some(square_id) = self.player.current_square().cloned() else {
            return Ok(None);
        };

        let name = match self.navigation.take_pending_topic() {
            Some(name) => name,
            None => return Ok(None),
        };
        let topic_id = self.topics.add_topic(name, &square_id, self.player.position())?;

        if self.navigation.onboarding_step() == OnboardingStep::PlacingFirstTopic {
            self.navigation.advance_onboarding(now_ms);
            self.player.complete_onboarding();
        }
        info!(topic = %topic_id, square = %square_id, "orb planted");
        Ok(Some(topic_id))
    }

    /// Begin a transition toward a square. Returns false while another
    /// transition is in flight or the square is unknown.
    pub fn start_transition(&mut self, target: &SquareId, now_ms: u64) -> bool {
        if self.topics.square(target).is_none() {
            return false;
        }
        self.navigation.start_transition(target.clone(), now_ms)
    }

    pub fn end_transition(&mut self) {
        self.navigation.end_transition();
    }

    pub fn toggle_map(&mut self) {
        self.navigation.toggle_map();
    }

    pub fn set_map_expanded(&mut self, expanded: bool) {
        self.navigation.set_map_expanded(expanded);
    }

    pub fn advance_onboarding(&mut self, now_ms: u64) -> OnboardingStep {
        let step = self.navigation.advance_onboarding(now_ms);
        if step == OnboardingStep::Completed {
            self.player.complete_onboarding();
        }
        step
    }

    /// Skip the rest of the sequence.
    pub fn complete_onboarding(&mut self) {
        self.navigation.set_onboarding_step(OnboardingStep::Completed);
        self.player.complete_onboarding();
    }

    /// Clear the player's zone and completion flag. The step machine resets
    /// separately via [`NavigationMachine::reset`].
    pub fn reset_onboarding(&mut self) {
        self.player.reset_onboarding(&self.config);
    }

    // --- Game loop ---

    /// One game-loop step: move the player, refresh edge proximity, drive
    /// the machine's timers, and apply the resulting events.
    pub fn tick(&mut self, input: &InputState, now_ms: u64, delta_ms: f32) -> Vec<NavEvent> {
        if !input.is_idle() {
            let position = step_player(self.player.position(), input, delta_ms, &self.config);
            self.player.set_position(position, &self.config);
        }

        let squares: Vec<&SubjectSquare> = self.topics.all_squares().collect();
        self.navigation
            .update_edge_proximity(self.player.position(), self.player.current_square(), &squares);

        let events = self.navigation.tick(now_ms);
        for event in &events {
            match event {
                NavEvent::ZoneSwitched(target) => {
                    self.player.enter_square(target.clone(), &self.config);
                }
                NavEvent::OnboardingAdvanced(OnboardingStep::Completed) => {
                    self.player.complete_onboarding();
                }
                _ => {}
            }
        }
        events
    }

    // --- Queries ---

    pub fn topic(&self, id: TopicId) -> Option<&Topic> {
        self.topics.topic(id)
    }

    pub fn topics_by_subject(&self, square_id: &SquareId) -> Vec<&Topic> {
        self.topics.topics_by_subject(square_id)
    }

    pub fn subject_square(&self, id: &SquareId) -> Option<&SubjectSquare> {
        self.topics.square(id)
    }

    pub fn all_subject_squares(&self) -> impl Iterator<Item = &SubjectSquare> {
        self.topics.all_squares()
    }

    pub fn related_topics(&self, start: TopicId, depth: usize) -> Vec<&Topic> {
        graph::related_topics(&self.topics, start, depth)
    }

    pub fn find_path(&self, from: TopicId, to: TopicId) -> Vec<&Topic> {
        graph::find_path(&self.topics, from, to)
    }

    pub fn suggested_topics(&self, current: TopicId) -> Vec<&Topic> {
        graph::suggested_topics(&self.topics, current, graph::DEFAULT_SUGGESTION_LIMIT)
    }

    pub fn conversation(&self, id: ConversationId) -> Option<&Conversation> {
        self.conversations.get(id)
    }

    pub fn conversations_by_topic(&self, topic_id: TopicId) -> Vec<&Conversation> {
        self.conversations.by_topic(topic_id)
    }

    pub fn exercise(&self, id: ExerciseId) -> Option<&Exercise> {
        self.exercises.get(id)
    }

    pub fn exercises_by_topic(&self, topic_id: TopicId) -> Vec<&Exercise> {
        self.exercises.by_topic(topic_id)
    }

    pub fn completion_rate(&self, topic_id: TopicId) -> f32 {
        self.exercises.completion_rate(topic_id)
    }

    /// Per-signal engagement detail for a topic.
    pub fn engagement_breakdown(
        &self,
        topic_id: TopicId,
        now: DateTime<Utc>,
    ) -> Result<EngagementBreakdown, GardenError> {
        self.require_topic(topic_id)?;
        let conversations = self.conversations.by_topic(topic_id);
        let exercises = self.exercises.by_topic(topic_id);
        Ok(self.engine.breakdown(&conversations, &exercises, now))
    }

    // --- Persistence ---

    /// Capture every store as one persistable snapshot.
    pub fn to_snapshot(&self) -> GardenSnapshot {
        GardenSnapshot {
            topics: self.topics.to_snapshot(),
            conversations: self.conversations.to_snapshot(),
            exercises: self.exercises.to_snapshot(),
            navigation: self.navigation.to_snapshot(),
            player: self.player.to_snapshot(),
        }
    }

    /// Rebuild a full garden from a snapshot. Each member store validates its
    /// own layout version.
    pub fn from_snapshot(snapshot: GardenSnapshot, config: WorldConfig) -> Result<Self, GardenError> {
        Ok(Self {
            engine: EngagementEngine::with_defaults(),
            topics: TopicStore::from_snapshot(snapshot.topics)?,
            conversations: ConversationStore::from_snapshot(snapshot.conversations)?,
            exercises: ExerciseStore::from_snapshot(snapshot.exercises)?,
            navigation: NavigationMachine::from_snapshot(snapshot.navigation, config.clone())?,
            player: PlayerState::from_snapshot(snapshot.player, &config)?,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn garden_with_square() -> (Garden, SquareId) {
        let mut garden = Garden::default();
        let square = garden.add_subject_square("Biology", SubjectTheme::Organic);
        (garden, square)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_add_topic_rejects_blank_name() {
        let (mut garden, square) = garden_with_square();
        assert_eq!(
            garden.add_topic("   ", &square, Position::default()),
            Err(GardenError::EmptyTopicName)
        );
    }

    #[test]
    fn test_delete_topic_cascades_study_history() {
        let (mut garden, square) = garden_with_square();
        let topic = garden.add_topic("Cells", &square, Position::default()).unwrap();
        let keeper = garden.add_topic("Genetics", &square, Position::default()).unwrap();

        let conv = garden.create_conversation(topic, None).unwrap();
        garden.add_message(conv, MessageRole::User, "hi", now()).unwrap();
        garden.create_exercise(topic, ExerciseKind::Quiz, "Name an organelle").unwrap();
        let kept_conv = garden.create_conversation(keeper, Some("DNA")).unwrap();

        garden.delete_topic(topic).unwrap();

        assert!(garden.topic(topic).is_none());
        assert!(garden.conversations_by_topic(topic).is_empty());
        assert!(garden.exercises_by_topic(topic).is_empty());
        // Unrelated history is untouched.
        assert!(garden.conversation(kept_conv).is_some());
    }

    #[test]
    fn test_interactions_rescore_after_recording() {
        let (mut garden, square) = garden_with_square();
        let topic = garden.add_topic("Cells", &square, Position::default()).unwrap();
        assert_eq!(garden.topic(topic).unwrap().engagement_score, 0);

        let conv = garden.create_conversation(topic, None).unwrap();
        garden.add_message(conv, MessageRole::User, "what is a cell?", now()).unwrap();
        let after_message = garden.topic(topic).unwrap().engagement_score;
        assert!(after_message > 0);

        let exercise = garden.create_exercise(topic, ExerciseKind::Quiz, "Quiz").unwrap();
        garden.mark_complete(exercise, now()).unwrap();
        let after_exercise = garden.topic(topic).unwrap().engagement_score;
        assert!(after_exercise > after_message);

        garden.reset_exercise(exercise, now()).unwrap();
        assert_eq!(garden.topic(topic).unwrap().engagement_score, after_message);
    }

    #[test]
    fn test_study_creation_requires_topic() {
        let (mut garden, _) = garden_with_square();
        let ghost = TopicId::new();
        assert!(matches!(
            garden.create_conversation(ghost, None),
            Err(GardenError::Store(StoreError::TopicNotFound(_)))
        ));
        assert!(matches!(
            garden.create_exercise(ghost, ExerciseKind::Problem, "p"),
            Err(GardenError::Store(StoreError::TopicNotFound(_)))
        ));
    }

    #[test]
    fn test_orb_placement_plants_at_player_position() {
        let (mut garden, square) = garden_with_square();
        garden.teleport(&square).unwrap();
        garden.set_player_position(Position::new(640.0, 480.0));
        garden.start_orb_carrying("Photosynthesis").unwrap();

        let topic_id = garden.confirm_orb_placement(0).unwrap().unwrap();
        let topic = garden.topic(topic_id).unwrap();
        assert_eq!(topic.name, "Photosynthesis");
        assert_eq!(topic.subject_square, square);
        assert_eq!(topic.position, Position::new(640.0, 480.0));
        assert_eq!(garden.navigation().orb_mode(), OrbMode::Idle);
    }

    #[test]
    fn test_orb_placement_without_zone_keeps_orb() {
        let mut garden = Garden::default();
        garden.start_orb_carrying("Stray").unwrap();
        assert_eq!(garden.confirm_orb_placement(0).unwrap(), None);
        assert_eq!(garden.navigation().orb_mode(), OrbMode::Carrying);
    }

    #[test]
    fn test_orb_placement_finishes_onboarding() {
        let (mut garden, square) = garden_with_square();
        garden.teleport(&square).unwrap();
        // Walk to the placing step.
        for _ in 0..4 {
            garden.advance_onboarding(0);
        }
        assert_eq!(garden.navigation().onboarding_step(), OnboardingStep::PlacingFirstTopic);

        garden.start_orb_carrying("First Topic").unwrap();
        garden.confirm_orb_placement(0).unwrap().unwrap();

        assert_eq!(garden.navigation().onboarding_step(), OnboardingStep::Completed);
        assert!(garden.player().onboarding_complete());
    }

    #[test]
    fn test_tick_applies_zone_switch() {
        let (mut garden, _) = garden_with_square();
        let history = garden.add_subject_square("History", SubjectTheme::Angular);
        let biology = SquareId::from_name("Biology");
        garden.teleport(&biology).unwrap();

        assert!(garden.start_transition(&history, 0));
        // Midpoint of the 500ms window: the zone switches and the player
        // recenters.
        garden.set_player_position(Position::new(10.0, 10.0));
        let events = garden.tick(&InputState::default(), 250, 0.0);
        assert!(events.contains(&NavEvent::ZoneSwitched(history.clone())));
        assert_eq!(garden.player().current_square(), Some(&history));
        assert_eq!(garden.player().position(), Position::center(garden.config()));

        let events = garden.tick(&InputState::default(), 500, 0.0);
        assert!(events.contains(&NavEvent::TransitionFinished));
        assert!(!garden.navigation().is_transitioning());
    }

    #[test]
    fn test_transition_rejects_unknown_square() {
        let (mut garden, _) = garden_with_square();
        assert!(!garden.start_transition(&SquareId::from_name("Nowhere"), 0));
    }

    #[test]
    fn test_tick_moves_player_with_input() {
        let (mut garden, square) = garden_with_square();
        garden.teleport(&square).unwrap();
        let start = garden.player().position();

        let input = InputState { right: true, ..Default::default() };
        garden.tick(&input, 16, 16.0);

        let moved = garden.player().position();
        assert!(moved.x > start.x);
        assert_eq!(moved.y, start.y);
    }

    #[test]
    fn test_full_snapshot_round_trip() {
        let (mut garden, square) = garden_with_square();
        let topic = garden.add_topic("Cells", &square, Position::new(5.0, 6.0)).unwrap();
        let conv = garden.create_conversation(topic, None).unwrap();
        garden.add_message(conv, MessageRole::User, "hello", now()).unwrap();
        garden.create_exercise(topic, ExerciseKind::Reflection, "Reflect").unwrap();
        garden.teleport(&square).unwrap();
        garden.complete_onboarding();

        let json = serde_json::to_string(&garden.to_snapshot()).unwrap();
        let restored = Garden::from_snapshot(
            serde_json::from_str(&json).unwrap(),
            WorldConfig::default(),
        )
        .unwrap();

        assert_eq!(restored.topic(topic), garden.topic(topic));
        assert_eq!(restored.conversation(conv), garden.conversation(conv));
        assert_eq!(restored.player().current_square(), Some(&square));
        assert!(restored.player().onboarding_complete());
        assert_eq!(restored.navigation().onboarding_step(), OnboardingStep::Completed);
    }
}
