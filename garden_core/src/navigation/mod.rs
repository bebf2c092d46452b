//! Navigation state machine: orb-carrying, timed zone transitions, the
//! onboarding sequence, and the map overlay toggle.
//!
//! The machine is single-threaded and tick-driven. All timed behavior hangs
//! off [`ScheduledTask`] handles held on the machine itself; the owner calls
//! [`NavigationMachine::tick`] with the current clock and applies the emitted
//! [`NavEvent`]s. Superseding events cancel pending tasks before scheduling
//! new ones, so stale callbacks cannot fire.

mod player;

pub use player::*;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use garden_world::{
    adjacent_square, near_edge, EdgeDirection, Position, SquareId, SubjectSquare, WorldConfig,
};

use crate::error::GardenError;

/// Whether the player is carrying an unplanted topic orb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrbMode {
    #[default]
    Idle,
    Carrying,
}

/// The strict forward-only onboarding sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    #[default]
    Welcome,
    SubjectSelection,
    EnteringForest,
    PlantPrompt,
    PlacingFirstTopic,
    Completed,
}

impl OnboardingStep {
    /// The following step, or None at the terminal step.
    pub fn next(self) -> Option<Self> {
        match self {
            OnboardingStep::Welcome => Some(OnboardingStep::SubjectSelection),
            OnboardingStep::SubjectSelection => Some(OnboardingStep::EnteringForest),
            OnboardingStep::EnteringForest => Some(OnboardingStep::PlantPrompt),
            OnboardingStep::PlantPrompt => Some(OnboardingStep::PlacingFirstTopic),
            OnboardingStep::PlacingFirstTopic => Some(OnboardingStep::Completed),
            OnboardingStep::Completed => None,
        }
    }
}

/// A pending timer with a cancellation handle: dropping the task cancels it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScheduledTask {
    fire_at_ms: u64,
}

impl ScheduledTask {
    fn at(fire_at_ms: u64) -> Self {
        Self { fire_at_ms }
    }

    fn is_due(&self, now_ms: u64) -> bool {
        now_ms >= self.fire_at_ms
    }
}

/// An in-flight two-phase zone transition.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Transition {
    target: SquareId,
    /// Fires at the temporal midpoint: the zone switches here.
    midpoint: ScheduledTask,
    /// Fires at the end of the window: transitioning state clears here.
    end: ScheduledTask,
    switched: bool,
}

/// State changes emitted by [`NavigationMachine::tick`] for the owner to
/// apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    /// The transition reached its midpoint: make `target` the active zone and
    /// recenter the player.
    ZoneSwitched(SquareId),
    /// The transition window closed.
    TransitionFinished,
    /// A timer advanced the onboarding sequence.
    OnboardingAdvanced(OnboardingStep),
}

/// The navigation state machine. One instance per session.
#[derive(Debug, Clone)]
pub struct NavigationMachine {
    config: WorldConfig,
    map_expanded: bool,
    orb_mode: OrbMode,
    pending_topic_name: Option<String>,
    near_edge: Option<EdgeDirection>,
    adjacent_square: Option<SquareId>,
    transition: Option<Transition>,
    onboarding_step: OnboardingStep,
    onboarding_timer: Option<ScheduledTask>,
}

/// Persisted layout version for navigation snapshots.
pub const NAVIGATION_SNAPSHOT_VERSION: u32 = 1;

/// The durable subset of navigation state. Transitions, edge proximity, and
/// timers are transient and always rehydrate cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationSnapshot {
    pub version: u32,
    pub map_expanded: bool,
    pub orb_mode: OrbMode,
    pub pending_topic_name: Option<String>,
    pub onboarding_step: OnboardingStep,
}

impl NavigationMachine {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            map_expanded: false,
            orb_mode: OrbMode::Idle,
            pending_topic_name: None,
            near_edge: None,
            adjacent_square: None,
            transition: None,
            onboarding_step: OnboardingStep::Welcome,
            onboarding_timer: None,
        }
    }

    // --- Map overlay ---

    pub fn map_expanded(&self) -> bool {
        self.map_expanded
    }

    pub fn set_map_expanded(&mut self, expanded: bool) {
        self.map_expanded = expanded;
    }

    pub fn toggle_map(&mut self) {
        self.map_expanded = !self.map_expanded;
    }

    // --- Orb carrying ---

    pub fn orb_mode(&self) -> OrbMode {
        self.orb_mode
    }

    pub fn pending_topic_name(&self) -> Option<&str> {
        self.pending_topic_name.as_deref()
    }

    /// Pick up an orb holding the (trimmed) name of the topic to plant.
    ///
    /// Empty and whitespace-only names are rejected; a carried orb's name is
    /// replaced by a second call.
    pub fn start_orb_carrying(&mut self, topic_name: &str) -> Result<(), GardenError> {
        let name = topic_name.trim();
        if name.is_empty() {
            return Err(GardenError::EmptyTopicName);
        }

        self.orb_mode = OrbMode::Carrying;
        self.pending_topic_name = Some(name.to_string());
        debug!(name, "orb carrying started");
        Ok(())
    }

    /// Drop the orb without planting.
    pub fn cancel_orb_carrying(&mut self) {
        self.orb_mode = OrbMode::Idle;
        self.pending_topic_name = None;
    }

    /// Hand over the pending topic name and return to idle. The caller plants
    /// the topic; None when no orb is carried.
    pub fn take_pending_topic(&mut self) -> Option<String> {
        let name = self.pending_topic_name.take();
        self.orb_mode = OrbMode::Idle;
        name
    }

    // --- Edge detection ---

    pub fn near_edge(&self) -> Option<EdgeDirection> {
        self.near_edge
    }

    pub fn adjacent_square(&self) -> Option<&SquareId> {
        self.adjacent_square.as_ref()
    }

    /// Refresh which edge the player is near and the zone on its other side.
    pub fn update_edge_proximity(
        &mut self,
        position: Position,
        current_square: Option<&SquareId>,
        squares: &[&SubjectSquare],
    ) {
        self.near_edge = near_edge(position, &self.config);
        self.adjacent_square = match (self.near_edge, current_square) {
            (Some(edge), Some(current)) => adjacent_square(current, edge, squares),
            _ => None,
        };
    }

    // --- Zone transition ---

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn transition_target(&self) -> Option<&SquareId> {
        self.transition.as_ref().map(|t| &t.target)
    }

    /// Begin a timed two-phase transition toward `target`.
    ///
    /// Requests arriving while a transition is in flight are ignored (returns
    /// false) rather than overlapped.
    pub fn start_transition(&mut self, target: SquareId, now_ms: u64) -> bool {
        if self.transition.is_some() {
            debug!(target = %target, "transition request ignored: already transitioning");
            return false;
        }

        let half = self.config.transition_ms / 2;
        self.transition = Some(Transition {
            midpoint: ScheduledTask::at(now_ms + half),
            end: ScheduledTask::at(now_ms + self.config.transition_ms),
            target: target.clone(),
            switched: false,
        });
        info!(target = %target, "zone transition started");
        true
    }

    /// Force-clear any in-flight transition (teardown path).
    pub fn end_transition(&mut self) {
        self.transition = None;
    }

    // --- Onboarding ---

    pub fn onboarding_step(&self) -> OnboardingStep {
        self.onboarding_step
    }

    /// Move the onboarding sequence one step forward. No-op at the terminal
    /// step. Any pending auto-advance timer is cancelled first; landing on
    /// `EnteringForest` schedules a fresh one.
    pub fn advance_onboarding(&mut self, now_ms: u64) -> OnboardingStep {
        self.onboarding_timer = None;

        if let Some(next) = self.onboarding_step.next() {
            self.onboarding_step = next;
            if next == OnboardingStep::EnteringForest {
                self.onboarding_timer =
                    Some(ScheduledTask::at(now_ms + self.config.onboarding_pause_ms));
            }
            info!(step = ?next, "onboarding advanced");
        }
        self.onboarding_step
    }

    /// Jump directly to a step (hydration/debug path). Cancels timers.
    pub fn set_onboarding_step(&mut self, step: OnboardingStep) {
        self.onboarding_timer = None;
        self.onboarding_step = step;
    }

    // --- Clock ---

    /// Advance every pending timer to `now_ms`, emitting the state changes
    /// the owner must apply.
    pub fn tick(&mut self, now_ms: u64) -> Vec<NavEvent> {
        let mut events = Vec::new();

        if let Some(transition) = &mut self.transition {
            if !transition.switched && transition.midpoint.is_due(now_ms) {
                transition.switched = true;
                events.push(NavEvent::ZoneSwitched(transition.target.clone()));
            }
        }
        if self
            .transition
            .as_ref()
            .map_or(false, |t| t.end.is_due(now_ms))
        {
            self.transition = None;
            events.push(NavEvent::TransitionFinished);
        }

        if let Some(timer) = self.onboarding_timer {
            if timer.is_due(now_ms) {
                let step = self.advance_onboarding(now_ms);
                events.push(NavEvent::OnboardingAdvanced(step));
            }
        }

        events
    }

    /// Restore the initial state and cancel every pending timer.
    pub fn reset(&mut self) {
        let config = self.config.clone();
        *self = Self::new(config);
    }

    // --- Persistence ---

    /// Capture the durable navigation state.
    pub fn to_snapshot(&self) -> NavigationSnapshot {
        NavigationSnapshot {
            version: NAVIGATION_SNAPSHOT_VERSION,
            map_expanded: self.map_expanded,
            orb_mode: self.orb_mode,
            pending_topic_name: self.pending_topic_name.clone(),
            onboarding_step: self.onboarding_step,
        }
    }

    /// Rebuild a machine from a snapshot; transient state starts cleared.
    pub fn from_snapshot(
        snapshot: NavigationSnapshot,
        config: WorldConfig,
    ) -> Result<Self, GardenError> {
        if snapshot.version != NAVIGATION_SNAPSHOT_VERSION {
            return Err(GardenError::UnsupportedSnapshotVersion {
                found: snapshot.version,
                expected: NAVIGATION_SNAPSHOT_VERSION,
            });
        }

        let mut machine = Self::new(config);
        machine.map_expanded = snapshot.map_expanded;
        machine.orb_mode = snapshot.orb_mode;
        machine.pending_topic_name = snapshot.pending_topic_name;
        machine.onboarding_step = snapshot.onboarding_step;
        Ok(machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garden_world::SubjectTheme;

    fn machine() -> NavigationMachine {
        NavigationMachine::new(WorldConfig::default())
    }

    #[test]
    fn test_orb_carrying_cycle() {
        let mut nav = machine();
        assert_eq!(nav.orb_mode(), OrbMode::Idle);

        nav.start_orb_carrying("  Thermodynamics  ").unwrap();
        assert_eq!(nav.orb_mode(), OrbMode::Carrying);
        assert_eq!(nav.pending_topic_name(), Some("Thermodynamics"));

        assert_eq!(nav.take_pending_topic(), Some("Thermodynamics".to_string()));
        assert_eq!(nav.orb_mode(), OrbMode::Idle);
        assert_eq!(nav.pending_topic_name(), None);
    }

    #[test]
    fn test_orb_rejects_blank_names() {
        let mut nav = machine();
        assert_eq!(nav.start_orb_carrying(""), Err(GardenError::EmptyTopicName));
        assert_eq!(nav.start_orb_carrying("   \t"), Err(GardenError::EmptyTopicName));
        assert_eq!(nav.orb_mode(), OrbMode::Idle);
    }

    #[test]
    fn test_orb_cancel() {
        let mut nav = machine();
        nav.start_orb_carrying("Entropy").unwrap();
        nav.cancel_orb_carrying();
        assert_eq!(nav.orb_mode(), OrbMode::Idle);
        assert_eq!(nav.take_pending_topic(), None);
    }

    #[test]
    fn test_transition_two_phase_timing() {
        let mut nav = machine(); // transition_ms = 500
        let target = SquareId::from_name("Biology");

        assert!(nav.start_transition(target.clone(), 1_000));
        assert!(nav.is_transitioning());

        // Before the midpoint: nothing fires.
        assert!(nav.tick(1_100).is_empty());

        // At the midpoint: the zone switches, still transitioning.
        let events = nav.tick(1_250);
        assert_eq!(events, vec![NavEvent::ZoneSwitched(target.clone())]);
        assert!(nav.is_transitioning());

        // The midpoint fires once.
        assert!(nav.tick(1_300).is_empty());

        // At the end of the window: transitioning clears.
        let events = nav.tick(1_500);
        assert_eq!(events, vec![NavEvent::TransitionFinished]);
        assert!(!nav.is_transitioning());
    }

    #[test]
    fn test_transition_reentrancy_guard() {
        let mut nav = machine();
        let first = SquareId::from_name("Biology");
        let second = SquareId::from_name("History");

        assert!(nav.start_transition(first.clone(), 0));
        assert!(!nav.start_transition(second, 100));
        assert_eq!(nav.transition_target(), Some(&first));
    }

    #[test]
    fn test_late_tick_fires_both_phases() {
        let mut nav = machine();
        let target = SquareId::from_name("Biology");
        nav.start_transition(target.clone(), 0);

        // A long frame gap lands past the whole window: both events fire in
        // order on the same tick.
        let events = nav.tick(10_000);
        assert_eq!(
            events,
            vec![NavEvent::ZoneSwitched(target), NavEvent::TransitionFinished]
        );
    }

    #[test]
    fn test_onboarding_walk() {
        let mut nav = machine();
        assert_eq!(nav.onboarding_step(), OnboardingStep::Welcome);

        let expected = [
            OnboardingStep::SubjectSelection,
            OnboardingStep::EnteringForest,
            OnboardingStep::PlantPrompt,
            OnboardingStep::PlacingFirstTopic,
            OnboardingStep::Completed,
        ];
        for step in expected {
            assert_eq!(nav.advance_onboarding(0), step);
        }

        // The sixth advance is a no-op at the terminal step.
        assert_eq!(nav.advance_onboarding(0), OnboardingStep::Completed);
    }

    #[test]
    fn test_onboarding_auto_advance_timer() {
        let mut nav = machine(); // onboarding_pause_ms = 1500
        nav.advance_onboarding(0); // subject_selection
        nav.advance_onboarding(100); // entering_forest, timer at 1600

        assert!(nav.tick(1_000).is_empty());
        assert_eq!(nav.onboarding_step(), OnboardingStep::EnteringForest);

        let events = nav.tick(1_600);
        assert_eq!(
            events,
            vec![NavEvent::OnboardingAdvanced(OnboardingStep::PlantPrompt)]
        );
        // The timer is consumed.
        assert!(nav.tick(5_000).is_empty());
    }

    #[test]
    fn test_explicit_advance_cancels_auto_timer() {
        let mut nav = machine();
        nav.advance_onboarding(0);
        nav.advance_onboarding(100); // entering_forest, timer pending

        // The user advances before the timer fires; it must not fire again.
        assert_eq!(nav.advance_onboarding(200), OnboardingStep::PlantPrompt);
        assert!(nav.tick(10_000).is_empty());
        assert_eq!(nav.onboarding_step(), OnboardingStep::PlantPrompt);
    }

    #[test]
    fn test_map_toggle_is_orthogonal() {
        let mut nav = machine();
        nav.start_orb_carrying("Orbits").unwrap();

        nav.toggle_map();
        assert!(nav.map_expanded());
        nav.toggle_map();
        assert!(!nav.map_expanded());
        // Orb state untouched.
        assert_eq!(nav.orb_mode(), OrbMode::Carrying);
    }

    #[test]
    fn test_edge_proximity() {
        let mut nav = machine();
        let math = SubjectSquare::new("Math", SubjectTheme::Crystalline);
        let bio = SubjectSquare::new("Biology", SubjectTheme::Organic);
        let squares = vec![&math, &bio];

        nav.update_edge_proximity(Position::new(50.0, 1000.0), Some(&math.id), &squares);
        assert_eq!(nav.near_edge(), Some(EdgeDirection::West));
        assert_eq!(nav.adjacent_square(), Some(&bio.id));

        nav.update_edge_proximity(Position::new(1000.0, 1000.0), Some(&math.id), &squares);
        assert_eq!(nav.near_edge(), None);
        assert_eq!(nav.adjacent_square(), None);
    }

    #[test]
    fn test_reset_cancels_timers() {
        let mut nav = machine();
        nav.advance_onboarding(0);
        nav.advance_onboarding(0); // timer pending
        nav.start_transition(SquareId::from_name("Biology"), 0);
        nav.toggle_map();

        nav.reset();
        assert_eq!(nav.onboarding_step(), OnboardingStep::Welcome);
        assert!(!nav.is_transitioning());
        assert!(!nav.map_expanded());
        assert!(nav.tick(100_000).is_empty());
    }

    #[test]
    fn test_snapshot_round_trip_clears_transients() {
        let mut nav = machine();
        nav.toggle_map();
        nav.start_orb_carrying("Genetics").unwrap();
        nav.advance_onboarding(0);
        nav.start_transition(SquareId::from_name("Biology"), 0);

        let json = serde_json::to_string(&nav.to_snapshot()).unwrap();
        let restored = NavigationMachine::from_snapshot(
            serde_json::from_str(&json).unwrap(),
            WorldConfig::default(),
        )
        .unwrap();

        assert!(restored.map_expanded());
        assert_eq!(restored.orb_mode(), OrbMode::Carrying);
        assert_eq!(restored.pending_topic_name(), Some("Genetics"));
        assert_eq!(restored.onboarding_step(), OnboardingStep::SubjectSelection);
        // Transient state does not survive hydration.
        assert!(!restored.is_transitioning());
        assert_eq!(restored.near_edge(), None);
    }
}
