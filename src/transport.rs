//! Transport state machine for the player.
//!
//! The transport owns the five-state machine (Stopped, Starting, Playing,
//! Paused, Stopping) and the enablement of the Play/Pause/Stop controls. It is
//! split in two layers:
//!
//! - [`Transport`] is a plain `Copy` value. [`Transport::step`] maps a state and
//!   an event to the next state plus the list of [`Effect`]s the engine has to
//!   carry out. Nothing in it touches audio or widgets, so every sequence of
//!   user and engine events can be replayed in tests.
//! - [`TransportController`] couples a `Transport` with a [`Deck`] (the audio
//!   engine seen from the control thread) and executes the effects in order.

use std::fmt;

use crate::source::BlockSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Starting,
    Playing,
    Paused,
    Stopping,
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportState::Stopped => "Stopped",
            TransportState::Starting => "Starting",
            TransportState::Playing => "Playing",
            TransportState::Paused => "Paused",
            TransportState::Stopping => "Stopping",
        };
        f.write_str(name)
    }
}

/// Enablement of the three transport buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    pub play: bool,
    pub pause: bool,
    pub stop: bool,
}

impl Controls {
    /// Everything disabled, as before any file has been opened.
    pub const NONE: Controls = Controls {
        play: false,
        pause: false,
        stop: false,
    };

    /// A freshly opened, unstarted file.
    pub const READY: Controls = Controls {
        play: true,
        pause: false,
        stop: false,
    };
}

/// Inputs to the state machine: user intent and engine notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    /// A new source was opened and handed to the engine
    SourceLoaded,
    PlayPressed,
    PausePressed,
    StopPressed,
    LoopToggled(bool),
    /// The engine reports that it is producing audio
    EngineStarted,
    /// The engine reports that it is no longer producing audio
    EngineStopped,
}

/// Side effects requested by a transition, to be executed against a [`Deck`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    StartSource,
    StopSource,
    ResetPosition,
    SetLooping(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transport {
    state: TransportState,
    controls: Controls,
    looping: bool,
    has_source: bool,
}

impl Transport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_looping(looping: bool) -> Self {
        Self {
            looping,
            ..Self::default()
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn has_source(&self) -> bool {
        self.has_source
    }

    /// Pure transition: returns the next transport and the effects to run.
    pub fn step(mut self, event: TransportEvent) -> (Transport, Vec<Effect>) {
        let effects = self.apply(event);
        (self, effects)
    }

    /// Applies an event in place and returns the effects to run, in order.
    pub fn apply(&mut self, event: TransportEvent) -> Vec<Effect> {
        let mut effects = Vec::new();

        match event {
            TransportEvent::SourceLoaded => {
                self.has_source = true;
                self.state = TransportState::Stopped;
                self.controls = Controls::READY;
                effects.push(Effect::StopSource);
                effects.push(Effect::ResetPosition);
                effects.push(Effect::SetLooping(self.looping));
            }
            TransportEvent::PlayPressed => {
                if self.controls.play {
                    effects.push(Effect::SetLooping(self.looping));
                    effects.extend(self.change_state(TransportState::Starting));
                }
            }
            TransportEvent::PausePressed => {
                if self.controls.pause {
                    // Stopping the source keeps its read position
                    effects.push(Effect::StopSource);
                    effects.extend(self.change_state(TransportState::Paused));
                }
            }
            TransportEvent::StopPressed => {
                effects.push(Effect::StopSource);
                effects.push(Effect::ResetPosition);
                effects.extend(self.change_state(TransportState::Stopped));
            }
            TransportEvent::LoopToggled(looping) => {
                self.looping = looping;
                if self.has_source {
                    effects.push(Effect::SetLooping(looping));
                }
            }
            TransportEvent::EngineStarted => {
                if self.state == TransportState::Starting {
                    effects.extend(self.change_state(TransportState::Playing));
                }
            }
            TransportEvent::EngineStopped => match self.state {
                TransportState::Playing | TransportState::Stopping => {
                    effects.extend(self.change_state(TransportState::Stopped));
                }
                // A pause stops the engine too; that notification must not demote Paused.
                // In Starting it can only be a stale notification from before the restart.
                TransportState::Paused | TransportState::Starting | TransportState::Stopped => {}
            },
        }

        effects
    }

    /// Commits `new_state` and returns the effects attached to entering it.
    /// Does nothing when the transport is already in `new_state`.
    pub fn change_state(&mut self, new_state: TransportState) -> Vec<Effect> {
        if self.state == new_state {
            return Vec::new();
        }

        log::debug!("Transport: {} -> {}", self.state, new_state);
        self.state = new_state;

        match new_state {
            TransportState::Stopped => {
                self.controls.stop = false;
                self.controls.play = true;
                self.controls.pause = false;
                vec![Effect::ResetPosition]
            }
            TransportState::Starting => {
                self.controls.play = false;
                self.controls.pause = false;
                vec![Effect::StartSource]
            }
            TransportState::Playing => {
                self.controls.stop = true;
                self.controls.pause = true;
                Vec::new()
            }
            TransportState::Paused => {
                self.controls.pause = false;
                self.controls.play = true;
                self.controls.stop = true;
                Vec::new()
            }
            TransportState::Stopping => vec![Effect::StopSource],
        }
    }
}

/// The audio engine as seen from the control thread.
pub trait Deck {
    /// Replaces the current source; the previous one is released by the engine.
    fn load(&mut self, source: Box<dyn BlockSource>);
    fn start(&mut self);
    fn stop(&mut self);
    fn set_position(&mut self, seconds: f64);
    fn set_looping(&mut self, looping: bool);
    fn position(&self) -> f64;
    fn is_playing(&self) -> bool;
}

/// Drives a [`Deck`] from transport events.
pub struct TransportController<D: Deck> {
    transport: Transport,
    deck: D,
}

impl<D: Deck> TransportController<D> {
    pub fn new(deck: D, looping: bool) -> Self {
        Self {
            transport: Transport::with_looping(looping),
            deck,
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn state(&self) -> TransportState {
        self.transport.state()
    }

    pub fn controls(&self) -> Controls {
        self.transport.controls()
    }

    pub fn deck(&self) -> &D {
        &self.deck
    }

    pub fn deck_mut(&mut self) -> &mut D {
        &mut self.deck
    }

    /// Hands a freshly decoded source to the deck and resets the controls.
    pub fn open(&mut self, source: Box<dyn BlockSource>) {
        self.deck.stop();
        self.deck.load(source);
        self.handle(TransportEvent::SourceLoaded);
    }

    pub fn play(&mut self) {
        self.handle(TransportEvent::PlayPressed);
    }

    pub fn pause(&mut self) {
        self.handle(TransportEvent::PausePressed);
    }

    pub fn stop(&mut self) {
        self.handle(TransportEvent::StopPressed);
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.handle(TransportEvent::LoopToggled(looping));
    }

    pub fn toggle_looping(&mut self) {
        let looping = !self.transport.is_looping();
        self.set_looping(looping);
    }

    /// Engine notification: the deck started or stopped producing audio.
    pub fn engine_changed(&mut self, playing: bool) {
        if playing {
            self.handle(TransportEvent::EngineStarted);
        } else {
            self.handle(TransportEvent::EngineStopped);
        }
    }

    pub fn handle(&mut self, event: TransportEvent) {
        for effect in self.transport.apply(event) {
            self.run(effect);
        }
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::StartSource => self.deck.start(),
            Effect::StopSource => self.deck.stop(),
            Effect::ResetPosition => self.deck.set_position(0.0),
            Effect::SetLooping(looping) => self.deck.set_looping(looping),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened() -> Transport {
        let (transport, _) = Transport::new().step(TransportEvent::SourceLoaded);
        transport
    }

    fn playing() -> Transport {
        let (transport, _) = opened().step(TransportEvent::PlayPressed);
        let (transport, _) = transport.step(TransportEvent::EngineStarted);
        transport
    }

    #[test]
    fn test_new_transport() {
        let transport = Transport::new();
        assert_eq!(transport.state(), TransportState::Stopped);
        assert_eq!(transport.controls(), Controls::NONE);
        assert!(!transport.has_source());
        assert!(!transport.is_looping());
    }

    #[test]
    fn test_play_without_source_is_ignored() {
        let (transport, effects) = Transport::new().step(TransportEvent::PlayPressed);
        assert_eq!(transport.state(), TransportState::Stopped);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_source_loaded_enables_play() {
        let (transport, effects) = Transport::new().step(TransportEvent::SourceLoaded);
        assert_eq!(transport.state(), TransportState::Stopped);
        assert_eq!(transport.controls(), Controls::READY);
        assert_eq!(
            effects,
            vec![
                Effect::StopSource,
                Effect::ResetPosition,
                Effect::SetLooping(false)
            ]
        );
    }

    #[test]
    fn test_play_starts_source() {
        let (transport, effects) = opened().step(TransportEvent::PlayPressed);
        assert_eq!(transport.state(), TransportState::Starting);
        assert!(!transport.controls().play);
        assert!(!transport.controls().pause);
        assert_eq!(
            effects,
            vec![Effect::SetLooping(false), Effect::StartSource]
        );
    }

    #[test]
    fn test_engine_started_enables_pause_and_stop() {
        let transport = playing();
        assert_eq!(transport.state(), TransportState::Playing);
        assert_eq!(
            transport.controls(),
            Controls {
                play: false,
                pause: true,
                stop: true
            }
        );
    }

    #[test]
    fn test_pause_retains_position() {
        let (transport, effects) = playing().step(TransportEvent::PausePressed);
        assert_eq!(transport.state(), TransportState::Paused);
        assert_eq!(effects, vec![Effect::StopSource]);
        assert_eq!(
            transport.controls(),
            Controls {
                play: true,
                pause: false,
                stop: true
            }
        );
    }

    #[test]
    fn test_resume_from_pause_does_not_rewind() {
        let (paused, _) = playing().step(TransportEvent::PausePressed);
        let (transport, effects) = paused.step(TransportEvent::PlayPressed);
        assert_eq!(transport.state(), TransportState::Starting);
        assert!(!effects.contains(&Effect::ResetPosition));
        assert!(effects.contains(&Effect::StartSource));
    }

    #[test]
    fn test_engine_stopped_while_playing() {
        let (transport, effects) = playing().step(TransportEvent::EngineStopped);
        assert_eq!(transport.state(), TransportState::Stopped);
        assert_eq!(transport.controls(), Controls::READY);
        assert_eq!(effects, vec![Effect::ResetPosition]);
    }

    #[test]
    fn test_engine_stopped_ignored_while_paused() {
        let (paused, _) = playing().step(TransportEvent::PausePressed);
        let mut transport = paused;
        for _ in 0..5 {
            let effects = transport.apply(TransportEvent::EngineStopped);
            assert!(effects.is_empty());
        }
        assert_eq!(transport, paused);
    }

    #[test]
    fn test_stale_engine_stopped_does_not_cancel_restart() {
        let (paused, _) = playing().step(TransportEvent::PausePressed);
        let (starting, _) = paused.step(TransportEvent::PlayPressed);
        let (transport, effects) = starting.step(TransportEvent::EngineStopped);
        assert_eq!(transport.state(), TransportState::Starting);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_stop_from_any_state() {
        let (paused, _) = playing().step(TransportEvent::PausePressed);
        for start in [opened(), playing(), paused] {
            let (transport, effects) = start.step(TransportEvent::StopPressed);
            assert_eq!(transport.state(), TransportState::Stopped);
            assert_eq!(effects[0], Effect::StopSource);
            assert_eq!(effects[1], Effect::ResetPosition);
        }
    }

    #[test]
    fn test_repeated_stop_is_idempotent() {
        let (once, _) = playing().step(TransportEvent::StopPressed);
        let (twice, effects) = once.step(TransportEvent::StopPressed);
        assert_eq!(once, twice);
        assert_eq!(effects, vec![Effect::StopSource, Effect::ResetPosition]);
    }

    #[test]
    fn test_change_state_same_state_is_noop() {
        let mut transport = playing();
        let before = transport;
        assert!(transport.change_state(TransportState::Playing).is_empty());
        assert_eq!(transport, before);
    }

    #[test]
    fn test_stopping_stops_source_and_settles_on_engine_stopped() {
        let mut transport = playing();
        assert_eq!(
            transport.change_state(TransportState::Stopping),
            vec![Effect::StopSource]
        );
        transport.apply(TransportEvent::EngineStopped);
        assert_eq!(transport.state(), TransportState::Stopped);
    }

    #[test]
    fn test_loop_toggle_without_source() {
        let (transport, effects) = Transport::new().step(TransportEvent::LoopToggled(true));
        assert!(transport.is_looping());
        assert!(effects.is_empty());
    }

    #[test]
    fn test_loop_toggle_with_source() {
        let (transport, effects) = opened().step(TransportEvent::LoopToggled(true));
        assert!(transport.is_looping());
        assert_eq!(effects, vec![Effect::SetLooping(true)]);
    }

    #[test]
    fn test_loading_while_playing_resets_controls() {
        let (transport, effects) = playing().step(TransportEvent::SourceLoaded);
        assert_eq!(transport.state(), TransportState::Stopped);
        assert_eq!(transport.controls(), Controls::READY);
        assert!(effects.contains(&Effect::StopSource));
        assert_eq!(transport, opened());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(TransportState::Paused.to_string(), "Paused");
        assert_eq!(TransportState::Stopping.to_string(), "Stopping");
    }
}
