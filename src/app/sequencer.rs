use super::cards::CardKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SequencerState {
    NotStarted,
    Playing(usize),
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionEvent {
    Start,
    MediaEnded(usize),
    Skip,
    TogglePause,
    Terminate,
}

/// Side effects the caller must perform after a transition. The sequencer
/// itself never touches the player or the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Effect {
    /// Mark the card active and start its audio, stopping any other clip.
    Activate(usize),
    PauseAudio,
    ResumeAudio,
    StopAll,
    Progress { done: u32, total: u32 },
    ShowResults,
}

/// Walks the card sequence in order. The cursor is the single source of
/// truth: completion events for any other card are stale and ignored, so a
/// queued "ended" racing a manual skip cannot advance twice.
#[derive(Debug)]
pub(crate) struct Sequencer {
    kinds: Vec<CardKind>,
    state: SequencerState,
    completed: u32,
    total_training: u32,
    paused: bool,
    ready_to_start: bool,
    results_shown: bool,
}

impl Sequencer {
    pub(crate) fn new(kinds: Vec<CardKind>) -> Self {
        let total_training = kinds
            .iter()
            .filter(|kind| **kind == CardKind::Training)
            .count() as u32;
        Self {
            kinds,
            state: SequencerState::NotStarted,
            completed: 0,
            total_training,
            paused: false,
            ready_to_start: false,
            results_shown: false,
        }
    }

    /// Initial effects once the card list is on screen: autoplay the
    /// preparation card when there is one. Playback may still fail at the
    /// player; the session then waits for an explicit start.
    pub(crate) fn begin(&self) -> Vec<Effect> {
        match self.kinds.first() {
            Some(CardKind::Preparation) => vec![Effect::Activate(0)],
            _ => Vec::new(),
        }
    }

    pub(crate) fn state(&self) -> SequencerState {
        self.state
    }

    pub(crate) fn completed(&self) -> u32 {
        self.completed
    }

    pub(crate) fn total_training(&self) -> u32 {
        self.total_training
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused
    }

    pub(crate) fn ready_to_start(&self) -> bool {
        self.ready_to_start
    }

    pub(crate) fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        match (self.state, event) {
            (SequencerState::NotStarted, SessionEvent::Start) => self.start(),
            (SequencerState::NotStarted, SessionEvent::MediaEnded(index)) => {
                // Preparation completion only unlocks the start action; it
                // never moves the cursor and never counts toward progress.
                if self.kinds.get(index) == Some(&CardKind::Preparation) {
                    self.ready_to_start = true;
                }
                Vec::new()
            }
            (SequencerState::Playing(cursor), SessionEvent::MediaEnded(index)) => {
                if index == cursor {
                    self.advance(cursor)
                } else {
                    Vec::new()
                }
            }
            (SequencerState::Playing(cursor), SessionEvent::Skip) => self.advance(cursor),
            (SequencerState::Playing(_), SessionEvent::TogglePause) => {
                self.paused = !self.paused;
                if self.paused {
                    vec![Effect::PauseAudio]
                } else {
                    vec![Effect::ResumeAudio]
                }
            }
            (SequencerState::NotStarted | SequencerState::Playing(_), SessionEvent::Terminate) => {
                self.state = SequencerState::Ended;
                let mut effects = vec![Effect::StopAll];
                self.push_results(&mut effects);
                effects
            }
            _ => Vec::new(),
        }
    }

    fn start(&mut self) -> Vec<Effect> {
        let Some(first_training) = self
            .kinds
            .iter()
            .position(|kind| *kind == CardKind::Training)
        else {
            // Degenerate sequence without a training card: nothing to play.
            self.state = SequencerState::Ended;
            let mut effects = vec![Effect::StopAll];
            self.push_results(&mut effects);
            return effects;
        };
        self.state = SequencerState::Playing(first_training);
        self.paused = false;
        vec![Effect::StopAll, Effect::Activate(first_training)]
    }

    fn advance(&mut self, cursor: usize) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.kinds.get(cursor) == Some(&CardKind::Training) {
            self.completed += 1;
            effects.push(Effect::Progress {
                done: self.completed,
                total: self.total_training,
            });
        }

        let next = cursor + 1;
        if next < self.kinds.len() {
            self.state = SequencerState::Playing(next);
            self.paused = false;
            effects.push(Effect::Activate(next));
        } else {
            self.state = SequencerState::Ended;
            effects.push(Effect::StopAll);
            self.push_results(&mut effects);
        }
        effects
    }

    fn push_results(&mut self, effects: &mut Vec<Effect>) {
        if !self.results_shown {
            self.results_shown = true;
            effects.push(Effect::ShowResults);
        }
    }
}
