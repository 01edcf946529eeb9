/// Named sound cues fired by core transitions. Playback is fire-and-forget;
/// a sink that cannot play simply drops the cue.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum AudioCue {
    DiceRoll,
    Purchase,
    Rent,
    CardDraw,
    Jail,
    PassGo,
    Build,
    Bankruptcy,
    Win,
    MenuSelect,
}

pub trait AudioSink {
    fn play(&mut self, cue: AudioCue);
}

/// Default sink: swallows every cue.
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: AudioCue) {}
}

/// Records cues in order; used by tests to assert on emitted sounds. The
/// shared handle stays usable after the sink is moved into the game.
#[derive(Clone, Default)]
pub struct RecordingAudio {
    pub cues: std::rc::Rc<std::cell::RefCell<Vec<AudioCue>>>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: AudioCue) {
        self.cues.borrow_mut().push(cue);
    }
}
