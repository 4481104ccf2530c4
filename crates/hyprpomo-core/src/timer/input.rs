use std::collections::VecDeque;

/// A single decoded keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// `p`: pause/resume.
    Pause,
    /// `s`: skip the current phase.
    Skip,
    /// `b`: break out of flow.
    Break,
    /// `q`: quit.
    Quit,
    /// Ctrl-C or a termination signal.
    Interrupt,
    Other(char),
}

impl Key {
    pub fn from_char(c: char) -> Self {
        match c.to_ascii_lowercase() {
            'p' => Key::Pause,
            's' => Key::Skip,
            'b' => Key::Break,
            'q' => Key::Quit,
            other => Key::Other(other),
        }
    }
}

/// Non-blocking source of keypresses. Returns at most one key per call.
pub trait KeySource {
    fn poll_key(&mut self) -> Option<Key>;
}

impl<K: KeySource + ?Sized> KeySource for &mut K {
    fn poll_key(&mut self) -> Option<Key> {
        (**self).poll_key()
    }
}

/// Replays keys at fixed poll counts.
///
/// Poll number `n` (zero-based) yields every scripted key whose position is
/// `<= n`, one per poll. Once the script is exhausted and `idle_limit`
/// further polls have gone by, the source reports [`Key::Interrupt`] so a
/// run driven by a short script still terminates.
#[derive(Debug, Clone)]
pub struct ScriptedKeys {
    script: VecDeque<(u64, Key)>,
    polls: u64,
    idle_polls: u64,
    idle_limit: u64,
}

impl ScriptedKeys {
    pub fn new(script: impl IntoIterator<Item = (u64, Key)>) -> Self {
        let mut script: Vec<_> = script.into_iter().collect();
        script.sort_by_key(|(at, _)| *at);
        Self {
            script: script.into(),
            polls: 0,
            idle_polls: 0,
            idle_limit: 1_000_000,
        }
    }

    pub fn with_idle_limit(mut self, idle_limit: u64) -> Self {
        self.idle_limit = idle_limit;
        self
    }

    /// Number of polls made so far.
    pub fn polls(&self) -> u64 {
        self.polls
    }
}

impl KeySource for ScriptedKeys {
    fn poll_key(&mut self) -> Option<Key> {
        let poll = self.polls;
        self.polls += 1;

        match self.script.front() {
            Some(&(at, key)) if at <= poll => {
                self.script.pop_front();
                Some(key)
            }
            Some(_) => None,
            None => {
                self.idle_polls += 1;
                (self.idle_polls > self.idle_limit).then_some(Key::Interrupt)
            }
        }
    }
}
