/// Playback of a fixed sequence of frames, e.g. the years of a time series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Playback {
    Stopped,
    Playing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    state: Playback,
    index: usize,
    len: usize,
}

impl Player {
    pub fn new(len: usize) -> Self {
        Self { state: Playback::Stopped, index: 0, len }
    }

    /// Starts at the last frame, where a year scrubber usually rests.
    pub fn at_end(len: usize) -> Self {
        Self { state: Playback::Stopped, index: len.saturating_sub(1), len }
    }

    pub fn state(&self) -> Playback {
        self.state
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_playing(&self) -> bool {
        self.state == Playback::Playing
    }

    fn last(&self) -> usize {
        self.len.saturating_sub(1)
    }

    /// Playing from the last frame rewinds first.
    pub fn play(&mut self) {
        if self.len < 2 {
            return;
        }
        if self.index >= self.last() {
            self.index = 0;
        }
        self.state = Playback::Playing;
    }

    pub fn pause(&mut self) {
        self.state = Playback::Stopped;
    }

    pub fn toggle(&mut self) {
        match self.state {
            Playback::Playing => self.pause(),
            Playback::Stopped => self.play(),
        }
    }

    /// Manual steps stop playback.
    pub fn step_forward(&mut self) {
        self.state = Playback::Stopped;
        self.index = (self.index + 1).min(self.last());
    }

    pub fn step_backward(&mut self) {
        self.state = Playback::Stopped;
        self.index = self.index.saturating_sub(1);
    }

    /// Advances one frame while playing; reaching the last frame stops.
    /// Returns whether the frame changed.
    pub fn tick(&mut self) -> bool {
        if self.state != Playback::Playing {
            return false;
        }
        if self.index < self.last() {
            self.index += 1;
        }
        if self.index >= self.last() {
            self.state = Playback::Stopped;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plays_to_the_end_then_stops() {
        let mut p = Player::new(3);
        p.play();
        assert!(p.tick());
        assert_eq!((p.index(), p.state()), (1, Playback::Playing));
        assert!(p.tick());
        assert_eq!((p.index(), p.state()), (2, Playback::Stopped));
        assert!(!p.tick());
        assert_eq!(p.index(), 2);
    }

    #[test]
    fn play_at_end_rewinds() {
        let mut p = Player::at_end(4);
        assert_eq!(p.index(), 3);
        p.toggle();
        assert_eq!((p.index(), p.state()), (0, Playback::Playing));
        p.toggle();
        assert_eq!(p.state(), Playback::Stopped);
    }

    #[test]
    fn steps_clamp_and_stop() {
        let mut p = Player::new(2);
        p.play();
        p.step_backward();
        assert_eq!((p.index(), p.state()), (0, Playback::Stopped));
        p.step_forward();
        p.step_forward();
        assert_eq!(p.index(), 1);
    }

    #[test]
    fn single_frame_never_plays() {
        let mut p = Player::new(1);
        p.play();
        assert!(!p.is_playing());
        let mut empty = Player::new(0);
        empty.step_forward();
        assert_eq!(empty.index(), 0);
    }
}
