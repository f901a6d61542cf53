/// Where the loop is within one tick.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    /// Queue drained; one frame may be rendered.
    Idle,
    /// A window message is being handled.
    Dispatching,
    /// Quit was observed. Terminal.
    Exited,
}

/// Single-threaded cadence: dispatch every pending message, then render
/// exactly one frame when the queue is empty.
///
/// Rendering never preempts a pending message, and nothing is rendered once
/// quit has been observed.
#[derive(Debug, Clone)]
pub struct RenderCadence {
    state: LoopState,
    messages: u64,
    /// Message total at the last [`RenderCadence::take_messages`].
    messages_taken: u64,
    frames: u64,
}

impl RenderCadence {
    pub fn new() -> Self {
        Self {
            state: LoopState::Idle,
            messages: 0,
            messages_taken: 0,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_exited(&self) -> bool {
        self.state == LoopState::Exited
    }

    /// A message arrived. Returns `false` if the loop already exited.
    pub fn on_message(&mut self) -> bool {
        if self.is_exited() {
            return false;
        }
        self.state = LoopState::Dispatching;
        self.messages += 1;
        true
    }

    /// The queue is empty. Returns `true` if a frame should be rendered now.
    pub fn on_idle(&mut self) -> bool {
        if self.is_exited() {
            return false;
        }
        self.state = LoopState::Idle;
        self.frames += 1;
        true
    }

    /// Quit observed: no message is dispatched and no frame rendered after this.
    pub fn quit(&mut self) {
        self.state = LoopState::Exited;
    }

    pub fn messages(&self) -> u64 {
        self.messages
    }

    /// Messages dispatched since the previous call.
    pub fn take_messages(&mut self) -> u64 {
        let since = self.messages - self.messages_taken;
        self.messages_taken = self.messages;
        since
    }

    /// Frames the cadence allowed.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for RenderCadence {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── transitions ───────────────────────────────────────────────────────

    #[test]
    fn starts_idle() {
        let cadence = RenderCadence::new();
        assert_eq!(cadence.state(), LoopState::Idle);
        assert_eq!(cadence.frames(), 0);
    }

    #[test]
    fn messages_are_dispatched_before_the_frame() {
        let mut cadence = RenderCadence::new();
        assert!(cadence.on_message());
        assert!(cadence.on_message());
        assert_eq!(cadence.state(), LoopState::Dispatching);
        assert_eq!(cadence.frames(), 0);

        assert!(cadence.on_idle());
        assert_eq!(cadence.state(), LoopState::Idle);
        assert_eq!(cadence.messages(), 2);
        assert_eq!(cadence.frames(), 1);
    }

    #[test]
    fn one_frame_per_idle_tick() {
        let mut cadence = RenderCadence::new();
        for _ in 0..3 {
            assert!(cadence.on_idle());
        }
        assert_eq!(cadence.frames(), 3);
    }

    #[test]
    fn taken_messages_count_from_the_previous_take() {
        let mut cadence = RenderCadence::new();
        cadence.on_message();
        cadence.on_message();
        assert_eq!(cadence.take_messages(), 2);

        cadence.on_idle();
        cadence.on_message();
        assert_eq!(cadence.take_messages(), 1);
        assert_eq!(cadence.take_messages(), 0);
        assert_eq!(cadence.messages(), 3);
    }

    // ── quit ──────────────────────────────────────────────────────────────

    #[test]
    fn nothing_renders_after_quit() {
        let mut cadence = RenderCadence::new();
        cadence.on_message();
        cadence.quit();

        assert!(!cadence.on_idle());
        assert!(!cadence.on_message());
        assert_eq!(cadence.state(), LoopState::Exited);
        assert_eq!(cadence.frames(), 0);
        assert_eq!(cadence.messages(), 1);
    }
}
