use std::time::Duration;

use crate::vm::config::TIMER_HZ;
use crate::vm::state::VmState;

pub const TIMER_TICK: Duration = Duration::from_nanos(1_000_000_000 / TIMER_HZ as u64);

/// One 60 Hz tick. Both timers stop at zero.
pub fn tick_timers(state: &mut VmState) {
    state.delay_timer = state.delay_timer.saturating_sub(1);
    state.sound_timer = state.sound_timer.saturating_sub(1);
}

/// Turns wall-clock time into whole timer ticks, carrying the remainder forward.
#[derive(Debug, Clone, Default)]
pub struct TimerClock {
    accumulated: Duration,
}

impl TimerClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulated += elapsed;

        let mut ticks = 0;
        while self.accumulated >= TIMER_TICK {
            self.accumulated -= TIMER_TICK;
            ticks += 1;
        }
        ticks
    }

    pub fn pending(&self) -> Duration {
        self.accumulated
    }
}

/// Applies every tick that `elapsed` completes and returns how many there were.
pub fn advance_timers(state: &mut VmState, clock: &mut TimerClock, elapsed: Duration) -> u32 {
    let ticks = clock.advance(elapsed);
    for _ in 0..ticks {
        tick_timers(state);
    }
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::state::create_state;

    #[test]
    fn partial_ticks_carry_over() {
        let mut clock = TimerClock::new();

        assert_eq!(clock.advance(TIMER_TICK / 2), 0);
        assert_eq!(clock.advance(TIMER_TICK / 2), 1);
        assert_eq!(clock.advance(TIMER_TICK * 3 + TIMER_TICK / 4), 3);
        assert_eq!(clock.pending(), TIMER_TICK / 4);
    }

    #[test]
    fn one_second_is_sixty_ticks() {
        let mut clock = TimerClock::new();
        assert_eq!(clock.advance(Duration::from_secs(1)), 60);
    }

    #[test]
    fn timers_drop_by_exactly_the_tick_count() {
        let mut state = create_state();
        let mut clock = TimerClock::new();
        state.delay_timer = 10;
        state.sound_timer = 4;

        let ticks = advance_timers(&mut state, &mut clock, TIMER_TICK * 6);

        assert_eq!(ticks, 6);
        assert_eq!(state.delay_timer, 4);
        assert_eq!(state.sound_timer, 0);
    }

    #[test]
    fn zero_timers_stay_at_zero() {
        let mut state = create_state();
        tick_timers(&mut state);
        assert_eq!(state.delay_timer, 0);
        assert_eq!(state.sound_timer, 0);
    }
}
