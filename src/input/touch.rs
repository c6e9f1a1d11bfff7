use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    Began,
    Moved,
    /// Still down, no movement since the last frame.
    Stationary,
    Ended,
    Canceled,
}

impl TouchPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, TouchPhase::Ended | TouchPhase::Canceled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchData {
    pub finger_id: i32,
    pub position: Vec2,
    pub delta_position: Vec2,
    /// Seconds since this record was last advanced.
    pub delta_time: f32,
    pub tap_count: u32,
    pub phase: TouchPhase,
}

impl TouchData {
    pub(crate) fn began(finger_id: i32, position: Vec2) -> Self {
        Self {
            finger_id,
            position,
            delta_position: Vec2::ZERO,
            delta_time: 0.0,
            tap_count: 1,
            phase: TouchPhase::Began,
        }
    }
}

/// Active touches, in the order the fingers went down.
#[derive(Debug, Default, Clone)]
pub struct Touch {
    previous: Vec<TouchData>,
    current: Vec<TouchData>,
}

impl Touch {
    pub fn touch(&self, index: usize) -> Option<&TouchData> {
        self.current.get(index)
    }

    pub fn touch_count(&self) -> usize {
        self.current.len()
    }

    pub fn touch_by_id(&self, finger_id: i32) -> Option<&TouchData> {
        self.current.iter().find(|touch| touch.finger_id == finger_id)
    }

    pub fn touches(&self) -> &[TouchData] {
        &self.current
    }

    /// The same finger as it was one frame earlier.
    pub fn previous_by_id(&self, finger_id: i32) -> Option<&TouchData> {
        self.previous.iter().find(|touch| touch.finger_id == finger_id)
    }

    /// Publishes `next` as the current frame, then settles `next` for the
    /// frame after: lifted fingers disappear and everything else still down
    /// reads as stationary until it moves again.
    pub(crate) fn advance(&mut self, next: &mut Vec<TouchData>, delta_time: f32) {
        for touch in next.iter_mut() {
            touch.delta_time = delta_time;
        }
        self.previous = std::mem::replace(&mut self.current, next.clone());

        next.retain(|touch| !touch.phase.is_terminal());
        for touch in next.iter_mut() {
            touch.phase = TouchPhase::Stationary;
            touch.delta_position = Vec2::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::input::{InputSink, InputState, TouchPhase};
    use glam::Vec2;

    #[test]
    fn finger_lift_is_visible_for_one_frame() {
        let sink = InputSink::new();
        let mut input = InputState::new();

        sink.touch_start(7, Vec2::new(1.0, 1.0));
        input.advance(&sink, 0.02);
        let touch = input.touch.touch_by_id(7).expect("touch began");
        assert_eq!(touch.phase, TouchPhase::Began);
        assert_eq!(touch.delta_time, 0.02);

        input.advance(&sink, 0.02);
        assert_eq!(input.touch.touch(0).map(|t| t.phase), Some(TouchPhase::Stationary));

        sink.touch_move(7, Vec2::new(4.0, 5.0));
        input.advance(&sink, 0.02);
        let touch = input.touch.touch(0).expect("still down");
        assert_eq!(touch.phase, TouchPhase::Moved);
        assert_eq!(touch.delta_position, Vec2::new(3.0, 4.0));

        sink.touch_end(7, Vec2::new(4.0, 5.0));
        input.advance(&sink, 0.02);
        assert_eq!(input.touch.touch_count(), 1);
        assert_eq!(input.touch.touch(0).map(|t| t.phase), Some(TouchPhase::Ended));

        input.advance(&sink, 0.02);
        assert_eq!(input.touch.touch_count(), 0);
        assert!(input.touch.previous_by_id(7).is_some());
    }

    #[test]
    fn fingers_are_tracked_independently() {
        let sink = InputSink::new();
        let mut input = InputState::new();
        sink.touch_start(1, Vec2::ZERO);
        sink.touch_start(2, Vec2::ONE);
        sink.touch_cancel(1);
        input.advance(&sink, 0.016);
        assert_eq!(input.touch.touch_count(), 2);
        assert_eq!(
            input.touch.touch_by_id(1).map(|t| t.phase),
            Some(TouchPhase::Canceled)
        );

        input.advance(&sink, 0.016);
        assert_eq!(input.touch.touch_count(), 1);
        assert_eq!(input.touch.touch(0).map(|t| t.finger_id), Some(2));
    }
}
