use anyhow::Result;
use glam::{Vec2, Vec3};

use super::Ball;
use crate::behavior::{AwakeContext, Behavior, BehaviorId, FrameContext};
use crate::input::KeyCode;
use crate::math::BoundingBox2D;

/// Units per frame a player paddle moves while its key is held.
pub const PLAYER_SPEED: f32 = 0.2;
/// Units per frame the computer paddle chases the ball.
pub const AI_SPEED: f32 = 0.03;

#[derive(Debug, Clone)]
pub struct Paddle {
    pub up_key: KeyCode,
    pub down_key: KeyCode,
    /// Computer-controlled paddles follow `ball` instead of reading keys.
    pub ai: bool,
    pub ball: Option<BehaviorId>,
    pub top_limit: f32,
    pub bottom_limit: f32,
    pub width: f32,
    pub height: f32,
    half_width: f32,
    half_height: f32,
    bounding_box: BoundingBox2D,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            up_key: KeyCode::Character('W'),
            down_key: KeyCode::Character('S'),
            ai: false,
            ball: None,
            top_limit: 3.0,
            bottom_limit: -3.0,
            width: 1.0,
            height: 2.0,
            half_width: 0.5,
            half_height: 1.0,
            bounding_box: BoundingBox2D::default(),
        }
    }
}

impl Paddle {
    pub fn player() -> Self {
        Self::default()
    }

    pub fn computer() -> Self {
        Self {
            ai: true,
            ..Self::default()
        }
    }

    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    /// Bounds as of the start of this paddle's last update.
    pub fn bounding_box(&self) -> BoundingBox2D {
        self.bounding_box
    }

    fn refresh_bounds(&mut self, position: Vec3) {
        self.bounding_box = BoundingBox2D::from_center_size(
            position.truncate(),
            Vec2::new(self.half_width, self.half_height) * 2.0,
        );
    }

    fn step(&self, ctx: &mut FrameContext<'_>) -> f32 {
        let y = ctx.position().y;
        if !self.ai {
            let keyboard = &ctx.input().keyboard;
            let mut dy = 0.0;
            if keyboard.key(self.up_key) && y + self.half_height < self.top_limit {
                dy += PLAYER_SPEED;
            }
            if keyboard.key(self.down_key) && y + dy - self.half_height > self.bottom_limit {
                dy -= PLAYER_SPEED;
            }
            return dy;
        }

        // Only react while the ball is heading toward the left side.
        let Some(ball) = self.ball else {
            return 0.0;
        };
        let Some(velocity) = ctx.behavior::<Ball>(ball).map(|ball| ball.velocity) else {
            return 0.0;
        };
        let Some(ball_position) = ctx.position_of(ball.entity) else {
            return 0.0;
        };
        if velocity.x >= 0.0 {
            0.0
        } else if ball_position.y < y {
            -AI_SPEED
        } else {
            AI_SPEED
        }
    }
}

impl Behavior for Paddle {
    fn awake(&mut self, _ctx: &mut AwakeContext<'_>) -> Result<()> {
        self.half_width = self.width / 2.0;
        self.half_height = self.height / 2.0;
        Ok(())
    }

    fn start(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        self.refresh_bounds(ctx.position());
        Ok(())
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        let position = ctx.position();
        self.refresh_bounds(position);
        let dy = self.step(ctx);
        if dy != 0.0 {
            ctx.set_position(position + Vec3::new(0.0, dy, 0.0));
        }
        Ok(())
    }
}
