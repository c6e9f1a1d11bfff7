use anyhow::Result;
use glam::{Vec2, Vec3};
use log::{info, warn};

use super::Paddle;
use crate::audio::AudioSource;
use crate::behavior::{Behavior, BehaviorId, FrameContext};
use crate::math::BoundingBox2D;

pub const BOUNCE_SOUNDS: [&str; 3] = [
    "Sounds/Blip_Select.wav",
    "Sounds/Blip_Select2.wav",
    "Sounds/Blip_Select3.wav",
];

/// How far past a paddle's face the ball may be and still bounce straight
/// back instead of also flipping its vertical direction.
const ERROR_MARGIN: f32 = 0.1;

/// The ball: moves a fixed step per frame, bounces off walls and paddles,
/// and keeps score.
///
/// Only one paddle is live at a time. After bouncing off one side the ball
/// ignores that paddle until it touches the other one or a point is scored.
#[derive(Debug, Clone)]
pub struct Ball {
    pub velocity: Vec3,
    pub top_limit: f32,
    pub bottom_limit: f32,
    pub left_limit: f32,
    pub right_limit: f32,
    pub width: f32,
    pub height: f32,
    /// Player paddle, on the right.
    pub paddle1: BehaviorId,
    /// Computer paddle, on the left.
    pub paddle2: BehaviorId,
    pub score1: u32,
    pub score2: u32,
    pub paddle1_enabled: bool,
    sounds: Vec<Option<AudioSource>>,
}

impl Ball {
    pub fn new(paddle1: BehaviorId, paddle2: BehaviorId) -> Self {
        Self {
            velocity: Vec3::new(-0.1, -0.1, 0.0),
            top_limit: 3.0,
            bottom_limit: -3.0,
            left_limit: -5.0,
            right_limit: 5.0,
            width: 0.5,
            height: 0.5,
            paddle1,
            paddle2,
            score1: 0,
            score2: 0,
            paddle1_enabled: true,
            sounds: Vec::new(),
        }
    }

    fn play(&mut self, ctx: &mut FrameContext<'_>, sound: usize) {
        let now = ctx.time().elapsed();
        if let Some(Some(source)) = self.sounds.get_mut(sound) {
            source.play(ctx.audio(), now);
        }
    }

    /// Face position, half width and bounds of a paddle.
    fn paddle(ctx: &FrameContext<'_>, id: BehaviorId) -> Option<(Vec3, f32, BoundingBox2D)> {
        let paddle = ctx.behavior::<Paddle>(id)?;
        let position = ctx.position_of(id.entity)?;
        Some((position, paddle.half_width(), paddle.bounding_box()))
    }

    fn score(&mut self, ctx: &mut FrameContext<'_>, right_scored: bool) {
        if right_scored {
            self.score1 += 1;
        } else {
            self.score2 += 1;
        }
        info!("score {} - {}", self.score1, self.score2);
        self.velocity.x = -self.velocity.x;
        ctx.set_position(Vec3::ZERO);
        self.paddle1_enabled = right_scored;
    }
}

impl Behavior for Ball {
    fn start(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        self.sounds = BOUNCE_SOUNDS
            .iter()
            .map(|path| match AudioSource::from_file(ctx.audio(), path) {
                Ok(source) => Some(source),
                Err(err) => {
                    warn!("ball: {err}");
                    None
                }
            })
            .collect();
        Ok(())
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<()> {
        ctx.set_position(ctx.position() + self.velocity);

        let x = ctx.position().x;
        if x < self.left_limit {
            self.score(ctx, true);
        } else if x > self.right_limit {
            self.score(ctx, false);
        }

        let position = ctx.position();
        let half = Vec2::new(self.width, self.height) / 2.0;
        let bounds = BoundingBox2D::new(position.truncate() - half, position.truncate() + half);

        if position.y - half.y <= self.bottom_limit || position.y + half.y >= self.top_limit {
            self.velocity.y = -self.velocity.y;
            self.play(ctx, 0);
        }

        if self.paddle1_enabled {
            if let Some((paddle, half_width, paddle_bounds)) = Self::paddle(ctx, self.paddle1) {
                if bounds.intersects(&paddle_bounds) {
                    if position.x <= paddle.x + half_width - ERROR_MARGIN {
                        self.velocity.y = -self.velocity.y;
                    }
                    self.velocity.x = -self.velocity.x;
                    self.paddle1_enabled = false;
                    self.play(ctx, 1);
                }
            }
        } else if let Some((paddle, half_width, paddle_bounds)) = Self::paddle(ctx, self.paddle2) {
            if bounds.intersects(&paddle_bounds) {
                if position.x >= paddle.x - half_width + ERROR_MARGIN {
                    self.velocity.y = -self.velocity.y;
                }
                self.velocity.x = -self.velocity.x;
                self.paddle1_enabled = true;
                self.play(ctx, 2);
            }
        }
        Ok(())
    }
}
