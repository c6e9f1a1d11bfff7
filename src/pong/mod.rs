//! Two-paddle demo game built on the engine.
//!
//! The player paddle sits on the right and moves with W/S; the computer
//! paddle on the left chases the ball whenever it is heading its way.

mod ball;
mod paddle;

pub use ball::{Ball, BOUNCE_SOUNDS};
pub use paddle::{Paddle, AI_SPEED, PLAYER_SPEED};

use glam::Vec3;
use log::info;

use crate::behavior::BehaviorId;
use crate::camera::Camera;
use crate::entity::{Entity, EntityId};
use crate::scene::Scene;

pub const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 0.0, -7.0);
pub const PLAYER_PADDLE_POSITION: Vec3 = Vec3::new(3.5, 0.0, 0.0);
pub const COMPUTER_PADDLE_POSITION: Vec3 = Vec3::new(-3.5, 0.0, 0.0);

/// Ids of everything [`build_scene`] creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PongHandles {
    pub camera: EntityId,
    pub paddle1: BehaviorId,
    pub paddle2: BehaviorId,
    pub ball: BehaviorId,
}

/// Populates `scene` with a camera, both paddles and the ball, in that
/// order.
pub fn build_scene(scene: &mut Scene) -> PongHandles {
    let mut camera = Entity::create_camera(scene.viewport());
    if let Some(index) = camera.camera() {
        if let Some(camera) = camera.get_mut::<Camera>(index) {
            camera.background = scene.config().background;
        }
    }
    camera.transform_mut().set_translation(CAMERA_POSITION);
    let camera = scene.add_entity(camera);

    let paddle1 = add_paddle(scene, "Paddle1", Paddle::player(), PLAYER_PADDLE_POSITION);
    let paddle2 = add_paddle(scene, "Paddle2", Paddle::computer(), COMPUTER_PADDLE_POSITION);

    let mut ball = Entity::create_quad()
        .with_name("Ball")
        .with_scale(Vec3::new(0.5, 0.5, 1.0));
    let index = ball.add_behavior(Ball::new(paddle1, paddle2));
    let ball = BehaviorId::new(scene.add_entity(ball), index);

    if let Some(paddle) = scene.behavior_mut::<Paddle>(paddle2) {
        paddle.ball = Some(ball);
    }
    info!("pong scene ready with {} entities", scene.len());

    PongHandles {
        camera,
        paddle1,
        paddle2,
        ball,
    }
}

fn add_paddle(scene: &mut Scene, name: &str, paddle: Paddle, position: Vec3) -> BehaviorId {
    let mut entity = Entity::create_quad()
        .with_name(name)
        .with_scale(Vec3::new(1.0, 2.0, 1.0));
    let index = entity.add_behavior(paddle);
    entity.transform_mut().set_translation(position);
    BehaviorId::new(scene.add_entity(entity), index)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::audio::{AudioBackend, AudioClip};
    use crate::config::EngineConfig;
    use crate::error::AudioError;
    use crate::input::KeyCode;

    const DT: f32 = 1.0 / 60.0;

    fn pong() -> (Scene, PongHandles) {
        let mut scene = Scene::new(EngineConfig::default());
        let handles = build_scene(&mut scene);
        (scene, handles)
    }

    fn position(scene: &Scene, id: BehaviorId) -> Vec3 {
        scene.graph().position(id.entity).expect("entity alive")
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn builds_four_entities_in_order() {
        let (scene, handles) = pong();
        let names: Vec<&str> = scene.entities().map(|(_, e)| e.name()).collect();
        assert_eq!(names, ["Camera", "Paddle1", "Paddle2", "Ball"]);
        assert_eq!(scene.cameras().len(), 1);
        assert_eq!(
            scene.graph().position(handles.camera),
            Some(CAMERA_POSITION)
        );
        let paddle2 = scene.behavior::<Paddle>(handles.paddle2).unwrap();
        assert_eq!(paddle2.ball, Some(handles.ball));
    }

    #[test]
    fn first_frame_moves_ball_and_computer_paddle() {
        let (mut scene, handles) = pong();
        scene.frame(DT);
        assert!(close(position(&scene, handles.ball), Vec3::new(-0.1, -0.1, 0.0)));
        assert!(close(position(&scene, handles.paddle2), Vec3::new(-3.5, 0.03, 0.0)));
        assert!(close(position(&scene, handles.paddle1), PLAYER_PADDLE_POSITION));
        // one clear plus three quads
        assert_eq!(scene.draws().len(), 4);
    }

    #[test]
    fn ball_bounces_off_the_player_paddle() {
        let (mut scene, handles) = pong();
        scene
            .set_position(handles.ball.entity, Vec3::new(3.4, 0.0, 0.0))
            .unwrap();
        scene.update(DT);

        let ball = scene.behavior::<Ball>(handles.ball).unwrap();
        assert!(close(ball.velocity, Vec3::new(0.1, 0.1, 0.0)));
        assert!(!ball.paddle1_enabled);
    }

    #[test]
    fn leaving_the_left_edge_scores_for_the_player() {
        let (mut scene, handles) = pong();
        scene
            .set_position(handles.ball.entity, Vec3::new(-4.95, 0.0, 0.0))
            .unwrap();
        if let Some(ball) = scene.behavior_mut::<Ball>(handles.ball) {
            ball.paddle1_enabled = false;
            ball.velocity = Vec3::new(-0.1, 0.0, 0.0);
        }
        // Move the computer paddle out of the way.
        scene
            .set_position(handles.paddle2.entity, Vec3::new(-3.5, 2.0, 0.0))
            .unwrap();
        scene.update(DT);

        let ball = scene.behavior::<Ball>(handles.ball).unwrap();
        assert_eq!((ball.score1, ball.score2), (1, 0));
        assert_eq!(ball.velocity.x, 0.1);
        assert!(ball.paddle1_enabled);
        assert_eq!(position(&scene, handles.ball), Vec3::ZERO);
    }

    #[test]
    fn leaving_the_right_edge_scores_for_the_computer() {
        let (mut scene, handles) = pong();
        scene
            .set_position(handles.ball.entity, Vec3::new(4.95, -2.0, 0.0))
            .unwrap();
        if let Some(ball) = scene.behavior_mut::<Ball>(handles.ball) {
            ball.velocity = Vec3::new(0.1, 0.0, 0.0);
        }
        scene.update(DT);

        let ball = scene.behavior::<Ball>(handles.ball).unwrap();
        assert_eq!((ball.score1, ball.score2), (0, 1));
        assert!(!ball.paddle1_enabled);
    }

    #[test]
    fn walls_flip_vertical_velocity() {
        let (mut scene, handles) = pong();
        scene
            .set_position(handles.ball.entity, Vec3::new(0.0, -2.7, 0.0))
            .unwrap();
        scene.update(DT);
        let ball = scene.behavior::<Ball>(handles.ball).unwrap();
        assert_eq!(ball.velocity.y, 0.1);
    }

    #[test]
    fn player_paddle_follows_keys_within_limits() {
        let (mut scene, handles) = pong();
        let sink = scene.input_sink();
        sink.key_down(KeyCode::Character('W'));
        for _ in 0..20 {
            scene.update(DT);
        }
        let y = position(&scene, handles.paddle1).y;
        assert!(y + 1.0 >= 3.0 - 1e-3);
        assert!(y + 1.0 <= 3.0 + PLAYER_SPEED + 1e-3);

        sink.key_up(KeyCode::Character('W'));
        scene.update(DT);
        assert_eq!(position(&scene, handles.paddle1).y, y);
    }

    #[derive(Clone, Default)]
    struct SharedLog(Arc<Mutex<Vec<String>>>);

    impl AudioBackend for SharedLog {
        fn decode(&mut self, path: &str) -> Result<AudioClip, AudioError> {
            Ok(AudioClip::new(path))
        }

        fn start(&mut self, clip: &AudioClip, _offset: f64) {
            self.0.lock().push(clip.path().to_string());
        }

        fn stop(&mut self, _clip: &AudioClip) {}
    }

    #[test]
    fn paddle_bounces_play_the_paddle_sound() {
        let log = SharedLog::default();
        let mut scene = Scene::new(EngineConfig::default()).with_audio(Box::new(log.clone()));
        let handles = build_scene(&mut scene);
        scene
            .set_position(handles.ball.entity, Vec3::new(3.4, 0.0, 0.0))
            .unwrap();
        scene.update(DT);
        assert_eq!(*log.0.lock(), vec![BOUNCE_SOUNDS[1].to_string()]);
    }
}
