use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use engine::{InputSnapshot, Millis, PathFinderHandle, Scene, SceneError, SceneTransition};
use tracing::{error, info};

use super::{PlayingSceneArgs, SceneFactory, SwitchingSceneArgs};
use crate::ui::SharedUiView;
use crate::wiring::{
    register_game_engine_observers, register_game_state_observers, ObserverSubscriptions,
};
use crate::world::{GameEngine, WorldBuildError, WorldBuilder};

const SCENE_NAME: &str = "switching_game_world";

/// One-frame scene that tears down the current world and hands a freshly
/// built one to a new playing scene.
///
/// The hero's speed multiplier and the player state survive the switch.
/// Everything else shown by the UI (messages, minimap trail) starts over.
pub(crate) struct SwitchingGameWorldScene {
    scene_factory: Rc<dyn SceneFactory>,
    path_finder: PathFinderHandle,
    previous_game_engine: Option<GameEngine>,
    ui_view: SharedUiView,
    character_file: PathBuf,
    total_time_played_on_character: Millis,
    world_builder: Box<dyn WorldBuilder>,
}

impl SwitchingGameWorldScene {
    pub(crate) fn new(
        scene_factory: Rc<dyn SceneFactory>,
        path_finder: PathFinderHandle,
        args: SwitchingSceneArgs,
    ) -> Self {
        Self {
            scene_factory,
            path_finder,
            previous_game_engine: Some(args.game_engine),
            ui_view: args.ui_view,
            character_file: args.character_file,
            total_time_played_on_character: args.total_time_played_on_character,
            world_builder: args.world_builder,
        }
    }

    fn switch_world(&mut self, previous: GameEngine) -> Result<SceneTransition, WorldBuildError> {
        let previous_world = previous.game_state().game_world();
        let from = previous_world.world_id;
        // The hero entity is rebuilt with the world, so its speed has to be
        // read before the old world goes away.
        let player_speed_multiplier = previous_world.player_entity.speed_multiplier();

        self.path_finder.reset();
        let (mut game_engine, world_behavior) =
            self.world_builder.build(previous, &self.path_finder)?;
        self.path_finder
            .set_grid(Arc::clone(game_engine.game_state().pathfinder_wall_grid()));

        let game_state = game_engine.game_state_mut();
        // The minimap reveals the camera area, so the camera must already
        // follow the new hero when the UI hears about the world.
        game_state.center_camera_on_player();
        self.ui_view
            .borrow_mut()
            .on_world_area_updated(game_state.entire_world_area(), game_state.camera_world_area());

        let mut subscriptions = ObserverSubscriptions::default();
        subscriptions.extend(register_game_engine_observers(&game_engine, &self.ui_view));
        // Player-state observers were registered once at session start.
        subscriptions.extend(register_game_state_observers(
            game_engine.game_state(),
            &self.ui_view,
            false,
        ));

        game_engine
            .game_state_mut()
            .set_hero_movement_speed(player_speed_multiplier);

        {
            let mut ui = self.ui_view.borrow_mut();
            ui.info_message.clear_messages();
            ui.minimap.clear_exploration();
        }

        info!(
            from = %from,
            to = %game_engine.game_state().game_world().world_id,
            behavior = world_behavior.debug_name(),
            speed_multiplier = player_speed_multiplier,
            observers = subscriptions.len(),
            "world_switched"
        );

        let playing_scene = Rc::clone(&self.scene_factory).playing_scene(PlayingSceneArgs {
            game_engine,
            world_behavior,
            ui_view: Rc::clone(&self.ui_view),
            subscriptions,
            new_hero_was_created: false,
            character_file: self.character_file.clone(),
            total_time_played_on_character: self.total_time_played_on_character,
        });
        Ok(SceneTransition::new(playing_scene))
    }
}

impl Scene for SwitchingGameWorldScene {
    fn debug_name(&self) -> &'static str {
        SCENE_NAME
    }

    fn run_one_frame(
        &mut self,
        _time_passed: Millis,
        _input: &InputSnapshot,
    ) -> Result<Option<SceneTransition>, SceneError> {
        let Some(previous) = self.previous_game_engine.take() else {
            return Err(SceneError::AlreadyCompleted { scene: SCENE_NAME });
        };
        match self.switch_world(previous) {
            Ok(transition) => Ok(Some(transition)),
            Err(err) => {
                error!(error = %err, "world_switch_failed");
                Err(SceneError::failed(SCENE_NAME, err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use engine::{Rect, Vec2};

    use super::*;
    use crate::ui::GameUiView;
    use crate::world::{
        behavior_for, build_world, builtin_map, MapWorldBuilder, PlayerState, WorldBehavior,
        WorldId,
    };

    #[derive(Debug)]
    struct PlayingRecord {
        world_id: WorldId,
        hero_position: Vec2,
        hero_speed_multiplier: f32,
        camera_area: Rect,
        grid_bound: bool,
        engine_subscribers: usize,
        state_subscribers: usize,
        player_state_subscribers: usize,
        subscriptions_handed_over: usize,
        messages_left: usize,
        trail_left: usize,
        behavior: &'static str,
        new_hero_was_created: bool,
        character_file: PathBuf,
        total_time_played_on_character: Millis,
    }

    struct RecordingFactory {
        path_finder: PathFinderHandle,
        ui_view: SharedUiView,
        playing: RefCell<Vec<PlayingRecord>>,
    }

    struct IdleScene;

    impl Scene for IdleScene {
        fn debug_name(&self) -> &'static str {
            "idle"
        }

        fn run_one_frame(
            &mut self,
            _time_passed: Millis,
            _input: &InputSnapshot,
        ) -> Result<Option<SceneTransition>, SceneError> {
            Ok(None)
        }
    }

    impl SceneFactory for RecordingFactory {
        fn playing_scene(self: Rc<Self>, args: PlayingSceneArgs) -> Box<dyn Scene> {
            let state = args.game_engine.game_state();
            let ui = self.ui_view.borrow();
            self.playing.borrow_mut().push(PlayingRecord {
                world_id: state.game_world().world_id,
                hero_position: state.game_world().player_entity.position(),
                hero_speed_multiplier: state.game_world().player_entity.speed_multiplier(),
                camera_area: state.camera_world_area(),
                grid_bound: self.path_finder.is_bound_to(state.pathfinder_wall_grid()),
                engine_subscribers: args.game_engine.subscriber_count(),
                state_subscribers: state.subscriber_count(),
                player_state_subscribers: state.player_state().subscriber_count(),
                subscriptions_handed_over: args.subscriptions.len(),
                messages_left: ui.info_message.messages().len(),
                trail_left: ui.minimap.exploration_trail().len(),
                behavior: args.world_behavior.debug_name(),
                new_hero_was_created: args.new_hero_was_created,
                character_file: args.character_file.clone(),
                total_time_played_on_character: args.total_time_played_on_character,
            });
            Box::new(IdleScene)
        }

        fn switching_game_world_scene(self: Rc<Self>, _args: SwitchingSceneArgs) -> Box<dyn Scene> {
            Box::new(IdleScene)
        }
    }

    struct Fixture {
        factory: Rc<RecordingFactory>,
        ui_view: SharedUiView,
        path_finder: PathFinderHandle,
    }

    impl Fixture {
        fn new() -> Self {
            let path_finder = PathFinderHandle::default();
            let ui_view = GameUiView::default().shared();
            let factory = Rc::new(RecordingFactory {
                path_finder: path_finder.clone(),
                ui_view: Rc::clone(&ui_view),
                playing: RefCell::new(Vec::new()),
            });
            Self {
                factory,
                ui_view,
                path_finder,
            }
        }

        /// A town session as it looks after startup: grid bound, player-state
        /// observers registered once, some UI state accumulated.
        fn town_engine(&self, speed_multiplier: f32) -> GameEngine {
            let map = builtin_map(WorldId::Town).expect("town");
            let mut engine =
                build_world(&map, PlayerState::new(12), self.path_finder.clone()).expect("town");
            self.path_finder
                .set_grid(Arc::clone(engine.game_state().pathfinder_wall_grid()));
            let _ = register_game_state_observers(engine.game_state(), &self.ui_view, true);
            engine
                .game_state_mut()
                .set_hero_movement_speed(speed_multiplier);

            let mut ui = self.ui_view.borrow_mut();
            ui.info_message.enqueue("Picked up 5 gold");
            ui.minimap.on_player_moved(Vec2::new(80.0, 240.0));
            ui.minimap.on_player_moved(Vec2::new(300.0, 240.0));
            drop(ui);
            engine
        }

        fn scene(
            &self,
            engine: GameEngine,
            world_builder: Box<dyn WorldBuilder>,
        ) -> SwitchingGameWorldScene {
            SwitchingGameWorldScene::new(
                Rc::clone(&self.factory) as Rc<dyn SceneFactory>,
                self.path_finder.clone(),
                SwitchingSceneArgs {
                    game_engine: engine,
                    ui_view: Rc::clone(&self.ui_view),
                    character_file: PathBuf::from("saves/hero.json"),
                    total_time_played_on_character: Millis(123_456),
                    world_builder,
                },
            )
        }

        fn switch_to_dungeon(&self, speed_multiplier: f32) -> PlayingRecord {
            let engine = self.town_engine(speed_multiplier);
            let mut scene = self.scene(engine, Box::new(MapWorldBuilder::new(WorldId::Dungeon)));
            let transition = scene
                .run_one_frame(Millis(16), &InputSnapshot::empty())
                .expect("switch")
                .expect("transition");
            assert_eq!(transition.scene().debug_name(), "idle");
            let mut records = self.factory.playing.borrow_mut();
            assert_eq!(records.len(), 1);
            records.remove(0)
        }
    }

    #[test]
    fn hero_speed_multiplier_survives_the_switch() {
        let fixture = Fixture::new();
        let record = fixture.switch_to_dungeon(1.6);
        assert_eq!(record.world_id, WorldId::Dungeon);
        assert!((record.hero_speed_multiplier - 1.6).abs() < 0.0001);
    }

    #[test]
    fn ui_hears_about_the_world_with_camera_already_on_the_hero() {
        let fixture = Fixture::new();
        let record = fixture.switch_to_dungeon(1.0);

        assert!(record.camera_area.center().distance(record.hero_position) < 0.001);
        let ui = fixture.ui_view.borrow();
        assert_eq!(ui.world_area_updates(), 1);
        assert_eq!(ui.minimap.world_area(), Some(Rect::new(0.0, 0.0, 800.0, 480.0)));
        let revealed = ui.minimap.revealed_area().expect("revealed");
        assert!(revealed.center().distance(record.hero_position) < 0.001);
    }

    #[test]
    fn path_finder_is_bound_to_new_grid_before_hand_off() {
        let fixture = Fixture::new();
        let record = fixture.switch_to_dungeon(1.0);
        assert!(record.grid_bound);
        assert!(fixture.path_finder.has_grid());
    }

    #[test]
    fn player_state_observers_are_not_registered_twice() {
        let fixture = Fixture::new();
        let record = fixture.switch_to_dungeon(1.0);

        assert_eq!(record.player_state_subscribers, 1);
        assert_eq!(record.engine_subscribers, 1);
        assert_eq!(record.state_subscribers, 1);
        assert_eq!(record.subscriptions_handed_over, 2);
    }

    #[test]
    fn stale_messages_and_exploration_are_cleared() {
        let fixture = Fixture::new();
        let record = fixture.switch_to_dungeon(1.0);

        assert_eq!(record.messages_left, 0);
        assert_eq!(record.trail_left, 0);
        let ui = fixture.ui_view.borrow();
        assert!(ui.info_message.is_empty());
        assert!(ui.minimap.exploration_trail().is_empty());
        assert_eq!(ui.money(), 12);
    }

    #[test]
    fn session_metadata_passes_through_unchanged() {
        let fixture = Fixture::new();
        let record = fixture.switch_to_dungeon(1.0);

        assert!(!record.new_hero_was_created);
        assert_eq!(record.character_file, PathBuf::from("saves/hero.json"));
        assert_eq!(record.total_time_played_on_character, Millis(123_456));
        assert_eq!(record.behavior, "dungeon");
    }

    #[test]
    fn builder_sees_a_reset_path_finder() {
        let fixture = Fixture::new();
        let engine = fixture.town_engine(1.0);
        let seen_grid = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen_grid);
        let builder = move |previous: GameEngine,
                            path_finder: &PathFinderHandle|
              -> Result<(GameEngine, Box<dyn WorldBehavior>), WorldBuildError> {
            *sink.borrow_mut() = Some(path_finder.has_grid());
            let map = builtin_map(WorldId::Town)?;
            let player_state = previous.into_game_state().into_player_state();
            let engine = build_world(&map, player_state, path_finder.clone())?;
            Ok((engine, behavior_for(WorldId::Town)))
        };

        let mut scene = fixture.scene(engine, Box::new(builder));
        scene
            .run_one_frame(Millis(16), &InputSnapshot::empty())
            .expect("switch");

        assert_eq!(*seen_grid.borrow(), Some(false));
        let records = fixture.factory.playing.borrow();
        assert_eq!(records[0].world_id, WorldId::Town);
        assert!(records[0].grid_bound);
    }

    #[test]
    fn failed_build_is_fatal_and_scene_runs_once() {
        let fixture = Fixture::new();
        let engine = fixture.town_engine(1.0);
        let builder = |_previous: GameEngine,
                       _path_finder: &PathFinderHandle|
         -> Result<(GameEngine, Box<dyn WorldBehavior>), WorldBuildError> {
            Err(WorldBuildError::MapIdMismatch {
                expected: WorldId::Dungeon,
                actual: WorldId::Town,
            })
        };

        let mut scene = fixture.scene(engine, Box::new(builder));
        let err = scene
            .run_one_frame(Millis(16), &InputSnapshot::empty())
            .expect_err("build fails");
        assert!(matches!(
            err,
            SceneError::Failed {
                scene: SCENE_NAME,
                ..
            }
        ));
        assert!(fixture.factory.playing.borrow().is_empty());
        assert!(!fixture.path_finder.has_grid());

        let err = scene
            .run_one_frame(Millis(16), &InputSnapshot::empty())
            .expect_err("already completed");
        assert!(matches!(err, SceneError::AlreadyCompleted { .. }));
    }
}
