use std::path::PathBuf;
use std::rc::Rc;

use engine::{InputSnapshot, Millis, Scene, SceneError, SceneTransition};
use tracing::{info, warn};

use super::{PlayingSceneArgs, SceneFactory, SwitchingSceneArgs};
use crate::character_file::{save_character_file, CharacterFile};
use crate::ui::SharedUiView;
use crate::wiring::ObserverSubscriptions;
use crate::world::{GameEngine, MapWorldBuilder, WorldBehavior, WorldId};

const SCENE_NAME: &str = "playing";

/// Runs one world until the hero steps through a portal.
pub(crate) struct PlayingScene {
    scene_factory: Rc<dyn SceneFactory>,
    game_engine: Option<GameEngine>,
    world_behavior: Box<dyn WorldBehavior>,
    ui_view: SharedUiView,
    _subscriptions: ObserverSubscriptions,
    new_hero_was_created: bool,
    character_file: PathBuf,
    total_time_played_on_character: Millis,
}

impl PlayingScene {
    pub(crate) fn new(scene_factory: Rc<dyn SceneFactory>, args: PlayingSceneArgs) -> Self {
        Self {
            scene_factory,
            game_engine: Some(args.game_engine),
            world_behavior: args.world_behavior,
            ui_view: args.ui_view,
            _subscriptions: args.subscriptions,
            new_hero_was_created: args.new_hero_was_created,
            character_file: args.character_file,
            total_time_played_on_character: args.total_time_played_on_character,
        }
    }

    /// Saving is best effort; a failed autosave never interrupts play.
    /// `world` is where the hero resumes on the next start.
    fn autosave(&self, game_engine: &GameEngine, world: WorldId) {
        let character = CharacterFile {
            money: game_engine.game_state().player_state().money(),
            total_time_played_ms: self.total_time_played_on_character.0,
            world,
            ..CharacterFile::new_hero()
        };
        if let Err(error) = save_character_file(&self.character_file, &character) {
            warn!(
                path = %self.character_file.display(),
                error = %error,
                "autosave_failed"
            );
        }
    }
}

impl Scene for PlayingScene {
    fn debug_name(&self) -> &'static str {
        SCENE_NAME
    }

    fn on_enter(&mut self) {
        let messages = self.world_behavior.on_startup(self.new_hero_was_created);
        let mut ui = self.ui_view.borrow_mut();
        for message in messages {
            ui.info_message.enqueue(message);
        }
    }

    /// Saves progress when the session ends here. After a portal hand-off
    /// the engine is gone and the save already happened.
    fn on_exit(&mut self) {
        if let Some(game_engine) = &self.game_engine {
            self.autosave(game_engine, game_engine.game_state().game_world().world_id);
        }
    }

    fn run_one_frame(
        &mut self,
        time_passed: Millis,
        input: &InputSnapshot,
    ) -> Result<Option<SceneTransition>, SceneError> {
        let Some(game_engine) = self.game_engine.as_mut() else {
            return Err(SceneError::AlreadyCompleted { scene: SCENE_NAME });
        };
        self.total_time_played_on_character =
            self.total_time_played_on_character.saturating_add(time_passed);

        let outcome = game_engine.run_one_frame(time_passed, input.movement_direction());
        let messages = self
            .world_behavior
            .control(time_passed, game_engine.game_state());
        {
            let mut ui = self.ui_view.borrow_mut();
            for message in messages {
                ui.info_message.enqueue(message);
            }
            ui.tick(time_passed);
        }

        let Some(destination) = outcome.entered_portal else {
            return Ok(None);
        };
        let Some(game_engine) = self.game_engine.take() else {
            return Err(SceneError::AlreadyCompleted { scene: SCENE_NAME });
        };
        info!(
            from = %game_engine.game_state().game_world().world_id,
            to = %destination,
            "portal_entered"
        );
        self.autosave(&game_engine, destination);

        let next = Rc::clone(&self.scene_factory).switching_game_world_scene(SwitchingSceneArgs {
            game_engine,
            ui_view: Rc::clone(&self.ui_view),
            character_file: self.character_file.clone(),
            total_time_played_on_character: self.total_time_played_on_character,
            world_builder: Box::new(MapWorldBuilder::new(destination)),
        });
        Ok(Some(SceneTransition::new(next)))
    }
}
