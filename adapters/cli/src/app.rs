//! Screen flow of the windowed game: start menu and play.

use std::time::Duration;

use derivative_dash_rendering::{
    FrameControl, FrameInput, MenuController, MenuDecision, MenuPresentation, MenuState, Scene,
};
use derivative_dash_world::query;

use crate::{scene, session::Session};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Screen {
    Menu,
    Playing,
}

/// Routes frame input either to the menu or to the session.
#[derive(Debug)]
pub(crate) struct App {
    session: Session,
    menu: MenuState,
    screen: Screen,
}

impl App {
    pub(crate) fn new(session: Session) -> Self {
        Self {
            session,
            menu: MenuState::new(),
            screen: Screen::Menu,
        }
    }

    /// Advances one presented frame and rewrites `scene` for it.
    pub(crate) fn frame(
        &mut self,
        frame_dt: Duration,
        input: FrameInput,
        scene: &mut Scene,
    ) -> FrameControl {
        if input.quit_requested {
            log::info!("quit requested");
            return FrameControl::Exit;
        }

        match self.screen {
            Screen::Menu => match self.menu.update(input.menu) {
                Some(MenuDecision::Start) => {
                    log::info!("run started from menu");
                    self.screen = Screen::Playing;
                }
                Some(MenuDecision::Quit) => {
                    log::info!("quit from menu");
                    return FrameControl::Exit;
                }
                None => {}
            },
            Screen::Playing => {
                let report = self.session.frame(frame_dt, &input.actions);
                if report.menu_requested {
                    self.screen = Screen::Menu;
                    self.menu = MenuState::new();
                }
            }
        }

        self.present(scene);
        FrameControl::Continue
    }

    /// Rewrites `scene` without advancing anything.
    pub(crate) fn present(&self, scene: &mut Scene) {
        let world = self.session.world();
        let menu = (self.screen == Screen::Menu).then(|| {
            MenuPresentation::new(
                query::welcome_banner(world),
                query::track(world).formula_label(),
                self.menu.selected(),
            )
        });
        scene::populate(scene, world, self.session.effects(), menu);
    }
}
