use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info};

use crate::arena::Arena;
use crate::config::{GameConfig, Theme};
use crate::error::{ArenaResult, GameError, GameResult};
use crate::platform::{Alignment, Color, Key, Platform};
use crate::snake::{Cell, Direction, Grid, MoveResult, Snake};

const HUD_TEXT_SIZE: u32 = 36;
const TITLE_TEXT_SIZE: u32 = 300;
const SCORE_TEXT_SIZE: u32 = 84;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Menu,
    Play,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Palette {
    primary_accent: Color,
    primary_base: Color,
    secondary_accent: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                primary_accent: Color::MAXIMUM_RED,
                primary_base: Color::WHITE_COFFEE,
                secondary_accent: Color::RAISIN_BLACK,
            },
            Theme::Dark => Palette {
                primary_accent: Color::WHITE_COFFEE,
                primary_base: Color::RAISIN_BLACK,
                secondary_accent: Color::MAXIMUM_RED,
            },
        }
    }
}

/// One embedded game session: the root arena, the chain carved from it, and
/// everything the menu/play/end state machine needs.
///
/// The host drives it through [`key_down`](Self::key_down),
/// [`update`](Self::update) and [`render`](Self::render). After a fatal
/// error every entry point fails with [`GameError::Halted`].
pub struct Game {
    config: GameConfig,
    arena: Arena,
    width: u32,
    height: u32,
    grid: Grid,
    snake: Snake,
    egg: Cell,
    score: u32,
    step_timer: f32,
    queued: Option<Direction>,
    run_state: RunState,
    won: bool,
    theme: Theme,
    rng: StdRng,
    dirty: bool,
    halted: bool,
}

impl Game {
    /// Sets up a session for a `width` x `height` pixel surface: derives the
    /// grid, creates the root arena, carves the chain store, and lays out the
    /// first chain. The session starts in the menu.
    pub fn init(width: u32, height: u32, config: GameConfig) -> GameResult<Self> {
        config.validate()?;

        let grid = Grid::new(width / config.cell_size, height / config.cell_size).ok_or(
            GameError::GridTooSmall {
                width,
                height,
                cell_size: config.cell_size,
            },
        )?;

        let mut arena = Arena::new(config.memory_size);
        let snake = Snake::new(&mut arena, config.max_length)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut game = Game {
            arena,
            width,
            height,
            grid,
            snake,
            egg: Cell::default(),
            score: 0,
            step_timer: config.step_interval,
            queued: None,
            run_state: RunState::Menu,
            won: false,
            theme: config.theme,
            rng,
            dirty: true,
            halted: false,
            config,
        };
        game.restart()?;

        info!(
            columns = grid.columns(),
            rows = grid.rows(),
            arena_used = game.arena.used(),
            arena_capacity = game.arena.capacity(),
            chain_capacity = game.snake.memory_capacity(),
            "game initialised"
        );
        Ok(game)
    }

    pub fn key_down(&mut self, key: Key) -> GameResult<()> {
        self.ensure_running()?;

        match key {
            Key::Space => {
                match self.run_state {
                    RunState::Play => self.run_state = RunState::Menu,
                    RunState::Menu => self.run_state = RunState::Play,
                    RunState::End => {
                        self.run_state = RunState::Play;
                        let restarted = self.restart();
                        self.check(restarted)?;
                    }
                }
                debug!(state = ?self.run_state, "run state changed");
                self.dirty = true;
            }
            Key::Theme => {
                self.theme = self.theme.toggled();
                self.dirty = true;
            }
            _ => {
                if self.run_state == RunState::Play {
                    self.queued = key.direction();
                }
            }
        }

        Ok(())
    }

    /// Advances the step timer by `delta_time` seconds and runs at most one
    /// simulation step when it runs out.
    pub fn update(&mut self, delta_time: f32) -> GameResult<()> {
        self.ensure_running()?;

        if self.run_state != RunState::Play {
            return Ok(());
        }

        self.step_timer -= delta_time;
        if self.step_timer <= 0.0 {
            let stepped = self.step();
            self.check(stepped)?;
            self.step_timer = self.config.step_interval;
        }

        Ok(())
    }

    /// Draws the current screen if anything changed since the last call.
    pub fn render<P: Platform + ?Sized>(&mut self, platform: &mut P) {
        if self.halted || !self.dirty {
            return;
        }
        self.dirty = false;

        let palette = Palette::for_theme(self.theme);
        self.clear_screen(platform, palette);

        match self.run_state {
            RunState::Play => {
                self.draw_egg(platform, palette);
                self.draw_snake(platform, palette);
                platform.draw_text(
                    &format!("SCORE: {}", self.score),
                    HUD_TEXT_SIZE / 4,
                    HUD_TEXT_SIZE,
                    HUD_TEXT_SIZE,
                    palette.primary_accent,
                    true,
                    Alignment::Left,
                );
            }
            RunState::Menu => self.draw_menu(platform, palette, "SNAKE"),
            RunState::End => {
                let title = if self.won { "CONGRATZ" } else { "OUCHH" };
                self.draw_menu(platform, palette, title);
            }
        }
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn won(&self) -> bool {
        self.won
    }

    pub fn egg(&self) -> Cell {
        self.egg
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    ///////////////////////////////////////////////////////////////////////////

    fn ensure_running(&self) -> GameResult<()> {
        if self.halted {
            Err(GameError::Halted)
        } else {
            Ok(())
        }
    }

    /// Any arena failure ends the session for good.
    fn check<T>(&mut self, result: ArenaResult<T>) -> GameResult<T> {
        result.map_err(|err| {
            error!(%err, "fatal memory error, halting");
            self.halted = true;
            GameError::from(err)
        })
    }

    fn restart(&mut self) -> ArenaResult<()> {
        self.step_timer = self.config.step_interval;
        self.queued = None;
        self.won = false;
        self.score = 0;
        self.relocate_egg();
        self.dirty = true;

        self.snake
            .restart(self.grid.center(), self.config.start_length)
    }

    fn step(&mut self) -> ArenaResult<()> {
        if let Some(direction) = self.queued.take() {
            self.snake.set_direction(direction);
        }

        let result = self.snake.move_step(self.grid, self.egg)?;
        self.dirty = true;

        match result {
            MoveResult::Crashed { new_head } => {
                info!(score = self.score, cell = %new_head, "chain ran into itself");
                self.run_state = RunState::End;
                self.won = false;
            }
            MoveResult::Grew { .. } => {
                self.score += 1;
                self.relocate_egg();
            }
            MoveResult::Won { .. } => {
                self.score += 1;
                self.relocate_egg();
                info!(score = self.score, length = self.snake.len(), "chain reached maximum length");
                self.run_state = RunState::End;
                self.won = true;
            }
            MoveResult::Moved { .. } | MoveResult::Empty => {}
        }

        Ok(())
    }

    /// Uniform pick over the whole grid; the body is not avoided.
    fn relocate_egg(&mut self) {
        self.egg = Cell::new(
            self.rng.gen_range(0..self.grid.columns()),
            self.rng.gen_range(0..self.grid.rows()),
        );
    }

    fn clear_screen<P: Platform + ?Sized>(&self, platform: &mut P, palette: Palette) {
        platform.draw_rectangle(0, 0, self.width, self.height, palette.primary_base, true);
        platform.draw_rectangle(0, 0, self.width, self.height, palette.primary_accent, false);
    }

    fn draw_cell<P: Platform + ?Sized>(&self, platform: &mut P, cell: Cell, color: Color, fill: bool) {
        let size = self.config.cell_size;
        platform.draw_rectangle(
            cell.x as u32 * size,
            cell.y as u32 * size,
            size,
            size,
            color,
            fill,
        );
    }

    fn draw_egg<P: Platform + ?Sized>(&self, platform: &mut P, palette: Palette) {
        self.draw_cell(platform, self.egg, palette.secondary_accent, true);
    }

    fn draw_snake<P: Platform + ?Sized>(&self, platform: &mut P, palette: Palette) {
        let mut segments = self.snake.segments();

        if let Some(head) = segments.next() {
            self.draw_cell(platform, head.cell, palette.secondary_accent, true);
        }

        for segment in segments {
            self.draw_cell(platform, segment.cell, palette.primary_accent, true);
            self.draw_cell(platform, segment.cell, palette.primary_base, false);
        }
    }

    fn draw_menu<P: Platform + ?Sized>(&self, platform: &mut P, palette: Palette, title: &str) {
        let center_x = self.width / 2;
        let step_y = self.height / 5;
        let y = 2 * step_y;

        platform.draw_text(
            title,
            center_x,
            y,
            TITLE_TEXT_SIZE,
            palette.primary_accent,
            true,
            Alignment::Center,
        );
        platform.draw_number(
            self.score,
            center_x,
            y + SCORE_TEXT_SIZE * 3 / 2,
            SCORE_TEXT_SIZE,
            palette.primary_accent,
            true,
            Alignment::Center,
        );
        platform.draw_text(
            "Press <space> to continue",
            center_x,
            y + 2 * step_y,
            HUD_TEXT_SIZE,
            palette.primary_accent,
            true,
            Alignment::Center,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArenaError;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Rect {
            x: u32,
            y: u32,
            color: Color,
            fill: bool,
        },
        Text {
            text: String,
            alignment: Alignment,
        },
        Error(String),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl Recorder {
        fn texts(&self) -> Vec<&str> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    Call::Text { text, .. } => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }
    }

    impl Platform for Recorder {
        fn draw_rectangle(&mut self, x: u32, y: u32, _w: u32, _h: u32, color: Color, fill: bool) {
            self.calls.push(Call::Rect { x, y, color, fill });
        }

        fn draw_text(
            &mut self,
            text: &str,
            _x: u32,
            _y: u32,
            _size: u32,
            _color: Color,
            _fill: bool,
            alignment: Alignment,
        ) {
            self.calls.push(Call::Text {
                text: text.to_string(),
                alignment,
            });
        }

        fn throw_error(&mut self, message: &str) {
            self.calls.push(Call::Error(message.to_string()));
        }
    }

    fn config() -> GameConfig {
        GameConfig {
            step_interval: 0.5,
            seed: Some(42),
            ..GameConfig::default()
        }
    }

    /// 10 x 8 grid, already playing.
    fn playing(config: GameConfig) -> Game {
        let mut game = Game::init(500, 400, config).unwrap();
        game.key_down(Key::Space).unwrap();
        assert_eq!(game.run_state(), RunState::Play);
        game
    }

    fn step(game: &mut Game) {
        let interval = game.config.step_interval;
        game.update(interval).unwrap();
    }

    fn cells(game: &Game) -> Vec<(i32, i32)> {
        game.snake().segments().map(|s| (s.cell.x, s.cell.y)).collect()
    }

    #[test]
    fn test_init_derives_grid_and_chain() {
        let game = Game::init(500, 420, config()).unwrap();

        assert_eq!(game.grid().columns(), 10);
        assert_eq!(game.grid().rows(), 8);
        assert_eq!(game.run_state(), RunState::Menu);
        assert_eq!(game.score(), 0);
        assert_eq!(cells(&game), vec![(5, 4); 3]);
        assert!(game.egg().x < 10 && game.egg().y < 8);
    }

    #[test]
    fn test_init_rejects_tiny_surface() {
        assert!(matches!(
            Game::init(49, 400, config()),
            Err(GameError::GridTooSmall { width: 49, .. })
        ));
    }

    #[test]
    fn test_init_rejects_invalid_config() {
        let config = GameConfig {
            start_length: 0,
            ..config()
        };
        assert!(matches!(Game::init(500, 400, config), Err(GameError::Config(_))));
    }

    #[test]
    fn test_space_toggles_menu_and_play() {
        let mut game = Game::init(500, 400, config()).unwrap();

        game.update(10.0).unwrap();
        assert_eq!(cells(&game), vec![(5, 4); 3]);

        game.key_down(Key::Space).unwrap();
        assert_eq!(game.run_state(), RunState::Play);
        game.key_down(Key::Space).unwrap();
        assert_eq!(game.run_state(), RunState::Menu);
    }

    #[test]
    fn test_directions_only_queue_while_playing() {
        let mut game = Game::init(500, 400, config()).unwrap();
        game.key_down(Key::Right).unwrap();
        assert_eq!(game.queued, None);

        game.key_down(Key::Space).unwrap();
        game.key_down(Key::Right).unwrap();
        assert_eq!(game.queued, Some(Direction::RIGHT));
    }

    #[test]
    fn test_step_timer_gates_simulation() {
        let mut game = playing(config());
        game.egg = Cell::new(0, 0);
        game.key_down(Key::Right).unwrap();

        game.update(0.25).unwrap();
        assert_eq!(game.snake().head(), Some(Cell::new(5, 4)));

        game.update(0.25).unwrap();
        assert_eq!(game.snake().head(), Some(Cell::new(6, 4)));

        // A huge delta still advances exactly one step.
        game.update(100.0).unwrap();
        assert_eq!(game.snake().head(), Some(Cell::new(7, 4)));
        assert_eq!(game.step_timer, 0.5);
    }

    #[test]
    fn test_queued_direction_is_consumed() {
        let mut game = playing(config());
        game.egg = Cell::new(0, 0);
        game.key_down(Key::Up).unwrap();
        step(&mut game);

        assert_eq!(game.queued, None);
        assert_eq!(game.snake().direction(), Direction::UP);

        // Reversal is ignored by the chain.
        game.key_down(Key::Down).unwrap();
        step(&mut game);
        assert_eq!(game.snake().direction(), Direction::UP);
        assert_eq!(game.snake().head(), Some(Cell::new(5, 2)));
    }

    #[test]
    fn test_eating_grows_and_scores() {
        let mut game = playing(config());
        game.key_down(Key::Right).unwrap();
        game.egg = Cell::new(6, 4);
        step(&mut game);

        assert_eq!(game.score(), 1);
        assert_eq!(game.snake().len(), 4);
        assert_eq!(game.run_state(), RunState::Play);
        let egg = game.egg();
        assert!((0..10).contains(&egg.x) && (0..8).contains(&egg.y));
    }

    #[test]
    fn test_reaching_max_length_wins() {
        let mut game = playing(GameConfig {
            start_length: 3,
            max_length: 4,
            ..config()
        });
        game.key_down(Key::Right).unwrap();
        game.egg = Cell::new(6, 4);
        step(&mut game);

        assert_eq!(game.run_state(), RunState::End);
        assert!(game.won());
        assert_eq!(game.score(), 1);

        let mut recorder = Recorder::default();
        game.render(&mut recorder);
        assert!(recorder.texts().contains(&"CONGRATZ"));
    }

    #[test]
    fn test_self_collision_ends_session() {
        let mut game = playing(GameConfig {
            start_length: 5,
            ..config()
        });
        game.egg = Cell::new(0, 0);

        for key in [Key::Right, Key::Up, Key::Left, Key::Down] {
            game.key_down(key).unwrap();
            step(&mut game);
        }

        assert_eq!(game.run_state(), RunState::End);
        assert!(!game.won());

        // End is inert until restarted.
        let before = cells(&game);
        game.update(10.0).unwrap();
        assert_eq!(cells(&game), before);

        let mut recorder = Recorder::default();
        game.render(&mut recorder);
        assert!(recorder.texts().contains(&"OUCHH"));
    }

    #[test]
    fn test_restart_resets_session() {
        let mut game = playing(GameConfig {
            start_length: 5,
            ..config()
        });
        game.key_down(Key::Right).unwrap();
        game.egg = Cell::new(6, 4);
        step(&mut game);
        assert_eq!(game.score(), 1);

        game.run_state = RunState::End;
        game.key_down(Key::Space).unwrap();

        assert_eq!(game.run_state(), RunState::Play);
        assert_eq!(game.score(), 0);
        assert_eq!(game.snake().len(), 5);
        assert_eq!(cells(&game), vec![(5, 4); 5]);
        assert_eq!(game.snake().direction(), Direction::NONE);
    }

    #[test]
    fn test_theme_toggle_swaps_palette() {
        let mut game = Game::init(500, 400, config()).unwrap();
        let mut light = Recorder::default();
        game.render(&mut light);

        game.key_down(Key::Theme).unwrap();
        assert_eq!(game.theme(), Theme::Dark);
        let mut dark = Recorder::default();
        game.render(&mut dark);

        assert_eq!(
            light.calls[0],
            Call::Rect {
                x: 0,
                y: 0,
                color: Color::WHITE_COFFEE,
                fill: true
            }
        );
        assert_eq!(
            dark.calls[0],
            Call::Rect {
                x: 0,
                y: 0,
                color: Color::RAISIN_BLACK,
                fill: true
            }
        );
    }

    #[test]
    fn test_render_only_after_changes() {
        let mut game = playing(config());
        game.egg = Cell::new(0, 0);

        let mut recorder = Recorder::default();
        game.render(&mut recorder);
        // Screen (2) + egg (1) + head (1) + two body records (2 each) + HUD.
        assert_eq!(recorder.calls.len(), 9);
        assert_eq!(recorder.texts(), vec!["SCORE: 0"]);

        let mut idle = Recorder::default();
        game.render(&mut idle);
        assert!(idle.calls.is_empty());

        step(&mut game);
        let mut stepped = Recorder::default();
        game.render(&mut stepped);
        assert_eq!(stepped.calls.len(), 9);
    }

    #[test]
    fn test_menu_screen_layout() {
        let mut game = Game::init(500, 400, config()).unwrap();
        let mut recorder = Recorder::default();
        game.render(&mut recorder);

        assert_eq!(
            recorder.texts(),
            vec!["SNAKE", "0", "Press <space> to continue"]
        );
        assert!(recorder.calls.iter().all(|call| match call {
            Call::Text { alignment, .. } => *alignment == Alignment::Center,
            _ => true,
        }));
    }

    #[test]
    fn test_memory_failure_halts_session() {
        let mut game = playing(config());
        // Swap in a chain store with no room to grow.
        let mut arena = Arena::new(4096);
        game.snake = Snake::new(&mut arena, 3).unwrap();
        game.snake.restart(Cell::new(5, 4), 3).unwrap();

        game.key_down(Key::Right).unwrap();
        game.egg = Cell::new(6, 4);
        let err = game.update(0.5).unwrap_err();
        assert!(matches!(err, GameError::Arena(ArenaError::OutOfMemory { .. })));
        assert!(game.is_halted());

        assert!(matches!(game.update(0.5), Err(GameError::Halted)));
        assert!(matches!(game.key_down(Key::Space), Err(GameError::Halted)));

        let mut recorder = Recorder::default();
        game.render(&mut recorder);
        assert!(recorder.calls.is_empty());
    }
}
