mod error;
mod game;
mod item;
mod maze;
mod player;
mod question;
mod save;

use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction as LayoutDir, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tui_textarea::TextArea;

use game::{AttemptResult, GameSession, GameStatus};
use maze::{AnimState, Direction, DoorId, Maze, MazeLayout};
use question::{QuestionBank, QuestionKind};
use save::PrefStore;

const QUESTION_DIR: &str = "questions";
const SAVE_FILE: &str = "savegame.toml";

enum Screen {
    TitleScreen,
    Playing,
    Question,
    Won,
    Lost,
}

enum MenuOption {
    NewGame,
    LoadGame,
    Quit,
}

impl MenuOption {
    fn next(&self) -> Self {
        match self {
            MenuOption::NewGame => MenuOption::LoadGame,
            MenuOption::LoadGame => MenuOption::Quit,
            MenuOption::Quit => MenuOption::NewGame,
        }
    }

    fn prev(&self) -> Self {
        match self {
            MenuOption::NewGame => MenuOption::Quit,
            MenuOption::LoadGame => MenuOption::NewGame,
            MenuOption::Quit => MenuOption::LoadGame,
        }
    }
}

struct App<'a> {
    session: GameSession,
    store: PrefStore,
    screen: Screen,
    menu_selection: MenuOption,
    message: String,
    message_style: Style,
    answer_input: TextArea<'a>,
    choice_index: usize,
}

impl<'a> App<'a> {
    fn new(session: GameSession, store: PrefStore) -> Self {
        App {
            session,
            store,
            screen: Screen::TitleScreen,
            menu_selection: MenuOption::NewGame,
            message: String::from("Answer questions to unlock doors. Reach the gate alive."),
            message_style: Style::default().fg(Color::Yellow),
            answer_input: make_answer_input(),
            choice_index: 0,
        }
    }

    fn say(&mut self, text: impl Into<String>, color: Color) {
        self.message = text.into();
        self.message_style = Style::default().fg(color);
    }

    fn start_new_game(&mut self) {
        if let Err(e) = save::new_game(&mut self.session, &mut self.store) {
            self.say(format!("Could not clear the old save: {e}"), Color::Magenta);
        } else {
            self.say(
                "A fresh maze. Pick a direction; every door asks a question.",
                Color::Yellow,
            );
        }
        self.screen = Screen::Playing;
    }

    fn load_saved_game(&mut self) {
        if save::load_game(&mut self.session, &self.store) {
            self.say("The maze remembers you. Carry on.", Color::Yellow);
            self.screen = Screen::Playing;
        } else {
            self.say("No saved game exists yet.", Color::Red);
        }
    }

    /// A movement key: walk through an open door, otherwise treat it as an
    /// interaction request on that wall's door.
    fn handle_direction(&mut self, dir: Direction) {
        if let Some(picked) = self.session.try_move(dir) {
            if picked.is_empty() {
                self.say("You step into the next room.", Color::White);
            } else {
                self.say(
                    format!(
                        "You step through and pocket a key ({} held).",
                        self.session.player.item_count
                    ),
                    Color::Cyan,
                );
            }
            return;
        }

        match self.session.interact(dir) {
            None => self.say("Solid wall. Nothing to open there.", Color::DarkGray),
            Some(AttemptResult::QuestionPresented) => {
                self.answer_input = make_answer_input();
                self.choice_index = 0;
                self.screen = Screen::Question;
            }
            Some(AttemptResult::Toggled { open: true }) => {
                self.say("The door swings open.", Color::Green)
            }
            Some(AttemptResult::Toggled { open: false }) => {
                self.say("The door clicks shut.", Color::White)
            }
            Some(AttemptResult::StillLocked) => self.say(
                "Sealed for good. Your wrong answer still echoes behind it.",
                Color::Red,
            ),
            Some(AttemptResult::NoQuestions) => self.say(
                "No questions remain to ask. This door will not test you.",
                Color::Magenta,
            ),
        }
    }

    fn submit(&mut self, input: &str) {
        let Some(outcome) = self.session.submit_answer(input) else {
            return;
        };
        self.screen = Screen::Playing;
        if outcome.correct {
            self.say("*** CORRECT! *** The door creaks open.", Color::Green);
        } else if outcome.lost {
            self.say("Wrong. And that was the last way through.", Color::Red);
        } else {
            self.say("Wrong. The lock fuses shut forever.", Color::Red);
        }
    }

    fn spend_key(&mut self) {
        if self.session.use_key().is_some() {
            self.screen = Screen::Playing;
            self.say(
                "The key melts into the lock. The door creaks open.",
                Color::Cyan,
            );
        }
        // Out of keys: the question simply stays up.
    }

    fn handle_question_key(&mut self, key: crossterm::event::KeyEvent) {
        let Some(pending) = self.session.pending() else {
            self.screen = Screen::Playing;
            return;
        };
        let kind = pending.question.kind();
        let option_count = match kind {
            QuestionKind::TrueFalse => 2,
            QuestionKind::MultipleChoice => pending.options.len().max(1),
            QuestionKind::FreeText => 0,
        };

        if key.code == KeyCode::F(1) {
            self.spend_key();
            return;
        }

        match kind {
            QuestionKind::TrueFalse | QuestionKind::MultipleChoice => match key.code {
                KeyCode::Up | KeyCode::Left => {
                    self.choice_index = (self.choice_index + option_count - 1) % option_count;
                }
                KeyCode::Down | KeyCode::Right | KeyCode::Tab => {
                    self.choice_index = (self.choice_index + 1) % option_count;
                }
                KeyCode::Enter => {
                    let answer = if kind == QuestionKind::TrueFalse {
                        if self.choice_index == 0 { "true" } else { "false" }.to_string()
                    } else {
                        self.session.pending().map(|p| p.options[self.choice_index].clone())
                            .unwrap_or_default()
                    };
                    self.submit(&answer);
                }
                _ => {}
            },
            QuestionKind::FreeText => match key.code {
                KeyCode::Enter => {
                    let answer = self.answer_input.lines().join(" ");
                    self.submit(&answer);
                }
                _ => {
                    self.answer_input.input(key);
                }
            },
        }
    }
}

fn make_answer_input<'a>() -> TextArea<'a> {
    let mut input = TextArea::default();
    input.set_block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Your Answer [Enter: submit | F1: use key] "),
    );
    input.set_cursor_line_style(Style::default());
    input
}

fn main() -> Result<()> {
    env_logger::init();

    let bank = QuestionBank::load(Path::new(QUESTION_DIR))
        .context("failed to load the trivia question packs")?;
    let maze = Maze::build(&MazeLayout::standard()).context("bad maze layout")?;
    let session = GameSession::new(maze, bank, item::standard_items());
    let store = PrefStore::open(Path::new(SAVE_FILE));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session, store);
    let mut last_frame = Instant::now();

    loop {
        terminal.draw(|f| draw_ui(f, &app))?;

        // Door swings are render-side only; the core just set the target.
        let dt = last_frame.elapsed().as_secs_f32();
        last_frame = Instant::now();
        for door in app.session.maze.doors_mut() {
            door.advance_animation(dt * 2.0);
        }

        if !event::poll(Duration::from_millis(80))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind == KeyEventKind::Release {
            continue;
        }

        match app.screen {
            Screen::TitleScreen => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    app.menu_selection = app.menu_selection.prev();
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    app.menu_selection = app.menu_selection.next();
                }
                KeyCode::Enter => match app.menu_selection {
                    MenuOption::NewGame => app.start_new_game(),
                    MenuOption::LoadGame => app.load_saved_game(),
                    MenuOption::Quit => break,
                },
                KeyCode::Char('q') => break,
                _ => {}
            },
            Screen::Playing => match key.code {
                KeyCode::Up | KeyCode::Char('w') => app.handle_direction(Direction::North),
                KeyCode::Right | KeyCode::Char('d') => app.handle_direction(Direction::East),
                KeyCode::Down | KeyCode::Char('s') => app.handle_direction(Direction::South),
                KeyCode::Left | KeyCode::Char('a') => app.handle_direction(Direction::West),
                KeyCode::F(2) => match save::save_game(&app.session, &mut app.store) {
                    Ok(()) => app.say("Game saved.", Color::Cyan),
                    Err(e) => app.say(format!("Save failed: {e}"), Color::Magenta),
                },
                KeyCode::F(3) => app.load_saved_game(),
                KeyCode::F(4) => app.start_new_game(),
                KeyCode::Char('q') | KeyCode::Esc => {
                    app.screen = Screen::TitleScreen;
                }
                _ => {}
            },
            Screen::Question => app.handle_question_key(key),
            Screen::Won | Screen::Lost => match key.code {
                KeyCode::Char('q') => break,
                KeyCode::Enter => {
                    app.screen = Screen::TitleScreen;
                }
                _ => {}
            },
        }

        if matches!(app.screen, Screen::Playing) {
            match app.session.tick() {
                GameStatus::Won => app.screen = Screen::Won,
                GameStatus::Lost => app.screen = Screen::Lost,
                GameStatus::InProgress => {}
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    match app.session.status() {
        GameStatus::Won => println!("\nYou reached the gate. The maze lets you go.\n"),
        GameStatus::Lost => println!("\nEvery path is sealed. The maze keeps you.\n"),
        GameStatus::InProgress => {}
    }

    Ok(())
}

fn draw_ui(f: &mut Frame, app: &App) {
    match app.screen {
        Screen::TitleScreen => {
            draw_title_screen(f, app);
            return;
        }
        Screen::Won => {
            draw_end_screen(
                f,
                "YOU ESCAPED",
                "The final door opens onto daylight.",
                Color::Green,
            );
            return;
        }
        Screen::Lost => {
            draw_end_screen(
                f,
                "TRAPPED FOREVER",
                "No unanswered door connects you to the gate.",
                Color::Red,
            );
            return;
        }
        Screen::Playing | Screen::Question => {}
    }

    let chunks = Layout::default()
        .direction(LayoutDir::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Length(5),
        ])
        .split(f.area());

    draw_status_bar(f, app, chunks[0]);

    let main_chunks = Layout::default()
        .direction(LayoutDir::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    let help = Paragraph::new(
        "Arrows / WASD: walk, or challenge a door\n\
         F2: save    F3: load    F4: new game\n\
         q: back to title\n\n\
         A closed door asks you a trivia question.\n\
         Answer right and it opens for good.\n\
         Answer wrong and it seals forever.\n\
         A key (F1 on a question) answers for you.\n\n\
         Legend:  @ you   G gate   * key\n\
         ? untried door   o unlocked   X sealed",
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" The Dark Forest "),
    )
    .wrap(Wrap { trim: false })
    .style(Style::default().fg(Color::White));
    f.render_widget(help, main_chunks[0]);

    let minimap = Paragraph::new(minimap_lines(&app.session))
        .block(Block::default().borders(Borders::ALL).title(" Minimap "))
        .alignment(Alignment::Center);
    f.render_widget(minimap, main_chunks[1]);

    let message = Paragraph::new(app.message.as_str())
        .block(Block::default().borders(Borders::ALL).title(" Whispers "))
        .wrap(Wrap { trim: false })
        .style(app.message_style);
    f.render_widget(message, chunks[2]);

    if matches!(app.screen, Screen::Question) {
        draw_question_window(f, app);
    }
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let (row, col) = app.session.maze.current_room().coords();
    let status = Line::from(vec![
        Span::styled(
            " TRIVIA MAZE ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" Room {}-{} ", row + 1, col + 1),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" Keys: {} ", app.session.player.item_count),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" Questions left: {} ", app.session.bank.remaining()),
            Style::default().fg(Color::Yellow),
        ),
    ]);
    let bar = Paragraph::new(status).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(bar, area);
}

/// Minimap glyph for one door. Mid-swing doors render as `/` regardless of
/// logical state.
fn door_glyph(maze: &Maze, id: Option<DoorId>, horizontal: bool) -> Span<'static> {
    let Some(id) = id else {
        return Span::raw(if horizontal { "───" } else { "│" });
    };
    let door = maze.door(id);
    let ch = if door.animation().0 != AnimState::Idle {
        '/'
    } else if door.is_open() {
        ' '
    } else if door.is_locked() && door.has_attempted() {
        'X'
    } else if door.is_locked() {
        '?'
    } else {
        'o'
    };
    let mut style = match ch {
        'X' => Style::default().fg(Color::Red),
        '?' => Style::default().fg(Color::Yellow),
        _ => Style::default().fg(Color::Green),
    };
    if maze.current_door() == Some(id) {
        style = style.add_modifier(Modifier::BOLD);
    }
    let text = if horizontal {
        format!("─{ch}─")
    } else {
        ch.to_string()
    };
    Span::styled(text, style)
}

fn minimap_lines(session: &GameSession) -> Vec<Line<'static>> {
    let maze = &session.maze;
    let mut lines = Vec::new();

    for row in 0..maze.rows() {
        let mut top = vec![Span::raw("·")];
        for col in 0..maze.cols() {
            let Ok(room) = maze.room_at(row, col) else {
                continue;
            };
            top.push(door_glyph(maze, room.door(Direction::North), true));
            top.push(Span::raw("·"));
        }
        lines.push(Line::from(top));

        let mut mid = Vec::new();
        for col in 0..maze.cols() {
            let Ok(room) = maze.room_at(row, col) else {
                continue;
            };
            mid.push(door_glyph(maze, room.door(Direction::West), false));
            mid.push(room_glyph(session, room));
        }
        mid.push(Span::raw("│"));
        lines.push(Line::from(mid));
    }

    let mut bottom = vec![Span::raw("·")];
    for _ in 0..maze.cols() {
        bottom.push(Span::raw("───"));
        bottom.push(Span::raw("·"));
    }
    lines.push(Line::from(bottom));
    lines
}

fn room_glyph(session: &GameSession, room: &maze::Room) -> Span<'static> {
    let maze = &session.maze;
    let (row, col) = room.coords();
    if maze.current_room().coords() == (row, col) {
        return Span::styled(
            " @ ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        );
    }
    if room.is_goal() {
        return Span::styled(
            " G ",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        );
    }
    if !room.has_visited() {
        return Span::styled("░░░", Style::default().fg(Color::DarkGray));
    }
    let has_key = session
        .items
        .iter()
        .any(|i| !i.collected && i.room == (row, col));
    if has_key {
        Span::styled(" * ", Style::default().fg(Color::Cyan))
    } else {
        Span::raw("   ")
    }
}

fn draw_question_window(f: &mut Frame, app: &App) {
    let Some(pending) = app.session.pending() else {
        return;
    };
    let kind = pending.question.kind();
    let area = centered_rect(60, 45, f.area());
    f.render_widget(Clear, area);

    let title = match kind {
        QuestionKind::TrueFalse => " True or False? ",
        QuestionKind::MultipleChoice => " Choose Wisely ",
        QuestionKind::FreeText => " Speak the Answer ",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(LayoutDir::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(6)])
        .split(inner);

    let question = Paragraph::new(pending.question.question.as_str())
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White));
    f.render_widget(question, chunks[0]);

    match kind {
        QuestionKind::TrueFalse => {
            let labels = ["True", "False"];
            let line = Line::from(
                labels
                    .iter()
                    .enumerate()
                    .flat_map(|(i, label)| {
                        let style = if i == app.choice_index {
                            Style::default().fg(Color::Black).bg(Color::Yellow)
                        } else {
                            Style::default().fg(Color::White)
                        };
                        [
                            Span::styled(format!("  {label}  "), style),
                            Span::raw("   "),
                        ]
                    })
                    .collect::<Vec<_>>(),
            );
            let buttons = Paragraph::new(line).alignment(Alignment::Center);
            f.render_widget(buttons, chunks[1]);
        }
        QuestionKind::MultipleChoice => {
            let lines: Vec<Line> = pending
                .options
                .iter()
                .enumerate()
                .map(|(i, opt)| {
                    let style = if i == app.choice_index {
                        Style::default().fg(Color::Black).bg(Color::Yellow)
                    } else {
                        Style::default().fg(Color::White)
                    };
                    Line::from(Span::styled(format!(" {opt} "), style))
                })
                .collect();
            f.render_widget(Paragraph::new(lines), chunks[1]);
        }
        QuestionKind::FreeText => {
            f.render_widget(&app.answer_input, chunks[1]);
        }
    }
}

fn draw_title_screen(f: &mut Frame, app: &App) {
    let area = f.area();

    let title_art = r#"
    ╔══════════════════════════════════════════════════╗
    ║                                                  ║
    ║   ████████╗██████╗ ██╗██╗   ██╗██╗ █████╗        ║
    ║   ╚══██╔══╝██╔══██╗██║██║   ██║██║██╔══██╗       ║
    ║      ██║   ██████╔╝██║██║   ██║██║███████║       ║
    ║      ██║   ██╔══██╗██║╚██╗ ██╔╝██║██╔══██║       ║
    ║      ██║   ██║  ██║██║ ╚████╔╝ ██║██║  ██║       ║
    ║      ╚═╝   ╚═╝  ╚═╝╚═╝  ╚═══╝  ╚═╝╚═╝  ╚═╝       ║
    ║                                                  ║
    ║      ███╗   ███╗ █████╗ ███████╗███████╗         ║
    ║      ████╗ ████║██╔══██╗╚══███╔╝██╔════╝         ║
    ║      ██╔████╔██║███████║  ███╔╝ █████╗           ║
    ║      ██║╚██╔╝██║██╔══██║ ███╔╝  ██╔══╝           ║
    ║      ██║ ╚═╝ ██║██║  ██║███████╗███████╗         ║
    ║      ╚═╝     ╚═╝╚═╝  ╚═╝╚══════╝╚══════╝         ║
    ║                                                  ║
    ║         "Every door asks. Few forgive."          ║
    ║                                                  ║
    ╚══════════════════════════════════════════════════╝
"#;

    let chunks = Layout::default()
        .direction(LayoutDir::Vertical)
        .constraints([
            Constraint::Length(21),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(area);

    let title = Paragraph::new(title_art)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let entries = [
        (
            "  NEW GAME  ",
            matches!(app.menu_selection, MenuOption::NewGame),
        ),
        (
            "  LOAD GAME  ",
            matches!(app.menu_selection, MenuOption::LoadGame),
        ),
        ("  QUIT  ", matches!(app.menu_selection, MenuOption::Quit)),
    ];
    for (i, (label, selected)) in entries.iter().enumerate() {
        let style = if *selected {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let entry = Paragraph::new(*label)
            .style(style)
            .alignment(Alignment::Center);
        f.render_widget(entry, chunks[i + 1]);
    }

    let help = Paragraph::new("↑/↓ to select  •  ENTER to confirm  •  q to quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[4]);
}

fn draw_end_screen(f: &mut Frame, headline: &str, detail: &str, color: Color) {
    let area = centered_rect(50, 30, f.area());
    let text = format!("\n{headline}\n\n{detail}\n\nENTER: back to title    q: quit");
    let body = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD));
    f.render_widget(Clear, area);
    f.render_widget(body, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(LayoutDir::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(LayoutDir::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
