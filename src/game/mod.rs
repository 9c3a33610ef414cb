use log::{debug, info};
use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::item::KeyItem;
use crate::maze::{Direction, DoorId, Maze};
use crate::player::Player;
use crate::question::{Question, QuestionBank, QuestionKind};

/// World-space edge length of one room, used to map grid coordinates to the
/// player's continuous position.
pub const ROOM_SIZE: f32 = 10.0;

pub fn room_position(row: usize, col: usize) -> [f32; 3] {
    [col as f32 * ROOM_SIZE, 0.0, row as f32 * ROOM_SIZE]
}

/// Frontend-facing knobs that ride along in the save file.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub camera_fov: f32,
    pub sun_enabled: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            camera_fov: 60.0,
            sun_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

/// A question bound to a door, awaiting the player's answer. For
/// multiple-choice questions the canonical answer has already been
/// rewritten to the correct option's text, so the spend-key shortcut can
/// re-read it directly.
#[derive(Debug)]
pub struct PendingAttempt {
    pub door: DoorId,
    pub question: Question,
    /// Shuffled option texts, multiple-choice only.
    pub options: Vec<String>,
}

/// What a door interaction amounted to.
#[derive(Debug, PartialEq, Eq)]
pub enum AttemptResult {
    /// First interaction: a question was selected and must be presented.
    QuestionPresented,
    /// Already attempted and unlocked; the door toggled.
    Toggled { open: bool },
    /// Already attempted and permanently locked.
    StillLocked,
    /// The pool ran dry; the interaction is refused.
    NoQuestions,
}

#[derive(Debug, Clone, Copy)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub lost: bool,
}

/// One game in progress: the maze, the question pool, the player, and the
/// pending door attempt if a question window is up. All collaborators are
/// injected at construction; nothing is looked up through globals.
#[derive(Debug)]
pub struct GameSession {
    pub maze: Maze,
    pub bank: QuestionBank,
    pub player: Player,
    pub items: Vec<KeyItem>,
    pub options: Options,
    status: GameStatus,
    pending: Option<PendingAttempt>,
}

impl GameSession {
    pub fn new(maze: Maze, bank: QuestionBank, items: Vec<KeyItem>) -> Self {
        let (row, col) = maze.start();
        GameSession {
            maze,
            bank,
            player: Player::new(room_position(row, col)),
            items,
            options: Options::default(),
            status: GameStatus::InProgress,
            pending: None,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn pending(&self) -> Option<&PendingAttempt> {
        self.pending.as_ref()
    }

    /// The door on the given wall of the player's current room.
    pub fn door_in(&self, dir: Direction) -> Option<DoorId> {
        self.maze.current_room().door(dir)
    }

    /// Player interaction with a door. The first interaction binds the door
    /// to a question; every later one just toggles it (if unlocked). The
    /// `attempted` flag is the reentrancy guard: a second interaction
    /// arriving while the question window is still up lands in the toggle
    /// path and, with the lock unresolved, does nothing.
    pub fn attempt_door(&mut self, id: DoorId) -> AttemptResult {
        let door = self.maze.door(id);
        if door.has_attempted() {
            let door = self.maze.door_mut(id);
            if door.is_open() {
                door.close();
                return AttemptResult::Toggled { open: false };
            }
            if !door.is_locked() {
                door.open();
                return AttemptResult::Toggled { open: true };
            }
            return AttemptResult::StillLocked;
        }

        let Ok(question) = self.bank.next() else {
            info!("question pool exhausted, refusing interaction with door {id}");
            return AttemptResult::NoQuestions;
        };
        let mut question = question.clone();

        let options = if question.kind() == QuestionKind::MultipleChoice {
            let options = question.options();
            // The correct option is first in the source data; pin it as the
            // canonical answer before shuffling what gets displayed.
            question.answer = options[0].clone();
            let mut shuffled = options;
            shuffled.shuffle(&mut thread_rng());
            shuffled
        } else {
            Vec::new()
        };

        debug!("door {id} binds question {}", question.id);
        self.maze.door_mut(id).mark_attempted();
        self.maze.set_current_door(Some(id));
        self.player.can_move = false;
        self.pending = Some(PendingAttempt {
            door: id,
            question,
            options,
        });
        AttemptResult::QuestionPresented
    }

    /// Convenience for the frontend: resolve a direction key against the
    /// current room and interact with that door.
    pub fn interact(&mut self, dir: Direction) -> Option<AttemptResult> {
        let id = self.door_in(dir)?;
        Some(self.attempt_door(id))
    }

    /// Evaluates a submitted answer against the pending attempt. Returns
    /// `None` when no question is up.
    pub fn submit_answer(&mut self, input: &str) -> Option<AnswerOutcome> {
        let pending = self.pending.take()?;
        let correct = pending.question.check_answer(input);
        info!(
            "answer {:?} to question {} is {}",
            input,
            pending.question.id,
            if correct { "correct" } else { "incorrect" }
        );

        let door = self.maze.door_mut(pending.door);
        door.resolve_attempt(correct);
        if correct {
            door.open();
        } else {
            let lost = self.maze.check_lose_condition();
            self.maze.set_lose_condition(lost);
        }

        self.bank.retire(&pending.question);
        self.player.can_move = true;
        self.maze.set_current_door(None);

        let lost = self.maze.lose_condition();
        if lost {
            self.status = GameStatus::Lost;
        }
        Some(AnswerOutcome { correct, lost })
    }

    /// Spend-key shortcut: consumes one key item and auto-submits the
    /// canonical correct answer. Silently does nothing when no question is
    /// up or the inventory is empty.
    pub fn use_key(&mut self) -> Option<AnswerOutcome> {
        let answer = self.pending.as_ref()?.question.answer.clone();
        if !self.player.spend_key() {
            return None;
        }
        self.submit_answer(&answer)
    }

    /// Moves the player through an open door. Returns the ids of any key
    /// items picked up in the new room, or `None` if the move was not
    /// possible.
    pub fn try_move(&mut self, dir: Direction) -> Option<Vec<u32>> {
        if !self.player.can_move {
            return None;
        }
        let room = self.maze.current_room();
        let id = room.door(dir)?;
        if !self.maze.door(id).is_open() {
            return None;
        }
        let (row, col) = room.coords();
        let (nr, nc) = self.maze.neighbor(row, col, dir)?;
        self.maze.enter_room(nr, nc).ok()?;
        self.player.position = room_position(nr, nc);
        Some(self.collect_items_here())
    }

    fn collect_items_here(&mut self) -> Vec<u32> {
        let here = self.maze.current_room().coords();
        let mut picked = Vec::new();
        for item in self.items.iter_mut().filter(|i| !i.collected && i.room == here) {
            item.collected = true;
            self.player.item_count += 1;
            picked.push(item.id);
        }
        if !picked.is_empty() {
            debug!("picked up keys {picked:?} in room {here:?}");
        }
        picked
    }

    /// Per-frame status check run by the game loop: standing in the goal
    /// room wins, a raised lose condition loses.
    pub fn tick(&mut self) -> GameStatus {
        if self.status == GameStatus::InProgress {
            if self.maze.lose_condition() {
                self.status = GameStatus::Lost;
            } else if self.maze.current_room().is_goal() {
                self.status = GameStatus::Won;
            }
        }
        self.status
    }

    /// Full in-memory reset: fresh doors, fresh pool, player at the start.
    pub fn new_game(&mut self) {
        self.maze.reset();
        self.bank.reset();
        for item in &mut self.items {
            item.collected = false;
        }
        let (row, col) = self.maze.start();
        self.player = Player::new(room_position(row, col));
        self.status = GameStatus::InProgress;
        self.pending = None;
    }

    /// Settles session state after a load: the player's room is re-derived
    /// from the restored position, any in-flight question is dropped, and
    /// the lose condition is recomputed from the restored door states.
    pub fn restore_finalize(&mut self) {
        self.pending = None;
        self.player.can_move = true;
        self.maze.set_current_door(None);
        self.sync_room_from_position();
        let lost = self.maze.check_lose_condition();
        self.maze.set_lose_condition(lost);
        self.status = GameStatus::InProgress;
        self.tick();
    }

    /// Re-derives the player's room from the continuous position, used
    /// after a load. Out-of-range positions clamp to the grid.
    pub fn sync_room_from_position(&mut self) {
        let row = (self.player.position[2] / ROOM_SIZE).round().max(0.0) as usize;
        let col = (self.player.position[0] / ROOM_SIZE).round().max(0.0) as usize;
        let row = row.min(self.maze.rows() - 1);
        let col = col.min(self.maze.cols() - 1);
        // Bounds were just clamped.
        let _ = self.maze.enter_room(row, col);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::MazeLayout;

    fn session_with(questions: Vec<Question>) -> GameSession {
        let maze = Maze::build(&MazeLayout::standard()).unwrap();
        GameSession::new(maze, QuestionBank::from_questions(questions), Vec::new())
    }

    fn east_door(session: &GameSession) -> DoorId {
        session.door_in(Direction::East).unwrap()
    }

    #[test]
    fn first_attempt_presents_a_question() {
        let mut session = session_with(vec![Question::new(1, 3, "Q?", "yes")]);
        let id = east_door(&session);
        assert_eq!(session.attempt_door(id), AttemptResult::QuestionPresented);
        assert!(session.pending().is_some());
        assert!(session.maze.door(id).has_attempted());
        assert!(!session.player.can_move);
    }

    #[test]
    fn correct_answer_unlocks_and_opens() {
        let mut session = session_with(vec![Question::new(1, 3, "Q?", "yes")]);
        let id = east_door(&session);
        session.attempt_door(id);
        let outcome = session.submit_answer("YES").unwrap();
        assert!(outcome.correct);
        assert!(!outcome.lost);
        let door = session.maze.door(id);
        assert!(!door.is_locked());
        assert!(door.is_open());
        assert!(session.player.can_move);
    }

    #[test]
    fn second_attempt_never_reselects_a_question() {
        let mut session = session_with(vec![
            Question::new(1, 3, "Q1?", "a"),
            Question::new(2, 3, "Q2?", "b"),
        ]);
        let id = east_door(&session);
        session.attempt_door(id);
        session.submit_answer("a").unwrap();
        let before = session.bank.remaining();

        // Door is attempted and open: interactions only toggle it.
        assert_eq!(session.attempt_door(id), AttemptResult::Toggled { open: false });
        assert_eq!(session.attempt_door(id), AttemptResult::Toggled { open: true });
        assert_eq!(session.bank.remaining(), before);
        assert!(session.pending().is_none());
    }

    #[test]
    fn reentrant_attempt_during_pending_question_degrades_to_toggle() {
        let mut session = session_with(vec![Question::new(1, 3, "Q?", "a")]);
        let id = east_door(&session);
        session.attempt_door(id);
        // Lock is unresolved, so the reentrant call can do nothing.
        assert_eq!(session.attempt_door(id), AttemptResult::StillLocked);
        // The original pending attempt is untouched.
        assert!(session.pending().is_some());
    }

    #[test]
    fn failed_door_stays_sealed() {
        let mut session = session_with(vec![
            Question::new(1, 3, "Q1?", "a"),
            Question::new(2, 3, "Q2?", "b"),
        ]);
        let id = east_door(&session);
        session.attempt_door(id);
        let outcome = session.submit_answer("wrong").unwrap();
        assert!(!outcome.correct);
        assert!(!outcome.lost, "plenty of alternate routes remain");
        assert_eq!(session.attempt_door(id), AttemptResult::StillLocked);
    }

    #[test]
    fn multiple_choice_rewrites_canonical_answer() {
        let mut session = session_with(vec![Question::new(2, 2, "Pick one", "cat,dog,fish")]);
        let id = east_door(&session);
        session.attempt_door(id);

        let pending = session.pending().unwrap();
        assert_eq!(pending.question.answer, "cat");
        assert_eq!(pending.options.len(), 3);
        for opt in ["cat", "dog", "fish"] {
            assert!(pending.options.iter().any(|o| o == opt));
        }

        let outcome = session.submit_answer("CAT").unwrap();
        assert!(outcome.correct);
    }

    #[test]
    fn use_key_auto_answers_when_inventory_nonzero() {
        let mut session = session_with(vec![Question::new(2, 2, "Pick one", "cat,dog,fish")]);
        session.player.item_count = 1;
        let id = east_door(&session);
        session.attempt_door(id);
        let outcome = session.use_key().unwrap();
        assert!(outcome.correct);
        assert_eq!(session.player.item_count, 0);
        assert!(session.maze.door(id).is_open());
    }

    #[test]
    fn use_key_is_silent_with_empty_inventory() {
        let mut session = session_with(vec![Question::new(1, 3, "Q?", "a")]);
        let id = east_door(&session);
        session.attempt_door(id);
        assert!(session.use_key().is_none());
        assert!(session.pending().is_some(), "question stays up");
        assert_eq!(session.player.item_count, 0);
    }

    #[test]
    fn exhausted_pool_refuses_interaction() {
        let mut session = session_with(vec![Question::new(1, 3, "Q?", "a")]);
        let id = east_door(&session);
        session.attempt_door(id);
        session.submit_answer("a").unwrap();

        // A different, untouched door now has no question to bind.
        let other = session.door_in(Direction::North).unwrap();
        assert_eq!(session.attempt_door(other), AttemptResult::NoQuestions);
        assert!(
            !session.maze.door(other).has_attempted(),
            "a refused interaction burns nothing"
        );
    }

    #[test]
    fn sealing_every_route_raises_the_lose_signal() {
        // Player starts at (3,0). Seal its two doors via failed answers;
        // the last failure must report the loss.
        let questions = (1..=3).map(|i| Question::new(i, 3, format!("Q{i}?").as_str(), "a"));
        let mut session = session_with(questions.collect());

        let east = session.door_in(Direction::East).unwrap();
        session.attempt_door(east);
        assert!(!session.submit_answer("wrong").unwrap().lost);

        let north = session.door_in(Direction::North).unwrap();
        session.attempt_door(north);
        let outcome = session.submit_answer("wrong").unwrap();
        assert!(outcome.lost);
        assert_eq!(session.tick(), GameStatus::Lost);
    }

    #[test]
    fn standing_in_the_goal_room_wins_on_tick() {
        let mut session = session_with(vec![Question::new(1, 3, "Q?", "a")]);
        assert_eq!(session.tick(), GameStatus::InProgress);
        session.maze.enter_room(0, 3).unwrap();
        assert_eq!(session.tick(), GameStatus::Won);
    }

    #[test]
    fn moving_through_an_open_door_collects_keys() {
        let maze = Maze::build(&MazeLayout::standard()).unwrap();
        let bank = QuestionBank::from_questions(vec![Question::new(1, 3, "Q?", "a")]);
        let items = vec![KeyItem::new(7, (3, 1))];
        let mut session = GameSession::new(maze, bank, items);

        let id = session.door_in(Direction::East).unwrap();
        session.attempt_door(id);
        session.submit_answer("a").unwrap();

        let picked = session.try_move(Direction::East).unwrap();
        assert_eq!(picked, vec![7]);
        assert_eq!(session.player.item_count, 1);
        assert_eq!(session.maze.current_room().coords(), (3, 1));
        assert_eq!(session.player.position, room_position(3, 1));

        // Walking back and forth does not double-collect.
        let back = session.try_move(Direction::West).unwrap();
        assert!(back.is_empty());
        assert_eq!(session.try_move(Direction::East).unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn cannot_move_through_closed_or_missing_doors() {
        let mut session = session_with(vec![Question::new(1, 3, "Q?", "a")]);
        assert!(session.try_move(Direction::East).is_none(), "door closed");
        assert!(session.try_move(Direction::West).is_none(), "border wall");
    }

    #[test]
    fn new_game_resets_everything() {
        let maze = Maze::build(&MazeLayout::standard()).unwrap();
        let bank = QuestionBank::from_questions(vec![Question::new(1, 3, "Q?", "a")]);
        let items = vec![KeyItem::new(1, (3, 1))];
        let mut session = GameSession::new(maze, bank, items);

        let id = session.door_in(Direction::East).unwrap();
        session.attempt_door(id);
        session.submit_answer("a").unwrap();
        session.try_move(Direction::East).unwrap();

        session.new_game();
        assert_eq!(session.status(), GameStatus::InProgress);
        assert_eq!(session.maze.current_room().coords(), (3, 0));
        assert_eq!(session.bank.remaining(), 1);
        assert_eq!(session.player.item_count, 0);
        assert!(session.items.iter().all(|i| !i.collected));
        assert!(session.maze.doors().all(|d| d.is_locked()));
    }

    #[test]
    fn sync_room_from_position_clamps_to_grid() {
        let mut session = session_with(vec![Question::new(1, 3, "Q?", "a")]);
        session.player.position = room_position(2, 3);
        session.sync_room_from_position();
        assert_eq!(session.maze.current_room().coords(), (2, 3));

        session.player.position = [900.0, 0.0, -50.0];
        session.sync_room_from_position();
        assert_eq!(session.maze.current_room().coords(), (0, 3));
    }
}
