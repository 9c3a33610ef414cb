use std::collections::HashSet;
use std::io;

use log::info;

use super::store::PrefStore;
use crate::game::GameSession;

const KEY_POS_X: &str = "PlayerPosition_x";
const KEY_POS_Y: &str = "PlayerPosition_y";
const KEY_POS_Z: &str = "PlayerPosition_z";
const KEY_ITEM_COUNT: &str = "PlayerItemCount";
const KEY_SPEED: &str = "PlayerSpeed";
const KEY_CAMERA_FOV: &str = "CameraFov";
const KEY_SUN_TOGGLE: &str = "SunToggle";
const KEY_VISITED_ROOMS: &str = "VisitedRooms";
const KEY_KEYS_IN_SCENE: &str = "KeysInScene";

fn question_key(id: u32) -> String {
    format!("QuestionAnswered_{id}")
}

/// Snapshots the whole session into the flat store and flushes it to disk.
pub fn save_game(session: &GameSession, store: &mut PrefStore) -> io::Result<()> {
    let player = &session.player;
    store.set_float(KEY_POS_X, player.position[0]);
    store.set_float(KEY_POS_Y, player.position[1]);
    store.set_float(KEY_POS_Z, player.position[2]);
    store.set_int(KEY_ITEM_COUNT, player.item_count as i64);
    store.set_float(KEY_SPEED, player.speed);

    store.set_float(KEY_CAMERA_FOV, session.options.camera_fov);
    store.set_int(KEY_SUN_TOGGLE, session.options.sun_enabled as i64);

    for door in session.maze.doors() {
        let key = door.save_key();
        store.set_int(&format!("{key}_LockState"), door.is_locked() as i64);
        store.set_int(&format!("{key}_HasAttempted"), door.has_attempted() as i64);
    }

    let visited: Vec<String> = session
        .maze
        .rooms()
        .filter(|r| r.has_visited())
        .map(|r| format!("{},{}", r.row(), r.col()))
        .collect();
    store.set_string(KEY_VISITED_ROOMS, &visited.join(";"));

    let active: Vec<String> = session
        .items
        .iter()
        .filter(|i| !i.collected)
        .map(|i| i.id.to_string())
        .collect();
    store.set_string(KEY_KEYS_IN_SCENE, &active.join(","));

    for id in session.bank.answered_ids() {
        store.set_int(&question_key(id), 1);
    }

    store.save()?;
    info!("game saved");
    Ok(())
}

/// Restores a session from the store. Returns `false` (touching nothing)
/// when no save exists; existence is decided solely by the player-position
/// key. Every other field is individually guarded, so a snapshot written
/// without some field keeps that field's in-memory value.
pub fn load_game(session: &mut GameSession, store: &PrefStore) -> bool {
    if !store.has(KEY_POS_X) {
        return false;
    }

    let player = &mut session.player;
    player.position[0] = store.get_float(KEY_POS_X, player.position[0]);
    player.position[1] = store.get_float(KEY_POS_Y, player.position[1]);
    player.position[2] = store.get_float(KEY_POS_Z, player.position[2]);
    player.item_count = store.get_int(KEY_ITEM_COUNT, player.item_count as i64).max(0) as u32;
    player.speed = store.get_float(KEY_SPEED, player.speed);

    session.options.camera_fov = store.get_float(KEY_CAMERA_FOV, session.options.camera_fov);
    session.options.sun_enabled = store.get_int(KEY_SUN_TOGGLE, session.options.sun_enabled as i64) == 1;

    let door_keys: Vec<_> = session
        .maze
        .doors()
        .map(|d| (d.id(), d.save_key()))
        .collect();
    for (id, key) in door_keys {
        let lock_key = format!("{key}_LockState");
        if store.has(&lock_key) {
            let locked = store.get_int(&lock_key, 1) == 1;
            let attempted = store.get_int(&format!("{key}_HasAttempted"), 0) == 1;
            session.maze.door_mut(id).restore(locked, attempted);
        }
    }

    if store.has(KEY_VISITED_ROOMS) {
        let visited = parse_coord_list(&store.get_string(KEY_VISITED_ROOMS, ""));
        session.maze.restore_visited(&visited);
    }

    if store.has(KEY_KEYS_IN_SCENE) {
        let active: HashSet<u32> = store
            .get_string(KEY_KEYS_IN_SCENE, "")
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        for item in &mut session.items {
            item.collected = !active.contains(&item.id);
        }
    }

    let answered: HashSet<u32> = session
        .bank
        .all_ids()
        .into_iter()
        .filter(|id| store.get_int(&question_key(*id), 0) == 1)
        .collect();
    session.bank.restore_answered(&answered);

    session.restore_finalize();
    info!("game loaded");
    true
}

/// Starts a new game: wipes the store and resets the session in memory.
pub fn new_game(session: &mut GameSession, store: &mut PrefStore) -> io::Result<()> {
    store.delete_all()?;
    session.new_game();
    info!("new game started");
    Ok(())
}

/// Parses "row,col;row,col" coordinate lists. Malformed entries are
/// skipped, not errors.
fn parse_coord_list(data: &str) -> Vec<(usize, usize)> {
    data.split(';')
        .filter_map(|pair| {
            let (r, c) = pair.split_once(',')?;
            Some((r.trim().parse().ok()?, c.trim().parse().ok()?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::KeyItem;
    use crate::maze::{Direction, Maze, MazeLayout};
    use crate::question::{Question, QuestionBank};
    use tempfile::TempDir;

    fn fresh_session() -> GameSession {
        let maze = Maze::build(&MazeLayout::standard()).unwrap();
        let bank = QuestionBank::from_questions(vec![
            Question::new(1, 1, "Q1?", "true"),
            Question::new(2, 2, "Q2?", "a,b,c"),
            Question::new(3, 3, "Q3?", "word"),
        ]);
        let items = vec![KeyItem::new(1, (3, 1)), KeyItem::new(2, (2, 0))];
        GameSession::new(maze, bank, items)
    }

    fn play_a_bit(session: &mut GameSession) {
        // Pass the east door, fail the north door, walk east.
        let east = session.door_in(Direction::East).unwrap();
        session.attempt_door(east);
        let q = session.pending().unwrap().question.answer.clone();
        session.submit_answer(&q).unwrap();

        let north = session.door_in(Direction::North).unwrap();
        session.attempt_door(north);
        session.submit_answer("definitely wrong").unwrap();

        session.try_move(Direction::East).unwrap();
        session.player.speed = 55.0;
        session.options.camera_fov = 72.0;
        session.options.sun_enabled = false;
    }

    #[test]
    fn load_without_save_reports_none() {
        let dir = TempDir::new().unwrap();
        let store = PrefStore::open(&dir.path().join("prefs.toml"));
        let mut session = fresh_session();
        assert!(!load_game(&mut session, &store));
    }

    #[test]
    fn save_load_round_trip_is_exact() {
        let dir = TempDir::new().unwrap();
        let mut store = PrefStore::open(&dir.path().join("prefs.toml"));
        let mut session = fresh_session();
        play_a_bit(&mut session);
        save_game(&session, &mut store).unwrap();

        let saved_doors: Vec<_> = session
            .maze
            .doors()
            .map(|d| (d.is_locked(), d.has_attempted()))
            .collect();
        let saved_pos = session.player.position;

        let store = PrefStore::open(&dir.path().join("prefs.toml"));
        let mut restored = fresh_session();
        assert!(load_game(&mut restored, &store));

        assert_eq!(restored.player.position, saved_pos);
        assert_eq!(restored.player.item_count, session.player.item_count);
        assert_eq!(restored.player.speed, 55.0);
        assert_eq!(restored.options.camera_fov, 72.0);
        assert!(!restored.options.sun_enabled);
        let doors: Vec<_> = restored
            .maze
            .doors()
            .map(|d| (d.is_locked(), d.has_attempted()))
            .collect();
        assert_eq!(doors, saved_doors);
        assert_eq!(restored.maze.current_room().coords(), (3, 1));
    }

    #[test]
    fn answered_questions_stay_out_of_the_pool() {
        let dir = TempDir::new().unwrap();
        let mut store = PrefStore::open(&dir.path().join("prefs.toml"));
        let mut session = fresh_session();
        play_a_bit(&mut session);
        let remaining = session.bank.remaining();
        save_game(&session, &mut store).unwrap();

        let mut restored = fresh_session();
        assert!(load_game(&mut restored, &store));
        assert_eq!(restored.bank.remaining(), remaining);
        let mut answered = restored.bank.answered_ids();
        answered.sort_unstable();
        let mut expected = session.bank.answered_ids();
        expected.sort_unstable();
        assert_eq!(answered, expected);
    }

    #[test]
    fn visited_rooms_and_items_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = PrefStore::open(&dir.path().join("prefs.toml"));
        let mut session = fresh_session();
        play_a_bit(&mut session);
        // Key 1 sits in (3,1) and was collected by the move.
        assert!(session.items[0].collected);
        save_game(&session, &mut store).unwrap();

        let mut restored = fresh_session();
        assert!(load_game(&mut restored, &store));
        assert!(restored.items[0].collected);
        assert!(!restored.items[1].collected);
        assert!(restored.maze.room_at(3, 0).unwrap().has_visited());
        assert!(restored.maze.room_at(3, 1).unwrap().has_visited());
        assert!(!restored.maze.room_at(0, 0).unwrap().has_visited());
    }

    #[test]
    fn fields_absent_from_the_save_keep_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.toml");
        // A minimal "older schema" save: position only.
        let mut store = PrefStore::open(&path);
        store.set_float("PlayerPosition_x", 0.0);
        store.set_float("PlayerPosition_y", 0.0);
        store.set_float("PlayerPosition_z", 30.0);
        store.save().unwrap();

        let mut session = fresh_session();
        let store = PrefStore::open(&path);
        assert!(load_game(&mut session, &store));
        assert_eq!(session.player.speed, crate::player::Player::DEFAULT_SPEED);
        assert_eq!(session.options.camera_fov, 60.0);
        assert!(session.options.sun_enabled);
        assert_eq!(session.maze.current_room().coords(), (3, 0));
        assert!(session.maze.doors().all(|d| d.is_locked() && !d.has_attempted()));
    }

    #[test]
    fn new_game_wipes_the_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.toml");
        let mut store = PrefStore::open(&path);
        let mut session = fresh_session();
        play_a_bit(&mut session);
        save_game(&session, &mut store).unwrap();

        new_game(&mut session, &mut store).unwrap();
        assert!(!store.has("PlayerPosition_x"));
        assert!(!path.exists());
        let store = PrefStore::open(&path);
        let mut other = fresh_session();
        assert!(!load_game(&mut other, &store));
    }

    #[test]
    fn coord_list_parsing_skips_garbage() {
        assert_eq!(parse_coord_list("0,1;2,3"), vec![(0, 1), (2, 3)]);
        assert_eq!(parse_coord_list("0,1;;bad;4"), vec![(0, 1)]);
        assert_eq!(parse_coord_list(""), Vec::<(usize, usize)>::new());
    }
}
