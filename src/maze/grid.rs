use log::debug;

use super::door::{Door, DoorId, Orientation};
use crate::error::GameError;

/// The four wall directions, in the fixed order used by every per-room door
/// array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A node in the maze grid. Identity is (row, col); everything else is
/// mutable session state or fixed layout data.
#[derive(Debug)]
pub struct Room {
    row: usize,
    col: usize,
    visited: bool,
    goal: bool,
    doors: [Option<DoorId>; 4],
}

impl Room {
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn coords(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn has_visited(&self) -> bool {
        self.visited
    }

    pub fn is_goal(&self) -> bool {
        self.goal
    }

    /// Door references in fixed north/east/south/west order. `None` marks a
    /// solid wall.
    pub fn doors(&self) -> [Option<DoorId>; 4] {
        self.doors
    }

    pub fn door(&self, dir: Direction) -> Option<DoorId> {
        self.doors[dir.index()]
    }
}

impl PartialEq for Room {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row && self.col == other.col
    }
}

impl Eq for Room {}

/// Declarative maze description. The builder turns this into rooms and
/// doors up front, so nothing is discovered by name at runtime and door ids
/// come out deterministic.
#[derive(Debug, Clone)]
pub struct MazeLayout {
    pub rows: usize,
    pub cols: usize,
    pub start: (usize, usize),
    pub goal: (usize, usize),
    /// Interior edges that are solid wall instead of a door, named by the
    /// room on their north/west side and the direction of the edge (only
    /// `East` and `South` are meaningful here).
    pub walls: Vec<((usize, usize), Direction)>,
}

impl MazeLayout {
    /// The shipped configuration: 4x4, every interior edge has a door,
    /// player starts in the southwest corner, goal in the northeast.
    pub fn standard() -> Self {
        MazeLayout {
            rows: 4,
            cols: 4,
            start: (3, 0),
            goal: (0, 3),
            walls: Vec::new(),
        }
    }
}

/// The maze: room grid, door arena, and the player's place in it.
#[derive(Debug)]
pub struct Maze {
    rows: usize,
    cols: usize,
    rooms: Vec<Room>,
    doors: Vec<Door>,
    start: (usize, usize),
    goal: (usize, usize),
    current: (usize, usize),
    current_door: Option<DoorId>,
    lose_condition: bool,
}

impl Maze {
    /// Builds the grid from a layout description. Interior edges get a door
    /// unless the layout lists them as solid; door ids are assigned in scan
    /// order (east edge, then south edge, row-major).
    pub fn build(layout: &MazeLayout) -> Result<Self, GameError> {
        let (rows, cols) = (layout.rows, layout.cols);
        let oob = |(r, c): (usize, usize)| GameError::OutOfBounds {
            row: r,
            col: c,
            rows,
            cols,
        };
        if layout.start.0 >= rows || layout.start.1 >= cols {
            return Err(oob(layout.start));
        }
        if layout.goal.0 >= rows || layout.goal.1 >= cols {
            return Err(oob(layout.goal));
        }

        let mut rooms: Vec<Room> = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (r, c)))
            .map(|(row, col)| Room {
                row,
                col,
                visited: false,
                goal: (row, col) == layout.goal,
                doors: [None; 4],
            })
            .collect();

        let mut doors = Vec::new();
        for row in 0..rows {
            for col in 0..cols {
                if col + 1 < cols && !layout.walls.contains(&((row, col), Direction::East)) {
                    let id = DoorId(doors.len());
                    doors.push(Door::new(id, row, col, Orientation::Vertical));
                    rooms[row * cols + col].doors[Direction::East.index()] = Some(id);
                    rooms[row * cols + col + 1].doors[Direction::West.index()] = Some(id);
                }
                if row + 1 < rows && !layout.walls.contains(&((row, col), Direction::South)) {
                    let id = DoorId(doors.len());
                    doors.push(Door::new(id, row, col, Orientation::Horizontal));
                    rooms[row * cols + col].doors[Direction::South.index()] = Some(id);
                    rooms[(row + 1) * cols + col].doors[Direction::North.index()] = Some(id);
                }
            }
        }

        debug!(
            "built {}x{} maze with {} doors, start {:?}, goal {:?}",
            rows,
            cols,
            doors.len(),
            layout.start,
            layout.goal
        );

        let mut maze = Maze {
            rows,
            cols,
            rooms,
            doors,
            start: layout.start,
            goal: layout.goal,
            current: layout.start,
            current_door: None,
            lose_condition: false,
        };
        maze.room_mut(layout.start.0, layout.start.1)?.visited = true;
        Ok(maze)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn room_at(&self, row: usize, col: usize) -> Result<&Room, GameError> {
        if row >= self.rows || col >= self.cols {
            return Err(GameError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(&self.rooms[row * self.cols + col])
    }

    fn room_mut(&mut self, row: usize, col: usize) -> Result<&mut Room, GameError> {
        if row >= self.rows || col >= self.cols {
            return Err(GameError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let cols = self.cols;
        Ok(&mut self.rooms[row * cols + col])
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    pub fn door(&self, id: DoorId) -> &Door {
        &self.doors[id.0]
    }

    pub fn door_mut(&mut self, id: DoorId) -> &mut Door {
        &mut self.doors[id.0]
    }

    pub fn doors(&self) -> impl Iterator<Item = &Door> {
        self.doors.iter()
    }

    pub fn doors_mut(&mut self) -> impl Iterator<Item = &mut Door> {
        self.doors.iter_mut()
    }

    pub fn start(&self) -> (usize, usize) {
        self.start
    }

    pub fn current_room(&self) -> &Room {
        &self.rooms[self.current.0 * self.cols + self.current.1]
    }

    /// Moves the player to a room and marks it visited.
    pub fn enter_room(&mut self, row: usize, col: usize) -> Result<(), GameError> {
        let room = self.room_mut(row, col)?;
        room.visited = true;
        self.current = (row, col);
        Ok(())
    }

    /// The door the player currently stands next to, if any. Set by the
    /// frontend from its trigger/selection events.
    pub fn current_door(&self) -> Option<DoorId> {
        self.current_door
    }

    pub fn set_current_door(&mut self, door: Option<DoorId>) {
        self.current_door = door;
    }

    pub fn neighbor(&self, row: usize, col: usize, dir: Direction) -> Option<(usize, usize)> {
        let (r, c) = (row as isize, col as isize);
        let (nr, nc) = match dir {
            Direction::North => (r - 1, c),
            Direction::East => (r, c + 1),
            Direction::South => (r + 1, c),
            Direction::West => (r, c - 1),
        };
        if nr < 0 || nc < 0 || nr as usize >= self.rows || nc as usize >= self.cols {
            return None;
        }
        Some((nr as usize, nc as usize))
    }

    pub fn lose_condition(&self) -> bool {
        self.lose_condition
    }

    pub fn set_lose_condition(&mut self, lost: bool) {
        self.lose_condition = lost;
    }

    /// Decides whether the game is lost: `true` when no traversable path
    /// remains between the player's room and the goal.
    ///
    /// An edge is blocked only when its door is both locked *and* attempted;
    /// a locked door nobody has tried yet could still be answered open, so
    /// it counts as passable here. The search is seeded at the goal and
    /// looks for the player's room, matching the outward direction in which
    /// each room's door array is populated.
    pub fn check_lose_condition(&self) -> bool {
        let mut seen = vec![false; self.rows * self.cols];
        self.unreachable_from(self.goal.0, self.goal.1, &mut seen)
    }

    /// Returns `false` as soon as any branch reaches the player's room,
    /// short-circuiting the remaining siblings.
    fn unreachable_from(&self, row: usize, col: usize, seen: &mut [bool]) -> bool {
        seen[row * self.cols + col] = true;
        if (row, col) == self.current {
            return false;
        }
        let doors = self.rooms[row * self.cols + col].doors();
        for (dir, slot) in Direction::ALL.into_iter().zip(doors) {
            let Some(id) = slot else {
                continue;
            };
            let door = &self.doors[id.0];
            if door.is_locked() && door.has_attempted() {
                continue;
            }
            let Some((nr, nc)) = self.neighbor(row, col, dir) else {
                continue;
            };
            if !seen[nr * self.cols + nc] && !self.unreachable_from(nr, nc, seen) {
                return false;
            }
        }
        true
    }

    /// Full reset for a new game: doors relocked, rooms unvisited, player
    /// back at the start.
    pub fn reset(&mut self) {
        for door in &mut self.doors {
            door.reset();
        }
        for room in &mut self.rooms {
            room.visited = false;
        }
        self.current = self.start;
        self.rooms[self.start.0 * self.cols + self.start.1].visited = true;
        self.current_door = None;
        self.lose_condition = false;
    }

    /// Restores the visited set from a saved coordinate list.
    pub fn restore_visited(&mut self, visited: &[(usize, usize)]) {
        for room in &mut self.rooms {
            room.visited = visited.contains(&(room.row, room.col));
        }
        // The player's room is visited by definition.
        let (r, c) = self.current;
        self.rooms[r * self.cols + c].visited = true;
    }
}
