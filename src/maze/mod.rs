pub mod door;
pub mod grid;

pub use door::{AnimState, Door, DoorId, Orientation};
pub use grid::{Direction, Maze, MazeLayout, Room};
