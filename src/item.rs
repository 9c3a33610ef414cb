/// A collectable key placed in a room. Picked up automatically when the
/// player enters; spent through `Player::spend_key` to auto-answer a
/// question.
#[derive(Debug, Clone)]
pub struct KeyItem {
    pub id: u32,
    pub room: (usize, usize),
    pub collected: bool,
}

impl KeyItem {
    pub fn new(id: u32, room: (usize, usize)) -> Self {
        KeyItem {
            id,
            room,
            collected: false,
        }
    }
}

/// The shipped key placement for the standard 4x4 maze.
pub fn standard_items() -> Vec<KeyItem> {
    vec![
        KeyItem::new(1, (2, 1)),
        KeyItem::new(2, (0, 0)),
        KeyItem::new(3, (1, 3)),
    ]
}
