/// Player session state the core tracks: world position, movement speed,
/// key-item inventory, and whether movement is currently allowed (frozen
/// while a question window is up).
#[derive(Debug)]
pub struct Player {
    pub position: [f32; 3],
    pub speed: f32,
    pub item_count: u32,
    pub can_move: bool,
}

impl Player {
    pub const DEFAULT_SPEED: f32 = 40.0;

    pub fn new(position: [f32; 3]) -> Self {
        Player {
            position,
            speed: Self::DEFAULT_SPEED,
            item_count: 0,
            can_move: true,
        }
    }

    /// Consumes one key item. Returns false (and changes nothing) when the
    /// inventory is empty.
    pub fn spend_key(&mut self) -> bool {
        if self.item_count > 0 {
            self.item_count -= 1;
            true
        } else {
            false
        }
    }
}
