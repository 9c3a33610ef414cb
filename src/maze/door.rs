use std::fmt;

/// Stable door identifier, assigned monotonically by the maze builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DoorId(pub usize);

impl fmt::Display for DoorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether the door sits in a horizontal (south-facing) or vertical
/// (east-facing) wall. Only the presentation layer cares, for picking the
/// swing animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Animation target state. The core only ever sets the target; the render
/// loop advances `progress` and flips back to `Idle` when done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimState {
    #[default]
    Idle,
    Opening,
    Closing,
}

/// A door between two orthogonally adjacent rooms.
///
/// Doors start locked, closed, and unattempted. The first (and only)
/// question attempt resolves the lock: a correct answer clears it, a wrong
/// answer makes it permanent. Once unlocked the door cycles open/closed
/// freely. There is no way back to the unattempted state short of a new
/// game.
#[derive(Debug)]
pub struct Door {
    id: DoorId,
    row: usize,
    col: usize,
    orientation: Orientation,
    locked: bool,
    open: bool,
    attempted: bool,
    anim: AnimState,
    anim_progress: f32,
}

impl Door {
    pub fn new(id: DoorId, row: usize, col: usize, orientation: Orientation) -> Self {
        Door {
            id,
            row,
            col,
            orientation,
            locked: true,
            open: false,
            attempted: false,
            anim: AnimState::Idle,
            anim_progress: 0.0,
        }
    }

    pub fn id(&self) -> DoorId {
        self.id
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn has_attempted(&self) -> bool {
        self.attempted
    }

    /// Key prefix under which this door's state is persisted. Combines the
    /// monotonic id with the wall position so the key stays stable across
    /// sessions of the same layout.
    pub fn save_key(&self) -> String {
        let o = match self.orientation {
            Orientation::Horizontal => 'H',
            Orientation::Vertical => 'V',
        };
        format!("Door_{}_{}x{}{}", self.id, self.row, self.col, o)
    }

    /// Opens the door. No-op while the lock is still set or the door is
    /// already open.
    pub fn open(&mut self) {
        if self.locked || self.open {
            return;
        }
        self.open = true;
        self.anim = AnimState::Opening;
        self.anim_progress = 0.0;
    }

    /// Closes the door. No-op if already closed.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.anim = AnimState::Closing;
        self.anim_progress = 0.0;
    }

    /// Records the one-time question attempt. A correct answer clears the
    /// lock; a wrong one sets it for good.
    pub fn resolve_attempt(&mut self, correct: bool) {
        self.attempted = true;
        self.locked = !correct;
    }

    /// Marks the door attempted before its answer is evaluated. First write
    /// wins: a second interaction arriving while a question is pending sees
    /// `has_attempted()` and degrades to open/close toggling.
    pub fn mark_attempted(&mut self) {
        self.attempted = true;
    }

    /// Direct state restore, used by the save/load path only.
    pub fn restore(&mut self, locked: bool, attempted: bool) {
        self.locked = locked;
        self.attempted = attempted;
        if self.locked {
            self.open = false;
        }
        self.anim = AnimState::Idle;
        self.anim_progress = 0.0;
    }

    /// Back to factory state for a new game.
    pub fn reset(&mut self) {
        self.locked = true;
        self.open = false;
        self.attempted = false;
        self.anim = AnimState::Idle;
        self.anim_progress = 0.0;
    }

    pub fn animation(&self) -> (AnimState, f32) {
        (self.anim, self.anim_progress)
    }

    /// Advances the swing animation. Driven by the render loop; the core
    /// never calls this.
    pub fn advance_animation(&mut self, dt: f32) {
        if self.anim == AnimState::Idle {
            return;
        }
        self.anim_progress += dt;
        if self.anim_progress >= 1.0 {
            self.anim_progress = 1.0;
            self.anim = AnimState::Idle;
        }
    }
}
