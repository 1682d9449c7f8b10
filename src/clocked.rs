use crate::components::clock::ClockPhase;

/// Edge-triggered storage cell: an explicit flip-flop model.
///
/// `write()` stores a pending value; the committed value only changes when
/// `tick()` is called with the cell's trigger edge. Between commits the
/// committed value is stable and visible to every other component, which is
/// what prevents combinational races inside a single clock tick.
#[derive(Debug, Clone, Copy)]
pub struct Clocked<T: Copy> {
    pending: T,
    committed: T,
    trigger: ClockPhase,
}

impl<T: Copy> Clocked<T> {
    pub fn new(initial: T, trigger: ClockPhase) -> Self {
        Clocked {
            pending: initial,
            committed: initial,
            trigger,
        }
    }

    /// Stage a value for the next trigger edge.
    pub fn write(&mut self, value: T) {
        self.pending = value;
    }

    /// The committed value, as seen by other components.
    pub fn read(&self) -> T {
        self.committed
    }

    /// The staged value. Used for level signals that are valid within the
    /// current phase, and for merging partial writes (PC nibbles).
    pub fn pending(&self) -> T {
        self.pending
    }

    /// Set pending and committed at once. Reset and direct test access only.
    pub fn force(&mut self, value: T) {
        self.pending = value;
        self.committed = value;
    }

    /// Commit pending to committed if `edge` matches the trigger edge.
    pub fn tick(&mut self, edge: ClockPhase) {
        if edge == self.trigger {
            self.committed = self.pending;
        }
    }
}
