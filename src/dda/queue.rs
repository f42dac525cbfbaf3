//! Fixed-capacity move queue and the timer interrupt entry point.

use heapless::Deque;

use crate::error::Result;
use crate::hal::StepperHal;
use crate::motion::RampProfile;

use super::record::MoveRecord;
use super::stepper::{Stepper, TickOutcome};

/// FIFO of planned moves between the planner and the stepper.
pub struct MoveQueue<P: RampProfile, const N: usize> {
    moves: Deque<MoveRecord<P>, N>,
}

impl<P: RampProfile, const N: usize> MoveQueue<P, N> {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            moves: Deque::new(),
        }
    }

    /// Append a move. Hands the record back if the queue is full.
    pub fn enqueue(&mut self, record: MoveRecord<P>) -> core::result::Result<(), MoveRecord<P>> {
        self.moves.push_back(record)
    }

    /// The next move to run.
    #[inline]
    pub fn peek(&self) -> Option<&MoveRecord<P>> {
        self.moves.front()
    }

    /// Remove the next move to run.
    pub fn dequeue(&mut self) -> Option<MoveRecord<P>> {
        self.moves.pop_front()
    }

    /// Number of queued moves.
    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Whether no move is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Whether the queue is at capacity.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.moves.is_full()
    }

    /// Maximum number of queued moves.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<P: RampProfile, const N: usize> Default for MoveQueue<P, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, H> Stepper<'_, P, H>
where
    P: RampProfile,
    H: StepperHal,
{
    /// Step timer interrupt handler.
    ///
    /// Runs one tick of the live move, then, if nothing is live any more,
    /// starts queued moves until one goes live or the queue runs dry. Null
    /// moves are applied on the way. Call it once from the foreground to
    /// start an idle machine.
    ///
    /// # Errors
    ///
    /// A hardware error from the tick or from activating the next move.
    pub fn service<const N: usize>(&mut self, queue: &mut MoveQueue<P, N>) -> Result<TickOutcome> {
        let outcome = self.step()?;

        while !self.is_live() {
            let Some(record) = queue.peek().copied() else {
                break;
            };
            // a record that failed to start stays at the head of the queue
            self.activate(&record)?;
            queue.dequeue();
        }

        Ok(outcome)
    }
}
