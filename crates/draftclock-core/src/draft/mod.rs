// Draft engine: pick order, turn clock, resolution and preference queues.

pub mod clock;
pub mod league;
pub mod order;
pub mod pick;
pub mod queue;
pub mod resolve;
pub mod roster;
pub mod state;
