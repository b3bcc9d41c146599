//! The timetabling model the layer tree is built for: an [`Instance`] describing events,
//! resources and constraints, and a [`Timetable`] holding segments and assignment nodes.
mod ids;
mod instance;
mod solution;
mod time_group;
mod timetable;

pub use ids::*;
pub use instance::*;
pub use solution::*;
pub use time_group::*;
pub use timetable::*;
