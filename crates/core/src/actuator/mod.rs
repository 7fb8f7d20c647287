//! Physical output control.
//!
//! The dispatch engine only needs two capabilities from the hardware side:
//! switching an output kind on or off, and a readiness probe. Both live on
//! the [`Actuator`] trait. [`LampActuator`] maps kinds onto a two-lamp bank
//! (yellow is red and green together).

mod error;
mod lamp;
mod traits;

pub use error::ActuatorError;
pub use lamp::{lamp_pattern, Lamp, LampActuator, LampState};
pub use traits::Actuator;
