//! Timer service.
//!
//! One cancellable periodic-tick primitive ([`Ticker`]) drives two pure,
//! tick-advanced disciplines: the per-question elapsed clock
//! ([`ElapsedClock`]) and the rate-limit countdown ([`Cooldown`]). The
//! disciplines hold no threads or tasks of their own, so tests drive them
//! synchronously by calling `tick()`.

mod cooldown;
mod elapsed;
mod ticker;

pub use cooldown::Cooldown;
pub use elapsed::ElapsedClock;
pub use ticker::Ticker;
