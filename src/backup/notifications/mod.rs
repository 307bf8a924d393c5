use crate::backup::result_error::result::Result;
use std::fmt::Display;

pub mod smtp;

pub use smtp::SmtpNotification;

/// Delivers the run report somewhere a human will read it.
pub trait Notification {
    fn send<D1: Display, D2: Display>(&self, topic: D1, msg: D2) -> Result<()>;
}

