//! External delivery channels for notifications.
//!
//! - [`emailjs`] — the transactional email provider used for every kind.
//! - [`backend`] — the remote HTTP backend that sends confirmation and
//!   newsletter emails on our behalf.
//! - [`smtp`] — the SMTP transport behind this service's own relay
//!   endpoints.

pub mod backend;
pub mod emailjs;
pub mod smtp;
