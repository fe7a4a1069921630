//! Session controller logic behind the `/auth` and `/users` endpoints.

mod service;

#[cfg(test)]
mod tests;

pub use service::SessionService;
