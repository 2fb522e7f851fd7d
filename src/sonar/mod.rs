mod client;
mod provider;
mod types;

pub use client::SonarClient;
pub use provider::SonarProvider;
