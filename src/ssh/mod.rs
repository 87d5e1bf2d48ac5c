// ABOUTME: SSH client integration for stored connections
// ABOUTME: Exports the process launcher and the listing/config renderers

pub mod export;
pub mod launcher;

pub use launcher::SshLauncher;
