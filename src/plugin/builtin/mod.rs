//! Builtin plugins
//!
//! Compiled-in plugins that self-register through the `builtin!` macro.
//! Offline analyzers (phone, hash, IP) work without any configuration;
//! network plugins share the process HTTP client from the plugin context.

pub mod api;
pub mod breach_watch;
pub mod hash_inspect;
pub mod ip_classify;
pub mod mail_profile;
pub mod phone_insight;
