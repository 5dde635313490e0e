//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `petbook_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("petbook_core ping={}", petbook_core::ping());
    println!("petbook_core version={}", petbook_core::core_version());
}
