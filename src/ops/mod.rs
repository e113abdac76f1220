//! The administrative procedures themselves. Each submodule is the working
//! part of one of the binaries; all of them print their progress as they go,
//! since these are operator-facing scripts, and return a summary the caller
//! (binary or test) can check.

pub mod confirm;
pub mod migrate;
pub mod schema;
pub mod seed;

/// Section banner used by every procedure.
pub fn banner(title: &str) {
    let line = "=".repeat(60);
    println!("\n{line}");
    println!("{title}");
    println!("{line}");
}
