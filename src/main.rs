//! `civic_issues` (civ) - Community issue reporting
//!
//! Report location-tagged civic issues, upvote and discuss them, and move
//! them through pending → in progress → resolved from an interactive session.

use civic_issues::run;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
