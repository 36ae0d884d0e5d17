pub mod commits;
pub mod config;
pub mod keep;
pub mod links;
pub mod status;

use crate::workflow::reconcile::MatchMode;

fn match_mode(substring: bool) -> MatchMode {
    if substring {
        MatchMode::Substring
    } else {
        MatchMode::Exact
    }
}
