//! Per-item controls bound once at page load.

pub(crate) mod dispatch;
pub(crate) mod favorite;
pub(crate) mod like;
pub(crate) mod title;

use crate::state::AppState;
use crate::util::log_debug;

pub(crate) fn bind_all(state: &AppState) {
    let likes = like::bind_like_buttons(state);
    let favorites = favorite::bind_favorite_buttons(state);
    let titles = title::bind_title_editors(state);

    log_debug(
        "controls",
        format!("bound like={likes} favorite={favorites} title={titles} view={}", state.page.view),
    );
}
