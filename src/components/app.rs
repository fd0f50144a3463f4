use super::nav::Nav;
use super::player::Player;
use super::toast::{Toast, TOAST_MS, use_toast};
use crate::state::Theme;
use yew::prelude::*;

/// Served under the stream path so ranged reads bypass the service worker.
pub const VIDEO_SRC: &str = "/watch/stream/sample.mp4";

#[function_component(App)]
pub fn app() -> Html {
    let theme = use_state(Theme::load);
    let nav_open = use_state(|| false);
    let (toast, show_toast) = use_toast(TOAST_MS);

    // Apply and persist the theme whenever it changes
    {
        let current = *theme;
        use_effect_with(current, move |_| {
            current.apply();
            current.save();
            || ()
        });
    }

    let toggle_theme = {
        let theme = theme.clone();
        Callback::from(move |_| theme.set(theme.toggled()))
    };
    let toggle_nav = {
        let nav_open = nav_open.clone();
        Callback::from(move |_| nav_open.set(!*nav_open))
    };
    let close_nav = {
        let nav_open = nav_open.clone();
        Callback::from(move |_| nav_open.set(false))
    };
    let theme_label = match *theme {
        Theme::Dark => "☀️",
        Theme::Light => "🌙",
    };

    let message = toast.message().map(str::to_string);

    html! { <>
        <Nav open={*nav_open} on_toggle={toggle_nav} on_close={close_nav}
            theme_label={theme_label} on_toggle_theme={toggle_theme} />
        <main class="container">
            <Player src={VIDEO_SRC} on_toast={show_toast} />
        </main>
        <Toast message={message} />
    </> }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Request;
    use crate::cache::rules::{Route, RuleTable};
    use crate::config::CacheConfig;

    #[test]
    fn player_video_ranges_bypass_the_cache() {
        let table = RuleTable::from_config(&CacheConfig::default());
        let ranged = Request::get(&format!("https://tube.test{VIDEO_SRC}"))
            .unwrap()
            .with_header("Range", "bytes=0-");
        assert_eq!(table.route(&ranged), Route::PassThrough);
    }
}
