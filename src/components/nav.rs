use yew::prelude::*;

use super::image::FallbackImage;

#[derive(Properties, PartialEq, Clone)]
pub struct NavProps {
    pub open: bool,
    pub on_toggle: Callback<()>,
    pub on_close: Callback<()>,
    pub theme_label: AttrValue,
    pub on_toggle_theme: Callback<()>,
}

/// Header navigation. On narrow screens the links collapse behind a menu
/// button, and the overlay behind them closes the menu when tapped.
#[function_component(Nav)]
pub fn nav(props: &NavProps) -> Html {
    let toggle_cb = {
        let cb = props.on_toggle.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let close_cb = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let theme_cb = {
        let cb = props.on_toggle_theme.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let shown = props.open.then_some("show");

    html! {<header class="site-header">
        <a class="logo" href="/">
            <FallbackImage src="/static/icons/icon-72x72.png" alt="" class="logo-icon" />
            {"MalgeunTube"}
        </a>
        <button id="menu-toggle" class="menu-btn" aria-label="Menu" onclick={toggle_cb}>
            {"☰"}
        </button>
        <nav id="nav-links" class={classes!("nav-links", shown)}>
            <a href="/">{"Home"}</a>
            <a href="/search">{"Search"}</a>
            <a href="/history">{"History"}</a>
            <a href="/playlists">{"Playlists"}</a>
        </nav>
        <button id="theme-toggle" class="theme-btn" onclick={theme_cb}>
            { props.theme_label.clone() }
        </button>
        <div id="nav-overlay" class={classes!("nav-overlay", shown)} onclick={close_cb}></div>
    </header>}
}
