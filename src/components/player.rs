use web_sys::{HtmlElement, HtmlVideoElement};
use yew::prelude::*;

use crate::config::GestureConfig;
use crate::gesture::dom::GestureBinding;

#[derive(Properties, PartialEq, Clone)]
pub struct PlayerProps {
    pub src: AttrValue,
    #[prop_or_default]
    pub poster: Option<AttrValue>,
    pub on_toast: Callback<String>,
}

/// Video player with touch gestures attached for as long as it is mounted.
#[function_component(Player)]
pub fn player(props: &PlayerProps) -> Html {
    let wrapper_ref = use_node_ref();
    let video_ref = use_node_ref();

    {
        let wrapper_ref = wrapper_ref.clone();
        let video_ref = video_ref.clone();
        let on_toast = props.on_toast.clone();
        use_effect_with((), move |_| {
            let binding = match (
                wrapper_ref.cast::<HtmlElement>(),
                video_ref.cast::<HtmlVideoElement>(),
            ) {
                (Some(wrapper), Some(video)) => {
                    GestureBinding::attach(&wrapper, &video, GestureConfig::load(), on_toast)
                }
                _ => None,
            };
            move || drop(binding)
        });
    }

    html! {<div ref={wrapper_ref} class="player-wrapper" style="position:relative;">
        <video ref={video_ref} class="player-video" controls={true} playsinline={true}
            src={props.src.clone()} poster={props.poster.clone()} />
    </div>}
}
