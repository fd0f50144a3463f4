use yew::prelude::*;

/// Backdrop shown in place of an image that failed to load.
pub const BROKEN_STYLE: &str = "background-color:#333;";

/// Alt text and inline style for an image, depending on whether it failed.
/// A broken image drops its alt text so the browser does not draw it over
/// the backdrop.
pub fn presentation(alt: &AttrValue, broken: bool) -> (AttrValue, Option<AttrValue>) {
    if broken {
        (AttrValue::Static(""), Some(AttrValue::Static(BROKEN_STYLE)))
    } else {
        (alt.clone(), None)
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct FallbackImageProps {
    pub src: AttrValue,
    #[prop_or_default]
    pub alt: AttrValue,
    #[prop_or_default]
    pub class: Classes,
}

#[function_component(FallbackImage)]
pub fn fallback_image(props: &FallbackImageProps) -> Html {
    let broken = use_state(|| false);
    let onerror = {
        let broken = broken.clone();
        Callback::from(move |_: Event| broken.set(true))
    };
    let (alt, style) = presentation(&props.alt, *broken);
    html! {
        <img src={props.src.clone()} alt={alt} style={style} class={props.class.clone()}
            onerror={onerror} />
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loaded_image_keeps_alt_and_style() {
        let alt = AttrValue::from("channel avatar");
        assert_eq!(presentation(&alt, false), (alt.clone(), None));
    }

    #[test]
    fn broken_image_gets_backdrop_and_empty_alt() {
        let (alt, style) = presentation(&AttrValue::from("thumbnail"), true);
        assert_eq!(alt.as_str(), "");
        assert_eq!(style.as_deref(), Some("background-color:#333;"));
    }
}
