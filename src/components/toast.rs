use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use yew::prelude::*;

pub const TOAST_MS: i32 = 2000;

/// The message currently on screen, tagged with the generation that showed
/// it so that an older timer cannot hide a newer message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToastSlot {
    generation: u32,
    message: Option<String>,
}

impl ToastSlot {
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[must_use]
    pub fn show(generation: u32, message: String) -> Self {
        Self {
            generation,
            message: Some(message),
        }
    }

    /// Hide the message if it still belongs to `generation`.
    #[must_use]
    pub fn expire(&self, generation: u32) -> Self {
        if generation == self.generation {
            Self {
                generation,
                message: None,
            }
        } else {
            self.clone()
        }
    }
}

pub enum ToastAction {
    Show { generation: u32, message: String },
    Expire(u32),
}

impl Reducible for ToastSlot {
    type Action = ToastAction;

    fn reduce(self: std::rc::Rc<Self>, action: ToastAction) -> std::rc::Rc<Self> {
        match action {
            ToastAction::Show {
                generation,
                message,
            } => Self::show(generation, message).into(),
            ToastAction::Expire(generation) => self.expire(generation).into(),
        }
    }
}

/// Toast state plus a callback that shows a message for `duration_ms`.
#[hook]
pub fn use_toast(duration_ms: i32) -> (UseReducerHandle<ToastSlot>, Callback<String>) {
    let slot = use_reducer(ToastSlot::default);
    // Callbacks outlive renders, so the counter cannot live in the reducer.
    let counter = use_mut_ref(|| 0u32);
    let show = {
        let slot = slot.clone();
        Callback::from(move |message: String| {
            let generation = {
                let mut counter = counter.borrow_mut();
                *counter = counter.wrapping_add(1);
                *counter
            };
            slot.dispatch(ToastAction::Show {
                generation,
                message,
            });
            let slot = slot.clone();
            let hide = Closure::once_into_js(move || {
                slot.dispatch(ToastAction::Expire(generation));
            });
            if let Some(win) = web_sys::window() {
                let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
                    hide.unchecked_ref(),
                    duration_ms,
                );
            }
        })
    };
    (slot, show)
}

#[derive(Properties, PartialEq, Clone)]
pub struct ToastProps {
    pub message: Option<String>,
}

#[function_component(Toast)]
pub fn toast(props: &ToastProps) -> Html {
    let class = classes!("toast", props.message.is_some().then_some("show"));
    html! {
        <div id="toast" class={class} role="status">
            { props.message.clone().unwrap_or_default() }
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_timer_does_not_hide_newer_message() {
        let first = ToastSlot::show(1, "+10s".into());
        let second = ToastSlot::show(2, "-10s".into());
        let after_old_timer = second.expire(first.generation());
        assert_eq!(after_old_timer.message(), Some("-10s"));
        let after_own_timer = after_old_timer.expire(second.generation());
        assert_eq!(after_own_timer.message(), None);
    }

    #[test]
    fn default_slot_is_hidden() {
        let slot = ToastSlot::default();
        assert_eq!(slot.message(), None);
        assert_eq!(slot.expire(0), slot);
    }
}
