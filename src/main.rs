use log::LevelFilter;
use tube_web::components::app::App;
use tube_web::util::{init_logging, shortcut_hint};

fn main() {
    init_logging(LevelFilter::Info);
    log::info!("{}", shortcut_hint());
    yew::Renderer::<App>::new().render();
}
