mod navigate;

pub use self::navigate::{Navigate, NavigateOperation};

pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::app::App;
use crate::Event;

pub type AppHttp = Http<Event>;
pub type AppRender = Render<Event>;
pub type AppNavigate = Navigate<Event>;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
    pub navigate: Navigate<Event>,
}
